//! A thin inspection shell: load a textual `AtomSpace` dump, optionally run
//! a bounded number of PLN or URE steps, and print what comes out.
//!
//! Not a network-facing surface — no listening socket, no persistent
//! process. Exists so a developer can exercise the library from a terminal.

use clap::{Parser, Subcommand};
use cogspace::context::{CoreConfig, CoreContext, WriterTracer};
use cogspace::{pln, AtomSpace, AtomType, TruthValue};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "atomspace-cli", version, about = "Inspect an AtomSpace dump.")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a dump and print every resident atom.
    Show {
        #[arg(required = true)]
        file: PathBuf,
        /// Print each atom as a JSON object instead of the textual form.
        #[arg(long)]
        json: bool,
    },
    /// Load a dump, run `pln.reason(max_iterations)`, and print what changed.
    Reason {
        #[arg(required = true)]
        file: PathBuf,
        #[arg(long, default_value_t = 10)]
        max_iterations: usize,
        #[arg(long)]
        trace: bool,
    },
}

fn main() {
    let args = Args::parse();
    let result = match &args.command {
        Command::Show { file, json } => handle_show(file, *json),
        Command::Reason {
            file,
            max_iterations,
            trace,
        } => handle_reason(file, *max_iterations, *trace),
    };

    if let Err(message) = result {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

fn handle_show(file: &PathBuf, json: bool) -> Result<(), String> {
    let space = load_dump(file)?;
    if json {
        for atom_type in cogspace::atom_type::all_types() {
            for atom in space.get_atoms_by_type(*atom_type, false) {
                let rendered = serde_json::to_string(&atom).map_err(|e| e.to_string())?;
                println!("{rendered}");
            }
        }
    } else {
        print_atoms(&space);
    }
    Ok(())
}

fn handle_reason(file: &PathBuf, max_iterations: usize, trace: bool) -> Result<(), String> {
    let space = load_dump(file)?;
    let context = if trace {
        CoreContext::with_tracer(CoreConfig::default(), Arc::new(WriterTracer::new(std::io::stderr())))
    } else {
        CoreContext::default()
    };
    let engine = pln::PlnEngine::new(space.clone(), context);
    let outcome = engine.reason(max_iterations);

    println!(
        "ran {} iteration(s), derived {} atom(s), budget_exhausted={}",
        outcome.iterations_run,
        outcome.inserted.len(),
        outcome.budget_exhausted
    );
    for atom in &outcome.inserted {
        println!("  {}", format_atom(atom, &space));
    }
    Ok(())
}

fn load_dump(path: &PathBuf) -> Result<AtomSpace, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("reading {}: {e}", path.display()))?;
    let space = AtomSpace::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        dump::parse_form(&space, line)
            .map_err(|e| format!("{}:{}: {e}", path.display(), line_no + 1))?;
    }
    Ok(space)
}

fn print_atoms(space: &AtomSpace) {
    for atom_type in cogspace::atom_type::all_types() {
        for atom in space.get_atoms_by_type(*atom_type, false) {
            println!("{}", format_atom(&atom, space));
        }
    }
}

fn format_atom(atom: &cogspace::Atom, _space: &AtomSpace) -> String {
    let tv = atom.tv();
    match atom.name() {
        Some(name) => format!(
            "{} {:?} \"{name}\" [{:.3} {:.3}]",
            atom.handle(),
            atom.atom_type(),
            tv.strength(),
            tv.confidence()
        ),
        None => format!(
            "{} {:?} {:?} [{:.3} {:.3}]",
            atom.handle(),
            atom.atom_type(),
            atom.outgoing(),
            tv.strength(),
            tv.confidence()
        ),
    }
}

/// A small recursive-descent reader for the recommended textual form:
/// `(TypeName "name" [s c])` for nodes, `(TypeName <child> <child> ...)` for
/// links, where each child is itself one of these forms.
mod dump {
    use super::*;

    pub fn parse_form(space: &AtomSpace, line: &str) -> Result<(), String> {
        let mut chars = line.char_indices().peekable();
        let atom = read_expr(space, line, &mut chars)?;
        let _ = atom;
        Ok(())
    }

    fn read_expr(
        space: &AtomSpace,
        src: &str,
        chars: &mut std::iter::Peekable<std::str::CharIndices>,
    ) -> Result<cogspace::Atom, String> {
        skip_ws(chars);
        match chars.next() {
            Some((_, '(')) => read_list(space, src, chars),
            other => Err(format!("expected '(', found {other:?}")),
        }
    }

    fn read_list(
        space: &AtomSpace,
        src: &str,
        chars: &mut std::iter::Peekable<std::str::CharIndices>,
    ) -> Result<cogspace::Atom, String> {
        skip_ws(chars);
        let type_name = read_token(src, chars);
        let atom_type = parse_type(&type_name)?;

        skip_ws(chars);
        if let Some(&(_, '"')) = chars.peek() {
            let name = read_string(src, chars)?;
            let tv = read_optional_tv(chars)?;
            expect_close(chars)?;
            return Ok(space.add_node(atom_type, &name, tv));
        }

        let mut children = Vec::new();
        loop {
            skip_ws(chars);
            match chars.peek() {
                Some(&(_, ')')) => {
                    chars.next();
                    break;
                }
                Some(&(_, '(')) => {
                    let child = read_expr(space, src, chars)?;
                    children.push(child.handle());
                }
                None => return Err("unterminated link".to_string()),
                Some(&(i, c)) => return Err(format!("unexpected character '{c}' at byte {i}")),
            }
        }
        space.add_link(atom_type, children, None).map_err(|e| e.to_string())
    }

    fn parse_type(name: &str) -> Result<AtomType, String> {
        cogspace::atom_type::all_types()
            .iter()
            .find(|t| format!("{t:?}") == name)
            .copied()
            .ok_or_else(|| format!("unknown atom type `{name}`"))
    }

    fn read_token(src: &str, chars: &mut std::iter::Peekable<std::str::CharIndices>) -> String {
        let start = chars.peek().map(|&(i, _)| i).unwrap_or(src.len());
        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() || c == ')' || c == '(' {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }
        src[start..end].to_string()
    }

    fn read_string(
        src: &str,
        chars: &mut std::iter::Peekable<std::str::CharIndices>,
    ) -> Result<String, String> {
        chars.next(); // opening quote
        let start = chars.peek().map(|&(i, _)| i).unwrap_or(src.len());
        let mut end = start;
        loop {
            match chars.next() {
                Some((i, '"')) => {
                    end = i;
                    break;
                }
                Some((i, c)) => end = i + c.len_utf8(),
                None => return Err("unterminated string literal".to_string()),
            }
        }
        Ok(src[start..end].to_string())
    }

    fn read_optional_tv(
        chars: &mut std::iter::Peekable<std::str::CharIndices>,
    ) -> Result<Option<TruthValue>, String> {
        skip_ws(chars);
        if chars.peek().map(|&(_, c)| c) != Some('[') {
            return Ok(None);
        }
        chars.next();
        skip_ws(chars);
        let s = read_number(chars)?;
        skip_ws(chars);
        let c = read_number(chars)?;
        skip_ws(chars);
        match chars.next() {
            Some((_, ']')) => Ok(Some(TruthValue::new(s, c))),
            other => Err(format!("expected ']', found {other:?}")),
        }
    }

    fn read_number(chars: &mut std::iter::Peekable<std::str::CharIndices>) -> Result<f64, String> {
        let mut digits = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_ascii_digit() || c == '.' || c == '-' {
                digits.push(c);
                chars.next();
            } else {
                break;
            }
        }
        digits.parse::<f64>().map_err(|e| e.to_string())
    }

    fn expect_close(chars: &mut std::iter::Peekable<std::str::CharIndices>) -> Result<(), String> {
        skip_ws(chars);
        match chars.next() {
            Some((_, ')')) => Ok(()),
            other => Err(format!("expected ')', found {other:?}")),
        }
    }

    fn skip_ws(chars: &mut std::iter::Peekable<std::str::CharIndices>) {
        while let Some(&(_, c)) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
            } else {
                break;
            }
        }
    }
}
