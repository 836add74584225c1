//! The fixed family of probabilistic rules (§4.3).

use crate::atom::{Atom, Handle};
use crate::atom_type::AtomType;
use crate::atomspace::AtomSpace;
use crate::context::PlnConfig;
use crate::truth_value::TruthValue;

/// A resident `A -> B` fact, flattened out of an `InheritanceLink` (or
/// subtype, e.g. `ImplicationLink`) for the rules to scan.
#[derive(Debug, Clone, Copy)]
pub struct InheritanceFact {
    pub subject: Handle,
    pub predicate: Handle,
    pub tv: TruthValue,
}

/// The effect a rule wants to have on the `AtomSpace`: either a brand new
/// link, or a revision of an atom that already exists (ModusPonens revises a
/// proposition node rather than producing a link).
#[derive(Debug, Clone)]
pub enum Effect {
    NewLink {
        atom_type: AtomType,
        outgoing: Vec<Handle>,
        tv: TruthValue,
    },
    UpdateAtom {
        handle: Handle,
        tv: TruthValue,
    },
}

impl Effect {
    /// `true` if applying this effect would produce (or update) the given
    /// atom's identity — used by `backward_chain`'s one-step dry run.
    pub fn targets(&self, atom: &Atom) -> bool {
        match self {
            Effect::NewLink {
                atom_type,
                outgoing,
                ..
            } => atom.atom_type() == *atom_type && atom.outgoing() == outgoing.as_slice(),
            Effect::UpdateAtom { handle, .. } => atom.handle() == *handle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub rule_name: &'static str,
    pub effect: Effect,
}

/// Gathers every resident `InheritanceLink`-family fact (including
/// `ImplicationLink`, declared a subtype in the type registry).
pub fn inheritance_facts(space: &AtomSpace) -> Vec<InheritanceFact> {
    space
        .get_atoms_by_type(AtomType::InheritanceLink, true)
        .into_iter()
        .filter_map(|atom| match atom {
            Atom::Link {
                ref outgoing, tv, ..
            } if outgoing.len() == 2 => Some(InheritanceFact {
                subject: outgoing[0],
                predicate: outgoing[1],
                tv,
            }),
            _ => None,
        })
        .collect()
}

/// Deduction: `A->B`, `B->C` |- `A->C`.
/// Strength `s_ab * s_bc`, confidence `c_ab * c_bc * discount`.
pub fn deduction(facts: &[InheritanceFact], cfg: &PlnConfig) -> Vec<Candidate> {
    let mut out = Vec::new();
    for ab in facts {
        for bc in facts {
            if ab.predicate != bc.subject || ab.subject == bc.predicate {
                continue;
            }
            let strength = ab.tv.strength() * bc.tv.strength();
            let confidence = ab.tv.confidence() * bc.tv.confidence() * cfg.discount;
            out.push(Candidate {
                rule_name: "Deduction",
                effect: Effect::NewLink {
                    atom_type: AtomType::InheritanceLink,
                    outgoing: vec![ab.subject, bc.predicate],
                    tv: TruthValue::new(strength, confidence),
                },
            });
        }
    }
    out
}

/// Inversion: `A->B` |- `B->A`.
/// Strength `1 / (1 + (1-s)/s)`, confidence `c * inversion_discount`.
pub fn inversion(facts: &[InheritanceFact], cfg: &PlnConfig) -> Vec<Candidate> {
    facts
        .iter()
        .filter(|f| f.tv.strength() > 0.0)
        .map(|f| {
            let s = f.tv.strength();
            let strength = 1.0 / (1.0 + (1.0 - s) / s);
            let confidence = f.tv.confidence() * cfg.inversion_discount;
            Candidate {
                rule_name: "Inversion",
                effect: Effect::NewLink {
                    atom_type: AtomType::InheritanceLink,
                    outgoing: vec![f.predicate, f.subject],
                    tv: TruthValue::new(strength, confidence),
                },
            }
        })
        .collect()
}

/// ModusPonens: `A->B` exists and node `A` has confidence above 0.5 |- revise `B`.
/// Strength `s_ab*s_A + background*(1-s_A)`, confidence `min(c_ab,c_A) * discount`.
pub fn modus_ponens(facts: &[InheritanceFact], space: &AtomSpace, cfg: &PlnConfig) -> Vec<Candidate> {
    let mut out = Vec::new();
    for f in facts {
        let Some(subject) = space.get_atom(f.subject) else {
            continue;
        };
        let s_a = subject.tv().strength();
        let c_a = subject.tv().confidence();
        if c_a <= 0.5 {
            continue;
        }
        let strength = f.tv.strength() * s_a + cfg.modus_ponens_background * (1.0 - s_a);
        let confidence = f.tv.confidence().min(c_a) * cfg.discount;
        out.push(Candidate {
            rule_name: "ModusPonens",
            effect: Effect::UpdateAtom {
                handle: f.predicate,
                tv: TruthValue::new(strength, confidence),
            },
        });
    }
    out
}

/// Abduction: `A->B`, `C->B` (`A != C`) |- `A->C`.
/// Strength is the normalized-product heuristic; confidence uses the fixed
/// abduction discount (0.6, Open Question (a)).
pub fn abduction(facts: &[InheritanceFact], cfg: &PlnConfig) -> Vec<Candidate> {
    let mut out = Vec::new();
    for ab in facts {
        for cb in facts {
            if ab.predicate != cb.predicate || ab.subject == cb.subject {
                continue;
            }
            let s_ab = ab.tv.strength();
            let s_cb = cb.tv.strength();
            let denom = s_ab * s_cb + (1.0 - s_ab) * (1.0 - s_cb);
            let strength = if denom > 0.0 { (s_ab * s_cb) / denom } else { 0.0 };
            let confidence = ab.tv.confidence().min(cb.tv.confidence()) * cfg.abduction_discount;
            out.push(Candidate {
                rule_name: "Abduction",
                effect: Effect::NewLink {
                    atom_type: AtomType::InheritanceLink,
                    outgoing: vec![ab.subject, cb.subject],
                    tv: TruthValue::new(strength, confidence),
                },
            });
        }
    }
    out
}

/// Runs every rule once, in the fixed ordering required by §4.3
/// (Deduction, Inversion, ModusPonens, Abduction).
pub fn all_candidates(space: &AtomSpace, cfg: &PlnConfig) -> Vec<Candidate> {
    let facts = inheritance_facts(space);
    let mut candidates = deduction(&facts, cfg);
    candidates.extend(inversion(&facts, cfg));
    candidates.extend(modus_ponens(&facts, space, cfg));
    candidates.extend(abduction(&facts, cfg));
    candidates
}
