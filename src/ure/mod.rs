//! The Unified Rule Engine: a generic rule registry plus Forward, Backward
//! (BIT), and Adaptive Mixed drivers (§4.4).

pub mod bit;
pub mod forward;
pub mod mixed;
pub mod rule;

pub use bit::{backward_chainer, BackwardChainer, BitOutcome};
pub use forward::{ForwardChainer, ForwardOutcome};
pub use mixed::{adaptive_chain, execute_strategy, InferenceMetrics, MixedOutcome, Strategy};
pub use rule::{Derivation, Rule, RuleRegistry};

use crate::atomspace::AtomSpace;
use crate::pln::rules::{self as pln_rules, Effect};
use crate::atom::Atom;
use crate::atom_type::AtomType;
use crate::context::PlnConfig;

/// `ure::create_engine(atomspace)` from §6: a `ForwardChainer` wired to the
/// fixed PLN rule set, exposed as `Rule` values so it composes with any
/// other registry a caller builds.
pub fn create_engine(_space: AtomSpace) -> ForwardChainer {
    ForwardChainer::new(pln_rule_registry())
}

/// Wraps each PLN formula (§4.3) as a `Rule` so it can sit in a
/// `RuleRegistry` next to rules from other families. Declared here, rather
/// than in `pln`, because the `Rule` trait is URE's abstraction over PLN's
/// concrete formulas, not the other way around. Public so callers building
/// a custom mixed-strategy run can start from the same base registry
/// `create_engine` uses.
pub fn pln_rule_registry() -> RuleRegistry {
    RuleRegistry::new()
        .with_rule(std::sync::Arc::new(PlnDeductionRule))
        .with_rule(std::sync::Arc::new(PlnInversionRule))
        .with_rule(std::sync::Arc::new(PlnModusPonensRule))
        .with_rule(std::sync::Arc::new(PlnAbductionRule))
}

struct PlnDeductionRule;

impl Rule for PlnDeductionRule {
    fn name(&self) -> &'static str {
        "Deduction"
    }

    fn premises(&self) -> &[AtomType] {
        &[AtomType::InheritanceLink, AtomType::InheritanceLink]
    }

    fn conclusion(&self) -> AtomType {
        AtomType::InheritanceLink
    }

    fn applies_to(&self, premises: &[Atom]) -> bool {
        let (Atom::Link { outgoing: ab, .. }, Atom::Link { outgoing: bc, .. }) =
            (&premises[0], &premises[1])
        else {
            return false;
        };
        ab.len() == 2 && bc.len() == 2 && ab[1] == bc[0] && ab[0] != bc[1]
    }

    fn apply(&self, premises: &[Atom], space: &AtomSpace) -> Option<Atom> {
        let cfg = PlnConfig::default();
        let ab = pln_rules::InheritanceFact {
            subject: premises[0].outgoing()[0],
            predicate: premises[0].outgoing()[1],
            tv: premises[0].tv(),
        };
        let bc = pln_rules::InheritanceFact {
            subject: premises[1].outgoing()[0],
            predicate: premises[1].outgoing()[1],
            tv: premises[1].tv(),
        };
        let candidates = pln_rules::deduction(&[ab, bc], &cfg);
        let candidate = candidates.into_iter().find(|c| {
            matches!(&c.effect, Effect::NewLink { outgoing, .. } if outgoing == &vec![ab.subject, bc.predicate])
        })?;
        match candidate.effect {
            Effect::NewLink { atom_type, outgoing, tv } => {
                space.add_link(atom_type, outgoing, Some(tv)).ok()
            }
            Effect::UpdateAtom { .. } => None,
        }
    }

    fn fitness(&self, premises: &[Atom]) -> f64 {
        premises[0].tv().confidence() * premises[1].tv().confidence()
    }
}

struct PlnInversionRule;

impl Rule for PlnInversionRule {
    fn name(&self) -> &'static str {
        "Inversion"
    }

    fn premises(&self) -> &[AtomType] {
        &[AtomType::InheritanceLink]
    }

    fn conclusion(&self) -> AtomType {
        AtomType::InheritanceLink
    }

    fn applies_to(&self, premises: &[Atom]) -> bool {
        let Atom::Link { outgoing, tv, .. } = &premises[0] else {
            return false;
        };
        outgoing.len() == 2 && tv.strength() > 0.0
    }

    fn apply(&self, premises: &[Atom], space: &AtomSpace) -> Option<Atom> {
        let cfg = PlnConfig::default();
        let fact = pln_rules::InheritanceFact {
            subject: premises[0].outgoing()[0],
            predicate: premises[0].outgoing()[1],
            tv: premises[0].tv(),
        };
        let candidate = pln_rules::inversion(&[fact], &cfg).into_iter().next()?;
        match candidate.effect {
            Effect::NewLink { atom_type, outgoing, tv } => space.add_link(atom_type, outgoing, Some(tv)).ok(),
            Effect::UpdateAtom { .. } => None,
        }
    }

    fn fitness(&self, premises: &[Atom]) -> f64 {
        premises[0].tv().confidence()
    }
}

/// Wraps `pln::rules::modus_ponens`. Its conclusion revises the predicate
/// node's tv in place rather than producing a link; `conclusion()` declares
/// `ConceptNode` since every seed scenario's predicate is one (the formula
/// itself is agnostic to node type).
struct PlnModusPonensRule;

impl Rule for PlnModusPonensRule {
    fn name(&self) -> &'static str {
        "ModusPonens"
    }

    fn premises(&self) -> &[AtomType] {
        &[AtomType::InheritanceLink]
    }

    fn conclusion(&self) -> AtomType {
        AtomType::ConceptNode
    }

    fn applies_to(&self, premises: &[Atom]) -> bool {
        matches!(&premises[0], Atom::Link { outgoing, .. } if outgoing.len() == 2)
    }

    fn apply(&self, premises: &[Atom], space: &AtomSpace) -> Option<Atom> {
        let cfg = PlnConfig::default();
        let fact = pln_rules::InheritanceFact {
            subject: premises[0].outgoing()[0],
            predicate: premises[0].outgoing()[1],
            tv: premises[0].tv(),
        };
        let candidate = pln_rules::modus_ponens(&[fact], space, &cfg).into_iter().next()?;
        match candidate.effect {
            Effect::UpdateAtom { handle, tv } => {
                space.update_tv(handle, tv);
                space.get_atom(handle)
            }
            Effect::NewLink { .. } => None,
        }
    }

    fn fitness(&self, premises: &[Atom]) -> f64 {
        premises[0].tv().confidence()
    }
}

struct PlnAbductionRule;

impl Rule for PlnAbductionRule {
    fn name(&self) -> &'static str {
        "Abduction"
    }

    fn premises(&self) -> &[AtomType] {
        &[AtomType::InheritanceLink, AtomType::InheritanceLink]
    }

    fn conclusion(&self) -> AtomType {
        AtomType::InheritanceLink
    }

    fn applies_to(&self, premises: &[Atom]) -> bool {
        let (Atom::Link { outgoing: ab, .. }, Atom::Link { outgoing: cb, .. }) =
            (&premises[0], &premises[1])
        else {
            return false;
        };
        ab.len() == 2 && cb.len() == 2 && ab[1] == cb[1] && ab[0] != cb[0]
    }

    fn apply(&self, premises: &[Atom], space: &AtomSpace) -> Option<Atom> {
        let cfg = PlnConfig::default();
        let ab = pln_rules::InheritanceFact {
            subject: premises[0].outgoing()[0],
            predicate: premises[0].outgoing()[1],
            tv: premises[0].tv(),
        };
        let cb = pln_rules::InheritanceFact {
            subject: premises[1].outgoing()[0],
            predicate: premises[1].outgoing()[1],
            tv: premises[1].tv(),
        };
        let candidates = pln_rules::abduction(&[ab, cb], &cfg);
        let candidate = candidates.into_iter().find(|c| {
            matches!(&c.effect, Effect::NewLink { outgoing, .. } if outgoing == &vec![ab.subject, cb.subject])
        })?;
        match candidate.effect {
            Effect::NewLink { atom_type, outgoing, tv } => {
                space.add_link(atom_type, outgoing, Some(tv)).ok()
            }
            Effect::UpdateAtom { .. } => None,
        }
    }

    fn fitness(&self, premises: &[Atom]) -> f64 {
        premises[0].tv().confidence().min(premises[1].tv().confidence())
    }
}
