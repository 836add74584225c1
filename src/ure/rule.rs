//! The generic rule capability set URE's chainers operate over (§9 "Rule
//! polymorphism"): rules are values implementing one trait rather than a
//! fixed enum, so the registry can hold PLN's rules alongside any other
//! family without the chainers knowing the difference.

use crate::atom::Atom;
use crate::atom_type::AtomType;
use crate::atomspace::AtomSpace;
use std::sync::Arc;

/// One premise combination and the conclusion a rule would produce from it,
/// without committing it to the `AtomSpace`. Chainers sort these by
/// `fitness` before applying any of them.
pub struct Derivation {
    pub rule_name: &'static str,
    pub premises: Vec<Atom>,
    pub conclusion: Atom,
    pub fitness: f64,
}

/// A rule: `name`, the atom types of its premises, the atom type of what it
/// concludes, and the two operations a chainer needs — `applies_to` to test
/// a candidate premise tuple cheaply, `apply` to actually run it.
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    /// The atom type each positional premise must have. A rule with two
    /// `InheritanceLink` premises returns a two-element slice.
    fn premises(&self) -> &[AtomType];

    /// The atom type `apply` produces.
    fn conclusion(&self) -> AtomType;

    /// Cheap pre-check before committing to `apply`'s full computation.
    fn applies_to(&self, premises: &[Atom]) -> bool;

    /// Computes the conclusion atom (not yet inserted) from a premise tuple
    /// that has already passed `applies_to`. Returns `None` if the rule
    /// decides, during the full computation, that it doesn't apply after all
    /// (e.g. a side condition `applies_to` doesn't check).
    fn apply(&self, premises: &[Atom], space: &AtomSpace) -> Option<Atom>;

    /// A rule-specific quality score in `[0, 1]` used to rank candidate
    /// derivations; chainers prefer the highest-fitness candidate first.
    fn fitness(&self, premises: &[Atom]) -> f64;
}

/// A heterogeneous collection of rules. Chainers enumerate it in insertion
/// order when scanning for candidates, then resort the resulting
/// derivations by fitness.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.register(rule);
        self
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Every candidate premise tuple, across every registered rule, that
    /// passes `applies_to`, paired with its would-be conclusion and fitness.
    /// Premise tuples are built from the cartesian product of resident atoms
    /// matching each positional premise type (including subtypes).
    pub fn candidate_derivations(&self, space: &AtomSpace) -> Vec<Derivation> {
        let mut out = Vec::new();
        for rule in &self.rules {
            for premises in premise_tuples(rule.premises(), space) {
                if !rule.applies_to(&premises) {
                    continue;
                }
                let Some(conclusion) = rule.apply(&premises, space) else {
                    continue;
                };
                let fitness = rule.fitness(&premises);
                out.push(Derivation {
                    rule_name: rule.name(),
                    premises,
                    conclusion,
                    fitness,
                });
            }
        }
        out.sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap_or(std::cmp::Ordering::Equal));
        out
    }
}

/// Cartesian product over the resident atoms of each premise type (with
/// subtypes). Bounded by the size of the space; fine at the scale a rule
/// registry is expected to run over in one pass.
fn premise_tuples(types: &[AtomType], space: &AtomSpace) -> Vec<Vec<Atom>> {
    let mut tuples: Vec<Vec<Atom>> = vec![Vec::new()];
    for &ty in types {
        let candidates = space.get_atoms_by_type(ty, true);
        let mut next = Vec::with_capacity(tuples.len() * candidates.len());
        for tuple in &tuples {
            for candidate in &candidates {
                let mut extended = tuple.clone();
                extended.push(candidate.clone());
                next.push(extended);
            }
        }
        tuples = next;
    }
    tuples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom_type::AtomType::*;
    use crate::truth_value::TruthValue;

    struct AlwaysTransitive;

    impl Rule for AlwaysTransitive {
        fn name(&self) -> &'static str {
            "AlwaysTransitive"
        }
        fn premises(&self) -> &[AtomType] {
            &[InheritanceLink, InheritanceLink]
        }
        fn conclusion(&self) -> AtomType {
            InheritanceLink
        }
        fn applies_to(&self, premises: &[Atom]) -> bool {
            premises[0].outgoing().get(1) == premises[1].outgoing().first()
        }
        fn apply(&self, premises: &[Atom], space: &AtomSpace) -> Option<Atom> {
            let a = *premises[0].outgoing().first()?;
            let c = *premises[1].outgoing().get(1)?;
            space.add_link(InheritanceLink, vec![a, c], Some(TruthValue::new(0.5, 0.5))).ok()
        }
        fn fitness(&self, premises: &[Atom]) -> f64 {
            premises[0].tv().confidence() * premises[1].tv().confidence()
        }
    }

    #[test]
    fn registry_finds_transitive_candidates() {
        let space = AtomSpace::new();
        let a = space.add_node(ConceptNode, "a", None).handle();
        let b = space.add_node(ConceptNode, "b", None).handle();
        let c = space.add_node(ConceptNode, "c", None).handle();
        space.add_link(InheritanceLink, vec![a, b], None).unwrap();
        space.add_link(InheritanceLink, vec![b, c], None).unwrap();

        let registry = RuleRegistry::new().with_rule(Arc::new(AlwaysTransitive));
        let derivations = registry.candidate_derivations(&space);
        assert!(derivations
            .iter()
            .any(|d| d.conclusion.outgoing() == [a, c]));
    }
}
