//! The generic forward chainer: repeatedly selects the highest-fitness
//! candidate derivations across a `RuleRegistry` and commits them to the
//! `AtomSpace`, in descending fitness order within each step.

use super::rule::RuleRegistry;
use crate::atom::Atom;
use crate::atom_type::AtomType;
use crate::atomspace::AtomSpace;
use std::time::Instant;

/// Result of a `ForwardChainer::run` call.
#[derive(Debug, Clone)]
pub struct ForwardOutcome {
    pub inserted: Vec<Atom>,
    pub steps_run: usize,
    pub budget_exhausted: bool,
    /// `true` if an atom of `target_type` (when one was given) was derived.
    pub target_reached: bool,
}

/// A forward chainer bound to a rule registry. `ure::create_engine` in §6
/// returns one of these wired to the fixed PLN rule set by default, but any
/// registry can be supplied.
pub struct ForwardChainer {
    registry: RuleRegistry,
}

impl ForwardChainer {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    /// Runs up to `max_steps` passes. Each pass computes every candidate
    /// derivation across the registry, sorts by fitness, and applies them in
    /// that order, skipping any derivation whose `fitness` falls below
    /// `fitness_cutoff` when one is given; a pass that inserts nothing ends
    /// the run early. Stops the moment `target_type` is produced, if one is
    /// given. Checks `deadline` at the start of each step for cooperative
    /// cancellation (§5).
    pub fn run(
        &self,
        space: &AtomSpace,
        max_steps: usize,
        target_type: Option<AtomType>,
        fitness_cutoff: Option<f64>,
        deadline: Option<Instant>,
    ) -> ForwardOutcome {
        let mut inserted = Vec::new();
        let mut steps_run = 0;
        let mut budget_exhausted = false;
        let mut target_reached = false;

        for step in 0..max_steps {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    budget_exhausted = true;
                    break;
                }
            }
            steps_run = step + 1;

            let derivations = self.registry.candidate_derivations(space);
            let mut any_inserted = false;
            for derivation in derivations {
                if fitness_cutoff.is_some_and(|cutoff| derivation.fitness < cutoff) {
                    continue;
                }
                let before = space.size();
                let Ok(atom) = space.add_link(
                    derivation.conclusion.atom_type(),
                    derivation.conclusion.outgoing().to_vec(),
                    Some(derivation.conclusion.tv()),
                ) else {
                    continue;
                };
                if space.size() > before {
                    any_inserted = true;
                    if Some(atom.atom_type()) == target_type {
                        target_reached = true;
                    }
                    inserted.push(atom);
                }
            }

            if target_reached || !any_inserted {
                break;
            }
            if step + 1 == max_steps {
                budget_exhausted = true;
            }
        }

        ForwardOutcome {
            inserted,
            steps_run,
            budget_exhausted,
            target_reached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom_type::AtomType::*;
    use crate::truth_value::TruthValue;
    use crate::ure::rule::Rule;
    use std::sync::Arc;

    struct Transitive;

    impl Rule for Transitive {
        fn name(&self) -> &'static str {
            "Transitive"
        }
        fn premises(&self) -> &[AtomType] {
            &[InheritanceLink, InheritanceLink]
        }
        fn conclusion(&self) -> AtomType {
            InheritanceLink
        }
        fn applies_to(&self, premises: &[Atom]) -> bool {
            premises[0].outgoing().get(1) == premises[1].outgoing().first()
                && premises[0].outgoing().first() != premises[1].outgoing().get(1)
        }
        fn apply(&self, premises: &[Atom], space: &AtomSpace) -> Option<Atom> {
            let a = *premises[0].outgoing().first()?;
            let c = *premises[1].outgoing().get(1)?;
            let strength = premises[0].tv().strength() * premises[1].tv().strength();
            let confidence = premises[0].tv().confidence() * premises[1].tv().confidence() * 0.9;
            space
                .add_link(InheritanceLink, vec![a, c], Some(TruthValue::new(strength, confidence)))
                .ok()
        }
        fn fitness(&self, premises: &[Atom]) -> f64 {
            premises[0].tv().confidence() * premises[1].tv().confidence()
        }
    }

    #[test]
    fn forward_chainer_derives_dog_to_animal() {
        let space = AtomSpace::new();
        let dog = space.add_node(ConceptNode, "dog", None).handle();
        let mammal = space.add_node(ConceptNode, "mammal", None).handle();
        let animal = space.add_node(ConceptNode, "animal", None).handle();
        space
            .add_link(InheritanceLink, vec![dog, mammal], Some(TruthValue::new(0.9, 0.8)))
            .unwrap();
        space
            .add_link(InheritanceLink, vec![mammal, animal], Some(TruthValue::new(0.8, 0.9)))
            .unwrap();

        let registry = super::RuleRegistry::new().with_rule(Arc::new(Transitive));
        let chainer = ForwardChainer::new(registry);
        let outcome = chainer.run(&space, 5, None, None, None);

        assert!(outcome
            .inserted
            .iter()
            .any(|a| a.outgoing() == [dog, animal]));
        assert!(!outcome.budget_exhausted);
    }

    #[test]
    fn forward_chainer_stops_at_target_type() {
        let space = AtomSpace::new();
        let dog = space.add_node(ConceptNode, "dog", None).handle();
        let mammal = space.add_node(ConceptNode, "mammal", None).handle();
        let animal = space.add_node(ConceptNode, "animal", None).handle();
        space
            .add_link(InheritanceLink, vec![dog, mammal], Some(TruthValue::new(0.9, 0.8)))
            .unwrap();
        space
            .add_link(InheritanceLink, vec![mammal, animal], Some(TruthValue::new(0.8, 0.9)))
            .unwrap();

        let registry = super::RuleRegistry::new().with_rule(Arc::new(Transitive));
        let chainer = ForwardChainer::new(registry);
        let outcome = chainer.run(&space, 5, Some(InheritanceLink), None, None);
        assert!(outcome.target_reached);
    }

    #[test]
    fn forward_chainer_skips_derivations_below_fitness_cutoff() {
        let space = AtomSpace::new();
        let dog = space.add_node(ConceptNode, "dog", None).handle();
        let mammal = space.add_node(ConceptNode, "mammal", None).handle();
        let animal = space.add_node(ConceptNode, "animal", None).handle();
        space
            .add_link(InheritanceLink, vec![dog, mammal], Some(TruthValue::new(0.9, 0.3)))
            .unwrap();
        space
            .add_link(InheritanceLink, vec![mammal, animal], Some(TruthValue::new(0.8, 0.3)))
            .unwrap();

        let registry = super::RuleRegistry::new().with_rule(Arc::new(Transitive));
        let chainer = ForwardChainer::new(registry);
        let outcome = chainer.run(&space, 5, None, Some(0.5), None);

        assert!(!outcome.inserted.iter().any(|a| a.outgoing() == [dog, animal]));
    }
}
