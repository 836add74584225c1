//! The forward/backward driver over the fixed PLN rule set.

use super::rules::{self, Effect};
use crate::atom::{Atom, Handle};
use crate::atom_type::AtomType;
use crate::atomspace::AtomSpace;
use crate::context::{CoreContext, TraceEvent};

/// The outcome of a `reason` call. Exhausting the iteration budget is not a
/// failure (§7) — it is reported here, alongside whatever was derived.
#[derive(Debug, Clone)]
pub struct ReasonOutcome {
    pub inserted: Vec<Atom>,
    pub iterations_run: usize,
    pub budget_exhausted: bool,
}

/// A PLN engine bound to one `AtomSpace` and `CoreContext`. Stateless beyond
/// that binding — every call re-scans the space fresh, which is what keeps
/// rule-purity (P5) easy to reason about.
pub struct PlnEngine {
    space: AtomSpace,
    context: CoreContext,
}

/// `pln::create_engine(atomspace)` from §6.
pub fn create_engine(space: AtomSpace) -> PlnEngine {
    PlnEngine::new(space, CoreContext::default())
}

impl PlnEngine {
    pub fn new(space: AtomSpace, context: CoreContext) -> Self {
        Self { space, context }
    }

    pub fn atomspace(&self) -> &AtomSpace {
        &self.space
    }

    /// Up to `max_iterations` fixpoint passes. Each pass applies every rule
    /// to the current atom set and inserts results through the `AtomSpace`,
    /// so re-derivations merge instead of multiplying (I1, P3). Terminates
    /// early the moment a pass inserts nothing new (P6, P7).
    pub fn reason(&self, max_iterations: usize) -> ReasonOutcome {
        let mut inserted = Vec::new();
        let mut iterations_run = 0;
        let mut budget_exhausted = false;

        for iteration in 0..max_iterations {
            iterations_run = iteration + 1;
            self.context.trace(TraceEvent::PassStarted {
                engine: "pln",
                iteration,
            });

            let before = self.space.size();
            let candidates = rules::all_candidates(&self.space, &self.context.config.pln);
            for candidate in &candidates {
                if let Some(atom) = apply_effect(&self.space, &candidate.effect) {
                    self.context.trace(TraceEvent::RuleApplied {
                        rule: candidate.rule_name,
                        conclusion: atom.handle(),
                    });
                    inserted.push(atom);
                }
            }
            let after = self.space.size();

            self.context.trace(TraceEvent::PassFinished {
                engine: "pln",
                iteration,
                inserted: after.saturating_sub(before),
            });

            if after == before {
                break;
            }
            if iteration + 1 == max_iterations {
                budget_exhausted = true;
                self.context.trace(TraceEvent::BudgetExhausted { engine: "pln" });
            }
        }

        ReasonOutcome {
            inserted,
            iterations_run,
            budget_exhausted,
        }
    }

    /// Iterates single passes, accumulating newly derived atoms whose type
    /// equals `target_type`.
    pub fn forward_chain(&self, target_type: AtomType, max_steps: usize) -> Vec<Atom> {
        let mut accumulated = Vec::new();
        for _ in 0..max_steps {
            let before = self.space.size();
            let outcome = self.reason(1);
            accumulated.extend(
                outcome
                    .inserted
                    .into_iter()
                    .filter(|a| a.atom_type() == target_type),
            );
            if self.space.size() == before {
                break;
            }
        }
        accumulated
    }

    /// Deliberately shallow and recursion-free: `true` if `goal` is already
    /// resident, or if a single rule application over current premises would
    /// produce an atom with `goal`'s identity.
    pub fn backward_chain(&self, goal: &Atom) -> bool {
        if self.space.contains(goal.handle()) {
            return true;
        }
        let candidates = rules::all_candidates(&self.space, &self.context.config.pln);
        candidates.iter().any(|c| c.effect.targets(goal))
    }
}

fn apply_effect(space: &AtomSpace, effect: &Effect) -> Option<Atom> {
    match effect {
        Effect::NewLink {
            atom_type,
            outgoing,
            tv,
        } => space.add_link(*atom_type, outgoing.clone(), Some(*tv)).ok(),
        Effect::UpdateAtom { handle, tv } => {
            space.update_tv(*handle, *tv);
            space.get_atom(*handle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom_type::AtomType::*;
    use crate::truth_value::TruthValue;

    #[test]
    fn deduction_then_reasoning_converges() {
        let space = AtomSpace::new();
        let dog = space.add_node(ConceptNode, "dog", None).handle();
        let mammal = space.add_node(ConceptNode, "mammal", None).handle();
        let animal = space.add_node(ConceptNode, "animal", None).handle();
        space
            .add_link(InheritanceLink, vec![dog, mammal], Some(TruthValue::new(0.9, 0.8)))
            .unwrap();
        space
            .add_link(
                InheritanceLink,
                vec![mammal, animal],
                Some(TruthValue::new(0.8, 0.9)),
            )
            .unwrap();

        let engine = create_engine(space.clone());
        let outcome = engine.reason(5);
        assert!(!outcome.budget_exhausted);

        let deduced = space.get_atoms_by_type(InheritanceLink, true);
        let dog_animal = deduced
            .iter()
            .find(|a| a.outgoing() == [dog, animal])
            .expect("dog->animal should have been derived");
        assert!((dog_animal.tv().strength() - 0.72).abs() < 1e-9);
        assert!((dog_animal.tv().confidence() - 0.648).abs() < 1e-9);
    }

    #[test]
    fn inversion_and_deduction_interplay_reaches_fixpoint_by_iteration_four() {
        let space = AtomSpace::new();
        let a = space.add_node(ConceptNode, "a", None).handle();
        let b = space.add_node(ConceptNode, "b", None).handle();
        let c = space.add_node(ConceptNode, "c", None).handle();
        space
            .add_link(InheritanceLink, vec![a, b], Some(TruthValue::new(0.8, 0.9)))
            .unwrap();
        space
            .add_link(InheritanceLink, vec![b, c], Some(TruthValue::new(0.7, 0.8)))
            .unwrap();

        let engine = create_engine(space.clone());
        engine.reason(3);

        let links = space.get_atoms_by_type(InheritanceLink, true);
        assert!(links.iter().any(|l| l.outgoing() == [a, c]));
        assert!(links.iter().any(|l| l.outgoing() == [b, a]));

        let size_after_three = space.size();
        engine.reason(1);
        assert_eq!(space.size(), size_after_three);
    }

    #[test]
    fn backward_chain_finds_one_step_derivation() {
        let space = AtomSpace::new();
        let dog = space.add_node(ConceptNode, "dog", None).handle();
        let mammal = space.add_node(ConceptNode, "mammal", None).handle();
        let animal = space.add_node(ConceptNode, "animal", None).handle();
        space
            .add_link(InheritanceLink, vec![dog, mammal], Some(TruthValue::new(0.9, 0.8)))
            .unwrap();
        space
            .add_link(
                InheritanceLink,
                vec![mammal, animal],
                Some(TruthValue::new(0.8, 0.9)),
            )
            .unwrap();

        let engine = create_engine(space.clone());
        let hypothetical = crate::atom::Atom::Link {
            handle: Handle(u64::MAX),
            atom_type: InheritanceLink,
            outgoing: vec![dog, animal],
            tv: TruthValue::default(),
        };
        assert!(engine.backward_chain(&hypothetical));
    }
}
