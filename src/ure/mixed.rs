//! The adaptive mixed engine: runs forward and backward chaining in one of
//! five fixed strategies and tracks `InferenceMetrics` so a caller (or the
//! adaptive strategy itself) can compare them.

use super::bit::{backward_chainer, goal_confidence, BitOutcome};
use super::forward::{ForwardChainer, ForwardOutcome};
use super::rule::RuleRegistry;
use crate::atom::{AtomKey, Handle};
use crate::atom_type::AtomType;
use crate::atomspace::AtomSpace;
use crate::context::UreConfig;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ForwardOnly,
    BackwardOnly,
    MixedForwardFirst,
    MixedBackwardFirst,
    AdaptiveBidirectional,
}

/// Per-run bookkeeping used to compare strategies (§4.4). `efficiency_score`
/// is atoms produced per second of wall-clock time, boosted by a goal-solved
/// bonus and a confidence-improvement bonus, each weighted by
/// `UreConfig::efficiency_alpha`/`efficiency_beta` — higher is better.
#[derive(Debug, Clone)]
pub struct InferenceMetrics {
    pub strategy: Strategy,
    pub atoms_generated: usize,
    pub reasoning_time: Duration,
    pub goal_achieved: bool,
    /// Best-confidence gain on the goal atom over the run (0.0 if no goal
    /// was given, or if the run made no progress on it), via
    /// `BackwardChainer::truth_value_fulfillment`.
    pub confidence_improvement: f64,
}

impl InferenceMetrics {
    /// `(atoms_generated / reasoning_time) * (1 + alpha*goal_achieved) *
    /// (1 + beta*confidence_improvement)`, per §4.4. Zero when
    /// `reasoning_time` is zero rather than dividing by it.
    pub fn efficiency_score(&self, cfg: &UreConfig) -> f64 {
        let seconds = self.reasoning_time.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        let throughput = self.atoms_generated as f64 / seconds;
        let goal_term = 1.0 + cfg.efficiency_alpha * if self.goal_achieved { 1.0 } else { 0.0 };
        let confidence_term = 1.0 + cfg.efficiency_beta * self.confidence_improvement;
        throughput * goal_term * confidence_term
    }
}

pub struct MixedOutcome {
    pub forward: Option<ForwardOutcome>,
    pub backward: Option<BitOutcome>,
    pub metrics: InferenceMetrics,
}

/// `ure::create_engine(atomspace)`'s mixed-strategy sibling (§6): executes
/// one fixed strategy over `registry`, optionally driving toward `goal`.
pub fn execute_strategy(
    strategy: Strategy,
    space: &AtomSpace,
    registry: &RuleRegistry,
    goal: Option<AtomKey>,
    cfg: &UreConfig,
    deadline: Option<Instant>,
) -> MixedOutcome {
    let started = Instant::now();
    let confidence_before = goal.as_ref().map(|g| goal_confidence(g, space)).unwrap_or(0.0);
    let gain = |space: &AtomSpace| -> f64 {
        goal.as_ref()
            .map(|g| (goal_confidence(g, space) - confidence_before).max(0.0))
            .unwrap_or(0.0)
    };

    match strategy {
        Strategy::ForwardOnly => {
            let outcome = ForwardChainer::new(registry.clone()).run(
                space,
                cfg.default_max_steps,
                None,
                None,
                deadline,
            );
            let metrics = InferenceMetrics {
                strategy,
                atoms_generated: outcome.inserted.len(),
                reasoning_time: started.elapsed(),
                goal_achieved: outcome.target_reached,
                confidence_improvement: gain(space),
            };
            MixedOutcome {
                forward: Some(outcome),
                backward: None,
                metrics,
            }
        }
        Strategy::BackwardOnly => {
            let backward = goal.clone().map(|g| {
                backward_chainer(space.clone(), cfg.default_max_iterations, cfg.default_max_iterations)
                    .with_lambda(cfg.bit_lambda)
                    .solve(g, deadline)
            });
            let metrics = InferenceMetrics {
                strategy,
                atoms_generated: 0,
                reasoning_time: started.elapsed(),
                goal_achieved: backward.as_ref().map(|b| b.solved).unwrap_or(false),
                confidence_improvement: gain(space),
            };
            MixedOutcome {
                forward: None,
                backward,
                metrics,
            }
        }
        Strategy::MixedForwardFirst => {
            let forward = ForwardChainer::new(registry.clone()).run(
                space,
                cfg.default_max_steps,
                None,
                None,
                deadline,
            );
            let backward = goal.clone().map(|g| {
                backward_chainer(space.clone(), cfg.default_max_iterations, cfg.default_max_iterations)
                    .with_lambda(cfg.bit_lambda)
                    .solve(g, deadline)
            });
            let solved = backward.as_ref().map(|b| b.solved).unwrap_or(forward.target_reached);
            let metrics = InferenceMetrics {
                strategy,
                atoms_generated: forward.inserted.len(),
                reasoning_time: started.elapsed(),
                goal_achieved: solved,
                confidence_improvement: gain(space),
            };
            MixedOutcome {
                forward: Some(forward),
                backward,
                metrics,
            }
        }
        Strategy::MixedBackwardFirst => {
            let backward = goal.clone().map(|g| {
                backward_chainer(space.clone(), cfg.default_max_iterations, cfg.default_max_iterations)
                    .with_lambda(cfg.bit_lambda)
                    .solve(g, deadline)
            });
            let already_solved = backward.as_ref().map(|b| b.solved).unwrap_or(false);
            let forward = if already_solved {
                None
            } else {
                Some(ForwardChainer::new(registry.clone()).run(
                    space,
                    cfg.default_max_steps,
                    None,
                    None,
                    deadline,
                ))
            };
            let solved = already_solved || forward.as_ref().map(|f| f.target_reached).unwrap_or(false);
            let metrics = InferenceMetrics {
                strategy,
                atoms_generated: forward.as_ref().map(|f| f.inserted.len()).unwrap_or(0),
                reasoning_time: started.elapsed(),
                goal_achieved: solved,
                confidence_improvement: gain(space),
            };
            MixedOutcome {
                forward,
                backward,
                metrics,
            }
        }
        Strategy::AdaptiveBidirectional => adaptive_chain(space, registry, goal, cfg, deadline),
    }
}

/// Structural shape of a goal atom, inspected by `adaptive_chain` to pick a
/// delegate strategy (§4.4): how many links deep it nests, how many free
/// variables it mentions, and whether any child is itself a link rather than
/// a plain node.
struct GoalComplexity {
    depth: usize,
    variable_count: usize,
    has_nested_links: bool,
}

fn analyze_goal_complexity(goal: &AtomKey, space: &AtomSpace) -> GoalComplexity {
    fn walk(handle: Handle, space: &AtomSpace, depth: usize, variables: &mut usize, nested: &mut bool) -> usize {
        let Some(atom) = space.get_atom(handle) else {
            return depth;
        };
        if atom.atom_type() == AtomType::VariableNode {
            *variables += 1;
            return depth;
        }
        if !atom.is_link() {
            return depth;
        }
        *nested = true;
        atom.outgoing()
            .iter()
            .map(|&child| walk(child, space, depth + 1, variables, nested))
            .max()
            .unwrap_or(depth)
    }

    match goal {
        AtomKey::Node { atom_type, .. } => GoalComplexity {
            depth: 0,
            variable_count: usize::from(*atom_type == AtomType::VariableNode),
            has_nested_links: false,
        },
        AtomKey::Link { outgoing, .. } => {
            let mut variable_count = 0;
            let mut has_nested_links = false;
            let depth = outgoing
                .iter()
                .map(|&child| walk(child, space, 1, &mut variable_count, &mut has_nested_links))
                .max()
                .unwrap_or(1);
            GoalComplexity {
                depth,
                variable_count,
                has_nested_links,
            }
        }
    }
}

/// Analyzes the goal's structural complexity and, for goals that are
/// neither trivially simple nor clearly variable-laden, a cheap same-call
/// trial run of both single-direction strategies at a reduced budget — its
/// "past performance" signal, since this driver has no cross-call history
/// store (Open Question, DESIGN.md) — to pick a delegate strategy (§4.4).
/// Labels the returned metrics with `AdaptiveBidirectional` so callers can
/// tell an adaptive run from a manually chosen one.
pub fn adaptive_chain(
    space: &AtomSpace,
    registry: &RuleRegistry,
    goal: Option<AtomKey>,
    cfg: &UreConfig,
    deadline: Option<Instant>,
) -> MixedOutcome {
    let complexity = goal.as_ref().map(|g| analyze_goal_complexity(g, space));

    let delegate = match (&goal, &complexity) {
        (None, _) => Strategy::ForwardOnly,
        (Some(_), Some(c)) if c.variable_count > 0 || c.has_nested_links => {
            Strategy::MixedForwardFirst
        }
        (Some(_), Some(c)) if c.depth <= 1 => Strategy::BackwardOnly,
        (Some(_), _) => {
            let trial_cfg = UreConfig {
                default_max_steps: cfg.default_max_steps.min(5).max(1),
                default_max_iterations: cfg.default_max_iterations.min(5).max(1),
                ..*cfg
            };
            let forward_trial =
                execute_strategy(Strategy::ForwardOnly, space, registry, goal.clone(), &trial_cfg, deadline);
            let backward_trial =
                execute_strategy(Strategy::BackwardOnly, space, registry, goal.clone(), &trial_cfg, deadline);
            if backward_trial.metrics.efficiency_score(cfg) >= forward_trial.metrics.efficiency_score(cfg) {
                Strategy::MixedBackwardFirst
            } else {
                Strategy::MixedForwardFirst
            }
        }
    };

    let mut outcome = execute_strategy(delegate, space, registry, goal, cfg, deadline);
    outcome.metrics.strategy = Strategy::AdaptiveBidirectional;
    outcome
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
        fn premises(&self) -> &[crate::atom_type::AtomType] {
            &[InheritanceLink, InheritanceLink]
        }
        fn conclusion(&self) -> crate::atom_type::AtomType {
            InheritanceLink
        }
        fn applies_to(&self, premises: &[crate::atom::Atom]) -> bool {
            premises[0].outgoing().get(1) == premises[1].outgoing().first()
                && premises[0].outgoing().first() != premises[1].outgoing().get(1)
        }
        fn apply(&self, premises: &[crate::atom::Atom], space: &AtomSpace) -> Option<crate::atom::Atom> {
            let a = *premises[0].outgoing().first()?;
            let c = *premises[1].outgoing().get(1)?;
            let strength = premises[0].tv().strength() * premises[1].tv().strength();
            let confidence = premises[0].tv().confidence() * premises[1].tv().confidence() * 0.9;
            space
                .add_link(InheritanceLink, vec![a, c], Some(TruthValue::new(strength, confidence)))
                .ok()
        }
        fn fitness(&self, premises: &[crate::atom::Atom]) -> f64 {
            premises[0].tv().confidence() * premises[1].tv().confidence()
        }
    }

    #[test]
    fn adaptive_strategy_solves_goal_via_backward_first() {
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

        let registry = RuleRegistry::new().with_rule(Arc::new(Transitive));
        let cfg = UreConfig::default();
        let goal = AtomKey::Link {
            atom_type: InheritanceLink,
            outgoing: vec![dog, animal],
        };
        let outcome = execute_strategy(
            Strategy::AdaptiveBidirectional,
            &space,
            &registry,
            Some(goal),
            &cfg,
            None,
        );
        assert!(outcome.metrics.goal_achieved);
        assert_eq!(outcome.metrics.strategy, Strategy::AdaptiveBidirectional);
    }

    #[test]
    fn forward_only_reports_efficiency_score() {
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

        let registry = RuleRegistry::new().with_rule(Arc::new(Transitive));
        let cfg = UreConfig::default();
        let outcome = execute_strategy(Strategy::ForwardOnly, &space, &registry, None, &cfg, None);
        assert!(outcome.metrics.atoms_generated > 0);
        assert!(outcome.metrics.efficiency_score(&cfg).is_finite());
    }
}
