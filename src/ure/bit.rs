//! The Backward Inference Tree (BIT): URE's backward chainer.
//!
//! Modeled as an arena indexed by `BitNodeId` rather than an owning tree with
//! parent pointers, per §9's guidance for cyclic/shared structure — a BIT
//! node never outlives the arena, and children are referenced by index.

use crate::atom::{Atom, AtomKey, Handle};
use crate::atom_type::AtomType;
use crate::atomspace::AtomSpace;
use crate::pattern::{self, Pattern, VariableBinding};
use crate::pln::rules;
use crate::truth_value::TruthValue;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitNodeId(usize);

struct BitNode {
    target: AtomKey,
    depth: usize,
    is_leaf: bool,
    exhausted: bool,
    fitness: f64,
    children: Vec<BitNodeId>,
}

/// Backward chainer bound to one `AtomSpace`, `max_depth`, and
/// `max_iterations` — mirrors `ure::backward_chainer(atomspace, max_depth,
/// max_iterations)` from §6.
pub struct BackwardChainer {
    space: AtomSpace,
    max_depth: usize,
    max_iterations: usize,
    lambda: f64,
}

/// Result of a `solve` call. Budget exhaustion returns the best partial
/// solution rather than discarding work (§5 Cancellation, §7).
#[derive(Debug, Clone)]
pub struct BitOutcome {
    pub solved: bool,
    pub expansions: usize,
    pub budget_exhausted: bool,
}

pub fn backward_chainer(space: AtomSpace, max_depth: usize, max_iterations: usize) -> BackwardChainer {
    BackwardChainer::new(space, max_depth, max_iterations)
}

impl BackwardChainer {
    pub fn new(space: AtomSpace, max_depth: usize, max_iterations: usize) -> Self {
        Self {
            space,
            max_depth,
            max_iterations,
            lambda: 0.2,
        }
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Searches for a derivation of `goal`, expanding the highest-fitness
    /// non-exhausted leaf at each step until solved, exhausted, or the
    /// `max_iterations` / `deadline` budget runs out.
    pub fn solve(&self, goal: AtomKey, deadline: Option<Instant>) -> BitOutcome {
        let mut arena: Vec<BitNode> = vec![self.make_node(goal, 0)];
        let mut expansions = 0;

        if is_resident(&arena[0].target, &self.space) {
            return BitOutcome {
                solved: true,
                expansions,
                budget_exhausted: false,
            };
        }

        for _ in 0..self.max_iterations {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return BitOutcome {
                        solved: is_solved(&arena, BitNodeId(0), &self.space),
                        expansions,
                        budget_exhausted: true,
                    };
                }
            }

            let Some(leaf) = select_leaf(&arena, self.max_depth) else {
                break;
            };
            expansions += 1;
            self.expand(&mut arena, leaf);

            if is_solved(&arena, BitNodeId(0), &self.space) {
                return BitOutcome {
                    solved: true,
                    expansions,
                    budget_exhausted: false,
                };
            }
        }

        let solved = is_solved(&arena, BitNodeId(0), &self.space);
        BitOutcome {
            solved,
            expansions,
            budget_exhausted: !solved && expansions >= self.max_iterations,
        }
    }

    /// Backward-propagates confidence from supporting premises for a
    /// resident atom, returning the best (highest-confidence) tv among the
    /// atom's own stored tv and every rule conclusion that targets it.
    pub fn truth_value_fulfillment(&self, handle: Handle) -> Option<TruthValue> {
        let atom = self.space.get_atom(handle)?;
        let mut best = atom.tv();
        let candidates =
            rules::all_candidates(&self.space, &crate::context::PlnConfig::default());
        for candidate in &candidates {
            if candidate.effect.targets(&atom) {
                if let rules::Effect::NewLink { tv, .. } | rules::Effect::UpdateAtom { tv, .. } =
                    &candidate.effect
                {
                    if tv.confidence() > best.confidence() {
                        best = *tv;
                    }
                }
            }
        }
        Some(best)
    }

    /// Pattern-driven search: runs the matcher first, then falls back to
    /// backward expansion for variable assignments the matcher alone cannot
    /// resolve (multi-hop goals such as seed scenario 5).
    pub fn variable_fulfillment_query(&self, pattern: &Pattern) -> Vec<VariableBinding> {
        let mut results = pattern::match_pattern(pattern, &self.space);
        let vars = collect_vars(pattern);
        if vars.is_empty() {
            return results;
        }

        let domain: Vec<Handle> = crate::atom_type::all_types()
            .iter()
            .flat_map(|&t| self.space.get_atoms_by_type(t, false))
            .filter(|a| a.is_node())
            .map(|a| a.handle())
            .collect();

        // Bounded to one or two free variables: a full cartesian search over
        // an arbitrary number of variables isn't needed by anything in scope
        // and would make this unbounded for large graphs.
        let assignments = match vars.as_slice() {
            [v0] => domain.iter().map(|&h| VariableBinding::from([(*v0, h)])).collect::<Vec<_>>(),
            [v0, v1] => domain
                .iter()
                .flat_map(|&h0| domain.iter().map(move |&h1| (h0, h1)))
                .map(|(h0, h1)| VariableBinding::from([(*v0, h0), (*v1, h1)]))
                .collect(),
            _ => Vec::new(),
        };

        for assignment in assignments {
            if results.contains(&assignment) {
                continue;
            }
            let Some((atom_type, outgoing)) = instantiate_link(pattern, &assignment) else {
                continue;
            };
            let goal = AtomKey::Link { atom_type, outgoing };
            if self.solve(goal, None).solved {
                results.push(assignment);
            }
        }
        results
    }

    fn make_node(&self, target: AtomKey, depth: usize) -> BitNode {
        let fitness = self.fitness_of(&target, depth);
        BitNode {
            target,
            depth,
            is_leaf: true,
            exhausted: false,
            fitness,
            children: Vec::new(),
        }
    }

    fn fitness_of(&self, target: &AtomKey, depth: usize) -> f64 {
        let (s, c) = resolve_tv(target, &self.space)
            .map(|tv| (tv.strength(), tv.confidence()))
            .unwrap_or((1.0, 0.0));
        s * c * (-self.lambda * depth as f64).exp()
    }

    /// Expands the leaf at `id`: for an `InheritanceLink`-family target
    /// `A->C`, tries every resident node `B` as a chaining midpoint and
    /// attaches `A->B`/`B->C` as premise children. Marks the node exhausted
    /// when no midpoint yields a usable pair of sub-targets.
    fn expand(&self, arena: &mut Vec<BitNode>, id: BitNodeId) {
        let (target, depth) = {
            let node = &arena[id.0];
            (node.target.clone(), node.depth)
        };

        if depth >= self.max_depth {
            arena[id.0].exhausted = true;
            return;
        }

        let AtomKey::Link {
            atom_type,
            outgoing,
        } = &target
        else {
            arena[id.0].exhausted = true;
            return;
        };
        if !atom_type.is_subtype_of(AtomType::InheritanceLink) || outgoing.len() != 2 {
            arena[id.0].exhausted = true;
            return;
        }
        let (a, c) = (outgoing[0], outgoing[1]);

        let midpoints: Vec<Handle> = self
            .space
            .get_atoms_by_type(AtomType::ConceptNode, true)
            .into_iter()
            .map(|atom| atom.handle())
            .filter(|&b| b != a && b != c)
            .collect();

        let mut new_children = Vec::new();
        for b in midpoints {
            let left = AtomKey::Link {
                atom_type: AtomType::InheritanceLink,
                outgoing: vec![a, b],
            };
            let right = AtomKey::Link {
                atom_type: AtomType::InheritanceLink,
                outgoing: vec![b, c],
            };
            // Only worth trying a midpoint already on one side of the gap —
            // otherwise every node in the space becomes a sibling subgoal
            // and the tree never narrows.
            if !is_resident(&left, &self.space) && !is_resident(&right, &self.space) {
                continue;
            }
            new_children.push(left);
            new_children.push(right);
        }

        arena[id.0].is_leaf = false;
        if new_children.is_empty() {
            arena[id.0].exhausted = true;
            return;
        }
        for child_target in new_children {
            let child = self.make_node(child_target, depth + 1);
            let child_id = BitNodeId(arena.len());
            arena.push(child);
            arena[id.0].children.push(child_id);
        }
    }
}

pub(crate) fn resolve_atom(key: &AtomKey, space: &AtomSpace) -> Option<Atom> {
    match key {
        AtomKey::Node { atom_type, name } => space.get_nodes_by_name(name, *atom_type).into_iter().next(),
        AtomKey::Link {
            atom_type,
            outgoing,
        } => space
            .get_atoms_by_type(*atom_type, false)
            .into_iter()
            .find(|a| a.outgoing() == outgoing.as_slice()),
    }
}

fn resolve_tv(key: &AtomKey, space: &AtomSpace) -> Option<TruthValue> {
    resolve_atom(key, space).map(|a| a.tv())
}

fn is_resident(key: &AtomKey, space: &AtomSpace) -> bool {
    resolve_atom(key, space).is_some()
}

/// Best known confidence for `goal`: 0.0 if it isn't resident, otherwise the
/// best of its own stored confidence and whatever `truth_value_fulfillment`
/// can backward-propagate for it. Used by the mixed engine to measure
/// `confidence_improvement` across a run (§4.4).
pub(crate) fn goal_confidence(goal: &AtomKey, space: &AtomSpace) -> f64 {
    let Some(atom) = resolve_atom(goal, space) else {
        return 0.0;
    };
    BackwardChainer::new(space.clone(), 0, 0)
        .truth_value_fulfillment(atom.handle())
        .map(|tv| tv.confidence())
        .unwrap_or_else(|| atom.tv().confidence())
}

/// Picks the highest-fitness non-exhausted leaf within `max_depth`,
/// tie-breaking by shallowest depth then by insertion (arena) order.
fn select_leaf(arena: &[BitNode], max_depth: usize) -> Option<BitNodeId> {
    arena
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_leaf && !n.exhausted && n.depth <= max_depth)
        .min_by(|(ia, a), (ib, b)| {
            b.fitness
                .partial_cmp(&a.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.depth.cmp(&b.depth))
                .then(ia.cmp(ib))
        })
        .map(|(i, _)| BitNodeId(i))
}

/// A node is solved when its target is resident, or when it has children and
/// every child is solved.
fn is_solved(arena: &[BitNode], id: BitNodeId, space: &AtomSpace) -> bool {
    let node = &arena[id.0];
    if is_resident(&node.target, space) {
        return true;
    }
    !node.children.is_empty() && node.children.iter().all(|&c| is_solved(arena, c, space))
}

fn collect_vars(pattern: &Pattern) -> Vec<Handle> {
    let mut vars = Vec::new();
    fn walk(pattern: &Pattern, vars: &mut Vec<Handle>) {
        match pattern {
            Pattern::Var(h) => {
                if !vars.contains(h) {
                    vars.push(*h);
                }
            }
            Pattern::Const(_) => {}
            Pattern::Link(_, children) => children.iter().for_each(|c| walk(c, vars)),
        }
    }
    walk(pattern, &mut vars);
    vars
}

fn instantiate_link(pattern: &Pattern, assignment: &VariableBinding) -> Option<(AtomType, Vec<Handle>)> {
    match pattern {
        Pattern::Link(ty, children) => {
            let mut outgoing = Vec::with_capacity(children.len());
            for child in children {
                let handle = match child {
                    Pattern::Const(h) => *h,
                    Pattern::Var(v) => *assignment.get(v)?,
                    Pattern::Link(..) => return None,
                };
                outgoing.push(handle);
            }
            Some((*ty, outgoing))
        }
        _ => None,
    }
}

/// A convenience re-export so callers can build a deadline from a duration
/// budget, mirroring how the mixed engine accepts `max_time`.
pub fn deadline_in(duration: Duration) -> Instant {
    Instant::now() + duration
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom_type::AtomType::*;
    use crate::truth_value::TruthValue;

    fn seed_chain(space: &AtomSpace) -> (Handle, Handle, Handle, Handle, Handle) {
        let fido = space.add_node(ConceptNode, "fido", None).handle();
        let dog = space.add_node(ConceptNode, "dog", None).handle();
        let mammal = space.add_node(ConceptNode, "mammal", None).handle();
        let animal = space.add_node(ConceptNode, "animal", None).handle();
        let living = space.add_node(ConceptNode, "living_thing", None).handle();
        let tv = TruthValue::new(0.9, 0.9);
        space.add_link(InheritanceLink, vec![fido, dog], Some(tv)).unwrap();
        space.add_link(InheritanceLink, vec![dog, mammal], Some(tv)).unwrap();
        space.add_link(InheritanceLink, vec![mammal, animal], Some(tv)).unwrap();
        space.add_link(InheritanceLink, vec![animal, living], Some(tv)).unwrap();
        (fido, dog, mammal, animal, living)
    }

    #[test]
    fn backward_query_solves_multi_hop_goal() {
        let space = AtomSpace::new();
        let (fido, _, _, _, living) = seed_chain(&space);

        let chainer = backward_chainer(space, 5, 50);
        let goal = AtomKey::Link {
            atom_type: InheritanceLink,
            outgoing: vec![fido, living],
        };
        let outcome = chainer.solve(goal, None);
        assert!(outcome.solved);
    }

    #[test]
    fn variable_fulfillment_finds_two_dogs() {
        let space = AtomSpace::new();
        let dog = space.add_node(ConceptNode, "dog", None).handle();
        let fido = space.add_node(ConceptNode, "fido", None).handle();
        let rex = space.add_node(ConceptNode, "rex", None).handle();
        let x = space.add_node(VariableNode, "$x", None).handle();
        space.add_link(InheritanceLink, vec![fido, dog], None).unwrap();
        space.add_link(InheritanceLink, vec![rex, dog], None).unwrap();

        let chainer = backward_chainer(space, 3, 20);
        let pattern = Pattern::link(InheritanceLink, vec![Pattern::var(x), Pattern::constant(dog)]);
        let bindings = chainer.variable_fulfillment_query(&pattern);
        assert_eq!(bindings.len(), 2);
    }
}
