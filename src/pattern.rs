//! Atom templates and the matcher that unifies them against a live `AtomSpace`.

use crate::atom::Handle;
use crate::atom_type::AtomType;
use crate::atomspace::AtomSpace;
use std::collections::BTreeMap;

/// A mapping from variable handle to the concrete atom it is bound to.
/// `BTreeMap` gives a deterministic iteration order, which keeps matcher
/// output order reproducible across runs even though §4.2 only promises
/// *some* deterministic order, not a specific one.
pub type VariableBinding = BTreeMap<Handle, Handle>;

/// A template that may contain variable slots (§4.2). `Var` and `Link`
/// reference handles that must already be resident in the `AtomSpace` being
/// matched against — a pattern is built from existing atoms, it does not
/// introduce new ones. `Link` patterns are *not* themselves interned; they
/// are transient templates, distinct from the structurally identical link
/// the match may or may not find already stored.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches any atom, binding the variable's handle to it. Repeated
    /// occurrences of the same handle must bind to the same atom (I5).
    Var(Handle),
    /// Matches only the exact atom behind this handle.
    Const(Handle),
    /// Matches a link of `atom_type` with exactly `children.len()` outgoing
    /// atoms, each matched positionally against the corresponding child.
    Link(AtomType, Vec<Pattern>),
}

impl Pattern {
    pub fn var(handle: Handle) -> Self {
        Pattern::Var(handle)
    }

    pub fn constant(handle: Handle) -> Self {
        Pattern::Const(handle)
    }

    pub fn link(atom_type: AtomType, children: Vec<Pattern>) -> Self {
        Pattern::Link(atom_type, children)
    }
}

/// Matches `pattern` against every atom in `space`, returning one binding per
/// successful unification. Matching is synchronous and non-yielding (§5):
/// the whole candidate set is scanned in a single call.
pub fn match_pattern(pattern: &Pattern, space: &AtomSpace) -> Vec<VariableBinding> {
    let candidates = candidate_handles(pattern, space);
    let mut results = Vec::new();
    for candidate in candidates {
        let mut bindings = VariableBinding::new();
        if unify(pattern, candidate, space, &mut bindings) {
            results.push(bindings);
        }
    }
    results
}

/// The search space for the top-level pattern: constants check only
/// themselves, a bare variable ranges over every resident atom, and a link
/// pattern only needs to examine atoms of its exact type (no subtyping —
/// §4.2 requires *equal* type at each matched level).
fn candidate_handles(pattern: &Pattern, space: &AtomSpace) -> Vec<Handle> {
    match pattern {
        Pattern::Const(h) => vec![*h],
        Pattern::Var(_) => crate::atom_type::all_types()
            .iter()
            .flat_map(|&t| space.get_atoms_by_type(t, false))
            .map(|a| a.handle())
            .collect(),
        Pattern::Link(ty, _) => space
            .get_atoms_by_type(*ty, false)
            .into_iter()
            .map(|a| a.handle())
            .collect(),
    }
}

fn unify(
    pattern: &Pattern,
    candidate: Handle,
    space: &AtomSpace,
    bindings: &mut VariableBinding,
) -> bool {
    match pattern {
        Pattern::Const(h) => *h == candidate,
        Pattern::Var(v) => match bindings.get(v) {
            Some(bound) => *bound == candidate,
            None => {
                bindings.insert(*v, candidate);
                true
            }
        },
        Pattern::Link(ty, children) => {
            let Some(atom) = space.get_atom(candidate) else {
                return false;
            };
            if atom.atom_type() != *ty || atom.arity() != children.len() {
                return false;
            }
            children
                .iter()
                .zip(atom.outgoing())
                .all(|(child_pattern, &child_handle)| {
                    unify(child_pattern, child_handle, space, bindings)
                })
        }
    }
}

/// Substitutes `bindings` into `pattern`, returning the handle of the
/// concrete atom the pattern denotes once every variable is resolved. Used by
/// `P4` (matcher soundness): the result must already be present in `space`.
pub fn substitute(pattern: &Pattern, bindings: &VariableBinding) -> Option<Handle> {
    match pattern {
        Pattern::Const(h) => Some(*h),
        Pattern::Var(v) => bindings.get(v).copied(),
        Pattern::Link(..) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom_type::AtomType::*;

    #[test]
    fn variable_fulfillment_over_two_dogs() {
        let space = AtomSpace::new();
        let dog = space.add_node(ConceptNode, "dog", None).handle();
        let fido = space.add_node(ConceptNode, "fido", None).handle();
        let rex = space.add_node(ConceptNode, "rex", None).handle();
        let x = space.add_node(VariableNode, "$x", None).handle();

        space.add_link(InheritanceLink, vec![fido, dog], None).unwrap();
        space.add_link(InheritanceLink, vec![rex, dog], None).unwrap();

        let pattern = Pattern::link(
            InheritanceLink,
            vec![Pattern::var(x), Pattern::constant(dog)],
        );
        let mut bindings = match_pattern(&pattern, &space);
        bindings.sort_by_key(|b| b[&x]);

        assert_eq!(bindings.len(), 2);
        let bound: Vec<Handle> = bindings.iter().map(|b| b[&x]).collect();
        assert!(bound.contains(&fido));
        assert!(bound.contains(&rex));
    }

    #[test]
    fn repeated_variable_requires_consistent_binding() {
        let space = AtomSpace::new();
        let a = space.add_node(ConceptNode, "a", None).handle();
        let b = space.add_node(ConceptNode, "b", None).handle();
        let x = space.add_node(VariableNode, "$x", None).handle();

        // Only a self-link should match `InheritanceLink($x, $x)`.
        space.add_link(InheritanceLink, vec![a, b], None).unwrap();
        let self_link = space.add_link(InheritanceLink, vec![a, a], None).unwrap();

        let pattern = Pattern::link(InheritanceLink, vec![Pattern::var(x), Pattern::var(x)]);
        let bindings = match_pattern(&pattern, &space);

        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0][&x], a);
        assert_eq!(substitute(&Pattern::var(x), &bindings[0]), Some(a));
        let _ = self_link;
    }

    #[test]
    fn matcher_soundness_every_binding_substitutes_to_a_resident_atom() {
        let space = AtomSpace::new();
        let dog = space.add_node(ConceptNode, "dog", None).handle();
        let fido = space.add_node(ConceptNode, "fido", None).handle();
        let x = space.add_node(VariableNode, "$x", None).handle();
        space.add_link(InheritanceLink, vec![fido, dog], None).unwrap();

        let pattern = Pattern::link(InheritanceLink, vec![Pattern::var(x), Pattern::constant(dog)]);
        for binding in match_pattern(&pattern, &space) {
            let bound = binding[&x];
            assert!(space.contains(bound));
        }
    }
}
