//! Interning, typing, indexing, and enumeration of atoms.
//!
//! `AtomSpace` is the single writer of the atom identity map (§4.1). It wraps
//! its indices in a `RwLock` so many readers can enumerate or look up atoms
//! concurrently while insertions serialize on one writer, per the §5
//! single-writer/multi-reader discipline.

use crate::atom::{Atom, AtomKey, Handle};
use crate::atom_type::AtomType;
use crate::error::{CoreError, CoreResult};
use crate::truth_value::TruthValue;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct Inner {
    atoms: HashMap<Handle, Atom>,
    identity: HashMap<AtomKey, Handle>,
    by_type: HashMap<AtomType, Vec<Handle>>,
    /// Secondary index accelerating node lookup by name across all node types.
    by_name: HashMap<String, Vec<Handle>>,
    /// `handle -> links that reference it`, maintained because rules and the
    /// pattern matcher traverse it frequently.
    incoming: HashMap<Handle, Vec<Handle>>,
    next_handle: u64,
}

/// Content-addressed store of atoms with type, name, and incoming-set indices.
///
/// Cloning an `AtomSpace` clones the `Arc`, so all clones share the same
/// underlying store; this is how the reasoning engines and any concurrent
/// readers hold a reference without the caller threading a lifetime through
/// every call.
#[derive(Clone, Default)]
pub struct AtomSpace {
    inner: Arc<RwLock<Inner>>,
}

impl AtomSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a node. If `(type, name)` already exists, returns the existing
    /// atom, merging in `tv` when its confidence exceeds what is stored (the
    /// monotonic merge rule, P3). Otherwise creates a fresh atom with `tv`
    /// (or the vacuous tv if none is supplied).
    pub fn add_node(&self, atom_type: AtomType, name: &str, tv: Option<TruthValue>) -> Atom {
        let key = AtomKey::Node {
            atom_type,
            name: name.to_string(),
        };
        let mut inner = self.inner.write().expect("atomspace lock poisoned");
        if let Some(&handle) = inner.identity.get(&key) {
            if let Some(tv) = tv {
                merge_tv(&mut inner, handle, tv);
            }
            return inner.atoms[&handle].clone();
        }

        let handle = next_handle(&mut inner);
        let atom = Atom::Node {
            handle,
            atom_type,
            name: name.to_string(),
            tv: tv.unwrap_or_default(),
        };
        insert_new(&mut inner, key, atom.clone());
        atom
    }

    /// Interns a link keyed on `(type, outgoing)`. Every outgoing handle must
    /// already be resident; otherwise returns `InvalidArgument` (I2).
    pub fn add_link(
        &self,
        atom_type: AtomType,
        outgoing: Vec<Handle>,
        tv: Option<TruthValue>,
    ) -> CoreResult<Atom> {
        let mut inner = self.inner.write().expect("atomspace lock poisoned");
        for h in &outgoing {
            if !inner.atoms.contains_key(h) {
                return Err(CoreError::InvalidArgument(format!(
                    "add_link: outgoing handle {h} is not resident in this AtomSpace"
                )));
            }
        }

        let key = AtomKey::Link {
            atom_type,
            outgoing: outgoing.clone(),
        };
        if let Some(&handle) = inner.identity.get(&key) {
            if let Some(tv) = tv {
                merge_tv(&mut inner, handle, tv);
            }
            return Ok(inner.atoms[&handle].clone());
        }

        let handle = next_handle(&mut inner);
        let atom = Atom::Link {
            handle,
            atom_type,
            outgoing: outgoing.clone(),
            tv: tv.unwrap_or_default(),
        };
        for target in &outgoing {
            inner.incoming.entry(*target).or_default().push(handle);
        }
        insert_new(&mut inner, key, atom.clone());
        Ok(atom)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.inner.read().expect("atomspace lock poisoned").atoms.contains_key(&handle)
    }

    pub fn get_atom(&self, handle: Handle) -> Option<Atom> {
        self.inner
            .read()
            .expect("atomspace lock poisoned")
            .atoms
            .get(&handle)
            .cloned()
    }

    /// Atoms whose incoming set references `handle`: the links that mention it.
    pub fn incoming_set(&self, handle: Handle) -> Vec<Atom> {
        let inner = self.inner.read().expect("atomspace lock poisoned");
        inner
            .incoming
            .get(&handle)
            .into_iter()
            .flatten()
            .filter_map(|h| inner.atoms.get(h).cloned())
            .collect()
    }

    /// All resident atoms whose type is `atom_type`, or a subtype of it when
    /// `subtypes` is true. Enumeration order is unspecified; callers must not
    /// depend on it (§4.1).
    pub fn get_atoms_by_type(&self, atom_type: AtomType, subtypes: bool) -> Vec<Atom> {
        let inner = self.inner.read().expect("atomspace lock poisoned");
        let types: Vec<AtomType> = if subtypes {
            crate::atom_type::subtypes_of(atom_type)
        } else {
            vec![atom_type]
        };
        types
            .into_iter()
            .flat_map(|t| inner.by_type.get(&t).cloned().unwrap_or_default())
            .filter_map(|h| inner.atoms.get(&h).cloned())
            .collect()
    }

    /// All node atoms with the given `name`, further filtered by `atom_type`
    /// when resolving ambiguity between node kinds that share a name.
    pub fn get_nodes_by_name(&self, name: &str, atom_type: AtomType) -> Vec<Atom> {
        let inner = self.inner.read().expect("atomspace lock poisoned");
        inner
            .by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|h| inner.atoms.get(h))
            .filter(|a| a.atom_type() == atom_type)
            .cloned()
            .collect()
    }

    /// Applies the monotonic merge rule directly to an already-resident
    /// atom's tv, without going through `add_node`/`add_link`. Used by
    /// reasoning engines deriving an updated tv for an existing atom (e.g.
    /// PLN's ModusPonens, which revises a proposition node rather than
    /// creating a link). Returns `true` if the update was applied.
    pub fn update_tv(&self, handle: Handle, tv: TruthValue) -> bool {
        let mut inner = self.inner.write().expect("atomspace lock poisoned");
        let current = match inner.atoms.get(&handle) {
            Some(atom) => atom.tv(),
            None => return false,
        };
        if tv.confidence() <= current.confidence() {
            return false;
        }
        merge_tv(&mut inner, handle, tv);
        true
    }

    pub fn size(&self) -> usize {
        self.inner.read().expect("atomspace lock poisoned").atoms.len()
    }

    pub fn node_count(&self) -> usize {
        self.inner
            .read()
            .expect("atomspace lock poisoned")
            .atoms
            .values()
            .filter(|a| a.is_node())
            .count()
    }

    pub fn link_count(&self) -> usize {
        self.inner
            .read()
            .expect("atomspace lock poisoned")
            .atoms
            .values()
            .filter(|a| a.is_link())
            .count()
    }
}

fn next_handle(inner: &mut Inner) -> Handle {
    let h = Handle(inner.next_handle);
    inner.next_handle += 1;
    h
}

fn insert_new(inner: &mut Inner, key: AtomKey, atom: Atom) {
    let handle = atom.handle();
    let atom_type = atom.atom_type();
    if let Some(name) = atom.name() {
        inner.by_name.entry(name.to_string()).or_default().push(handle);
    }
    inner.by_type.entry(atom_type).or_default().push(handle);
    inner.identity.insert(key, handle);
    inner.atoms.insert(handle, atom);
}

/// Monotonic merge: replace the stored tv only if the incoming confidence is
/// strictly greater (P3). A lower-confidence update is a silent no-op
/// (`Conflict`, per §7 — not surfaced as an error).
fn merge_tv(inner: &mut Inner, handle: Handle, tv: TruthValue) {
    if let Some(atom) = inner.atoms.get_mut(&handle) {
        let current = atom.tv();
        if tv.confidence() > current.confidence() {
            match atom {
                Atom::Node { tv: slot, .. } | Atom::Link { tv: slot, .. } => *slot = tv,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom_type::AtomType::*;

    #[test]
    fn interning_dog_twice_yields_identity() {
        let space = AtomSpace::new();
        let a = space.add_node(ConceptNode, "dog", None);
        let b = space.add_node(ConceptNode, "dog", None);
        assert_eq!(a.handle(), b.handle());
        assert_eq!(space.size(), 1);
    }

    #[test]
    fn link_dedup_keeps_higher_confidence_tv() {
        let space = AtomSpace::new();
        let dog = space.add_node(ConceptNode, "dog", None).handle();
        let animal = space.add_node(ConceptNode, "animal", None).handle();

        space
            .add_link(
                InheritanceLink,
                vec![dog, animal],
                Some(TruthValue::new(0.8, 0.9)),
            )
            .unwrap();
        let second = space
            .add_link(
                InheritanceLink,
                vec![dog, animal],
                Some(TruthValue::new(0.7, 0.95)),
            )
            .unwrap();

        assert_eq!(second.tv(), TruthValue::new(0.7, 0.95));
        assert_eq!(space.size(), 3);
    }

    #[test]
    fn lower_confidence_update_is_ignored() {
        let space = AtomSpace::new();
        space.add_node(ConceptNode, "dog", Some(TruthValue::new(0.7, 0.95)));
        let unchanged = space.add_node(ConceptNode, "dog", Some(TruthValue::new(0.9, 0.1)));
        assert_eq!(unchanged.tv(), TruthValue::new(0.7, 0.95));
    }

    #[test]
    fn add_link_rejects_dangling_outgoing() {
        let space = AtomSpace::new();
        let dog = space.add_node(ConceptNode, "dog", None).handle();
        let dangling = Handle(9999);
        let result = space.add_link(InheritanceLink, vec![dog, dangling], None);
        assert!(matches!(result, Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn incoming_set_and_type_index_are_consistent() {
        let space = AtomSpace::new();
        let dog = space.add_node(ConceptNode, "dog", None);
        let animal = space.add_node(ConceptNode, "animal", None);
        let link = space
            .add_link(InheritanceLink, vec![dog.handle(), animal.handle()], None)
            .unwrap();

        assert!(space
            .get_atoms_by_type(ConceptNode, true)
            .iter()
            .any(|a| a.handle() == dog.handle()));
        let incoming = space.incoming_set(dog.handle());
        assert!(incoming.iter().any(|a| a.handle() == link.handle()));
    }

    #[test]
    fn implication_link_counts_as_inheritance_subtype() {
        let space = AtomSpace::new();
        let a = space.add_node(ConceptNode, "a", None).handle();
        let b = space.add_node(ConceptNode, "b", None).handle();
        let imp = space.add_link(ImplicationLink, vec![a, b], None).unwrap();

        let inheritance_like = space.get_atoms_by_type(InheritanceLink, true);
        assert!(inheritance_like.iter().any(|x| x.handle() == imp.handle()));
    }
}
