//! The tagged-sum atom type and its stable handle.

use crate::atom_type::AtomType;
use crate::truth_value::TruthValue;
use serde::{Deserialize, Serialize};

/// An opaque, stable identifier for an atom within one `AtomSpace`. Handles
/// are never reused after deletion (I3) and are cheap to copy and hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(pub(crate) u64);

impl Handle {
    pub fn index(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The identity key of an atom: what `AtomSpace` interns on. Two atoms with
/// equal identity are the same stored instance (I1).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AtomKey {
    Node { atom_type: AtomType, name: String },
    Link {
        atom_type: AtomType,
        outgoing: Vec<Handle>,
    },
}

/// A node or link in the hypergraph. `Atom` is the value returned to callers;
/// the `AtomSpace` owns the canonical copy behind each `Handle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Atom {
    Node {
        handle: Handle,
        atom_type: AtomType,
        name: String,
        tv: TruthValue,
    },
    Link {
        handle: Handle,
        atom_type: AtomType,
        outgoing: Vec<Handle>,
        tv: TruthValue,
    },
}

impl Atom {
    pub fn handle(&self) -> Handle {
        match self {
            Atom::Node { handle, .. } | Atom::Link { handle, .. } => *handle,
        }
    }

    pub fn atom_type(&self) -> AtomType {
        match self {
            Atom::Node { atom_type, .. } | Atom::Link { atom_type, .. } => *atom_type,
        }
    }

    pub fn tv(&self) -> TruthValue {
        match self {
            Atom::Node { tv, .. } | Atom::Link { tv, .. } => *tv,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Atom::Node { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Atom::Link { .. })
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Atom::Node { name, .. } => Some(name),
            Atom::Link { .. } => None,
        }
    }

    pub fn outgoing(&self) -> &[Handle] {
        match self {
            Atom::Node { .. } => &[],
            Atom::Link { outgoing, .. } => outgoing,
        }
    }

    /// `arity(link) = |outgoing|`; nodes have arity zero.
    pub fn arity(&self) -> usize {
        self.outgoing().len()
    }

    pub fn key(&self) -> AtomKey {
        match self {
            Atom::Node {
                atom_type, name, ..
            } => AtomKey::Node {
                atom_type: *atom_type,
                name: name.clone(),
            },
            Atom::Link {
                atom_type,
                outgoing,
                ..
            } => AtomKey::Link {
                atom_type: *atom_type,
                outgoing: outgoing.clone(),
            },
        }
    }

    /// `true` for a `VariableNode`, the only type whose equality under
    /// pattern matching is position-dependent rather than by identity (I5).
    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            Atom::Node {
                atom_type: AtomType::VariableNode,
                ..
            }
        )
    }
}
