//! The closed, hierarchical enumeration of atom kinds.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single atom kind. The set is closed and versioned: adding a variant is a
/// breaking change to any serialized `AtomSpace` dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomType {
    // --- Node types ---
    ConceptNode,
    PredicateNode,
    VariableNode,
    NumberNode,

    // --- Link types ---
    ListLink,
    AndLink,
    OrLink,
    NotLink,
    InheritanceLink,
    EvaluationLink,
    ImplicationLink,
}

impl AtomType {
    pub fn is_node(self) -> bool {
        matches!(
            self,
            AtomType::ConceptNode
                | AtomType::PredicateNode
                | AtomType::VariableNode
                | AtomType::NumberNode
        )
    }

    pub fn is_link(self) -> bool {
        !self.is_node()
    }

    /// `true` if `self` is `other`, or a declared subtype of it. Every type is
    /// trivially a subtype of itself; node types and link types never cross.
    pub fn is_subtype_of(self, other: AtomType) -> bool {
        self == other || SUBTYPES.get(&self).is_some_and(|parents| parents.contains(&other))
    }
}

impl std::fmt::Display for AtomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Direct-parent subtype edges. `NumberNode` is a `ConceptNode` (a number is a
/// concept with a numeric name); `ImplicationLink` behaves as an
/// `InheritanceLink` for PLN's purposes (both express `A -> B`).
static SUBTYPES: Lazy<HashMap<AtomType, Vec<AtomType>>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(AtomType::NumberNode, vec![AtomType::ConceptNode]);
    map.insert(AtomType::ImplicationLink, vec![AtomType::InheritanceLink]);
    map
});

/// All concrete atom types the registry knows about, in a stable order.
pub fn all_types() -> &'static [AtomType] {
    const ALL: &[AtomType] = &[
        AtomType::ConceptNode,
        AtomType::PredicateNode,
        AtomType::VariableNode,
        AtomType::NumberNode,
        AtomType::ListLink,
        AtomType::AndLink,
        AtomType::OrLink,
        AtomType::NotLink,
        AtomType::InheritanceLink,
        AtomType::EvaluationLink,
        AtomType::ImplicationLink,
    ];
    ALL
}

/// Every type that is `ty` or a subtype of it, including `ty` itself.
pub fn subtypes_of(ty: AtomType) -> Vec<AtomType> {
    all_types()
        .iter()
        .copied()
        .filter(|&t| t.is_subtype_of(ty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_link_partition() {
        for ty in all_types() {
            assert_ne!(ty.is_node(), ty.is_link());
        }
    }

    #[test]
    fn subtype_relation_includes_self() {
        assert!(AtomType::InheritanceLink.is_subtype_of(AtomType::InheritanceLink));
        assert!(AtomType::ImplicationLink.is_subtype_of(AtomType::InheritanceLink));
        assert!(!AtomType::InheritanceLink.is_subtype_of(AtomType::ImplicationLink));
    }

    #[test]
    fn subtypes_of_inheritance_includes_implication() {
        let subs = subtypes_of(AtomType::InheritanceLink);
        assert!(subs.contains(&AtomType::InheritanceLink));
        assert!(subs.contains(&AtomType::ImplicationLink));
        assert!(!subs.contains(&AtomType::EvaluationLink));
    }
}
