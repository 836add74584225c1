//! A typed hypergraph knowledge store with probabilistic and unified-rule
//! reasoning engines layered on top.
//!
//! - [`atomspace`] holds and indexes atoms; [`atom`], [`atom_type`], and
//!   [`truth_value`] define what an atom is.
//! - [`pattern`] matches templates against a live `AtomSpace`.
//! - [`pln`] is the fixed probabilistic rule set (Deduction, Inversion,
//!   ModusPonens, Abduction) and its forward/backward driver.
//! - [`ure`] is the generic rule engine: a `Rule` trait, a registry, a
//!   forward chainer, a BIT-based backward chainer, and an adaptive mixed
//!   driver over both.
//! - [`context`] carries configuration and diagnostics explicitly, rather
//!   than through process-wide state.

pub mod atom;
pub mod atom_type;
pub mod atomspace;
pub mod context;
pub mod error;
pub mod pattern;
pub mod pln;
pub mod truth_value;
pub mod ure;

pub use atom::{Atom, AtomKey, Handle};
pub use atom_type::AtomType;
pub use atomspace::AtomSpace;
pub use context::{CoreConfig, CoreContext};
pub use error::{CoreError, CoreResult};
pub use pattern::{match_pattern, Pattern, VariableBinding};
pub use truth_value::TruthValue;
