//! Probabilistic Logic Network: a fixed rule set over inheritance-family
//! links plus a forward/backward driver (§4.3).

pub mod engine;
pub mod rules;

pub use engine::{create_engine, PlnEngine, ReasonOutcome};
pub use rules::{Candidate, Effect, InheritanceFact};
