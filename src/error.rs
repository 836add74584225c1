use thiserror::Error;

/// The single error type the core signals across the AtomSpace and both
/// reasoning engines. Budget exhaustion is deliberately *not* a variant here:
/// it is a normal result (see `pln::ReasonOutcome`, `ure::forward::ForwardOutcome`),
/// not a failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Ill-typed arguments: an `add_link` outgoing handle that isn't resident,
    /// a pattern referencing a handle from a different `AtomSpace`, and similar.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A requested feature the current build omits (e.g. a persistent backend
    /// adapter that was never wired in).
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// An attempted truth-value update lost the confidence race. Not surfaced
    /// by the `AtomSpace` API itself (merge semantics resolve it silently);
    /// the variant exists so collaborators that care can observe it.
    #[error("conflict: {0}")]
    Conflict(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
