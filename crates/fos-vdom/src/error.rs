//! Render errors

use std::error::Error;

/// Result type for render, reconcile and commit
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors surfaced to the caller of `render`
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Host tag that no DOM can create
    #[error("Invalid element type: {tag:?}")]
    InvalidElementType { tag: String },

    /// Hook calls diverged between two renders of the same fiber
    #[error("Hook order violation in <{component}>: expected {expected}, found {found}")]
    HookOrderViolation {
        component: String,
        expected: String,
        found: String,
    },

    /// Fiber nesting passed `Config::max_depth`
    #[error("Fiber tree exceeds maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    /// The DOM driver rejected a mutation. Earlier mutations of the same
    /// commit have already been applied.
    #[error("DOM driver error: {0}")]
    Driver(#[source] Box<dyn Error + Send + Sync>),
}

impl RenderError {
    pub(crate) fn driver(err: impl Error + Send + Sync + 'static) -> Self {
        Self::Driver(Box::new(err))
    }

    /// Whether this error comes from breaking the hook call contract
    pub fn is_caller_contract_violation(&self) -> bool {
        matches!(self, Self::HookOrderViolation { .. })
    }
}
