use thiserror::Error;

/// Target-originated failures are boxed into this
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Failures raised by an intercepted call
///
/// Interceptor-originated kinds propagate through the chain's after-phases
/// unchanged; only [RetryExhausted](CallError::RetryExhausted) wraps, and it
/// deliberately carries the last concrete failure.
#[derive(Error, Debug)]
pub enum CallError {
    /// The scope's current role does not match the required one
    #[error("required role '{required}' but current role is '{actual}'")]
    AuthorizationDenied { required: String, actual: String },
    /// A precondition on the call arguments failed
    #[error("validation failed: {0}")]
    Validation(String),
    /// The retry budget ran out; carries the last failure
    #[error("all {attempts} attempts failed: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<CallError>,
    },
    /// The retry wait was cancelled
    #[error("retry wait interrupted")]
    Interrupted,
    /// The dispatched call produced a value of an unexpected type
    #[error("'{operation}' returned an unexpected type")]
    BadReturnType { operation: String },
    /// Any other failure from the target itself
    #[error("{0}")]
    Failed(DynError),
}

impl CallError {
    pub fn failed(error: impl Into<DynError>) -> Self {
        CallError::Failed(error.into())
    }

    /// Whether a retry interceptor may re-invoke after this failure
    ///
    /// Authorization denials are never retried; an interrupted or already
    /// exhausted retry is final.
    pub fn retryable(&self) -> bool {
        !matches!(
            self,
            CallError::AuthorizationDenied { .. }
                | CallError::Interrupted
                | CallError::RetryExhausted { .. }
        )
    }
}

/// Binding declaration problems, surfaced fail-fast at startup
#[derive(Error, Debug)]
pub enum BindingError {
    /// Selector patterns are `bean.method` globs
    #[error("selector '{pattern}' is invalid: {reason}")]
    InvalidSelector { pattern: String, reason: String },
    /// The same interceptor is bound twice to the same selector
    #[error("interceptor '{interceptor}' is already bound to '{pattern}'")]
    ConflictingBinding {
        pattern: String,
        interceptor: &'static str,
    },
}
