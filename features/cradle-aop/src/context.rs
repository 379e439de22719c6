//! Explicit per-call state
//!
//! The current role and invocation id are explicit values rather than
//! thread-scoped ambient storage: the caller hands a [CallScope] to each
//! dispatched call, and the chain threads a [CallContext] through every
//! interceptor. Nothing can leak between unrelated call chains because
//! nothing is shared between them.

/// Ambient caller state for one or more calls - the "current actor"
///
/// Read-only to interceptors; the caller environment sets it up front.
#[derive(Debug, Clone, Default)]
pub struct CallScope {
    role: Option<String>,
}

impl CallScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
        }
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn set_role(&mut self, role: impl Into<String>) {
        self.role = Some(role.into());
    }

    pub fn clear_role(&mut self) {
        self.role = None;
    }
}

/// State of one logical call chain
///
/// Created at chain entry, dropped at exit. The invocation id is set by the
/// outermost interceptor and cleared again on both success and failure.
#[derive(Debug)]
pub struct CallContext {
    target: String,
    method: String,
    args: Vec<String>,
    role: Option<String>,
    invocation_id: Option<String>,
    attempt: u32,
}

impl CallContext {
    pub fn new(
        target: impl Into<String>,
        method: impl Into<String>,
        args: Vec<String>,
        scope: &CallScope,
    ) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
            args,
            role: scope.role.clone(),
            invocation_id: None,
            attempt: 0,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// `target.method`, the logical operation name used for matching,
    /// metrics keys and log lines
    pub fn operation(&self) -> String {
        format!("{}.{}", self.target, self.method)
    }

    /// Rendered call arguments, for audit observation
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// The current invocation id, or `-` when outside a tagged chain
    pub fn invocation_id(&self) -> &str {
        self.invocation_id.as_deref().unwrap_or("-")
    }

    pub fn set_invocation_id(&mut self, id: impl Into<String>) {
        self.invocation_id = Some(id.into());
    }

    pub fn clear_invocation_id(&mut self) {
        self.invocation_id = None;
    }

    /// 1-based attempt counter maintained by the retry interceptor
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn set_attempt(&mut self, attempt: u32) {
        self.attempt = attempt;
    }
}
