use crate::{
    chain::{CallOutcome, Interceptor},
    context::CallContext,
    errors::CallError,
};

/// Read-only before/after observation of arguments and outcome
///
/// Never fails and never alters control flow.
#[derive(Default)]
pub struct AuditInterceptor;

impl AuditInterceptor {
    pub fn new() -> Self {
        Self
    }
}

impl Interceptor for AuditInterceptor {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn before(&self, call: &mut CallContext) -> Result<(), CallError> {
        tracing::info!(
            id = %call.invocation_id(),
            operation = %call.operation(),
            args = ?call.args(),
            "AUDIT before"
        );
        Ok(())
    }

    fn after(&self, call: &CallContext, outcome: &CallOutcome) {
        match outcome {
            Ok(_) => tracing::info!(
                id = %call.invocation_id(),
                operation = %call.operation(),
                result = "ok",
                "AUDIT after"
            ),
            Err(error) => tracing::info!(
                id = %call.invocation_id(),
                operation = %call.operation(),
                %error,
                "AUDIT after"
            ),
        }
    }
}
