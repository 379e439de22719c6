use crate::{
    chain::{CallOutcome, Interceptor, Proceed},
    context::CallContext,
};

/// Transaction boundary markers around a call
///
/// Logs BEGIN, then COMMIT on success or ROLLBACK on failure, and re-raises
/// the failure unchanged. A logging boundary only - no state is reverted.
#[derive(Default)]
pub struct TransactionalInterceptor;

impl TransactionalInterceptor {
    pub fn new() -> Self {
        Self
    }
}

impl Interceptor for TransactionalInterceptor {
    fn name(&self) -> &'static str {
        "transactional"
    }

    fn around(&self, call: &mut CallContext, next: &mut dyn Proceed) -> CallOutcome {
        tracing::info!(id = %call.invocation_id(), operation = %call.operation(), "BEGIN");

        let outcome = next.proceed(call);

        match &outcome {
            Ok(_) => {
                tracing::info!(id = %call.invocation_id(), operation = %call.operation(), "COMMIT")
            }
            Err(error) => {
                tracing::error!(
                    id = %call.invocation_id(),
                    operation = %call.operation(),
                    %error,
                    "ROLLBACK"
                )
            }
        }
        outcome
    }
}
