use uuid::Uuid;

use crate::{
    chain::{CallOutcome, Interceptor, Proceed},
    context::CallContext,
};

/// Tags the whole call chain with a short unique id
///
/// Outermost by convention so the id spans every attempt of a retried call.
/// The id is cleared again on both the success and the failure path.
#[derive(Default)]
pub struct InvocationIdInterceptor;

impl InvocationIdInterceptor {
    pub fn new() -> Self {
        Self
    }

    fn short_id() -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(8);
        id
    }
}

impl Interceptor for InvocationIdInterceptor {
    fn name(&self) -> &'static str {
        "invocation-id"
    }

    fn around(&self, call: &mut CallContext, next: &mut dyn Proceed) -> CallOutcome {
        let id = Self::short_id();
        call.set_invocation_id(&id);
        tracing::info!(id = %id, operation = %call.operation(), "START");

        let outcome = next.proceed(call);

        match &outcome {
            Ok(_) => tracing::info!(id = %id, operation = %call.operation(), "END"),
            Err(error) => {
                tracing::info!(id = %id, operation = %call.operation(), %error, "END")
            }
        }
        call.clear_invocation_id();
        outcome
    }
}
