use crate::{
    chain::Interceptor,
    context::CallContext,
    errors::CallError,
};

/// Rejects the call before the target runs unless the scope's current role
/// matches the required one exactly
pub struct RequireRoleInterceptor {
    required: String,
}

impl RequireRoleInterceptor {
    pub fn new(required: impl Into<String>) -> Self {
        Self {
            required: required.into(),
        }
    }
}

impl Interceptor for RequireRoleInterceptor {
    fn name(&self) -> &'static str {
        "require-role"
    }

    fn before(&self, call: &mut CallContext) -> Result<(), CallError> {
        let current = call.role().unwrap_or("-");
        tracing::info!(
            id = %call.invocation_id(),
            operation = %call.operation(),
            required = %self.required,
            current = %current,
            "role check"
        );

        if current != self.required {
            return Err(CallError::AuthorizationDenied {
                required: self.required.clone(),
                actual: current.to_string(),
            });
        }
        Ok(())
    }
}
