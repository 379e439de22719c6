use std::time::Duration;

use crate::{
    cancel::CancelToken,
    chain::{CallOutcome, Interceptor, Proceed},
    context::CallContext,
    errors::CallError,
};

/// Re-invokes the wrapped call on failure, up to a fixed attempt budget
///
/// Waits the fixed delay between attempts, no backoff. Innermost by
/// convention so a retry re-runs only the real work. Cancelling the token
/// aborts a pending wait immediately and surfaces
/// [Interrupted](CallError::Interrupted).
pub struct RetryInterceptor {
    max_attempts: u32,
    delay: Duration,
    cancel: CancelToken,
}

impl RetryInterceptor {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            cancel: CancelToken::new(),
        }
    }

    /// Shares an external token so callers can abort waiting retries
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Interceptor for RetryInterceptor {
    fn name(&self) -> &'static str {
        "retry"
    }

    fn around(&self, call: &mut CallContext, next: &mut dyn Proceed) -> CallOutcome {
        let mut attempt = 0;
        loop {
            attempt += 1;
            call.set_attempt(attempt);

            let error = match next.proceed(call) {
                Ok(value) => return Ok(value),
                Err(error) if !error.retryable() => return Err(error),
                Err(error) => error,
            };

            if attempt >= self.max_attempts {
                tracing::error!(
                    id = %call.invocation_id(),
                    operation = %call.operation(),
                    attempts = attempt,
                    "all attempts failed"
                );
                return Err(CallError::RetryExhausted {
                    attempts: attempt,
                    source: Box::new(error),
                });
            }

            tracing::warn!(
                id = %call.invocation_id(),
                operation = %call.operation(),
                attempt,
                delay_ms = self.delay.as_millis() as u64,
                %error,
                "attempt failed, retrying"
            );
            if !self.cancel.wait(self.delay) {
                return Err(CallError::Interrupted);
            }
        }
    }
}
