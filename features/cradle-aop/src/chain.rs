use std::{any::Any, sync::Arc};

use crate::{context::CallContext, errors::CallError};

/// Type-erased return value of a dispatched call
pub type CallOutcome = Result<Box<dyn Any + Send>, CallError>;

/// The rest of the chain, from an interceptor's point of view
///
/// An around-interceptor may proceed zero, one or several times
/// (the retry interceptor proceeds once per attempt).
pub trait Proceed {
    fn proceed(&mut self, call: &mut CallContext) -> CallOutcome;
}

/// One cross-cutting behaviour wrapped around a target call
///
/// Implement the capability you need:
/// - `before` to observe or veto the call before the target runs
/// - `after` to observe the outcome without altering it
/// - `around` for full control over whether and how often to proceed
///
/// The default `around` runs before → proceed → after. A failing `before`
/// short-circuits everything further in; interceptors further out still see
/// the failure in their after-phase as the chain unwinds.
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn before(&self, call: &mut CallContext) -> Result<(), CallError> {
        let _ = call;
        Ok(())
    }

    fn after(&self, call: &CallContext, outcome: &CallOutcome) {
        let _ = (call, outcome);
    }

    fn around(&self, call: &mut CallContext, next: &mut dyn Proceed) -> CallOutcome {
        self.before(call)?;
        let outcome = next.proceed(call);
        self.after(call, &outcome);
        outcome
    }
}

/// Statically composed chain for one operation
///
/// Interceptors are stored outermost first; the innermost one sits closest
/// to the real target.
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self { interceptors }
    }

    /// A chain that applies nothing and calls the target directly
    pub fn empty() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Runs `target` with every interceptor wrapped around it in order
    pub fn call(
        &self,
        call: &mut CallContext,
        target: &mut dyn FnMut(&mut CallContext) -> CallOutcome,
    ) -> CallOutcome {
        struct Step<'a> {
            rest: &'a [Arc<dyn Interceptor>],
            target: &'a mut dyn FnMut(&mut CallContext) -> CallOutcome,
        }

        impl Proceed for Step<'_> {
            fn proceed(&mut self, call: &mut CallContext) -> CallOutcome {
                match self.rest.split_first() {
                    Some((head, tail)) => {
                        let mut next = Step {
                            rest: tail,
                            target: &mut *self.target,
                        };
                        head.around(call, &mut next)
                    }
                    None => (self.target)(call),
                }
            }
        }

        Step {
            rest: &self.interceptors,
            target,
        }
        .proceed(call)
    }
}
