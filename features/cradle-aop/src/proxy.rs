use std::{any::Any, collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::{
    binding::BindingSet,
    chain::{CallOutcome, InterceptorChain},
    context::{CallContext, CallScope},
    errors::CallError,
};

/// Decides per bean whether calls go through an interceptor chain
///
/// Built once from the frozen [BindingSet]; handing out dispatch handles is
/// cheap.
#[derive(Clone)]
pub struct Dispatcher {
    bindings: Arc<BindingSet>,
}

impl Dispatcher {
    pub fn new(bindings: BindingSet) -> Self {
        Self {
            bindings: Arc::new(bindings),
        }
    }

    /// Whether any binding applies to this bean
    ///
    /// When this is false, callers can skip the handle and use the raw
    /// target directly.
    pub fn advises(&self, bean: &str) -> bool {
        self.bindings.advises(bean)
    }

    /// Wraps a target in a dispatch handle
    pub fn wrap<T: Send + Sync + 'static>(
        &self,
        bean: impl Into<String>,
        target: Arc<T>,
    ) -> Proxied<T> {
        Proxied {
            bean: bean.into(),
            target,
            bindings: self.bindings.clone(),
            chains: RwLock::new(HashMap::new()),
        }
    }
}

/// Dispatch handle routing external calls through the interceptor chain
///
/// Only calls entering through [invoke](Proxied::invoke) are intercepted.
/// When the target calls one of its own methods on `self`, that inner call
/// runs directly with no chain applied - self-invocation bypasses
/// interception. A target that needs its internal calls intercepted must
/// call back in through its own injected `Proxied` handle instead of `self`.
pub struct Proxied<T> {
    bean: String,
    target: Arc<T>,
    bindings: Arc<BindingSet>,
    /// Chains composed per method on first use
    chains: RwLock<HashMap<String, Arc<InterceptorChain>>>,
}

impl<T: Send + Sync + 'static> Proxied<T> {
    pub fn bean(&self) -> &str {
        &self.bean
    }

    /// The raw target - calls through this bypass every binding
    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    /// Invokes `body` on the target with the method's chain wrapped around it
    ///
    /// `args` are rendered argument values for audit observation. The chain
    /// may re-run `body` (retry), so it takes `FnMut`.
    pub fn invoke<R: Send + 'static>(
        &self,
        method: &str,
        scope: &CallScope,
        args: Vec<String>,
        mut body: impl FnMut(&T) -> Result<R, CallError>,
    ) -> Result<R, CallError> {
        let chain = self.chain_for(method);
        let mut call = CallContext::new(self.bean.clone(), method, args, scope);

        let target = self.target.clone();
        let mut thunk = move |_call: &mut CallContext| -> CallOutcome {
            body(&target).map(|value| Box::new(value) as Box<dyn Any + Send>)
        };

        match chain.call(&mut call, &mut thunk) {
            Ok(value) => value
                .downcast::<R>()
                .map(|value| *value)
                .map_err(|_| CallError::BadReturnType {
                    operation: call.operation(),
                }),
            Err(error) => Err(error),
        }
    }

    fn chain_for(&self, method: &str) -> Arc<InterceptorChain> {
        if let Some(chain) = self.chains.read().get(method) {
            return chain.clone();
        }

        let chain = Arc::new(self.bindings.chain_for(&self.bean, method));
        tracing::debug!(
            bean = %self.bean,
            method,
            interceptors = chain.len(),
            "composed chain"
        );
        self.chains
            .write()
            .entry(method.to_string())
            .or_insert(chain)
            .clone()
    }
}
