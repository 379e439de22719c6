use std::sync::Arc;

use globset::{Glob, GlobMatcher};

use crate::{
    chain::{Interceptor, InterceptorChain},
    errors::BindingError,
};

/// Recommended order values for the built-in interceptors
///
/// Lower is further out. Retries sit innermost so that only the real work is
/// re-run, while the invocation id and transaction boundary span all
/// attempts.
pub mod order {
    pub const INVOCATION_ID: i32 = 0;
    pub const TRANSACTIONAL: i32 = 10;
    pub const SECURITY: i32 = 20;
    pub const METRICS: i32 = 30;
    pub const AUDIT: i32 = 40;
    pub const RETRY: i32 = 50;
}

/// Glob pattern over `bean.method` operation names
///
/// `book_service.remove_book` matches one method, `book_service.*` every
/// method of one bean, `*.find_*` a method family across beans.
#[derive(Debug, Clone)]
pub struct Selector {
    pattern: String,
    bean: GlobMatcher,
    method: GlobMatcher,
}

impl Selector {
    pub fn parse(pattern: &str) -> Result<Self, BindingError> {
        let Some((bean, method)) = pattern.split_once('.') else {
            return Err(BindingError::InvalidSelector {
                pattern: pattern.to_string(),
                reason: "expected 'bean.method'".to_string(),
            });
        };

        let compile = |part: &str| -> Result<GlobMatcher, BindingError> {
            Glob::new(part)
                .map(|glob| glob.compile_matcher())
                .map_err(|error| BindingError::InvalidSelector {
                    pattern: pattern.to_string(),
                    reason: error.to_string(),
                })
        };

        Ok(Self {
            pattern: pattern.to_string(),
            bean: compile(bean)?,
            method: compile(method)?,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, bean: &str, method: &str) -> bool {
        self.bean.is_match(bean) && self.method.is_match(method)
    }

    /// Whether any method of `bean` could match
    pub fn matches_bean(&self, bean: &str) -> bool {
        self.bean.is_match(bean)
    }
}

/// One (selector, interceptor, order) declaration
pub struct InterceptorBinding {
    pub selector: Selector,
    pub interceptor: Arc<dyn Interceptor>,
    pub order: i32,
    /// Declaration sequence, breaks order ties
    seq: usize,
}

/// Collects binding declarations during startup
#[derive(Default)]
pub struct AspectRegistryBuilder {
    bindings: Vec<InterceptorBinding>,
}

impl AspectRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a binding, failing fast on an invalid selector or a
    /// duplicate (selector, interceptor) pair
    pub fn bind(
        &mut self,
        selector: &str,
        order: i32,
        interceptor: Arc<dyn Interceptor>,
    ) -> Result<&mut Self, BindingError> {
        let selector = Selector::parse(selector)?;

        if self.bindings.iter().any(|binding| {
            binding.selector.pattern() == selector.pattern()
                && binding.interceptor.name() == interceptor.name()
        }) {
            return Err(BindingError::ConflictingBinding {
                pattern: selector.pattern().to_string(),
                interceptor: interceptor.name(),
            });
        }

        tracing::debug!(
            selector = selector.pattern(),
            interceptor = interceptor.name(),
            order,
            "bound interceptor"
        );
        let seq = self.bindings.len();
        self.bindings.push(InterceptorBinding {
            selector,
            interceptor,
            order,
            seq,
        });
        Ok(self)
    }

    /// Freezes the declarations into an ordered, immutable set
    pub fn build(mut self) -> BindingSet {
        self.bindings
            .sort_by_key(|binding| (binding.order, binding.seq));
        BindingSet {
            bindings: self.bindings,
        }
    }
}

/// Ordered, immutable set of interceptor bindings
///
/// Established at startup; per-call work is a match over precompiled globs.
pub struct BindingSet {
    bindings: Vec<InterceptorBinding>,
}

impl BindingSet {
    /// Composes the chain for one operation, outermost interceptor first
    pub fn chain_for(&self, bean: &str, method: &str) -> InterceptorChain {
        let interceptors = self
            .bindings
            .iter()
            .filter(|binding| binding.selector.matches(bean, method))
            .map(|binding| binding.interceptor.clone())
            .collect();
        InterceptorChain::new(interceptors)
    }

    /// Whether any binding applies to this bean at all
    pub fn advises(&self, bean: &str) -> bool {
        self.bindings
            .iter()
            .any(|binding| binding.selector.matches_bean(bean))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
