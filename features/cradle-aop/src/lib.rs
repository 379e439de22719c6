//! Call interception: ordered chains of cross-cutting interceptors applied
//! through explicit dispatch handles.
//!
//! Bindings (`selector`, `order`, interceptor) are declared at startup,
//! validated fail-fast and frozen into a [BindingSet]. A [Dispatcher] wraps
//! a target in a [Proxied] handle; every call entering through
//! [Proxied::invoke] runs the matching chain, outermost interceptor first.
//!
//! Calls a target makes on its own `self` never pass through the handle and
//! are therefore not intercepted. This asymmetry is a deliberate property of
//! dispatch-handle wrapping; see [Proxied] for the workaround.
//!
//! ```no_run
//! use std::sync::Arc;
//! use cradle_aop::{
//!     order, AspectRegistryBuilder, CallScope, Dispatcher, RequireRoleInterceptor,
//! };
//!
//! struct Shelf;
//! impl Shelf {
//!     fn clear(&self) {}
//! }
//!
//! let mut aspects = AspectRegistryBuilder::new();
//! aspects.bind(
//!     "shelf.clear",
//!     order::SECURITY,
//!     Arc::new(RequireRoleInterceptor::new("ADMIN")),
//! )?;
//! let dispatcher = Dispatcher::new(aspects.build());
//!
//! let shelf = dispatcher.wrap("shelf", Arc::new(Shelf));
//! let admin = CallScope::with_role("ADMIN");
//! shelf.invoke("clear", &admin, vec![], |shelf| {
//!     shelf.clear();
//!     Ok(())
//! })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binding;
pub mod cancel;
pub mod chain;
pub mod context;
pub mod errors;
pub mod interceptors;
pub mod metrics;
pub mod proxy;

pub use binding::{order, AspectRegistryBuilder, BindingSet, InterceptorBinding, Selector};
pub use cancel::CancelToken;
pub use chain::{CallOutcome, Interceptor, InterceptorChain, Proceed};
pub use context::{CallContext, CallScope};
pub use errors::{BindingError, CallError, DynError};
pub use interceptors::{
    AuditInterceptor, InvocationIdInterceptor, MetricsInterceptor, RequireRoleInterceptor,
    RetryInterceptor, TransactionalInterceptor,
};
pub use metrics::MetricsRegistry;
pub use proxy::{Dispatcher, Proxied};
