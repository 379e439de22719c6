//! The built-in cross-cutting interceptors
//!
//! Each mirrors one concern of the representative stack: invocation-id
//! tagging, transaction boundary logging, role checks, metrics, audit
//! observation and retries.

pub mod audit;
pub mod invocation_id;
pub mod metrics;
pub mod retry;
pub mod security;
pub mod transactional;

pub use audit::AuditInterceptor;
pub use invocation_id::InvocationIdInterceptor;
pub use metrics::MetricsInterceptor;
pub use retry::RetryInterceptor;
pub use security::RequireRoleInterceptor;
pub use transactional::TransactionalInterceptor;
