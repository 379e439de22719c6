use std::{sync::Arc, time::Instant};

use crate::{
    chain::{CallOutcome, Interceptor, Proceed},
    context::CallContext,
    metrics::MetricsRegistry,
};

/// Counts calls and records durations in a shared [MetricsRegistry]
///
/// Keyed by an explicit metric name, falling back to the operation name.
pub struct MetricsInterceptor {
    registry: Arc<MetricsRegistry>,
    metric: Option<String>,
}

impl MetricsInterceptor {
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self {
            registry,
            metric: None,
        }
    }

    /// Counts under `metric` instead of the operation name
    pub fn named(registry: Arc<MetricsRegistry>, metric: impl Into<String>) -> Self {
        Self {
            registry,
            metric: Some(metric.into()),
        }
    }
}

impl Interceptor for MetricsInterceptor {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn around(&self, call: &mut CallContext, next: &mut dyn Proceed) -> CallOutcome {
        let key = self
            .metric
            .clone()
            .unwrap_or_else(|| call.operation());
        let count = self.registry.increment(&key);

        let started = Instant::now();
        let outcome = next.proceed(call);
        let elapsed = started.elapsed();
        self.registry.record_duration(&key, elapsed);

        tracing::info!(
            id = %call.invocation_id(),
            metric = %key,
            count,
            duration_us = elapsed.as_micros() as u64,
            "metrics"
        );
        outcome
    }
}
