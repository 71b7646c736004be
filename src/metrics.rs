use commonware_runtime::Metrics as RuntimeMetrics;
use prometheus_client::metrics::{counter::Counter, gauge::Gauge};

/// Metrics for the [`Engine`](crate::Engine).
#[derive(Default)]
pub struct Metrics {
    /// Latest observed chain height.
    pub height: Gauge,
    /// Number of fake rounds submitted.
    pub fake_rounds: Counter,
    /// Number of real rounds submitted.
    pub real_rounds: Counter,
    /// Number of staking updates submitted.
    pub submissions: Counter,
    /// Number of passed expectation checks.
    pub checks: Counter,
}

impl Metrics {
    /// Create and return a new set of metrics, registered with the given context.
    pub fn init<E: RuntimeMetrics>(context: E) -> Self {
        let metrics = Metrics::default();
        context.register(
            "height",
            "Latest observed chain height",
            metrics.height.clone(),
        );
        context.register(
            "fake_rounds",
            "Number of fake rounds submitted",
            metrics.fake_rounds.clone(),
        );
        context.register(
            "real_rounds",
            "Number of real rounds submitted",
            metrics.real_rounds.clone(),
        );
        context.register(
            "submissions",
            "Number of staking updates submitted",
            metrics.submissions.clone(),
        );
        context.register(
            "checks",
            "Number of passed expectation checks",
            metrics.checks.clone(),
        );
        metrics
    }
}
