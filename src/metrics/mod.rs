// Private module declaration
mod server;

use prometheus::{IntCounterVec, IntGauge, Opts, Registry};

pub use server::metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers:
// - Command pipeline outcomes per operation
// - Event publishing (handed off, failed per stage)
// - Login attempts
// - Publisher circuit breaker state
//
// Scraped via /metrics on the metrics server.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub commands_total: IntCounterVec,
    pub events_published: IntCounterVec,
    pub event_publish_failures: IntCounterVec,
    pub login_attempts: IntCounterVec,
    pub publisher_circuit_state: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let commands_total = IntCounterVec::new(
            Opts::new("company_commands_total", "Company commands by operation and outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(commands_total.clone()))?;

        let events_published = IntCounterVec::new(
            Opts::new("company_events_published_total", "Events handed off to the broker"),
            &["event_type"],
        )?;
        registry.register(Box::new(events_published.clone()))?;

        let event_publish_failures = IntCounterVec::new(
            Opts::new(
                "company_event_publish_failures_total",
                "Events that were not delivered, by failing stage",
            ),
            &["event_type", "stage"],
        )?;
        registry.register(Box::new(event_publish_failures.clone()))?;

        let login_attempts = IntCounterVec::new(
            Opts::new("login_attempts_total", "Login attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(login_attempts.clone()))?;

        let publisher_circuit_state = IntGauge::new(
            "event_publisher_circuit_state",
            "Event publisher circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(publisher_circuit_state.clone()))?;

        Ok(Self {
            registry,
            commands_total,
            events_published,
            event_publish_failures,
            login_attempts,
            publisher_circuit_state,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_command(&self, operation: &str, outcome: &str) {
        self.commands_total.with_label_values(&[operation, outcome]).inc();
    }

    pub fn record_event_published(&self, event_type: &str) {
        self.events_published.with_label_values(&[event_type]).inc();
    }

    pub fn record_publish_failure(&self, event_type: &str, stage: &str) {
        self.event_publish_failures.with_label_values(&[event_type, stage]).inc();
    }

    pub fn record_login(&self, outcome: &str) {
        self.login_attempts.with_label_values(&[outcome]).inc();
    }

    pub fn set_publisher_circuit_state(&self, state: i64) {
        self.publisher_circuit_state.set(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_value(metrics: &Metrics, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        metrics
            .registry()
            .gather()
            .into_iter()
            .find(|family| family.name() == name)?
            .metric
            .iter()
            .find(|m| {
                labels.iter().all(|(k, v)| {
                    m.label.iter().any(|pair| pair.name() == *k && pair.value() == *v)
                })
            })
            .map(|m| m.counter.value.unwrap_or_default())
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_command("create", "success");
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_command_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record_command("create", "success");
        metrics.record_command("create", "success");
        metrics.record_command("create", "conflict");

        assert_eq!(
            counter_value(&metrics, "company_commands_total", &[("operation", "create"), ("outcome", "success")]),
            Some(2.0)
        );
        assert_eq!(
            counter_value(&metrics, "company_commands_total", &[("outcome", "conflict")]),
            Some(1.0)
        );
    }

    #[test]
    fn test_record_publish_failure_by_stage() {
        let metrics = Metrics::new().unwrap();
        metrics.record_publish_failure("company_deleted", "circuit_open");

        assert_eq!(
            counter_value(
                &metrics,
                "company_event_publish_failures_total",
                &[("event_type", "company_deleted"), ("stage", "circuit_open")]
            ),
            Some(1.0)
        );
    }

    #[test]
    fn test_circuit_state_gauge() {
        let metrics = Metrics::new().unwrap();
        metrics.set_publisher_circuit_state(1);

        let gathered = metrics.registry().gather();
        let state = gathered
            .iter()
            .find(|m| m.name() == "event_publisher_circuit_state")
            .unwrap();
        assert_eq!(state.metric[0].gauge.value, Some(1.0));
    }
}
