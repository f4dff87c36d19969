use anyhow::Context;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;

use crate::domain::company::CompanyEvent;
use crate::metrics::Metrics;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig};
use super::{EventPublisher, PublishError};

// ============================================================================
// Kafka Event Publisher
// ============================================================================
//
// `publish` returns once the producer has queued the record. The broker
// acknowledgment is awaited by a tracked task on the main runtime, so it
// outlives both the request and the HTTP worker that handled it.
//
// The circuit breaker counts handoff and delivery failures alike.
//
// ============================================================================

pub struct KafkaEventPublisher {
    producer: FutureProducer,
    topic: String,
    circuit_breaker: CircuitBreaker,
    deliveries: TaskTracker,
    runtime: Handle,
    metrics: Arc<Metrics>,
}

impl KafkaEventPublisher {
    /// Must be called from within the runtime that should own delivery tasks.
    pub fn new(brokers: &str, topic: &str, metrics: Arc<Metrics>) -> anyhow::Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .context("failed to create Kafka producer")?;

        let gauge = metrics.clone();
        let circuit_breaker = CircuitBreaker::new(CircuitBreakerConfig::default())
            .with_transition_hook(move |state| gauge.set_publisher_circuit_state(state.as_gauge()));

        Ok(Self {
            producer,
            topic: topic.to_string(),
            circuit_breaker,
            deliveries: TaskTracker::new(),
            runtime: Handle::current(),
            metrics,
        })
    }

    /// Stop accepting events and wait at most `drain` for outstanding
    /// acknowledgments, then flush whatever is left in the producer queue.
    pub async fn close(&self, drain: Duration) {
        let started = Instant::now();
        self.deliveries.close();

        let pending = self.deliveries.len();
        tracing::info!(pending, "Draining event deliveries");

        if tokio::time::timeout(drain, self.deliveries.wait()).await.is_err() {
            tracing::warn!(
                pending = self.deliveries.len(),
                "Event delivery drain timed out; remaining acknowledgments abandoned"
            );
        }

        // librdkafka's flush blocks the calling thread.
        let remaining = drain.saturating_sub(started.elapsed());
        let producer = self.producer.clone();
        match tokio::task::spawn_blocking(move || producer.flush(remaining)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Kafka producer flush did not complete"),
            Err(e) => tracing::warn!(error = %e, "Kafka producer flush task failed"),
        }
        let circuit = self.circuit_breaker.state().await;
        tracing::info!(?circuit, "Event publisher closed");
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish(&self, event: CompanyEvent) -> Result<(), PublishError> {
        if self.deliveries.is_closed() {
            return Err(PublishError::Unavailable("publisher is closed".to_string()));
        }
        self.circuit_breaker
            .try_acquire()
            .await
            .map_err(|e| PublishError::Unavailable(e.to_string()))?;

        let event_type = event.event_type.as_str();
        let key = event.key();
        let payload = event.to_payload()?;

        let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);
        let handoff = self.producer.send_result(record).map_err(|(e, _)| e.to_string());
        let delivery = match handoff {
            Ok(delivery) => delivery,
            Err(error) => {
                self.circuit_breaker.record_failure().await;
                return Err(PublishError::Handoff(error));
            }
        };

        let circuit_breaker = self.circuit_breaker.clone();
        let metrics = self.metrics.clone();
        let topic = self.topic.clone();

        self.deliveries.spawn_on(
            async move {
                let failure = match delivery.await {
                    Ok(Ok(_)) => None,
                    Ok(Err((e, _))) => Some(e.to_string()),
                    Err(_) => Some("producer dropped before acknowledgment".to_string()),
                };

                match failure {
                    None => {
                        circuit_breaker.record_success().await;
                        tracing::debug!(topic = %topic, key = %key, event_type, "Event delivered");
                    }
                    Some(error) => {
                        circuit_breaker.record_failure().await;
                        metrics.record_publish_failure(event_type, "delivery");
                        tracing::warn!(
                            topic = %topic,
                            key = %key,
                            event_type,
                            error = %error,
                            "Event delivery failed"
                        );
                    }
                }
            },
            &self.runtime,
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::company::CompanyId;

    // Nothing listens on port 1, so a queued record stays unacknowledged
    // until message.timeout.ms.
    fn unreachable_publisher() -> KafkaEventPublisher {
        KafkaEventPublisher::new("127.0.0.1:1", "company_events", Arc::new(Metrics::new().unwrap())).unwrap()
    }

    #[tokio::test]
    async fn test_close_is_bounded_by_the_drain_window() {
        let publisher = unreachable_publisher();
        publisher.publish(CompanyEvent::deleted(CompanyId::generate())).await.unwrap();
        assert_eq!(publisher.deliveries.len(), 1);

        let drain = Duration::from_millis(200);
        let started = Instant::now();
        publisher.close(drain).await;
        let elapsed = started.elapsed();

        assert!(elapsed >= drain, "returned before the drain window: {elapsed:?}");
        assert!(elapsed < drain + Duration::from_millis(500), "close overran: {elapsed:?}");
    }

    #[tokio::test]
    async fn test_publish_after_close_fails_fast() {
        let publisher = unreachable_publisher();
        publisher.close(Duration::from_millis(50)).await;

        let started = Instant::now();
        let error = publisher
            .publish(CompanyEvent::deleted(CompanyId::generate()))
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(matches!(error, PublishError::Unavailable(_)));
        assert_eq!(error.stage(), "circuit_open");
        assert_eq!(publisher.deliveries.len(), 0);
    }
}
