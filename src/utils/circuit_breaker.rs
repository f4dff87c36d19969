use std::sync::Arc;
use tokio::sync::Mutex;
use std::time::{Duration, Instant};

// ============================================================================
// Circuit Breaker
// ============================================================================
//
// Tracks consecutive failures of a downstream dependency and fails fast while
// it is considered down.
//
// States:
// - Closed: calls pass through
// - Open: calls are rejected until `open_for` has elapsed
// - HalfOpen: calls pass through; `success_threshold` successes close the
//   circuit, any failure reopens it
//
// Outcomes can be reported after the fact (`record_success` /
// `record_failure`) for operations whose result arrives asynchronously.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    /// Numeric encoding for the metrics gauge.
    pub fn as_gauge(&self) -> i64 {
        match self {
            CircuitState::Closed => 0,
            CircuitState::Open => 1,
            CircuitState::HalfOpen => 2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening
    pub failure_threshold: u32,
    /// How long to stay open before probing
    pub open_for: Duration,
    /// Successes needed in half-open to close
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_for: Duration::from_secs(30),
            success_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("circuit breaker is open")]
pub struct CircuitOpen;

type TransitionHook = Arc<dyn Fn(CircuitState) + Send + Sync>;

#[derive(Clone)]
pub struct CircuitBreaker {
    inner: Arc<Mutex<Inner>>,
    config: CircuitBreakerConfig,
    on_transition: Option<TransitionHook>,
}

struct Inner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    opened_at: Option<Instant>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                opened_at: None,
            })),
            config,
            on_transition: None,
        }
    }

    /// Called with the new state on every transition.
    pub fn with_transition_hook(mut self, hook: impl Fn(CircuitState) + Send + Sync + 'static) -> Self {
        self.on_transition = Some(Arc::new(hook));
        self
    }

    /// Ask for permission to call the dependency.
    pub async fn try_acquire(&self) -> Result<(), CircuitOpen> {
        let mut inner = self.inner.lock().await;

        if inner.state != CircuitState::Open {
            return Ok(());
        }

        let cooled_down = inner
            .opened_at
            .map_or(true, |at| at.elapsed() >= self.config.open_for);
        if !cooled_down {
            return Err(CircuitOpen);
        }

        tracing::info!("Circuit breaker transitioning to HalfOpen");
        inner.success_count = 0;
        self.transition(&mut inner, CircuitState::HalfOpen);
        Ok(())
    }

    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;

        match inner.state {
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    tracing::info!(successes = inner.success_count, "Circuit breaker closing");
                    inner.failure_count = 0;
                    inner.success_count = 0;
                    inner.opened_at = None;
                    self.transition(&mut inner, CircuitState::Closed);
                }
            }
            CircuitState::Closed => inner.failure_count = 0,
            // A late acknowledgment for a call made before the circuit opened.
            CircuitState::Open => {}
        }
    }

    pub async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.failure_count += 1;

        match inner.state {
            CircuitState::Closed if inner.failure_count >= self.config.failure_threshold => {
                tracing::warn!(failures = inner.failure_count, "Circuit breaker opening");
                inner.opened_at = Some(Instant::now());
                self.transition(&mut inner, CircuitState::Open);
            }
            CircuitState::HalfOpen => {
                tracing::warn!("Failure during half-open, reopening circuit");
                inner.success_count = 0;
                inner.opened_at = Some(Instant::now());
                self.transition(&mut inner, CircuitState::Open);
            }
            _ => {}
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    fn transition(&self, inner: &mut Inner, to: CircuitState) {
        inner.state = to;
        if let Some(ref hook) = self.on_transition {
            hook(to);
        }
    }
}
