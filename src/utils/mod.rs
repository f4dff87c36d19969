pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
pub use retry::{retry_with_backoff, RetryConfig, RetryResult};
