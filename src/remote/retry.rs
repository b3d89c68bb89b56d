use std::time::Duration;

use backon::ExponentialBuilder;

/// Default backoff for remote calls: 500ms doubling up to 4s, five
/// retries, with jitter.
pub fn default_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(4))
        .with_max_times(5)
        .with_factor(2.0)
        .with_jitter()
}

/// Retries on 408, 409, 429 and 5xx.
pub const fn is_retryable_status(code: u16) -> bool {
    matches!(code, 408 | 409 | 429 | 500..=599)
}
