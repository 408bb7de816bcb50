//! Transient-failure retry for DataForSEO calls.

use std::future::Future;
use std::time::Duration;

use crate::error::DataForSeoError;

const MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Network failures, 5xx and 429 are transient. Envelope errors, decode
/// failures and other 4xx are final.
pub(crate) fn is_retriable(err: &DataForSeoError) -> bool {
    match err {
        DataForSeoError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        DataForSeoError::Status { status, .. } => *status == 429 || (500..600).contains(status),
        DataForSeoError::MissingCredentials
        | DataForSeoError::InvalidBaseUrl { .. }
        | DataForSeoError::Api { .. }
        | DataForSeoError::Deserialize { .. }
        | DataForSeoError::NoTaskCreated { .. }
        | DataForSeoError::EmptyResponse { .. } => false,
    }
}

/// Un-jittered delay before retry number `retry` (1-based): `base × 2^(retry-1)`,
/// capped at one minute.
pub(crate) fn base_delay_ms(backoff_base_ms: u64, retry: u32) -> u64 {
    let exponent = retry.saturating_sub(1).min(10);
    backoff_base_ms
        .saturating_mul(1u64 << exponent)
        .min(MAX_RETRY_DELAY_MS)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn jittered(delay_ms: u64) -> Duration {
    let factor = 0.75 + rand::random::<f64>() * 0.5;
    Duration::from_millis((delay_ms as f64 * factor) as u64)
}

/// Runs `operation`, retrying transient failures up to `max_retries` times
/// with ±25 % jittered exponential back-off.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, DataForSeoError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DataForSeoError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retry >= max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retry += 1;
        let delay = jittered(base_delay_ms(backoff_base_ms, retry));
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient DataForSEO failure"
        );
        tokio::time::sleep(delay).await;
    }
}
