use crate::config::RetryConfig;
use crate::error::NutritionError;
use log::{debug, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Run `operation` up to `policy.attempts` times.
///
/// Only transient failures (transport errors and 5xx responses) are retried;
/// everything else is returned on the first occurrence. The delay grows
/// linearly with the attempt number.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryConfig,
    label: &str,
    mut operation: F,
) -> Result<T, NutritionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, NutritionError>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        debug!("Calling {} (attempt {}/{})", label, attempt, attempts);

        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < attempts => {
                warn!(
                    "{} failed (attempt {}/{}): {}",
                    label, attempt, attempts, e
                );
                let delay = Duration::from_millis(policy.delay_ms * attempt as u64);
                debug!("Waiting {:?} before retry", delay);
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
