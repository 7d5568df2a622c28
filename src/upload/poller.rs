use std::time::Duration;

use rand::Rng;

use crate::backend::models::{AuthToken, PollOutcome, ProcessingStatus};
use crate::backend::Backend;

use super::PollError;

/// Status polling limits.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay between polls while the file is still processing
    pub interval: Duration,
    /// Total status requests before giving up with `Timeout`
    pub max_attempts: u32,
    /// Consecutive request errors before the poll fails
    pub max_consecutive_errors: u32,
    /// Upper bound on the backoff after an error
    pub backoff_max: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 300,
            max_consecutive_errors: 5,
            backoff_max: Duration::from_secs(30),
        }
    }
}

impl PollPolicy {
    /// Equal-jitter exponential backoff: uniform in `[base/2, base]` where
    /// `base = interval * 2^(errors-1)`, capped at `backoff_max`.
    fn error_delay(&self, consecutive_errors: u32) -> Duration {
        let exp = consecutive_errors.saturating_sub(1).min(16);
        let base = self
            .interval
            .saturating_mul(1u32 << exp)
            .min(self.backoff_max);
        let base_ms = base.as_millis() as u64;
        if base_ms < 2 {
            return base;
        }
        let jittered = rand::thread_rng().gen_range(base_ms / 2..=base_ms);
        Duration::from_millis(jittered)
    }
}

/// Poll a file's processing status until it is terminal or the attempt
/// ceiling is reached.
///
/// Running out of attempts is not an error: it resolves with
/// [`PollOutcome::Timeout`] so the caller can move on and check later.
/// Request errors back off and only fail the poll once
/// `max_consecutive_errors` happen in a row.
pub async fn poll_until_terminal(
    backend: &dyn Backend,
    token: &AuthToken,
    file_id: &str,
    policy: &PollPolicy,
) -> Result<PollOutcome, PollError> {
    let mut consecutive_errors = 0u32;

    for attempt in 1..=policy.max_attempts {
        let delay = match backend.file_status(token, file_id).await {
            Ok(ProcessingStatus::Completed) => {
                tracing::debug!(file_id, attempt, "File processing completed");
                return Ok(PollOutcome::Completed);
            }
            Ok(ProcessingStatus::Failed) => {
                tracing::warn!(file_id, attempt, "File processing failed");
                return Ok(PollOutcome::Failed);
            }
            Ok(_) => {
                consecutive_errors = 0;
                policy.interval
            }
            Err(e) => {
                consecutive_errors += 1;
                if consecutive_errors >= policy.max_consecutive_errors {
                    return Err(PollError::TooManyErrors {
                        attempts: attempt,
                        source: e,
                    });
                }
                tracing::debug!(
                    file_id,
                    attempt,
                    consecutive_errors,
                    error = %e,
                    "Status poll failed, backing off"
                );
                policy.error_delay(consecutive_errors)
            }
        };

        if attempt < policy.max_attempts {
            tokio::time::sleep(delay).await;
        }
    }

    tracing::warn!(
        file_id,
        attempts = policy.max_attempts,
        "Gave up polling; processing may still complete server-side"
    );
    Ok(PollOutcome::Timeout)
}
