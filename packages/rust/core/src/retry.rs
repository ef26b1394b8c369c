//! Bounded retry for pipeline stages.

use std::future::Future;

use companyscout_shared::{Result, RetryPolicy, Stage};
use tracing::warn;

/// Run `op` until it succeeds or `policy.max_attempts()` is reached.
///
/// Sleeps `policy.delay()` between attempts. The last error is returned
/// unchanged.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, stage: Stage, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                warn!(%stage, attempt, max_attempts, error = %e, "stage failed, retrying");
                let delay = policy.delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use companyscout_shared::ResearchError;
    use std::sync::atomic::{AtomicU32, Ordering};

    const NO_DELAY: RetryPolicy = RetryPolicy {
        max_retries: 2,
        delay_secs: 0,
    };

    #[tokio::test]
    async fn stops_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry(NO_DELAY, Stage::Fetch, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ResearchError::Fetch("boom".into()))
        })
        .await;

        assert_eq!(result.unwrap_err().to_string(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = retry(NO_DELAY, Stage::Lookup, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 2 {
                Err(ResearchError::Lookup("flaky".into()))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn none_policy_runs_once() {
        let calls = AtomicU32::new(0);
        let _: Result<()> = retry(RetryPolicy::none(), Stage::Persist, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ResearchError::Storage("locked".into()))
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
