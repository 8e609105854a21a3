//! Bounded retry with reload-based recovery.

use std::future::Future;

use tracing::warn;

use teamboard_core::CrawlError;

/// Retries one logical extraction up to `max_retries` extra times.
///
/// Every failed attempt is followed by a recovery step (a full page reload
/// plus login detection) so the page is left clean even when the error
/// finally propagates. There is no backoff beyond the recovery itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub async fn run<T, Op, OpFut, Rec, RecFut>(
        &self,
        label: &str,
        mut op: Op,
        mut recover: Rec,
    ) -> Result<T, CrawlError>
    where
        Op: FnMut() -> OpFut,
        OpFut: Future<Output = Result<T, CrawlError>>,
        Rec: FnMut() -> RecFut,
        RecFut: Future<Output = Result<(), CrawlError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            warn!(
                query = label,
                attempt,
                max_attempts = self.max_attempts(),
                error = %err,
                "extraction attempt failed"
            );

            if let Err(e) = recover().await {
                warn!(query = label, error = %e, "recovery after failed attempt did not complete");
            }

            if attempt > self.max_retries {
                return Err(err);
            }
        }
    }
}
