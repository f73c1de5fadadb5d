use std::future::Future;
use std::time::Duration;
use tokio::time::{ timeout_at, Instant };

use crate::errors::ProxyError;

/// Stand-in expiry for budgets too large to add to the clock (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Wall-clock budget for one proxy call.
///
/// The timer only exists while the wrapped future is being polled, so it is
/// released on every exit path, including early returns and panics.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    budget: Duration,
    expires_at: Instant,
}

impl Deadline {
    pub fn start(budget: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(budget)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self { budget, expires_at }
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Drives `fut` to completion or aborts it once the deadline passes.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ProxyError>
        where F: Future<Output = Result<T, ProxyError>>
    {
        match timeout_at(self.expires_at, fut).await {
            Ok(result) => result,
            Err(_) => Err(ProxyError::DeadlineExceeded { budget: self.budget }),
        }
    }
}
