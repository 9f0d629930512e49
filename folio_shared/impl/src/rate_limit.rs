use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use folio_di::Build;
use folio_shared_contracts::{
    rate_limit::{RateLimitError, RateLimitService},
    time::TimeService,
};
use folio_utils::trace_instrument;
use tokio::sync::Mutex;
use tracing::debug;

/// Number of ledger entries above which expired windows are evicted.
const PRUNE_THRESHOLD: usize = 1024;

/// Fixed-window rate limiter keeping its ledger in process memory.
///
/// Counters are lost on restart and are not shared between multiple
/// instances of the service.
#[derive(Debug, Clone, Build)]
pub struct MemoryRateLimitServiceImpl<Time> {
    time: Time,
    config: RateLimitServiceConfig,
    #[state]
    state: Arc<State>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitServiceConfig {
    /// Number of tokens available per key and window.
    pub points: u32,
    /// Length of a window, starting at the first consumed token.
    pub window: Duration,
}

#[derive(Debug, Default)]
struct State {
    ledger: Mutex<HashMap<String, Window>>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start: DateTime<Utc>,
    consumed: u32,
}

impl Window {
    fn new(start: DateTime<Utc>) -> Self {
        Self { start, consumed: 0 }
    }

    fn expires_at(&self, length: Duration) -> DateTime<Utc> {
        self.start + length
    }

    fn is_expired(&self, now: DateTime<Utc>, length: Duration) -> bool {
        now >= self.expires_at(length)
    }
}

impl<Time> RateLimitService for MemoryRateLimitServiceImpl<Time>
where
    Time: TimeService,
{
    #[trace_instrument(skip(self))]
    async fn consume(&self, key: &str) -> Result<(), RateLimitError> {
        let RateLimitServiceConfig { points, window } = self.config;
        let now = self.time.now();

        let mut ledger = self.state.ledger.lock().await;

        if ledger.len() >= PRUNE_THRESHOLD {
            ledger.retain(|_, entry| !entry.is_expired(now, window));
        }

        let entry = ledger
            .entry(key.to_owned())
            .or_insert_with(|| Window::new(now));

        if entry.is_expired(now, window) {
            *entry = Window::new(now);
        }

        if entry.consumed >= points {
            let retry_after = (entry.expires_at(window) - now)
                .to_std()
                .unwrap_or_default();
            debug!(key, consumed = entry.consumed, ?retry_after, "rate limit exceeded");
            return Err(RateLimitError::Exceeded { retry_after });
        }

        entry.consumed += 1;

        Ok(())
    }
}
