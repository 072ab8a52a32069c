use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Sliding-window call counter keyed by operation name.
///
/// A call is allowed while fewer than `max_requests` allowed calls happened
/// within the trailing `window`. Denied calls are not recorded.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    history: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            history: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt for `key`; returns false when the cap is reached
    pub async fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut history = self.history.lock().await;
        let calls = history.entry(key.to_string()).or_default();
        calls.retain(|at| now.saturating_duration_since(*at) < self.window);

        if calls.len() >= self.max_requests {
            tracing::warn!(
                "Rate limit hit for {}: {}/{}",
                key,
                calls.len(),
                self.max_requests
            );
            return false;
        }

        calls.push(now);
        true
    }
}
