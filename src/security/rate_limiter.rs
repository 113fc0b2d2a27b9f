// ABOUTME: Sliding-window rate limiter keyed by tool name.
// ABOUTME: Counts call timestamps inside the trailing window per tool.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// A call budget: at most `max_calls` inside any trailing `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimit {
    pub max_calls: u32,
    #[serde(rename = "window_seconds", deserialize_with = "de_seconds")]
    pub window: Duration,
}

fn de_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

impl RateLimit {
    pub fn new(max_calls: u32, window: Duration) -> Self {
        Self { max_calls, window }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(60))
    }
}

/// Sliding-window rate limiter for tool calls.
///
/// State lives for the life of the process. Every operation prunes
/// timestamps that fell out of the window, so memory per tool stays
/// bounded by the tool's `max_calls` when calls go through `try_acquire`.
pub struct RateLimiter {
    calls: Mutex<HashMap<String, VecDeque<Instant>>>,
    default: RateLimit,
    overrides: HashMap<String, RateLimit>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimit::default())
    }
}

impl RateLimiter {
    /// Create a limiter applying `default` to every tool.
    pub fn new(default: RateLimit) -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            default,
            overrides: HashMap::new(),
        }
    }

    /// Use a dedicated budget for one tool.
    pub fn with_limit(mut self, tool: impl Into<String>, limit: RateLimit) -> Self {
        self.overrides.insert(tool.into(), limit);
        self
    }

    /// The budget that applies to `tool`.
    pub fn limit_for(&self, tool: &str) -> RateLimit {
        self.overrides.get(tool).copied().unwrap_or(self.default)
    }

    /// Whether one more call to `tool` would fit in its window. Does not record.
    pub async fn allow(&self, tool: &str) -> bool {
        let limit = self.limit_for(tool);
        let mut calls = self.calls.lock().await;
        match calls.get_mut(tool) {
            Some(stamps) => {
                prune(stamps, limit.window, Instant::now());
                stamps.len() < limit.max_calls as usize
            }
            None => limit.max_calls > 0,
        }
    }

    /// Record a call to `tool` now.
    pub async fn record(&self, tool: &str) {
        let limit = self.limit_for(tool);
        let now = Instant::now();
        let mut calls = self.calls.lock().await;
        let stamps = calls.entry(tool.to_string()).or_default();
        prune(stamps, limit.window, now);
        stamps.push_back(now);
    }

    /// Check and record in one step under the lock.
    ///
    /// Returns `false`, recording nothing, when the window is full.
    pub async fn try_acquire(&self, tool: &str) -> bool {
        let limit = self.limit_for(tool);
        let now = Instant::now();
        let mut calls = self.calls.lock().await;
        let stamps = calls.entry(tool.to_string()).or_default();
        prune(stamps, limit.window, now);
        if stamps.len() >= limit.max_calls as usize {
            return false;
        }
        stamps.push_back(now);
        true
    }

    /// Number of calls to `tool` inside its current window (for monitoring).
    pub async fn recent_calls(&self, tool: &str) -> usize {
        let limit = self.limit_for(tool);
        let mut calls = self.calls.lock().await;
        calls.get_mut(tool).map_or(0, |stamps| {
            prune(stamps, limit.window, Instant::now());
            stamps.len()
        })
    }
}

/// Drop timestamps at or beyond the window edge.
fn prune(stamps: &mut VecDeque<Instant>, window: Duration, now: Instant) {
    while let Some(oldest) = stamps.front() {
        if now.duration_since(*oldest) >= window {
            stamps.pop_front();
        } else {
            break;
        }
    }
}
