use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a shared cursor and the guard around it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Upper bound on waiting in `try_acquire`, in milliseconds.
    ///
    /// `None` makes `try_acquire` a non-blocking attempt. Every other entry
    /// point waits for the lock as long as it takes.
    pub lock_timeout_ms: Option<u64>,
    /// Buffer size of the in-process event bus.
    pub event_capacity: usize,
    /// Caller-side retry settings used by `poll`.
    pub poll: PollConfig,
}

impl CursorConfig {
    /// Bound `try_acquire` to `ms` milliseconds.
    pub fn with_lock_timeout(mut self, ms: u64) -> Self {
        self.lock_timeout_ms = Some(ms);
        self
    }

    /// Set the event bus capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Replace the polling settings.
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Lock timeout as a [`Duration`], if one is set.
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: None,
            event_capacity: 1024,
            poll: PollConfig::default(),
        }
    }
}

/// Bounded retry settings for callers waiting on a ready worker.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Maximum number of guarded steps before giving up.
    pub max_attempts: u32,
    /// Pause between unsuccessful steps, in milliseconds (0 = none).
    pub backoff_ms: u64,
}

impl PollConfig {
    /// Set the maximum number of attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the backoff between attempts.
    pub fn with_backoff(mut self, ms: u64) -> Self {
        self.backoff_ms = ms;
        self
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: CursorConfig =
            serde_json::from_str(r#"{ "lock_timeout_ms": 250, "poll": { "backoff_ms": 5 } }"#)
                .unwrap();
        assert_eq!(config.lock_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.event_capacity, 1024);
        assert_eq!(config.poll.max_attempts, 10);
        assert_eq!(config.poll.backoff_ms, 5);
    }

    #[test]
    fn test_default_has_no_lock_timeout() {
        let config = CursorConfig::default();
        assert_eq!(config.lock_timeout(), None);
        let parsed: CursorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.lock_timeout_ms, None);
    }

    #[test]
    fn test_builders_override_fields() {
        let config = CursorConfig::default()
            .with_lock_timeout(10)
            .with_event_capacity(8)
            .with_poll(PollConfig::default().with_max_attempts(3).with_backoff(1));
        assert_eq!(config.lock_timeout_ms, Some(10));
        assert_eq!(config.event_capacity, 8);
        assert_eq!(config.poll.max_attempts, 3);
        assert_eq!(config.poll.backoff_ms, 1);
    }
}
