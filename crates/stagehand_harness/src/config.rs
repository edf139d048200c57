//! Harness timing configuration.

use std::time::Duration;

/// How long the harness waits for the editor, and how it paces ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Timeout for `wait_for` calls that do not name one.
    pub default_timeout: Duration,
    /// Timeout for propagation to settle after a prefab edit.
    pub propagation_timeout: Duration,
    /// Timeout for a level to become active after create/open/reload.
    pub level_timeout: Duration,
    /// Pause between predicate polls; zero polls back to back.
    pub poll_interval: Duration,
    /// Wall-clock length of one tick during `idle`.
    pub idle_tick: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(5),
            propagation_timeout: Duration::from_secs(10),
            level_timeout: Duration::from_secs(30),
            poll_interval: Duration::ZERO,
            idle_tick: Duration::from_millis(16),
        }
    }
}

impl HarnessConfig {
    /// Short timeouts for in-process runs and tests.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            default_timeout: Duration::from_secs(1),
            propagation_timeout: Duration::from_secs(2),
            level_timeout: Duration::from_secs(2),
            poll_interval: Duration::ZERO,
            idle_tick: Duration::from_millis(1),
        }
    }

    /// Long timeouts for slow editors.
    #[must_use]
    pub fn patient() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            propagation_timeout: Duration::from_secs(60),
            level_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(1),
            idle_tick: Duration::from_millis(16),
        }
    }

    /// Sets the default wait timeout.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets the propagation timeout.
    #[must_use]
    pub fn with_propagation_timeout(mut self, timeout: Duration) -> Self {
        self.propagation_timeout = timeout;
        self
    }

    /// Sets the level timeout.
    #[must_use]
    pub fn with_level_timeout(mut self, timeout: Duration) -> Self {
        self.level_timeout = timeout;
        self
    }

    /// Sets the pause between polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the idle tick length.
    #[must_use]
    pub fn with_idle_tick(mut self, tick: Duration) -> Self {
        self.idle_tick = tick;
        self
    }
}
