//! Deadline waits over the editor's idle loop.
//!
//! The editor only advances when the harness ticks it. Every wait here
//! alternates between evaluating a predicate and yielding one tick, which
//! drives background work and delivers queued notifications before the next
//! evaluation.

use std::ops::{Deref, DerefMut};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{trace, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::session::Session;

/// A wall-clock budget started at construction.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    start: Instant,
    timeout: Duration,
}

impl Deadline {
    /// Starts a deadline `timeout` from now.
    #[must_use]
    pub fn start(timeout: Duration) -> Self {
        Self {
            start: Instant::now(),
            timeout,
        }
    }

    /// Time since the deadline started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// True once the elapsed time exceeds the timeout.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.elapsed() > self.timeout
    }

    /// Time left, zero once expired.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }
}

/// Marks the session as waiting until dropped, unwinding included.
struct WaitGuard<'a> {
    session: &'a mut Session,
}

impl<'a> WaitGuard<'a> {
    fn enter(session: &'a mut Session) -> Self {
        session.waiting = true;
        Self { session }
    }
}

impl Deref for WaitGuard<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for WaitGuard<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.session.waiting = false;
    }
}

impl Session {
    /// Yields one editor tick and delivers the notifications it produced.
    ///
    /// # Errors
    ///
    /// Returns `EngineLost` once the editor is gone.
    pub fn tick(&mut self) -> HarnessResult<()> {
        self.bus.tick()?;
        self.dispatch_notifications();
        Ok(())
    }

    /// Polls `predicate` until it holds or `timeout` elapses, ticking the
    /// editor between polls. Returns whether the predicate held.
    ///
    /// The predicate is evaluated at least once. It must only read editor
    /// state; calling `wait_for` from inside it fails with `NestedWait`.
    ///
    /// # Errors
    ///
    /// Returns the predicate's error, `NestedWait`, or a tick failure. The
    /// wait is abandoned at that point.
    pub fn wait_for(
        &mut self,
        timeout: Duration,
        mut predicate: impl FnMut(&mut Session) -> HarnessResult<bool>,
    ) -> HarnessResult<bool> {
        if self.waiting {
            return Err(HarnessError::NestedWait);
        }
        WaitGuard::enter(self).poll(timeout, &mut predicate)
    }

    /// [`Session::wait_for`] with the configured default timeout.
    ///
    /// # Errors
    ///
    /// As [`Session::wait_for`].
    pub fn wait_for_default(
        &mut self,
        predicate: impl FnMut(&mut Session) -> HarnessResult<bool>,
    ) -> HarnessResult<bool> {
        self.wait_for(self.config.default_timeout, predicate)
    }

    fn poll(
        &mut self,
        timeout: Duration,
        predicate: &mut dyn FnMut(&mut Session) -> HarnessResult<bool>,
    ) -> HarnessResult<bool> {
        let deadline = Deadline::start(timeout);
        let mut polls = 0_u64;
        loop {
            polls += 1;
            if predicate(self)? {
                trace!(polls, elapsed = ?deadline.elapsed(), "wait_satisfied");
                return Ok(true);
            }
            if deadline.expired() {
                warn!(polls, ?timeout, "wait_timed_out");
                return Ok(false);
            }
            self.tick()?;
            if !self.config.poll_interval.is_zero() {
                thread::sleep(self.config.poll_interval.min(deadline.remaining()));
            }
        }
    }

    /// Ticks for roughly `duration` of wall-clock time, at least once.
    ///
    /// # Errors
    ///
    /// Returns a tick failure.
    pub fn idle(&mut self, duration: Duration) -> HarnessResult<()> {
        let deadline = Deadline::start(duration);
        loop {
            self.tick()?;
            if deadline.expired() {
                return Ok(());
            }
            thread::sleep(self.config.idle_tick.min(deadline.remaining()));
        }
    }

    /// Ticks exactly `frames` times.
    ///
    /// # Errors
    ///
    /// Returns a tick failure.
    pub fn idle_frames(&mut self, frames: u32) -> HarnessResult<()> {
        for _ in 0..frames {
            self.tick()?;
        }
        Ok(())
    }
}
