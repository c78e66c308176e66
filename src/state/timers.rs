//! Round timers.

use std::{collections::HashMap, future::Future, time::Duration};

use tokio::task::JoinHandle;
use tracing::debug;

/// Delayed callbacks a room arms while a round is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Fires when the playing time is over; opens the grace window.
    RoundDuration,
    /// Fires when late results are no longer accepted; ends the round.
    ResultGrace,
}

/// Pending timers, at most one per kind. Re-arming a kind replaces the pending one.
#[derive(Debug, Default)]
pub struct RoundTimers {
    pending: HashMap<TimerKind, JoinHandle<()>>,
}

impl RoundTimers {
    /// Run `on_fire` after `delay` unless the timer is cancelled first.
    pub fn schedule<F>(&mut self, kind: TimerKind, delay: Duration, on_fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire.await;
        });
        if let Some(previous) = self.pending.insert(kind, handle) {
            previous.abort();
        }
        debug!(timer = ?kind, delay_ms = delay.as_millis() as u64, "timer armed");
    }

    /// Abort the pending timer of `kind`, if any.
    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(handle) = self.pending.remove(&kind) {
            handle.abort();
        }
    }

    /// Abort every pending timer.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }

    #[cfg(test)]
    pub(crate) fn is_armed(&self, kind: TimerKind) -> bool {
        self.pending
            .get(&kind)
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RoundTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
