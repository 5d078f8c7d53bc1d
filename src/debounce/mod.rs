//! Trailing-edge debouncing driven by an injected clock.
//!
//! A [`Debouncer`] owns at most one pending timer. Every call cancels the
//! armed timer before arming a new one, and the caller's event loop drives
//! delivery through [`Debouncer::poll`]. A superseded payload is dropped and
//! can never be delivered.

use std::time::{Duration, Instant};

use crate::config::FilterConfig;
use crate::filter::{filter_table, Table, VisibilityReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Armed {
    pub id: TimerId,
    pub deadline: Instant,
    /// The timer this call superseded, if one was pending.
    pub cancelled: Option<TimerId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub deadline: Instant,
    pub payload: T,
}

#[derive(Debug)]
struct Pending<T> {
    id: TimerId,
    deadline: Instant,
    payload: T,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    next_id: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_id: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Cancels any pending timer and arms a new one due `delay` after `now`.
    pub fn call(&mut self, payload: T, now: Instant) -> Armed {
        let cancelled = self.cancel();
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = now.checked_add(self.delay).unwrap_or(now);
        self.pending = Some(Pending {
            id,
            deadline,
            payload,
        });
        Armed {
            id,
            deadline,
            cancelled,
        }
    }

    pub fn cancel(&mut self) -> Option<TimerId> {
        let pending = self.pending.take()?;
        tracing::trace!(timer = pending.id.0, "debounce timer cancelled");
        Some(pending.id)
    }

    /// Delivers the pending payload once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Fired<T>> {
        let ready = self
            .pending
            .as_ref()
            .map(|p| now >= p.deadline)
            .unwrap_or(false);
        if !ready {
            return None;
        }
        self.take()
    }

    /// Delivers the pending payload immediately, ignoring the deadline.
    pub fn flush(&mut self) -> Option<Fired<T>> {
        self.take()
    }

    fn take(&mut self) -> Option<Fired<T>> {
        let pending = self.pending.take()?;
        Some(Fired {
            id: pending.id,
            deadline: pending.deadline,
            payload: pending.payload,
        })
    }
}

/// Table filter that only runs once typing pauses.
#[derive(Debug)]
pub struct DebouncedFilter {
    debouncer: Debouncer<String>,
}

pub fn make_debounced_filter(delay_ms: u64) -> DebouncedFilter {
    DebouncedFilter::new(Duration::from_millis(delay_ms))
}

impl DebouncedFilter {
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.debounce)
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Records a keystroke. Any evaluation still waiting is superseded.
    pub fn on_input(&mut self, query: impl Into<String>, now: Instant) -> Armed {
        self.debouncer.call(query.into(), now)
    }

    /// Runs the latest query against `table` once the delay has elapsed.
    ///
    /// A missing table still consumes the pending query.
    pub fn poll(&mut self, now: Instant, table: Option<&mut Table>) -> Option<VisibilityReport> {
        let fired = self.debouncer.poll(now)?;
        filter_table(Some(&fired.payload), table)
    }

    pub fn flush(&mut self, table: Option<&mut Table>) -> Option<VisibilityReport> {
        let fired = self.debouncer.flush()?;
        filter_table(Some(&fired.payload), table)
    }

    pub fn cancel(&mut self) -> Option<TimerId> {
        self.debouncer.cancel()
    }
}
