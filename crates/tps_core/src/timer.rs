//! Cooperative timers
//!
//! Two flavours:
//! - [`TimerQueue`] holds actions keyed by absolute due time. The owner polls
//!   it each tick with the current time and receives every action that came
//!   due, each exactly once. Handles act as cancel tokens.
//! - [`Countdown`] is a tiny per-instance countdown driven by frame delta,
//!   meant to live inside pooled objects so that reacquiring the object
//!   resets it together with the rest of its state.

use crate::handle::{Handle, HandleAllocator};

/// Marker type for timer handles
pub struct Scheduled;

/// Cancel token for a scheduled action
pub type TimerHandle = Handle<Scheduled>;

struct Entry<A> {
    handle: TimerHandle,
    due: f64,
    seq: u64,
    action: A,
}

/// Pending actions ordered by due time
pub struct TimerQueue<A> {
    handles: HandleAllocator<Scheduled>,
    entries: Vec<Entry<A>>,
    next_seq: u64,
}

impl<A> TimerQueue<A> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            handles: HandleAllocator::new(),
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Schedule `action` to fire `delay` seconds after `now`.
    /// Negative delays are treated as zero.
    pub fn schedule(&mut self, now: f64, delay: f64, action: A) -> TimerHandle {
        let handle = self.handles.allocate();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            handle,
            due: now + delay.max(0.0),
            seq,
            action,
        });
        handle
    }

    /// Cancel a pending action. Stale handles (already fired or cancelled)
    /// return false and change nothing.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        if !self.handles.free(handle) {
            return false;
        }
        self.entries.retain(|entry| entry.handle != handle);
        true
    }

    /// Move a pending action to fire `delay` seconds after `now`. The action
    /// keeps its handle. Returns false for stale handles.
    pub fn restart(&mut self, handle: TimerHandle, now: f64, delay: f64) -> bool {
        let seq = self.next_seq;
        match self.entries.iter_mut().find(|entry| entry.handle == handle) {
            Some(entry) => {
                entry.due = now + delay.max(0.0);
                entry.seq = seq;
                self.next_seq += 1;
                true
            }
            None => false,
        }
    }

    /// Check whether a handle is still pending
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.handles.is_valid(handle)
    }

    /// Absolute due time of a pending action
    pub fn due(&self, handle: TimerHandle) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.handle == handle)
            .map(|entry| entry.due)
    }

    /// Seconds left before a pending action fires, never negative
    pub fn remaining(&self, handle: TimerHandle, now: f64) -> Option<f64> {
        self.due(handle).map(|due| (due - now).max(0.0))
    }

    /// Remove and return every action due at or before `now`, earliest first.
    /// Actions due at the same instant come out in scheduling order.
    pub fn poll(&mut self, now: f64) -> Vec<A> {
        if self.entries.iter().all(|entry| entry.due > now) {
            return Vec::new();
        }

        let (mut fired, pending): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|entry| entry.due <= now);
        self.entries = pending;

        fired.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        fired
            .into_iter()
            .map(|entry| {
                self.handles.free(entry.handle);
                entry.action
            })
            .collect()
    }

    /// Number of pending actions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.entries.clear();
        self.handles.clear();
    }
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame-driven countdown owned by a single instance
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Countdown {
    duration: f32,
    remaining: f32,
    running: bool,
}

impl Countdown {
    /// Create a stopped countdown
    pub const fn new() -> Self {
        Self {
            duration: 0.0,
            remaining: 0.0,
            running: false,
        }
    }

    /// Start (or restart) counting down from `duration` seconds
    pub fn start(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.remaining = self.duration;
        self.running = true;
    }

    /// Advance by `dt`. Returns true on the tick that completes the
    /// countdown, and never again until restarted.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        self.remaining -= dt.max(0.0);
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.running = false;
            return true;
        }
        false
    }

    /// Stop without completing
    pub fn cancel(&mut self) {
        self.remaining = 0.0;
        self.running = false;
    }

    /// Whether the countdown is in progress
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds left
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Elapsed fraction in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
    }
}
