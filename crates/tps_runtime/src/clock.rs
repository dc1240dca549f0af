//! Match clock
//!
//! Counts match time and reports whole-second and whole-minute boundaries.
//! The session publishes what [`GameClock::tick`] reports; the clock itself
//! never touches the bus.

use crate::events::{MinutePassed, TimeElapsed};

/// Boundaries crossed by one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClockTick {
    /// Latest whole second reached, if a new one was reached
    pub second: Option<TimeElapsed>,
    /// Every minute boundary crossed, in order
    pub minutes: Vec<MinutePassed>,
    /// The time limit was reached on this tick
    pub time_up: bool,
}

/// Elapsed match time with a time limit
#[derive(Debug, Clone, PartialEq)]
pub struct GameClock {
    elapsed: f64,
    whole_seconds: u64,
    minute: u32,
    limit: f64,
    difficulty_percent: f32,
    finished: bool,
}

impl GameClock {
    /// `match_minutes` of play; enemies grow `difficulty_percent` stronger
    /// every minute
    pub fn new(match_minutes: f32, difficulty_percent: f32) -> Self {
        Self {
            elapsed: 0.0,
            whole_seconds: 0,
            minute: 0,
            limit: f64::from(match_minutes.max(0.0)) * 60.0,
            difficulty_percent,
            finished: false,
        }
    }

    /// Advance by `dt` seconds. A finished clock stays put.
    pub fn tick(&mut self, dt: f32) -> ClockTick {
        let mut out = ClockTick::default();
        if self.finished {
            return out;
        }

        self.elapsed += f64::from(dt.max(0.0));
        if self.limit > 0.0 && self.elapsed >= self.limit {
            self.elapsed = self.limit;
            self.finished = true;
            out.time_up = true;
        }

        let seconds = self.elapsed.floor() as u64;
        if seconds > self.whole_seconds {
            self.whole_seconds = seconds;
            out.second = Some(TimeElapsed {
                minutes: (seconds / 60) as u32,
                seconds: (seconds % 60) as u32,
            });
        }

        let minutes = (seconds / 60) as u32;
        while self.minute < minutes {
            self.minute += 1;
            out.minutes.push(MinutePassed {
                minute: self.minute,
                percent: self.difficulty_percent,
            });
        }
        out
    }

    /// Seconds since the match started
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Whole minutes passed
    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Whether the time limit was reached
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stop counting (player died)
    pub fn stop(&mut self) {
        self.finished = true;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.whole_seconds = 0;
        self.minute = 0;
        self.finished = false;
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(20.0, 10.0)
    }
}
