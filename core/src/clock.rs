//! Virtual game clock for drivers. Owns `now`, speed control and pause.
//!
//! The core never reads this clock. Drivers (the runner, tests) advance
//! it and pass `now` into every operation.

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameClock {
    pub now:     Timestamp,
    pub tick_ms: u64,
    pub speed:   ClockSpeed,
    pub paused:  bool,
}

impl GameClock {
    pub fn new(start: Timestamp, tick_ms: u64) -> Self {
        Self {
            now: start,
            tick_ms,
            speed: ClockSpeed::Normal,
            paused: true,
        }
    }

    /// Advance one tick. Returns the new `now`.
    /// Panics if called while paused; callers must check.
    pub fn advance(&mut self) -> Timestamp {
        assert!(!self.paused, "advance() called on paused clock");
        self.now = self.now.saturating_add(self.tick_ms * self.speed.multiplier());
        self.now
    }

    /// Jump forward by an explicit amount, regardless of speed.
    pub fn skip(&mut self, ms: u64) -> Timestamp {
        self.now = self.now.saturating_add(ms);
        self.now
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn set_speed(&mut self, speed: ClockSpeed) {
        self.speed = speed;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClockSpeed {
    Normal,      // 1× tick_ms per advance
    Fast,        // 5×
    FastForward, // 30×
}

impl ClockSpeed {
    pub fn multiplier(&self) -> u64 {
        match self {
            Self::Normal      => 1,
            Self::Fast        => 5,
            Self::FastForward => 30,
        }
    }
}
