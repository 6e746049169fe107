//! Asymmetric repeating on/off schedule

use chrono::{DateTime, Duration, Utc};
use crate::application::errors::ConfigError;

/// A schedule that is "on" for `on` then "off" for `off`, forever, starting at `anchor`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSchedule {
    anchor: DateTime<Utc>,
    on: Duration,
    off: Duration,
}

/// Where `now` falls in a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub active: bool,
    /// Time until the current phase ends
    pub remaining: Duration,
    /// Instant the current phase ends and the next one starts
    pub next_boundary: DateTime<Utc>,
}

impl Phase {
    pub fn hours_left(&self) -> i64 {
        self.remaining.num_hours()
    }

    pub fn minutes_left(&self) -> i64 {
        self.remaining.num_minutes() % 60
    }
}

impl IntervalSchedule {
    pub fn new(anchor: DateTime<Utc>, on: Duration, off: Duration) -> Result<Self, ConfigError> {
        if on <= Duration::zero() || off <= Duration::zero() {
            return Err(ConfigError::InvalidValue(
                "schedule durations must be positive".to_string(),
            ));
        }
        Ok(Self { anchor, on, off })
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    /// Compute the phase at `now`.
    ///
    /// The schedule is periodic in both directions, so a `now` before the
    /// anchor is answered as if the cycle had been running since forever.
    /// Exactly on a boundary the new phase has already begun.
    pub fn phase(&self, now: DateTime<Utc>) -> Phase {
        let on = self.on.num_milliseconds();
        let cycle = on + self.off.num_milliseconds();
        let elapsed = (now - self.anchor).num_milliseconds();

        let cycle_index = elapsed.div_euclid(cycle);
        let offset = elapsed.rem_euclid(cycle);
        let active = offset < on;

        let phase_end = if active { on } else { cycle };
        let next_boundary = self.anchor + Duration::milliseconds(cycle_index * cycle + phase_end);

        Phase {
            active,
            remaining: next_boundary - now,
            next_boundary,
        }
    }
}
