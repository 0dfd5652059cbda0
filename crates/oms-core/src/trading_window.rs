//! Trading window gate.
//!
//! Decides whether a wall-clock time of day falls inside the configured
//! admission window. Used for:
//! - Rejecting order instructions outside trading hours
//! - Startup validation of window configuration

use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Admission window expressed as wall-clock times of day.
///
/// Both ends are inclusive. Windows that cross midnight are not supported:
/// a window with `start > end` is never open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TradingWindow {
    #[must_use]
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Check if a given time of day is within the window.
    #[must_use]
    pub fn is_open_at(&self, now: NaiveTime) -> bool {
        self.start <= now && now <= self.end
    }

    /// Check the window against the given clock.
    #[must_use]
    pub fn is_open(&self, clock: &dyn WallClock) -> bool {
        self.is_open_at(clock.time_of_day())
    }

    /// Reject windows that can never be open.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(CoreError::InvalidConfig(format!(
                "trading window start {} is after end {} (windows crossing midnight are not supported)",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for TradingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Source of the current wall-clock time of day, enabling testability.
pub trait WallClock: Send + Sync {
    fn time_of_day(&self) -> NaiveTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl WallClock for LocalClock {
    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Clock pinned to a fixed time of day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl FixedClock {
    /// Clock pinned at `hour:min:00`.
    ///
    /// # Panics
    /// Panics if `hour` or `min` are out of range.
    #[must_use]
    pub fn at(hour: u32, min: u32) -> Self {
        Self(NaiveTime::from_hms_opt(hour, min, 0).expect("valid time of day"))
    }
}

impl WallClock for FixedClock {
    fn time_of_day(&self) -> NaiveTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, min: u32, sec: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, sec).unwrap()
    }

    fn window(start: u32, end: u32) -> TradingWindow {
        TradingWindow::new(t(start, 0, 0), t(end, 0, 0))
    }

    #[test]
    fn test_inside_window_is_open() {
        let w = window(10, 13);
        assert!(w.is_open_at(t(11, 0, 0)));
        assert!(w.is_open_at(t(12, 59, 59)));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let w = window(10, 13);
        assert!(w.is_open_at(t(10, 0, 0)));
        assert!(w.is_open_at(t(13, 0, 0)));
    }

    #[test]
    fn test_outside_window_is_closed() {
        let w = window(15, 16);
        assert!(!w.is_open_at(t(11, 0, 0)));
        assert!(!w.is_open_at(t(14, 59, 59)));
        assert!(!w.is_open_at(t(16, 0, 1)));
    }

    #[test]
    fn test_midnight_crossing_window_never_open() {
        let w = window(22, 2);
        assert!(!w.is_open_at(t(23, 0, 0)));
        assert!(!w.is_open_at(t(1, 0, 0)));
        assert!(!w.is_open_at(t(12, 0, 0)));
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_ordered_window() {
        assert!(window(10, 13).validate().is_ok());
        // Degenerate single-instant window is valid
        assert!(window(10, 10).validate().is_ok());
    }

    #[test]
    fn test_is_open_with_clock() {
        let w = window(10, 13);
        assert!(w.is_open(&FixedClock::at(11, 0)));
        assert!(!w.is_open(&FixedClock::at(9, 59)));
    }

    #[test]
    fn test_window_display() {
        assert_eq!(window(10, 13).to_string(), "10:00:00-13:00:00");
    }
}
