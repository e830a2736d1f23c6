//! Time-window send scheduling.
//!
//! `next_valid_send_time` is the only scheduling primitive: given an anchor
//! and a window it returns the earliest timestamp that respects the minimum
//! interval, the allowed weekdays and the time-of-day range. Pure and
//! deterministic; the campaign dispatcher threads its pacing cursor through
//! repeated calls.

use chrono::{DateTime, Datelike, Days, NaiveTime, TimeDelta, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Upper bound on day-by-day advancement. A week of disallowed days plus one
/// is enough for any satisfiable window; an empty day set exhausts the guard.
const MAX_DAY_HOPS: usize = 8;

/// Allowed weekday set and time-of-day range during which sends may occur.
/// The range is half-open: `start <= t < end`, UTC wall-clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub days: Vec<Weekday>,
}

impl SendWindow {
    pub fn allows_day(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// Smallest `t >= anchor + min_interval` whose weekday is allowed and whose
/// time-of-day lies in `[window.start, window.end)`. A candidate past the
/// window end or on a disallowed day moves to the next day's window start,
/// day by day. If the guard runs out (unsatisfiable window, e.g. an empty
/// day set) the current candidate is returned unchanged.
pub fn next_valid_send_time(
    anchor: DateTime<Utc>,
    min_interval: TimeDelta,
    window: &SendWindow,
) -> DateTime<Utc> {
    let mut candidate = anchor + min_interval;
    for _ in 0..=MAX_DAY_HOPS {
        if window.allows_day(candidate.weekday()) {
            if candidate.time() < window.start {
                candidate = candidate.date_naive().and_time(window.start).and_utc();
            }
            if window.contains(candidate.time()) {
                return candidate;
            }
        }
        candidate = (candidate.date_naive() + Days::new(1))
            .and_time(window.start)
            .and_utc();
    }
    candidate
}
