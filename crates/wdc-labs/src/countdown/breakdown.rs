use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Days/hours/minutes/seconds left until a deadline, pinned at zero once it passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CountdownBreakdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl CountdownBreakdown {
    pub const ZERO: CountdownBreakdown = CountdownBreakdown {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Always derived from the absolute deadline, never from a previous value.
    pub fn until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = (deadline - now).num_seconds();
        Self::from_seconds(u64::try_from(remaining).unwrap_or(0))
    }

    pub fn from_seconds(total: u64) -> Self {
        Self {
            days: total / SECONDS_PER_DAY,
            hours: (total / SECONDS_PER_HOUR) % 24,
            minutes: (total / SECONDS_PER_MINUTE) % 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.days * SECONDS_PER_DAY
            + self.hours * SECONDS_PER_HOUR
            + self.minutes * SECONDS_PER_MINUTE
            + self.seconds
    }

    pub fn is_expired(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for CountdownBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn one_of_each_unit() {
        let breakdown = CountdownBreakdown::until(now() + Duration::seconds(90_061), now());
        assert_eq!(
            breakdown,
            CountdownBreakdown {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1,
            }
        );
        assert_eq!(breakdown.total_seconds(), 90_061);
        assert_eq!(breakdown.to_string(), "01:01:01:01");
    }

    #[test]
    fn past_deadlines_are_pinned_at_zero() {
        let breakdown = CountdownBreakdown::until(now() - Duration::days(3), now());
        assert_eq!(breakdown, CountdownBreakdown::ZERO);
        assert!(breakdown.is_expired());
        assert!(CountdownBreakdown::until(now(), now()).is_expired());
    }

    #[test]
    fn partial_seconds_round_down() {
        let breakdown =
            CountdownBreakdown::until(now() + Duration::milliseconds(59_999), now());
        assert_eq!(breakdown.seconds, 59);
        assert_eq!(breakdown.minutes, 0);

        let almost = CountdownBreakdown::until(now() + Duration::milliseconds(999), now());
        assert!(almost.is_expired());
    }

    #[test]
    fn large_spans_keep_counting_days() {
        let breakdown = CountdownBreakdown::from_seconds(400 * 86_400 + 23 * 3_600 + 59 * 60 + 59);
        assert_eq!(breakdown.days, 400);
        assert_eq!(breakdown.hours, 23);
        assert_eq!(breakdown.minutes, 59);
        assert_eq!(breakdown.seconds, 59);
    }
}
