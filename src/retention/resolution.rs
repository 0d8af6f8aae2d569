//! Bucket widths for the four resolution instances.
//!
//! All arithmetic happens on wall-clock time (`NaiveDateTime`) in the zone of
//! the run's `now`, so calendar days and months line up with what a user sees.

use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Resolution {
    /// Cascade order, finest first.
    pub const ALL: [Resolution; 4] = [
        Resolution::Hourly,
        Resolution::Daily,
        Resolution::Weekly,
        Resolution::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Hourly => "hourly",
            Resolution::Daily => "daily",
            Resolution::Weekly => "weekly",
            Resolution::Monthly => "monthly",
        }
    }

    fn unit_ms(&self) -> Option<i64> {
        match self {
            Resolution::Hourly => Some(3_600_000),
            Resolution::Daily => Some(86_400_000),
            Resolution::Weekly => Some(7 * 86_400_000),
            Resolution::Monthly => None,
        }
    }

    /// Start of the unit containing `at`. Weeks start on Monday.
    pub fn floor(&self, at: NaiveDateTime) -> NaiveDateTime {
        let sub_second = Duration::nanoseconds(i64::from(at.nanosecond()));
        let since_midnight = Duration::seconds(i64::from(at.num_seconds_from_midnight()));
        let midnight = at - since_midnight - sub_second;

        match self {
            Resolution::Hourly => {
                let since_hour = Duration::seconds(i64::from(at.minute() * 60 + at.second()));
                at - since_hour - sub_second
            }
            Resolution::Daily => midnight,
            Resolution::Weekly => {
                midnight - Duration::days(i64::from(at.weekday().num_days_from_monday()))
            }
            Resolution::Monthly => midnight - Duration::days(i64::from(at.day0())),
        }
    }

    /// `at` moved back by `count` units, saturating at the earliest
    /// representable time.
    pub fn step_back(&self, at: NaiveDateTime, count: u32) -> NaiveDateTime {
        let count_i64 = i64::from(count);
        let shifted = match self {
            Resolution::Hourly => at.checked_sub_signed(Duration::hours(count_i64)),
            Resolution::Daily => at.checked_sub_signed(Duration::days(count_i64)),
            Resolution::Weekly => at.checked_sub_signed(Duration::weeks(count_i64)),
            Resolution::Monthly => at.checked_sub_months(Months::new(count)),
        };
        shifted.unwrap_or(NaiveDateTime::MIN)
    }

    /// Whole units elapsed from `earlier` to `later`. Months are calendar
    /// months; month arithmetic clamps, so Jan 31 to Feb 28 is one month.
    pub fn units_between(&self, later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
        if let Some(unit) = self.unit_ms() {
            return later.signed_duration_since(earlier).num_milliseconds() / unit;
        }

        let months = i64::from(later.year() - earlier.year()) * 12
            + i64::from(later.month0())
            - i64::from(earlier.month0());
        if months <= 0 {
            return months;
        }

        let overshoots = u32::try_from(months)
            .ok()
            .and_then(|m| earlier.checked_add_months(Months::new(m)))
            .map_or(false, |shifted| shifted > later);

        if overshoots {
            months - 1
        } else {
            months
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
