//! History retention ("rhythm").
//!
//! Downsamples the point history with decreasing resolution as points age:
//! - hourly, daily, weekly and monthly windows are applied in that order
//! - inside a window every bucket keeps only its newest point
//! - points outside a window are passed to the next, coarser window
//! - whatever is older than the monthly window is discarded
//!
//! The engine is a pure function of (history, limits, now). Running it again
//! with a later `now` can drop more points as they age into coarser buckets.

pub mod resolution;

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::point::Point;
pub use resolution::Resolution;

/// How the upper edge of each resolution window is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Every window ends at the last full unit before `now`.
    #[default]
    Now,
    /// Weekly and monthly windows end where the previous window starts.
    Cascade,
}

/// Number of buckets retained per resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionLimits {
    pub hourly: u32,
    pub daily: u32,
    pub weekly: u32,
    pub monthly: u32,
    pub anchor: Anchor,
}

impl Default for RetentionLimits {
    fn default() -> Self {
        RetentionLimits {
            hourly: 24,
            daily: 7,
            weekly: 4,
            monthly: 12,
            anchor: Anchor::Now,
        }
    }
}

impl RetentionLimits {
    pub fn buckets(&self, resolution: Resolution) -> u32 {
        match resolution {
            Resolution::Hourly => self.hourly,
            Resolution::Daily => self.daily,
            Resolution::Weekly => self.weekly,
            Resolution::Monthly => self.monthly,
        }
    }
}

/// Time range covered by one resolution: `lower < t <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub resolution: Resolution,
    pub buckets: u32,
    pub upper: NaiveDateTime,
    pub lower: NaiveDateTime,
}

impl Window {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.lower < at && at <= self.upper
    }

    /// Bucket of `at`, 0 being the most recent full unit. `None` means the
    /// point is not filtered by this window.
    pub fn bucket(&self, at: NaiveDateTime) -> Option<u32> {
        if !self.contains(at) {
            return None;
        }

        let index = self.resolution.units_between(self.upper, at);
        u32::try_from(index).ok().filter(|index| *index < self.buckets)
    }
}

/// The four windows for `now`, finest first.
pub fn windows<Tz: TimeZone>(limits: &RetentionLimits, now: &DateTime<Tz>) -> Vec<Window> {
    let now = now.naive_local();
    let mut windows = Vec::with_capacity(Resolution::ALL.len());
    let mut previous_start: Option<NaiveDateTime> = None;

    for resolution in Resolution::ALL {
        let buckets = limits.buckets(resolution);
        let end = match (limits.anchor, resolution, previous_start) {
            (Anchor::Cascade, Resolution::Weekly | Resolution::Monthly, Some(start)) => start,
            _ => resolution.floor(now),
        };
        let start = resolution.step_back(end, buckets);
        previous_start = Some(start);

        windows.push(Window {
            resolution,
            buckets,
            upper: just_before(end),
            lower: just_before(start),
        });
    }

    windows
}

/// Trim an ascending history. The result is ascending as well and is a
/// subsequence of the input.
pub fn retain<Tz: TimeZone>(
    history: Vec<Point>,
    limits: &RetentionLimits,
    now: &DateTime<Tz>,
) -> Vec<Point> {
    let windows = windows(limits, now);
    let zone = now.timezone();

    // newest first, so the first point seen in a bucket is the one kept
    let mut points: Vec<(NaiveDateTime, Point)> = history
        .into_iter()
        .rev()
        .map(|point| (local_time(point.timestamp, &zone), point))
        .collect();

    for window in &windows {
        points = apply_window(points, window);
    }

    if let Some(horizon) = windows.last().map(|w| w.lower) {
        points.retain(|(at, _)| *at > horizon);
    }

    points.into_iter().rev().map(|(_, point)| point).collect()
}

/// Insert `point` after every point that is not newer than it.
pub fn append(history: &mut Vec<Point>, point: Point) {
    let index = history.partition_point(|p| p.timestamp <= point.timestamp);
    history.insert(index, point);
}

fn apply_window(points: Vec<(NaiveDateTime, Point)>, window: &Window) -> Vec<(NaiveDateTime, Point)> {
    if window.buckets == 0 {
        return points;
    }

    let mut filled: HashSet<u32> = HashSet::new();
    points
        .into_iter()
        .filter(|(at, _)| match window.bucket(*at) {
            Some(bucket) => filled.insert(bucket),
            None => true,
        })
        .collect()
}

/// Wall-clock time of an epoch-ms timestamp in `zone`. Out of range values
/// sort before everything else.
pub(crate) fn local_time<Tz: TimeZone>(timestamp: i64, zone: &Tz) -> NaiveDateTime {
    DateTime::<Utc>::from_timestamp_millis(timestamp)
        .map(|utc| utc.with_timezone(zone).naive_local())
        .unwrap_or(NaiveDateTime::MIN)
}

fn just_before(at: NaiveDateTime) -> NaiveDateTime {
    at.checked_sub_signed(Duration::milliseconds(1))
        .unwrap_or(NaiveDateTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Statistics;

    // Monday
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 14, 35, 0).unwrap()
    }

    fn point_at(at: DateTime<Utc>) -> Point {
        Point::new(&at, Vec::new(), Statistics::default())
    }

    fn limits(hourly: u32, daily: u32, weekly: u32, monthly: u32) -> RetentionLimits {
        RetentionLimits {
            hourly,
            daily,
            weekly,
            monthly,
            anchor: Anchor::Now,
        }
    }

    fn timestamps(points: &[Point]) -> Vec<i64> {
        points.iter().map(|p| p.timestamp).collect()
    }

    fn naive(y: i32, mo: u32, d: u32, h: u32) -> NaiveDateTime {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap().naive_utc()
    }

    #[test]
    fn single_new_point_is_kept() {
        let p = point_at(now());
        let result = retain(vec![p.clone()], &RetentionLimits::default(), &now());
        assert_eq!(result, vec![p]);
    }

    #[test]
    fn empty_history_stays_empty() {
        assert!(retain(Vec::new(), &RetentionLimits::default(), &now()).is_empty());
    }

    #[test]
    fn windows_end_at_previous_full_unit() {
        let windows = windows(&limits(2, 1, 1, 2), &now());
        let ms = Duration::milliseconds(1);

        assert_eq!(windows[0].resolution, Resolution::Hourly);
        assert_eq!(windows[0].upper, naive(2026, 10, 19, 14) - ms);
        assert_eq!(windows[0].lower, naive(2026, 10, 19, 12) - ms);
        assert_eq!(windows[1].upper, naive(2026, 10, 19, 0) - ms);
        assert_eq!(windows[1].lower, naive(2026, 10, 18, 0) - ms);
        assert_eq!(windows[2].upper, naive(2026, 10, 19, 0) - ms);
        assert_eq!(windows[2].lower, naive(2026, 10, 12, 0) - ms);
        assert_eq!(windows[3].upper, naive(2026, 10, 1, 0) - ms);
        assert_eq!(windows[3].lower, naive(2026, 8, 1, 0) - ms);
    }

    #[test]
    fn cascade_windows_tile_behind_each_other() {
        let limits = RetentionLimits {
            anchor: Anchor::Cascade,
            ..RetentionLimits::default()
        };
        let windows = windows(&limits, &now());
        let ms = Duration::milliseconds(1);

        // daily: Oct 12 .. Oct 19, weekly picks up at Oct 12
        assert_eq!(windows[1].lower, naive(2026, 10, 12, 0) - ms);
        assert_eq!(windows[2].upper, windows[1].lower);
        assert_eq!(windows[2].lower, naive(2026, 9, 14, 0) - ms);
        assert_eq!(windows[3].upper, windows[2].lower);
        assert_eq!(windows[3].lower, naive(2025, 9, 14, 0) - ms);
    }

    #[test]
    fn newest_point_in_a_bucket_wins() {
        let older = point_at(now() - Duration::minutes(85)); // 13:10
        let newer = point_at(now() - Duration::minutes(55)); // 13:40
        let current = point_at(now());

        let result = retain(
            vec![older, newer.clone(), current.clone()],
            &limits(2, 0, 0, 1),
            &now(),
        );
        assert_eq!(result, vec![newer, current]);
    }

    #[test]
    fn distinct_buckets_are_all_kept() {
        let a = point_at(now() - Duration::minutes(145)); // 12:10
        let b = point_at(now() - Duration::minutes(85)); // 13:10
        let current = point_at(now());
        let history = vec![a, b, current];

        let result = retain(history.clone(), &limits(2, 0, 0, 1), &now());
        assert_eq!(result, history);
    }

    #[test]
    fn zero_limit_passes_everything_through() {
        let history = vec![
            point_at(now() - Duration::minutes(85)),
            point_at(now() - Duration::minutes(80)),
            point_at(now()),
        ];

        let result = retain(history.clone(), &limits(0, 0, 0, 1), &now());
        assert_eq!(result, history);
    }

    #[test]
    fn points_beyond_monthly_horizon_are_dropped() {
        let ancient = point_at(now() - Duration::days(100));
        let recent = point_at(now() - Duration::days(40));
        let current = point_at(now());

        let result = retain(
            vec![ancient, recent.clone(), current.clone()],
            &limits(2, 1, 1, 2),
            &now(),
        );
        assert_eq!(result, vec![recent, current]);
    }

    #[test]
    fn zero_monthly_limit_keeps_only_the_current_month() {
        let last_month = point_at(Utc.with_ymd_and_hms(2026, 9, 30, 23, 0, 0).unwrap());
        let this_month = point_at(Utc.with_ymd_and_hms(2026, 10, 1, 1, 0, 0).unwrap());
        let current = point_at(now());

        let result = retain(
            vec![last_month, this_month.clone(), current.clone()],
            &limits(0, 0, 0, 0),
            &now(),
        );
        assert_eq!(result, vec![this_month, current]);
    }

    #[test]
    fn mixed_history_scenario() {
        let old = point_at(now() - Duration::days(40)); // Sep 9, monthly bucket 0
        let yesterday = point_at(now() - Duration::hours(20)); // Oct 18 18:35
        let first = point_at(now() - Duration::minutes(85)); // 13:10
        let second = point_at(now() - Duration::minutes(55)); // 13:40
        let current = point_at(now());

        let result = retain(
            vec![
                old.clone(),
                yesterday.clone(),
                first,
                second.clone(),
                current.clone(),
            ],
            &limits(2, 1, 1, 2),
            &now(),
        );
        assert_eq!(
            timestamps(&result),
            timestamps(&[old, yesterday, second, current])
        );
    }

    #[test]
    fn weekly_bucket_keeps_newest_of_the_week() {
        // week of Oct 12, both outside the single daily bucket (Oct 18)
        let tuesday = point_at(Utc.with_ymd_and_hms(2026, 10, 13, 9, 0, 0).unwrap());
        let thursday = point_at(Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap());
        let current = point_at(now());

        let result = retain(
            vec![tuesday, thursday.clone(), current.clone()],
            &limits(2, 1, 1, 2),
            &now(),
        );
        assert_eq!(result, vec![thursday, current]);
    }

    #[test]
    fn advancing_now_can_drop_more_points() {
        let a = point_at(now() - Duration::minutes(145)); // 12:10
        let b = point_at(now() - Duration::minutes(85)); // 13:10
        let current = point_at(now());
        let limits = limits(2, 1, 0, 1);

        let first = retain(vec![a, b, current.clone()], &limits, &now());
        assert_eq!(first.len(), 3);

        // a day later all three share yesterday's daily bucket
        let later = now() + Duration::days(1);
        let second = retain(first, &limits, &later);
        assert_eq!(timestamps(&second), timestamps(&[current]));
    }

    #[test]
    fn points_kept_by_a_finer_window_are_thinned_by_the_next() {
        let history: Vec<Point> = (0..31)
            .rev()
            .map(|hours| point_at(now() - Duration::hours(hours)))
            .collect();

        let result = retain(history, &RetentionLimits::default(), &now());

        // today's 15 points, plus one daily point for all of yesterday
        assert_eq!(result.len(), 16);
        let yesterday = point_at(now() - Duration::hours(15)); // 23:35
        assert_eq!(result[0].timestamp, yesterday.timestamp);
        assert_eq!(result[15].timestamp, point_at(now()).timestamp);
    }

    #[test]
    fn out_of_range_bucket_passes_through() {
        let window = Window {
            resolution: Resolution::Hourly,
            buckets: 1,
            upper: naive(2026, 10, 19, 14),
            lower: naive(2026, 10, 19, 10),
        };

        assert_eq!(window.bucket(naive(2026, 10, 19, 13) + Duration::minutes(30)), Some(0));
        assert_eq!(window.bucket(naive(2026, 10, 19, 11)), None);
        assert_eq!(window.bucket(naive(2026, 10, 19, 15)), None);
    }

    #[test]
    fn append_keeps_history_sorted() {
        let a = point_at(now() - Duration::hours(3));
        let b = point_at(now() - Duration::hours(1));
        let late = point_at(now() - Duration::hours(2));
        let mut history = vec![a.clone(), b.clone()];

        append(&mut history, late.clone());
        assert_eq!(history, vec![a, late, b]);
    }

    #[test]
    fn limits_deserialize_with_defaults() {
        let limits: RetentionLimits = toml::from_str("hourly = 2\nanchor = \"cascade\"").unwrap();
        assert_eq!(limits.hourly, 2);
        assert_eq!(limits.daily, 7);
        assert_eq!(limits.anchor, Anchor::Cascade);
    }
}
