//! Time window segmentation for batch scans
//!
//! Splits a range into contiguous windows aligned to the start day's midnight.
//! Historical backfills use 12h windows, routine catch-up scans use 24h.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Window size for deep historical backfill
pub const HISTORY_STEP: Duration = Duration::hours(12);

/// Window size for routine catch-up scans
pub const CATCH_UP_STEP: Duration = Duration::hours(24);

/// Inclusive unix-second window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start_time: i64,
    pub end_time: i64,
}

/// Windows of `step` covering the days of `start` through `end`, in the
/// timezone the instants carry.
///
/// The first window starts at midnight of `start`'s day, each window ends one
/// second before the next begins, and windows are produced while their start is
/// before 23:59:59 of `end`'s day.
pub fn segments<Tz: TimeZone>(
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    step: Duration,
) -> Vec<Segment> {
    let step = step.num_seconds();
    if step <= 0 {
        return Vec::new();
    }

    let (first, _) = day_bounds(start);
    let (_, last) = day_bounds(end);

    (0..)
        .map(|i| first + i * step)
        .take_while(|start_time| *start_time < last)
        .map(|start_time| Segment {
            start_time,
            end_time: start_time + step - 1,
        })
        .collect()
}

/// First and last second (00:00:00, 23:59:59) of the day containing `instant`
pub fn day_bounds<Tz: TimeZone>(instant: &DateTime<Tz>) -> (i64, i64) {
    let tz = instant.timezone();
    let date = instant.date_naive();
    let at = |time: NaiveTime| {
        // A DST gap can swallow midnight; fall back to the naive UTC reading
        tz.from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| date.and_time(time).and_utc().timestamp())
    };

    (
        at(NaiveTime::MIN),
        at(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)),
    )
}

/// Bounds of the current local day
pub fn today_bounds() -> (i64, i64) {
    day_bounds(&Local::now())
}

/// Bounds of the previous local day
pub fn yesterday_bounds() -> (i64, i64) {
    day_bounds(&(Local::now() - Duration::days(1)))
}

/// 12h windows between the oldest and newest stored records
pub fn history_segments(first: &DateTime<Local>, latest: &DateTime<Local>) -> Vec<Segment> {
    segments(first, latest, HISTORY_STEP)
}

/// 24h windows from the oldest stored record up to `now`
pub fn catch_up_segments(first: &DateTime<Local>, now: &DateTime<Local>) -> Vec<Segment> {
    segments(first, now, CATCH_UP_STEP)
}
