//! Time grid geometry.
//!
//! Converts a vertical position inside a day column into a clock time snapped
//! to the grid, and back. Every function here clamps its input instead of
//! failing, so pointer math from the UI can be fed in unchecked.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike};

/// Minutes in a calendar day.
pub const MINUTES_PER_DAY: u32 = 1440;

const SECONDS_PER_DAY: i64 = 86_400;

/// Fraction of a column's height that a pointer position represents.
///
/// A zero-height (or negative, or non-finite) container yields `0.0`.
pub fn offset_ratio(pointer_y: f32, container_top: f32, container_height: f32) -> f64 {
    if !container_height.is_finite() || container_height <= 0.0 {
        return 0.0;
    }
    clamp_ratio(((pointer_y - container_top) / container_height) as f64)
}

/// Convert a column ratio into minutes since midnight, snapped to `step_minutes`.
///
/// The ratio is clamped to `[0, 1]`, floored to whole minutes, then rounded to
/// the nearest multiple of the step. The result can be `1440` for a pointer at
/// the very bottom of the column (end of day).
pub fn time_from_offset(offset_ratio: f64, step_minutes: u32) -> u32 {
    let step = effective_step(step_minutes);
    // The epsilon absorbs float noise from ratios built as `minutes / 1440`.
    let minutes = (clamp_ratio(offset_ratio) * MINUTES_PER_DAY as f64 + 1e-9).floor() as u32;
    let snapped = ((minutes as f64 / step as f64).round() as u32) * step;
    snapped.min(MINUTES_PER_DAY)
}

/// Inverse of [`time_from_offset`]: the column ratio for a minute of the day.
pub fn offset_from_time(minutes_since_midnight: u32) -> f64 {
    minutes_since_midnight.min(MINUTES_PER_DAY) as f64 / MINUTES_PER_DAY as f64
}

/// Round an instant up to the next grid line of its own day.
///
/// Instants already on a grid line (with zero seconds) are returned unchanged,
/// which makes the function idempotent.
pub fn round_up<Tz: TimeZone>(instant: &DateTime<Tz>, step_minutes: u32) -> DateTime<Tz> {
    let step_secs = effective_step(step_minutes) as i64 * 60;
    let secs = instant.num_seconds_from_midnight() as i64;
    let nanos = instant.nanosecond() as i64;

    let remainder = secs % step_secs;
    if remainder == 0 && nanos == 0 {
        return instant.clone();
    }

    // Midnight is always a grid line, even for steps that do not divide the day.
    let advance = (step_secs - remainder).min(SECONDS_PER_DAY - secs);
    instant.clone() - Duration::nanoseconds(nanos) + Duration::seconds(advance)
}

/// Wall-clock time for a minute-of-day value. `1440` maps to `23:59:59`.
pub fn time_of_day(minutes_since_midnight: u32) -> NaiveTime {
    if minutes_since_midnight >= MINUTES_PER_DAY {
        return NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    }
    NaiveTime::from_hms_opt(minutes_since_midnight / 60, minutes_since_midnight % 60, 0)
        .unwrap_or(NaiveTime::MIN)
}

/// Minute of the day for an instant in its own time zone.
pub fn minutes_since_midnight<Tz: TimeZone>(instant: &DateTime<Tz>) -> u32 {
    instant.hour() * 60 + instant.minute()
}

/// Pixel geometry of one day column, as laid out by the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridColumn {
    pub top: f32,
    pub height: f32,
}

impl GridColumn {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    /// Snapped minute of the day under a pointer.
    pub fn minutes_at(&self, pointer_y: f32, step_minutes: u32) -> u32 {
        time_from_offset(offset_ratio(pointer_y, self.top, self.height), step_minutes)
    }

    /// Y coordinate of a minute of the day inside this column.
    pub fn y_for(&self, minutes_since_midnight: u32) -> f32 {
        self.top + offset_from_time(minutes_since_midnight) as f32 * self.height.max(0.0)
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

fn effective_step(step_minutes: u32) -> u32 {
    step_minutes.clamp(1, MINUTES_PER_DAY)
}
