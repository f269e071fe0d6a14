//! Interval duration resolution.
//!
//! Every interval of a run shares one duration: either the configured
//! step length or the spacing of the first two timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Step length used when it cannot be inferred from the timestamps.
pub const DEFAULT_STEP_MINUTES: u32 = 60;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Uniform duration of one simulation interval.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::clock::StepDuration;
///
/// let step = StepDuration::from_minutes(30);
/// assert_eq!(step.hours(), 0.5);
/// assert_eq!(step.minutes(), 30.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDuration {
    hours: f64,
}

impl StepDuration {
    pub fn from_minutes(minutes: u32) -> Self {
        Self {
            hours: f64::from(minutes) / 60.0,
        }
    }

    /// Builds a duration directly from hours. Negative or non-finite values
    /// collapse to zero, which makes every energy contribution zero.
    pub fn from_hours(hours: f64) -> Self {
        Self {
            hours: if hours.is_finite() { hours.max(0.0) } else { 0.0 },
        }
    }

    /// Resolves the duration for a run.
    ///
    /// An explicit, non-zero `step_minutes` wins; otherwise the length is
    /// inferred from `time` with [`infer_step_minutes`].
    pub fn resolve(step_minutes: Option<u32>, time: &[String]) -> Self {
        match step_minutes {
            Some(minutes) if minutes > 0 => Self::from_minutes(minutes),
            _ => Self::from_minutes(infer_step_minutes(time)),
        }
    }

    pub fn hours(&self) -> f64 {
        self.hours
    }

    pub fn minutes(&self) -> f64 {
        self.hours * 60.0
    }
}

/// Infers the step length in minutes from the first two timestamps.
///
/// The difference is rounded half-to-even to whole minutes and floored at
/// one minute. Fewer than two timestamps, or timestamps that do not parse,
/// give [`DEFAULT_STEP_MINUTES`].
pub fn infer_step_minutes(time: &[String]) -> u32 {
    let [first, second, ..] = time else {
        return DEFAULT_STEP_MINUTES;
    };
    let (Some(t0), Some(t1)) = (parse_timestamp(first), parse_timestamp(second)) else {
        tracing::debug!(first = %first, second = %second, "unparseable timestamps, using default step");
        return DEFAULT_STEP_MINUTES;
    };

    let seconds = (t1 - t0).num_milliseconds() as f64 / 1000.0;
    let minutes = (seconds / 60.0).round_ties_even();
    if minutes < 1.0 {
        1
    } else if minutes >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        minutes as u32
    }
}

/// Parses an ISO-8601-like timestamp.
///
/// Accepts RFC 3339 (with `Z` or an offset, converted to UTC), naive
/// date-times with `T` or a space separator and optional seconds and
/// fractional seconds, and bare dates (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(naive, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
