//! Subtitle Time
//!
//! Signed millisecond duration with `[-]H:MM:SS.mmm` parsing/formatting and
//! frame <-> time conversion.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const MSECS_PER_HOUR: i64 = 3_600_000;
const MSECS_PER_MINUTE: i64 = 60_000;
const MSECS_PER_SECOND: i64 = 1_000;

/// Errors returned when a time string cannot be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("empty time string")]
    Empty,

    #[error("malformed time string: {0:?} (expected [-]H:MM:SS.mmm)")]
    Malformed(String),

    #[error("time out of range: {0:?}")]
    OutOfRange(String),
}

/// A signed count of milliseconds.
///
/// Negative values are meaningful (time-shift deltas); a subtitle's own start
/// and end are expected to be non-negative in normal use.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SubtitleTime {
    totalmsecs: i64,
}

impl SubtitleTime {
    /// Zero time
    pub const ZERO: SubtitleTime = SubtitleTime { totalmsecs: 0 };

    /// Creates a time from a millisecond count
    pub const fn new(totalmsecs: i64) -> Self {
        Self { totalmsecs }
    }

    /// Creates a time from hour/minute/second/millisecond components,
    /// saturating at the bounds of `i64`
    pub fn from_hms(hours: i64, minutes: i64, seconds: i64, mseconds: i64) -> Self {
        Self::new(
            hours
                .saturating_mul(MSECS_PER_HOUR)
                .saturating_add(minutes.saturating_mul(MSECS_PER_MINUTE))
                .saturating_add(seconds.saturating_mul(MSECS_PER_SECOND))
                .saturating_add(mseconds),
        )
    }

    /// Like `from_hms`, but `None` when the total does not fit in `i64`
    pub fn checked_from_hms(
        hours: i64,
        minutes: i64,
        seconds: i64,
        mseconds: i64,
    ) -> Option<Self> {
        let total = hours
            .checked_mul(MSECS_PER_HOUR)?
            .checked_add(minutes.checked_mul(MSECS_PER_MINUTE)?)?
            .checked_add(seconds.checked_mul(MSECS_PER_SECOND)?)?
            .checked_add(mseconds)?;
        Some(Self::new(total))
    }

    /// Total milliseconds
    pub fn totalmsecs(&self) -> i64 {
        self.totalmsecs
    }

    pub fn is_zero(&self) -> bool {
        self.totalmsecs == 0
    }

    pub fn hours(&self) -> i64 {
        self.totalmsecs / MSECS_PER_HOUR
    }

    pub fn minutes(&self) -> i64 {
        (self.totalmsecs % MSECS_PER_HOUR) / MSECS_PER_MINUTE
    }

    pub fn seconds(&self) -> i64 {
        (self.totalmsecs % MSECS_PER_MINUTE) / MSECS_PER_SECOND
    }

    pub fn mseconds(&self) -> i64 {
        self.totalmsecs % MSECS_PER_SECOND
    }

    pub fn set_hours(&mut self, hours: i64) {
        self.totalmsecs += (hours - self.hours()) * MSECS_PER_HOUR;
    }

    pub fn set_minutes(&mut self, minutes: i64) {
        self.totalmsecs += (minutes - self.minutes()) * MSECS_PER_MINUTE;
    }

    pub fn set_seconds(&mut self, seconds: i64) {
        self.totalmsecs += (seconds - self.seconds()) * MSECS_PER_SECOND;
    }

    pub fn set_mseconds(&mut self, mseconds: i64) {
        self.totalmsecs += mseconds - self.mseconds();
    }

    /// Returns true when `value` scans as `H:M:S.ms`.
    ///
    /// Only the shape is checked; `0:99:99.5000` is accepted.
    pub fn validate(value: &str) -> bool {
        value.parse::<SubtitleTime>().is_ok()
    }

    /// Floating-point ratio `self / other`; `0.0` when `other` is zero.
    pub fn ratio(&self, other: SubtitleTime) -> f64 {
        if other.totalmsecs == 0 {
            return 0.0;
        }
        self.totalmsecs as f64 / other.totalmsecs as f64
    }

    /// `round(frame / fps * 1000)` milliseconds
    pub fn frame_to_time(frame: i64, fps: f64) -> SubtitleTime {
        if !fps.is_finite() || fps <= 0.0 {
            warn!(fps, "Invalid framerate for frame to time conversion");
            return SubtitleTime::ZERO;
        }
        SubtitleTime::new((frame as f64 / fps * 1000.0).round() as i64)
    }

    /// `round(totalmsecs * fps / 1000)` frames
    pub fn time_to_frame(time: SubtitleTime, fps: f64) -> i64 {
        if !fps.is_finite() || fps <= 0.0 {
            warn!(fps, "Invalid framerate for time to frame conversion");
            return 0;
        }
        (time.totalmsecs as f64 * fps / 1000.0).round() as i64
    }

    /// Frame number of this time at `fps`
    pub fn to_frame(&self, fps: f64) -> i64 {
        Self::time_to_frame(*self, fps)
    }
}

fn parse_component(value: &str, source: &str) -> Result<i64, TimeParseError> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeParseError::Malformed(source.to_string()));
    }
    value
        .parse::<i64>()
        .map_err(|_| TimeParseError::Malformed(source.to_string()))
}

impl FromStr for SubtitleTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TimeParseError::Empty);
        }

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let mut parts = body.splitn(3, ':');
        let (Some(h), Some(m), Some(rest)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(TimeParseError::Malformed(s.to_string()));
        };
        let Some((sec, ms)) = rest.split_once('.') else {
            return Err(TimeParseError::Malformed(s.to_string()));
        };

        let time = SubtitleTime::checked_from_hms(
            parse_component(h, s)?,
            parse_component(m, s)?,
            parse_component(sec, s)?,
            parse_component(ms, s)?,
        )
        .ok_or_else(|| TimeParseError::OutOfRange(s.to_string()))?;

        Ok(if negative { -time } else { time })
    }
}

impl fmt::Display for SubtitleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.totalmsecs < 0 { "-" } else { "" };
        let abs = SubtitleTime::new(self.totalmsecs.abs());
        write!(
            f,
            "{}{}:{:02}:{:02}.{:03}",
            sign,
            abs.hours(),
            abs.minutes(),
            abs.seconds(),
            abs.mseconds()
        )
    }
}

impl From<i64> for SubtitleTime {
    fn from(totalmsecs: i64) -> Self {
        SubtitleTime::new(totalmsecs)
    }
}

impl Add for SubtitleTime {
    type Output = SubtitleTime;

    fn add(self, rhs: SubtitleTime) -> SubtitleTime {
        SubtitleTime::new(self.totalmsecs + rhs.totalmsecs)
    }
}

impl AddAssign for SubtitleTime {
    fn add_assign(&mut self, rhs: SubtitleTime) {
        self.totalmsecs += rhs.totalmsecs;
    }
}

impl Sub for SubtitleTime {
    type Output = SubtitleTime;

    fn sub(self, rhs: SubtitleTime) -> SubtitleTime {
        SubtitleTime::new(self.totalmsecs - rhs.totalmsecs)
    }
}

impl SubAssign for SubtitleTime {
    fn sub_assign(&mut self, rhs: SubtitleTime) {
        self.totalmsecs -= rhs.totalmsecs;
    }
}

impl Neg for SubtitleTime {
    type Output = SubtitleTime;

    fn neg(self) -> SubtitleTime {
        SubtitleTime::new(-self.totalmsecs)
    }
}

impl Mul<f64> for SubtitleTime {
    type Output = SubtitleTime;

    fn mul(self, rhs: f64) -> SubtitleTime {
        SubtitleTime::new((self.totalmsecs as f64 * rhs) as i64)
    }
}

impl Div<f64> for SubtitleTime {
    type Output = SubtitleTime;

    fn div(self, rhs: f64) -> SubtitleTime {
        if rhs == 0.0 {
            warn!("Division of a time value by zero");
            return SubtitleTime::ZERO;
        }
        SubtitleTime::new((self.totalmsecs as f64 / rhs) as i64)
    }
}

/// Integer quotient of the two millisecond counts; `0` when `rhs` is zero.
/// Use [`SubtitleTime::ratio`] for a fractional result.
impl Div for SubtitleTime {
    type Output = i64;

    fn div(self, rhs: SubtitleTime) -> i64 {
        if rhs.totalmsecs == 0 {
            warn!("Division of a time value by a zero time");
            return 0;
        }
        self.totalmsecs / rhs.totalmsecs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_round_trip() {
        let time: SubtitleTime = "1:02:03.456".parse().unwrap();
        assert_eq!(time.totalmsecs(), 3_723_456);
        assert_eq!(time.to_string(), "1:02:03.456");
    }

    #[test]
    fn negative_time_formats_with_sign() {
        let one_sec: SubtitleTime = "0:00:01.000".parse().unwrap();
        let negative = SubtitleTime::new(-one_sec.totalmsecs());
        assert_eq!(negative.to_string(), "-0:00:01.000");
        assert_eq!("-0:00:01.000".parse::<SubtitleTime>().unwrap(), negative);
    }

    #[test]
    fn hours_field_is_unbounded() {
        let time: SubtitleTime = "123:00:00.000".parse().unwrap();
        assert_eq!(time.hours(), 123);
        assert_eq!(time.to_string(), "123:00:00.000");
    }

    #[test]
    fn huge_hours_are_out_of_range() {
        assert_eq!(
            "9999999999999:00:00.000".parse::<SubtitleTime>(),
            Err(TimeParseError::OutOfRange("9999999999999:00:00.000".to_string()))
        );
        assert!(matches!(
            "-9999999999999:00:00.000".parse::<SubtitleTime>(),
            Err(TimeParseError::OutOfRange(_))
        ));
        assert!(!SubtitleTime::validate("9999999999999:00:00.000"));

        assert!(SubtitleTime::checked_from_hms(i64::MAX / MSECS_PER_HOUR + 1, 0, 0, 0).is_none());
        assert_eq!(
            SubtitleTime::checked_from_hms(1, 2, 3, 456),
            Some(SubtitleTime::new(3_723_456))
        );
        assert_eq!(
            SubtitleTime::from_hms(i64::MAX, 0, 0, 0).totalmsecs(),
            i64::MAX
        );
    }

    #[test]
    fn malformed_strings_are_errors_not_zero() {
        assert_eq!("".parse::<SubtitleTime>(), Err(TimeParseError::Empty));
        assert!(matches!(
            "1:02".parse::<SubtitleTime>(),
            Err(TimeParseError::Malformed(_))
        ));
        assert!(matches!(
            "a:00:00.000".parse::<SubtitleTime>(),
            Err(TimeParseError::Malformed(_))
        ));
        assert!(matches!(
            "0:00:01,000".parse::<SubtitleTime>(),
            Err(TimeParseError::Malformed(_))
        ));
    }

    #[test]
    fn validate_checks_shape_only() {
        assert!(SubtitleTime::validate("0:99:99.5000"));
        assert!(SubtitleTime::validate("-0:00:00.001"));
        assert!(!SubtitleTime::validate("00:00:00"));
    }

    #[test]
    fn component_accessors_truncate() {
        let time = SubtitleTime::from_hms(1, 2, 3, 456);
        assert_eq!(time.hours(), 1);
        assert_eq!(time.minutes(), 2);
        assert_eq!(time.seconds(), 3);
        assert_eq!(time.mseconds(), 456);
    }

    #[test]
    fn component_setters_apply_delta() {
        let mut time = SubtitleTime::from_hms(1, 2, 3, 456);
        time.set_minutes(10);
        assert_eq!(time, SubtitleTime::from_hms(1, 10, 3, 456));
        time.set_hours(0);
        time.set_mseconds(0);
        assert_eq!(time.to_string(), "0:10:03.000");
        time.set_seconds(59);
        assert_eq!(time.to_string(), "0:10:59.000");
    }

    #[test]
    fn arithmetic_operates_on_milliseconds() {
        let a = SubtitleTime::new(1500);
        let b = SubtitleTime::new(500);
        assert_eq!((a + b).totalmsecs(), 2000);
        assert_eq!((a - b).totalmsecs(), 1000);
        assert_eq!((b - a).totalmsecs(), -1000);
        assert_eq!((a * 2.0).totalmsecs(), 3000);
        assert_eq!((a / 3.0).totalmsecs(), 500);
        assert_eq!(a / b, 3);
        assert_eq!(b / a, 0);
        assert!((b.ratio(a) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn division_by_zero_is_guarded() {
        let a = SubtitleTime::new(1500);
        assert_eq!(a / SubtitleTime::ZERO, 0);
        assert_eq!(a / 0.0, SubtitleTime::ZERO);
        assert_eq!(a.ratio(SubtitleTime::ZERO), 0.0);
    }

    #[test]
    fn frame_conversion_rounds() {
        assert_eq!(SubtitleTime::frame_to_time(25, 25.0).totalmsecs(), 1000);
        assert_eq!(SubtitleTime::frame_to_time(1, 23.976).totalmsecs(), 42);
        assert_eq!(SubtitleTime::time_to_frame(SubtitleTime::new(1000), 29.97), 30);
        assert_eq!(SubtitleTime::new(40).to_frame(25.0), 1);
    }

    #[test]
    fn frame_conversion_rejects_bad_fps() {
        assert_eq!(SubtitleTime::frame_to_time(10, 0.0), SubtitleTime::ZERO);
        assert_eq!(SubtitleTime::time_to_frame(SubtitleTime::new(1000), f64::NAN), 0);
    }
}
