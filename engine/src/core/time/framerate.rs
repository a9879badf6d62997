//! Framerate Utilities
//!
//! Closed set of supported framerates with their float values and labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported document framerates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FrameRate {
    #[serde(rename = "23.976")]
    Fps23_976,
    #[serde(rename = "24")]
    Fps24,
    #[default]
    #[serde(rename = "25")]
    Fps25,
    #[serde(rename = "29.97")]
    Fps29_97,
    #[serde(rename = "30")]
    Fps30,
}

impl FrameRate {
    /// Every supported framerate, slowest first
    pub const ALL: [FrameRate; 5] = [
        FrameRate::Fps23_976,
        FrameRate::Fps24,
        FrameRate::Fps25,
        FrameRate::Fps29_97,
        FrameRate::Fps30,
    ];

    /// Frames per second
    pub fn value(&self) -> f64 {
        match self {
            FrameRate::Fps23_976 => 23.976,
            FrameRate::Fps24 => 24.0,
            FrameRate::Fps25 => 25.0,
            FrameRate::Fps29_97 => 29.97,
            FrameRate::Fps30 => 30.0,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            FrameRate::Fps23_976 => "23.976 (Film)",
            FrameRate::Fps24 => "24",
            FrameRate::Fps25 => "25 (PAL)",
            FrameRate::Fps29_97 => "29.97 (NTSC)",
            FrameRate::Fps30 => "30",
        }
    }

    /// Looks up the framerate whose value matches `fps` to the nearest
    /// thousandth. Custom rates outside the table return `None`.
    pub fn from_value(fps: f64) -> Option<FrameRate> {
        if !fps.is_finite() {
            return None;
        }
        let key = (fps * 1000.0).round() as i64;
        FrameRate::ALL
            .into_iter()
            .find(|rate| (rate.value() * 1000.0).round() as i64 == key)
    }

    /// Duration of one frame in milliseconds
    pub fn msecs_per_frame(&self) -> f64 {
        1000.0 / self.value()
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::SubtitleTime;

    #[test]
    fn value_lookup_is_exact() {
        assert_eq!(FrameRate::Fps23_976.value(), 23.976);
        assert_eq!(FrameRate::Fps29_97.value(), 29.97);
        assert_eq!(FrameRate::Fps25.value(), 25.0);
    }

    #[test]
    fn from_value_rounds_to_thousandth() {
        assert_eq!(FrameRate::from_value(23.9761), Some(FrameRate::Fps23_976));
        assert_eq!(FrameRate::from_value(29.97), Some(FrameRate::Fps29_97));
        assert_eq!(FrameRate::from_value(30.0), Some(FrameRate::Fps30));
        assert_eq!(FrameRate::from_value(23.98), None);
        assert_eq!(FrameRate::from_value(50.0), None);
        assert_eq!(FrameRate::from_value(f64::NAN), None);
    }

    #[test]
    fn every_rate_round_trips_through_its_value() {
        for rate in FrameRate::ALL {
            assert_eq!(FrameRate::from_value(rate.value()), Some(rate));
        }
    }

    #[test]
    fn msecs_per_frame() {
        assert!((FrameRate::Fps25.msecs_per_frame() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn frame_time_round_trip_within_one_frame() {
        for rate in FrameRate::ALL {
            let fps = rate.value();
            for frame in (0..5000).step_by(7) {
                let time = SubtitleTime::frame_to_time(frame, fps);
                let back = SubtitleTime::time_to_frame(time, fps);
                assert!((back - frame).abs() <= 1, "{rate}: {frame} -> {back}");
            }
        }
    }

    #[test]
    fn serializes_as_numeric_label() {
        let json = serde_json::to_string(&FrameRate::Fps23_976).unwrap();
        assert_eq!(json, "\"23.976\"");
    }
}
