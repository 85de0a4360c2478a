//! ffmpeg time syntax parsing and formatting.
//!
//! ffmpeg and ffprobe exchange durations in two textual forms: `H:MM:SS[.f]`
//! and plain `S[.f]`. [`TimeCode`] accepts both on parse and always formats
//! as `HH:MM:SS.ffffff` with six fractional digits. Fractional parts of
//! arbitrary length are scaled positionally (right-padded or truncated to
//! microseconds), so `"14.8"` means 14.8 seconds, not 14 seconds and 8
//! microseconds.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoreError;

const MICROS_PER_SEC: u64 = 1_000_000;

/// A non-negative duration with microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeCode {
    micros: u64,
}

impl TimeCode {
    pub const ZERO: TimeCode = TimeCode { micros: 0 };

    pub fn from_micros(micros: u64) -> Self {
        Self { micros }
    }

    /// Rounds to the nearest microsecond; negative inputs clamp to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        let micros = (secs.max(0.0) * MICROS_PER_SEC as f64).round() as u64;
        Self { micros }
    }

    pub fn as_micros(&self) -> u64 {
        self.micros
    }

    pub fn total_seconds(&self) -> f64 {
        self.micros as f64 / MICROS_PER_SEC as f64
    }

    pub fn to_duration(&self) -> Duration {
        Duration::from_micros(self.micros)
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self {
            micros: duration.as_micros() as u64,
        }
    }

    pub fn hours(&self) -> u64 {
        self.micros / MICROS_PER_SEC / 3600
    }

    pub fn minutes(&self) -> u64 {
        self.micros / MICROS_PER_SEC / 60 % 60
    }

    pub fn seconds(&self) -> u64 {
        self.micros / MICROS_PER_SEC % 60
    }

    pub fn microseconds(&self) -> u64 {
        self.micros % MICROS_PER_SEC
    }
}

impl Add for TimeCode {
    type Output = TimeCode;

    fn add(self, rhs: TimeCode) -> TimeCode {
        TimeCode {
            micros: self.micros + rhs.micros,
        }
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:06}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.microseconds()
        )
    }
}

impl FromStr for TimeCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time_code(s).ok_or_else(|| CoreError::InvalidTimeCode {
            value: s.to_string(),
        })
    }
}

fn parse_time_code(s: &str) -> Option<TimeCode> {
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (s, None),
    };

    let frac_micros = match frac {
        Some(frac) => parse_fraction_micros(frac)?,
        None => 0,
    };

    let fields: Vec<&str> = whole.split(':').collect();
    let whole_seconds = match fields.as_slice() {
        // SECONDS
        [secs] => parse_digits(secs)?,
        // HOURS:MM:SS
        [hours, minutes, seconds] => {
            let hours = parse_digits(hours)?;
            let minutes = parse_digits(minutes)?;
            let seconds = parse_digits(seconds)?;
            if minutes > 59 || seconds > 59 {
                return None;
            }
            hours * 3600 + minutes * 60 + seconds
        }
        _ => return None,
    };

    Some(TimeCode {
        micros: whole_seconds.checked_mul(MICROS_PER_SEC)? + frac_micros,
    })
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Scales a fractional-second digit string to microseconds by decimal place:
/// `"8"` is 800000, `"007"` is 7000, digits past the sixth are dropped.
fn parse_fraction_micros(frac: &str) -> Option<u64> {
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits: String = frac.chars().take(6).collect();
    while digits.len() < 6 {
        digits.push('0');
    }
    digits.parse().ok()
}
