//! SRT timestamp parsing and ASS timestamp formatting.
//! SRT writes `HH:MM:SS,mmm`, ASS wants `H:MM:SS.cc`.

use crate::error::ConvertError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

static SRT_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})[,.](\d{1,3})$").unwrap());

/// A timestamp at ASS precision (hundredths of a second).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AssTimestamp {
    pub hours: u32,
    pub minutes: u8,
    pub seconds: u8,
    pub centis: u8,
}

impl AssTimestamp {
    /// Sentinel used when a timestamp cannot be parsed.
    pub const ZERO: AssTimestamp = AssTimestamp {
        hours: 0,
        minutes: 0,
        seconds: 0,
        centis: 0,
    };

    /// Build a timestamp, rejecting out of range fields.
    pub fn new(hours: u32, minutes: u8, seconds: u8, centis: u8) -> Result<Self, ConvertError> {
        if minutes >= 60 || seconds >= 60 || centis >= 100 {
            return Err(ConvertError::InvalidTimestamp(format!(
                "{hours}:{minutes:02}:{seconds:02}.{centis:02}"
            )));
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
            centis,
        })
    }

    /// Parse an SRT timestamp such as `00:01:23,456` or `0:01:23.4`.
    ///
    /// The fraction is right padded to milliseconds and then truncated to
    /// centiseconds, so `,456` becomes `.45` rather than `.46`.
    pub fn parse(raw: &str) -> Result<Self, ConvertError> {
        let invalid = || ConvertError::InvalidTimestamp(raw.to_string());
        let caps = SRT_TIMESTAMP.captures(raw.trim()).ok_or_else(invalid)?;
        let hours: u32 = caps[1].parse().map_err(|_| invalid())?;
        let minutes: u8 = caps[2].parse().map_err(|_| invalid())?;
        let seconds: u8 = caps[3].parse().map_err(|_| invalid())?;

        let mut fraction = caps[4].to_string();
        while fraction.len() < 3 {
            fraction.push('0');
        }
        fraction.truncate(3);
        let millis: u16 = fraction.parse().map_err(|_| invalid())?;
        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(invalid());
        }
        Self::new(hours, minutes, seconds, (millis / 10) as u8)
    }

    /// Like [`AssTimestamp::parse`] but falls back to [`AssTimestamp::ZERO`],
    /// so one bad timestamp never aborts a document.
    pub fn parse_or_zero(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|err| {
            warn!("{err}; using {}", Self::ZERO);
            Self::ZERO
        })
    }

    /// Total length in centiseconds.
    pub fn total_centis(&self) -> u64 {
        ((u64::from(self.hours) * 60 + u64::from(self.minutes)) * 60 + u64::from(self.seconds))
            * 100
            + u64::from(self.centis)
    }

    /// Inverse of [`AssTimestamp::total_centis`]. `None` if the hours overflow.
    pub fn from_total_centis(total: u64) -> Option<Self> {
        let hours = u32::try_from(total / 360_000).ok()?;
        Some(Self {
            hours,
            minutes: ((total % 360_000) / 6000) as u8,
            seconds: ((total % 6000) / 100) as u8,
            centis: (total % 100) as u8,
        })
    }
}

impl fmt::Display for AssTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}:{:02}.{:02}",
            self.hours, self.minutes, self.seconds, self.centis
        )
    }
}
