//! Core library for converting SubRip (SRT) subtitles into Advanced SubStation
//! Alpha (ASS) scripts.
//!
//! The pipeline runs leaf-first: [`encoding`] repairs mojibake, [`srt`] splits
//! and parses cue blocks (using [`timestamp`] and [`text`]), [`timing`] fixes
//! non-positive durations and [`ass`] renders the final script. [`convert`]
//! composes all of it and [`intake`] wraps it for callers holding raw bytes.

pub mod ass;
pub mod convert;
pub mod encoding;
pub mod error;
pub mod intake;
pub mod srt;
pub mod text;
pub mod timestamp;
pub mod timing;

pub use convert::{convert, convert_file, ConversionResult};
pub use error::ConvertError;
pub use intake::{convert_upload, ConversionResponse, IntakeOptions};
pub use srt::{CueStyle, SubtitleRecord};
pub use timestamp::AssTimestamp;
