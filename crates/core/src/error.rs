//! Error types shared by the conversion pipeline.
//!
//! Only [`ConvertError::EmptyDocument`], [`ConvertError::NoValidSubtitles`] and
//! the boundary variants ever reach a caller. The rest are recovered where
//! they occur and only show up in logs.

use thiserror::Error;

/// Everything that can go wrong while turning SRT text into an ASS script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// A single timestamp could not be parsed or is out of range.
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// A cue block is missing lines or has no recognizable time range.
    #[error("unparsable block: {0}")]
    UnparsableBlock(String),

    /// The whole document is empty or whitespace only.
    #[error("the subtitle file is empty")]
    EmptyDocument,

    /// The document has content but not a single usable cue.
    #[error("no valid subtitles found in file")]
    NoValidSubtitles,

    /// A parsed record cannot be written as a dialogue line.
    #[error("cannot render subtitle {index}: {reason}")]
    UnrenderableRecord {
        /// Index of the offending record.
        index: u32,
        /// What made it unrenderable.
        reason: String,
    },

    /// Uploaded file name does not end in `.srt`.
    #[error("unsupported file type: {0} (only .srt files are accepted)")]
    UnsupportedFileType(String),

    /// Uploaded file exceeds the configured byte limit.
    #[error("file is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge {
        /// Actual size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Any other internal fault, caught at the orchestrator boundary.
    #[error("unexpected conversion failure: {0}")]
    UnexpectedFailure(String),
}
