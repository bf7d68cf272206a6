//! This module is responsible for SRT parsing.
//! It splits a document into cue blocks and turns each block into a
//! [`SubtitleRecord`] with ASS ready timestamps and text.

use crate::error::ConvertError;
use crate::text::{self, normalize_newlines};
use crate::timestamp::AssTimestamp;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{debug, trace, warn};

pub use crate::text::CueStyle;

/// One or more blank lines, blank lines may carry trailing whitespace.
static BLOCK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").unwrap());
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Accepted time range separators, tried in order. The first match wins.
static TIME_RANGES: LazyLock<[(&'static str, Regex); 3]> = LazyLock::new(|| {
    const TS: &str = r"(\d+:\d+:\d+[,.]\d+)";
    let build = |sep: &str| Regex::new(&format!(r"{TS}\s*{sep}\s*{TS}")).unwrap();
    [
        ("arrow", build("-->")),
        ("unicode arrow", build("→")),
        ("hyphen", build("-")),
    ]
});

/// Represents a single parsed cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleRecord {
    /// Cue number as declared in the file.
    pub index: u32,
    pub start: AssTimestamp,
    pub end: AssTimestamp,
    /// Cleaned text, lines joined with `\N`.
    pub text: String,
    /// Text lines as they appeared in the block, joined with `\n`.
    pub original_text: String,
    pub style: CueStyle,
}

/// Parse a whole SRT document into records ordered by ascending index.
///
/// Blocks that cannot be parsed are logged and skipped. A document with
/// content but no valid blocks yields an empty list; only a blank document
/// is an error.
pub fn parse(document: &str) -> Result<Vec<SubtitleRecord>, ConvertError> {
    let document = normalize_newlines(document);
    let document = document.trim_start_matches('\u{FEFF}');
    if document.trim().is_empty() {
        return Err(ConvertError::EmptyDocument);
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (n, block) in split_blocks(document).enumerate() {
        match parse_block(block) {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                warn!("skipping block {}: {err}", n + 1);
            }
        }
    }
    debug!("parsed {} blocks, skipped {skipped}", records.len());
    records.sort_by_key(|r| r.index);
    Ok(records)
}

/// Split a newline-normalized document on blank lines, dropping blank blocks.
pub fn split_blocks(document: &str) -> impl Iterator<Item = &str> {
    BLOCK_SEPARATOR
        .split(document)
        .filter(|block| !block.trim().is_empty())
}

/// Parse a single block: index line, time range line, then text lines.
pub fn parse_block(block: &str) -> Result<SubtitleRecord, ConvertError> {
    trace!("parse_block block={block:?}");
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < 3 {
        return Err(ConvertError::UnparsableBlock(format!(
            "expected index, time range and text, found {} line(s)",
            lines.len()
        )));
    }

    let index = parse_index(lines[0]).ok_or_else(|| {
        ConvertError::UnparsableBlock(format!("no cue index in {:?}", lines[0]))
    })?;
    let (start, end) = parse_time_range(lines[1]).ok_or_else(|| {
        ConvertError::UnparsableBlock(format!("cue {index}: no time range in {:?}", lines[1]))
    })?;

    let original_text = lines[2..].join("\n");
    let formatted = text::format(&original_text);
    Ok(SubtitleRecord {
        index,
        start,
        end,
        text: formatted.text,
        original_text,
        style: formatted.style,
    })
}

/// Read the cue number. Falls back to the first run of digits in the line.
fn parse_index(line: &str) -> Option<u32> {
    line.parse().ok().or_else(|| {
        let digits = DIGITS.find(line)?;
        debug!("index line {line:?} is not a bare number, using {}", digits.as_str());
        digits.as_str().parse().ok()
    })
}

/// Match the time range line against each accepted separator.
/// Timestamps that match the shape but fail validation become zero.
fn parse_time_range(line: &str) -> Option<(AssTimestamp, AssTimestamp)> {
    TIME_RANGES.iter().find_map(|(name, re)| {
        let caps = re.captures(line)?;
        trace!("time range {line:?} matched {name} separator");
        Some((
            AssTimestamp::parse_or_zero(&caps[1]),
            AssTimestamp::parse_or_zero(&caps[2]),
        ))
    })
}
