//! ASS script rendering.
//!
//! The header (script info and styles) is a fixed template at 1920x1080;
//! only the `Dialogue:` lines vary between documents.

use crate::error::ConvertError;
use crate::srt::SubtitleRecord;
use std::fmt::Write;
use tracing::{trace, warn};

/// Script info, style sheet and events format line.
pub const HEADER: &str = "\
[Script Info]
; Converted from SubRip by srt2ass
Title: Converted Subtitle
ScriptType: v4.00+
WrapStyle: 0
ScaledBorderAndShadow: yes
YCbCr Matrix: TV.709
PlayResX: 1920
PlayResY: 1080

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,64,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,0,0,0,0,100,100,0,0,1,3,1,2,60,60,50,1
Style: Title,Arial,80,&H0000FFFF,&H000000FF,&H00000000,&H80000000,-1,0,0,0,100,100,0,0,1,4,2,8,60,60,60,1
Style: Italic,Arial,64,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,0,-1,0,0,100,100,0,0,1,3,1,2,60,60,50,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

/// Render the full script: header, then one dialogue line per record in
/// the given order. Records that cannot be rendered are skipped; the
/// returned count is the number of dialogue lines actually written.
pub fn render(records: &[SubtitleRecord]) -> (String, usize) {
    trace!("render records={}", records.len());
    let mut out = String::with_capacity(HEADER.len() + records.len() * 64);
    out.push_str(HEADER);
    let mut written = 0;
    for record in records {
        match dialogue_line(record) {
            Ok(line) => {
                out.push_str(&line);
                out.push('\n');
                written += 1;
            }
            Err(err) => warn!("{err}; skipping"),
        }
    }
    (out, written)
}

/// Format one `Dialogue:` line.
/// Fails if the text would break the one-event-per-line layout.
pub fn dialogue_line(record: &SubtitleRecord) -> Result<String, ConvertError> {
    if record.text.contains(['\n', '\r']) {
        return Err(ConvertError::UnrenderableRecord {
            index: record.index,
            reason: "text contains a raw line break".to_string(),
        });
    }
    let mut line = String::with_capacity(40 + record.text.len());
    write!(
        line,
        "Dialogue: 0,{},{},{},,0,0,0,,{}",
        record.start,
        record.end,
        record.style.name(),
        record.text
    )
    .map_err(|e| ConvertError::UnrenderableRecord {
        index: record.index,
        reason: e.to_string(),
    })?;
    Ok(line)
}
