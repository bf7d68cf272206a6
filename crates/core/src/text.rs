//! Cleanup of SRT cue text into ASS dialogue text.
//!
//! SRT cues carry loose HTML: `<i>`, `<b>`, `<font color=..>`, `<br>` and
//! entities. ASS has none of that, so tags are stripped (keeping their inner
//! text), italics become either the `Italic` style or inline `{\i1}` overrides,
//! and line breaks become the literal `\N` marker.

use crate::encoding;
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{debug, trace};

/// ASS hard line break.
pub const LINE_BREAK: &str = "\\N";

/// Text used when a cue has nothing left after cleaning.
pub const PLACEHOLDER: &str = "[...]";

const BOM: char = '\u{FEFF}';

static WRAPPED_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*<\s*i\s*>(.*)<\s*/\s*i\s*>\s*$").unwrap());
static ITALIC_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*(/)?\s*i\s*>").unwrap());
static INLINE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*/?\s*(?:b|u|s|strike|em|strong|font|span|div|p)\b[^>]*>").unwrap()
});
static BREAK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Style an individual cue is rendered with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum CueStyle {
    #[default]
    Default,
    /// Defined in the style sheet; nothing selects it yet.
    Title,
    Italic,
}

impl CueStyle {
    /// Style name as written in the `[V4+ Styles]` section.
    pub fn name(&self) -> &'static str {
        match self {
            CueStyle::Default => "Default",
            CueStyle::Title => "Title",
            CueStyle::Italic => "Italic",
        }
    }
}

/// Cleaned text plus the style detected for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedText {
    pub text: String,
    pub style: CueStyle,
}

/// Turn raw cue text (possibly several lines) into ASS ready text.
/// The result is never empty.
pub fn format(raw: &str) -> FormattedText {
    trace!("format raw={raw:?}");
    let text = raw.strip_prefix(BOM).unwrap_or(raw);
    let text = encoding::fix(text);
    let text = normalize_newlines(&text);

    let (text, style) = if is_wholly_italic(&text) {
        (ITALIC_TAG.replace_all(&text, "").into_owned(), CueStyle::Italic)
    } else {
        (inline_italics(&text), CueStyle::Default)
    };

    let text = INLINE_TAG.replace_all(&text, "");
    let text = BREAK_TAG.replace_all(&text, LINE_BREAK);
    let text = decode_entities(&text);
    let text = text.replace('\n', LINE_BREAK);
    let text = tidy_lines(&text);

    if text.is_empty() {
        debug!("cue text empty after cleaning, falling back to original");
        return FormattedText {
            text: fallback(raw),
            style: CueStyle::Default,
        };
    }
    FormattedText { text, style }
}

/// Convert `\r\n` and lone `\r` to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decode named and numeric HTML entities. Unknown names and control
/// characters are left as is; `&#13;` and `&#10;` become `\n`.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = match body.strip_prefix('#') {
                Some(num) => numeric_entity(num),
                None => named_entity(body),
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

fn numeric_entity(num: &str) -> Option<char> {
    let code = match num.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => num.parse().ok()?,
    };
    match char::from_u32(code)? {
        '\r' | '\n' => Some('\n'),
        c if c.is_control() => None,
        c => Some(c),
    }
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{A0}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        _ => return None,
    };
    Some(c)
}

/// A cue is wholly italic when the whole text, or every non-empty line,
/// is a single `<i>...</i>` span.
fn is_wholly_italic(text: &str) -> bool {
    let single_span = |s: &str| {
        WRAPPED_ITALIC
            .captures(s)
            .is_some_and(|caps| ITALIC_TAG.find(&caps[1]).is_none())
    };
    if single_span(text) {
        return true;
    }
    let mut lines = text.lines().filter(|l| !l.trim().is_empty()).peekable();
    lines.peek().is_some() && lines.all(single_span)
}

/// Rewrite partial `<i>` spans as ASS override tags.
fn inline_italics(text: &str) -> String {
    ITALIC_TAG
        .replace_all(text, |caps: &Captures| {
            if caps.get(1).is_some() {
                "{\\i0}"
            } else {
                "{\\i1}"
            }
        })
        .into_owned()
}

/// Trim each `\N` separated line, squeeze runs of blanks and drop empty lines.
fn tidy_lines(text: &str) -> String {
    text.split(LINE_BREAK)
        .map(|line| SPACES.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
        .trim()
        .to_string()
}

/// Whitespace collapsed original text, or the placeholder.
fn fallback(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        collapsed
    }
}
