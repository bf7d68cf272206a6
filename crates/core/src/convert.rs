//! Conversion orchestration.
//! This module wires SRT parsing, timing validation and ASS rendering.

use crate::error::ConvertError;
use crate::{ass, encoding, srt, timing};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{error, info, trace};

/// Outcome of one conversion. Exactly one of `content` or `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResult {
    /// Successful result carrying the rendered script.
    pub fn succeeded(content: String, subtitle_count: usize) -> Self {
        Self {
            success: true,
            content: Some(content),
            subtitle_count: Some(subtitle_count),
            error: None,
        }
    }

    /// Failed result carrying a human readable message.
    pub fn failed(err: &ConvertError) -> Self {
        Self {
            success: false,
            content: None,
            subtitle_count: None,
            error: Some(err.to_string()),
        }
    }

    /// View the result as a `Result`, handy for `?` in callers.
    pub fn into_result(self) -> Result<(String, usize)> {
        match (self.content, self.subtitle_count) {
            (Some(content), Some(count)) if self.success => Ok((content, count)),
            _ => Err(anyhow!(self
                .error
                .unwrap_or_else(|| "conversion failed".to_string()))),
        }
    }
}

/// Convert SRT text into an ASS script.
///
/// Never fails and never panics: every problem, including a panic inside
/// the pipeline, ends up as a failed [`ConversionResult`].
pub fn convert(raw: &str) -> ConversionResult {
    trace!("convert raw_len={}", raw.len());
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run_pipeline(raw)))
        .unwrap_or_else(|payload| Err(ConvertError::UnexpectedFailure(panic_message(&payload))));
    match outcome {
        Ok((content, count)) => {
            info!("converted {count} subtitles");
            ConversionResult::succeeded(content, count)
        }
        Err(err) => {
            error!("conversion failed: {err}");
            ConversionResult::failed(&err)
        }
    }
}

/// Repair, parse, validate and render. Only document level failures are returned.
pub fn run_pipeline(raw: &str) -> Result<(String, usize), ConvertError> {
    let repaired = encoding::fix(raw);
    let records = srt::parse(&repaired)?;
    if records.is_empty() {
        return Err(ConvertError::NoValidSubtitles);
    }
    let records = timing::validate(records);
    let (content, written) = ass::render(&records);
    if written == 0 {
        return Err(ConvertError::NoValidSubtitles);
    }
    Ok((content, written))
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "internal error".to_string())
}

/// Convert an SRT file on disk and write the ASS script.
/// The output defaults to the input path with an `.ass` extension.
pub fn convert_file(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    trace!("convert_file input={}", input.display());
    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let (text, encoding) = crate::intake::decode_text(&bytes);
    info!("decoded {} as {encoding}", input.display());
    let (content, count) = convert(&text).into_result()?;
    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    fs::write(&out_path, content).with_context(|| format!("writing {}", out_path.display()))?;
    info!("wrote {count} subtitles to {}", out_path.display());
    Ok(out_path)
}

/// `movie.srt` becomes `movie.ass` next to it.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("ass")
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use tempfile::tempdir;

    fn cue(index: u32, start: &str, end: &str, text: &str) -> String {
        format!("{index}\n{start} --> {end}\n{text}\n\n")
    }

    #[test]
    fn converts_in_index_order() {
        let input = [
            cue(3, "00:00:05,000", "00:00:06,000", "three"),
            cue(1, "00:00:01,000", "00:00:02,000", "one"),
            cue(2, "00:00:03,000", "00:00:04,000", "two"),
        ]
        .concat();
        let result = convert(&input);
        assert!(result.success);
        assert_eq!(result.subtitle_count, Some(3));
        let content = result.content.unwrap();
        let texts: Vec<&str> = content
            .lines()
            .filter(|l| l.starts_with("Dialogue:"))
            .map(|l| l.rsplit(",,").next().unwrap())
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn drops_one_malformed_block_out_of_ten() {
        let mut input = String::new();
        for i in 1..=10u32 {
            if i == 4 {
                input.push_str("4\n00:00:04,000 --> 00:00:05,000\n\n");
            } else {
                input.push_str(&cue(i, &format!("00:00:{i:02},000"), &format!("00:00:{i:02},900"), "text"));
            }
        }
        let result = convert(&input);
        assert_eq!(result.subtitle_count, Some(9));
        assert_eq!(result.content.unwrap().matches("\nDialogue: ").count(), 9);
    }

    #[test]
    fn encoded_carriage_return_keeps_cue_and_count() {
        let input = [
            cue(1, "00:00:01,000", "00:00:02,000", "A&#13;B"),
            cue(2, "00:00:03,000", "00:00:04,000", "ok"),
        ]
        .concat();
        let result = convert(&input);
        let content = result.content.unwrap();
        assert_eq!(result.subtitle_count, Some(2));
        assert_eq!(content.matches("\nDialogue: ").count(), 2);
        assert!(content.contains(",,A\\NB\n"));
    }

    #[test]
    fn corrects_backwards_cue() {
        let result = convert(&cue(1, "00:00:05,000", "00:00:03,000", "oops"));
        let content = result.content.unwrap();
        assert!(content.contains("Dialogue: 0,0:00:05.00,0:00:06.00,Default,,0,0,0,,oops"));
    }

    #[test]
    fn italic_cue_uses_italic_style() {
        let result = convert(&cue(1, "00:00:01,000", "00:00:02,000", "<i>Hello\nWorld</i>"));
        assert!(result
            .content
            .unwrap()
            .contains(",Italic,,0,0,0,,Hello\\NWorld\n"));
    }

    #[test]
    fn restores_vietnamese_mojibake() {
        let text = "Tôi không biết điều đó là";
        let (broken, _) = WINDOWS_1252.decode_without_bom_handling(text.as_bytes());
        assert_ne!(broken, text);
        let result = convert(&cue(1, "00:00:01,000", "00:00:02,000", &broken));
        assert!(result.content.unwrap().ends_with(&format!(",,{text}\n")));
        assert_eq!(encoding::fix(text), text);
    }

    #[test]
    fn empty_and_unusable_documents_fail_differently() {
        let empty = convert("   \n\n ");
        assert!(!empty.success);
        assert_eq!(empty.error.as_deref(), Some("the subtitle file is empty"));
        assert!(empty.content.is_none() && empty.subtitle_count.is_none());

        let unusable = convert("hello\n\nworld\n");
        assert!(!unusable.success);
        assert_eq!(unusable.error.as_deref(), Some("no valid subtitles found in file"));
    }

    #[test]
    fn result_serializes_like_the_endpoint() {
        let ok = serde_json::to_value(ConversionResult::succeeded("x".into(), 1)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "content": "x", "subtitleCount": 1}));
        let err = serde_json::to_value(ConversionResult::failed(&ConvertError::EmptyDocument)).unwrap();
        assert_eq!(err, serde_json::json!({"success": false, "error": "the subtitle file is empty"}));
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload = panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(&payload), "boom");
    }

    #[test]
    fn writes_ass_next_to_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movie.srt");
        fs::write(&path, cue(1, "00:00:00,000", "00:00:01,000", "hello")).unwrap();
        let out = convert_file(&path, None).unwrap();
        assert_eq!(out, dir.path().join("movie.ass"));
        let written = fs::read_to_string(out).unwrap();
        assert!(written.starts_with("[Script Info]"));
        assert!(written.contains(",,hello\n"));
    }

    #[test]
    fn convert_file_reports_empty_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.srt");
        fs::write(&path, "").unwrap();
        let err = convert_file(&path, None).unwrap_err();
        assert_eq!(err.to_string(), "the subtitle file is empty");
        assert!(!dir.path().join("empty.ass").exists());
    }
}
