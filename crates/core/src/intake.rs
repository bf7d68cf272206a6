//! Entry point for callers that hold an uploaded file rather than text.
//!
//! Checks the file name and size, decodes the bytes with a fallback chain
//! and wraps the conversion result together with the file name.

use crate::convert::{convert, ConversionResult};
use crate::error::ConvertError;
use encoding_rs::WINDOWS_1252;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Default upload limit, 10 MiB.
pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Bytes Windows-1252 leaves undefined.
const WINDOWS_1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Limits applied before any conversion work happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeOptions {
    pub max_bytes: usize,
}

impl Default for IntakeOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Which step of the decode chain produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextEncoding {
    Utf8,
    /// UTF-8 with a truncated character at the very end, which is dropped.
    Utf8Lenient,
    Windows1252,
    Latin1,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf8Lenient => "UTF-8 (lenient)",
            TextEncoding::Windows1252 => "Windows-1252",
            TextEncoding::Latin1 => "Latin-1",
        };
        f.write_str(name)
    }
}

/// Response returned to an upload caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub success: bool,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResponse {
    fn new(filename: &str, result: ConversionResult) -> Self {
        Self {
            success: result.success,
            filename: filename.to_string(),
            content: result.content,
            subtitle_count: result.subtitle_count,
            error: result.error,
        }
    }

    fn rejected(filename: &str, err: &ConvertError) -> Self {
        warn!("rejecting {filename}: {err}");
        Self::new(filename, ConversionResult::failed(err))
    }
}

/// Check, decode and convert one uploaded file.
pub fn convert_upload(filename: &str, bytes: &[u8], options: &IntakeOptions) -> ConversionResponse {
    if let Err(err) = check_upload(filename, bytes.len(), options) {
        return ConversionResponse::rejected(filename, &err);
    }
    let (text, encoding) = decode_text(bytes);
    info!("decoded {filename} ({} bytes) as {encoding}", bytes.len());
    ConversionResponse::new(filename, convert(&text))
}

/// Accept only `.srt` names (any case) within the size limit.
pub fn check_upload(filename: &str, size: usize, options: &IntakeOptions) -> Result<(), ConvertError> {
    if !filename.to_ascii_lowercase().ends_with(".srt") {
        return Err(ConvertError::UnsupportedFileType(filename.to_string()));
    }
    if size > options.max_bytes {
        return Err(ConvertError::FileTooLarge {
            size,
            limit: options.max_bytes,
        });
    }
    Ok(())
}

/// Decode bytes with the first encoding that accepts them:
/// strict UTF-8, lenient UTF-8, Windows-1252, then Latin-1 which always works.
pub fn decode_text(bytes: &[u8]) -> (String, TextEncoding) {
    let err = match std::str::from_utf8(bytes) {
        Ok(text) => return (text.to_string(), TextEncoding::Utf8),
        Err(err) => err,
    };
    if err.error_len().is_none() {
        debug!("dropping truncated UTF-8 sequence at byte {}", err.valid_up_to());
        let text = String::from_utf8_lossy(&bytes[..err.valid_up_to()]).into_owned();
        return (text, TextEncoding::Utf8Lenient);
    }
    if !bytes.iter().any(|b| WINDOWS_1252_UNDEFINED.contains(b)) {
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
        return (text.into_owned(), TextEncoding::Windows1252);
    }
    (bytes.iter().map(|&b| char::from(b)).collect(), TextEncoding::Latin1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRT: &str = "1\n00:00:01,000 --> 00:00:02,000\nCafé\n";

    #[test]
    fn decodes_utf8_first() {
        assert_eq!(decode_text(SRT.as_bytes()), (SRT.to_string(), TextEncoding::Utf8));
    }

    #[test]
    fn drops_truncated_utf8_tail() {
        let mut bytes = "Việt".as_bytes().to_vec();
        bytes.extend_from_slice(&"ệ".as_bytes()[..2]);
        assert_eq!(decode_text(&bytes), ("Việt".to_string(), TextEncoding::Utf8Lenient));
    }

    #[test]
    fn falls_back_to_windows_1252_then_latin1() {
        let bytes = b"Caf\xe9 \x93ok\x94";
        assert_eq!(
            decode_text(bytes),
            ("Café \u{201C}ok\u{201D}".to_string(), TextEncoding::Windows1252)
        );
        let bytes = b"Caf\xe9 \x81";
        assert_eq!(decode_text(bytes), ("Café \u{81}".to_string(), TextEncoding::Latin1));
    }

    #[test]
    fn gates_file_type_and_size() {
        let options = IntakeOptions { max_bytes: 10 };
        assert!(check_upload("movie.SRT", 10, &options).is_ok());
        assert_eq!(
            check_upload("movie.ass", 1, &options),
            Err(ConvertError::UnsupportedFileType("movie.ass".into()))
        );
        assert_eq!(
            check_upload("movie.srt", 11, &options),
            Err(ConvertError::FileTooLarge { size: 11, limit: 10 })
        );
    }

    #[test]
    fn upload_response_carries_filename() {
        let ok = convert_upload("a.srt", SRT.as_bytes(), &IntakeOptions::default());
        assert!(ok.success);
        assert_eq!(ok.filename, "a.srt");
        assert_eq!(ok.subtitle_count, Some(1));
        assert!(ok.content.unwrap().ends_with(",,Café\n"));

        let rejected = convert_upload("a.txt", SRT.as_bytes(), &IntakeOptions::default());
        let json = serde_json::to_value(&rejected).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["filename"], "a.txt");
        assert!(json.get("content").is_none());
        assert!(json["error"].as_str().unwrap().contains("only .srt"));
    }

    #[test]
    fn windows_1252_upload_converts() {
        let bytes = b"1\r\n00:00:01,000 --> 00:00:02,000\r\nCaf\xe9\r\n";
        let res = convert_upload("old.srt", bytes, &IntakeOptions::default());
        assert_eq!(res.subtitle_count, Some(1));
        assert!(res.content.unwrap().ends_with(",,Café\n"));
    }
}
