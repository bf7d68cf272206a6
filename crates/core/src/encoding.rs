//! Repair of Vietnamese subtitle text that was saved as UTF-8 but later decoded
//! as Windows-1252, e.g. `Viá»‡t` instead of `Việt`.
//!
//! The replacement table is derived once from the Vietnamese alphabet and a
//! handful of punctuation marks: every character is encoded to UTF-8 and those
//! bytes are decoded as Windows-1252 to get the corrupted form. All corrupted
//! forms are then matched in a single pass, longest first, so a repaired
//! character is never fed back into another replacement.

use encoding_rs::WINDOWS_1252;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::trace;

/// Lower and upper case Vietnamese letters that need more than one UTF-8 byte.
const VIETNAMESE_LETTERS: &str = concat!(
    "àáảãạăằắẳẵặâầấẩẫậđèéẻẽẹêềếểễệìíỉĩịòóỏõọôồốổỗộơờớởỡợùúủũụưừứửữựỳýỷỹỵ",
    "ÀÁẢÃẠĂẰẮẲẴẶÂẦẤẨẪẬĐÈÉẺẼẸÊỀẾỂỄỆÌÍỈĨỊÒÓỎÕỌÔỒỐỔỖỘƠỜỚỞỠỢÙÚỦŨỤƯỪỨỬỮỰỲÝỶỸỴ",
);

/// Typographic punctuation that shows up corrupted next to the letters.
const PUNCTUATION: &str = "\u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}\u{2026}\u{2022}";

/// A single corrupted sequence and the character it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    pub corrupted: String,
    pub fixed: char,
}

struct RepairTable {
    pattern: Regex,
    lookup: HashMap<String, char>,
}

static TABLE: LazyLock<RepairTable> = LazyLock::new(|| {
    let repairs = repairs();
    let alternation = repairs
        .iter()
        .map(|r| regex::escape(&r.corrupted))
        .collect::<Vec<_>>()
        .join("|");
    RepairTable {
        // The alternation is built from escaped literals only.
        pattern: Regex::new(&alternation).expect("escaped literals always compile"),
        lookup: repairs.into_iter().map(|r| (r.corrupted, r.fixed)).collect(),
    }
});

/// Build the ordered replacement table.
/// Entries are sorted longest first; ties keep alphabet order.
pub fn repairs() -> Vec<Repair> {
    let mut out: Vec<Repair> = VIETNAMESE_LETTERS
        .chars()
        .chain(PUNCTUATION.chars())
        .map(|fixed| {
            let mut buf = [0u8; 4];
            let bytes = fixed.encode_utf8(&mut buf).as_bytes();
            let (corrupted, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            Repair {
                corrupted: corrupted.into_owned(),
                fixed,
            }
        })
        .collect();
    out.sort_by(|a, b| b.corrupted.chars().count().cmp(&a.corrupted.chars().count()));
    out
}

/// Replace every known corrupted sequence in `text` with its real character.
/// Text without corruption is returned unchanged.
pub fn fix(text: &str) -> String {
    let table = &*TABLE;
    if !table.pattern.is_match(text) {
        return text.to_string();
    }
    trace!("fix: repairing mojibake in {} bytes", text.len());
    table
        .pattern
        .replace_all(text, |caps: &regex::Captures| {
            let found = &caps[0];
            table
                .lookup
                .get(found)
                .map(|c| c.to_string())
                .unwrap_or_else(|| found.to_string())
        })
        .into_owned()
}
