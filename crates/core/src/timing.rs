//! Duration checks run after parsing.

use crate::srt::SubtitleRecord;
use crate::timestamp::AssTimestamp;
use tracing::{trace, warn};

/// Duration given to a cue whose end is not after its start, in centiseconds.
pub const MIN_DURATION_CENTIS: u64 = 100;

/// Make sure every record ends strictly after it starts.
///
/// Records with `end <= start` get `end = start + 1s`. Records are corrected
/// in place and never dropped; if the corrected end cannot be represented the
/// record is passed through unchanged.
pub fn validate(mut records: Vec<SubtitleRecord>) -> Vec<SubtitleRecord> {
    trace!("validate records={}", records.len());
    for record in records.iter_mut() {
        let start = record.start.total_centis();
        if record.end.total_centis() > start {
            continue;
        }
        let extended = start
            .checked_add(MIN_DURATION_CENTIS)
            .and_then(AssTimestamp::from_total_centis);
        match extended {
            Some(end) => {
                warn!(
                    "cue {}: end {} is not after start {}, extending to {end}",
                    record.index, record.end, record.start
                );
                record.end = end;
            }
            None => warn!(
                "cue {}: cannot extend end past {}, leaving as is",
                record.index, record.start
            ),
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::CueStyle;

    fn record(index: u32, start: &str, end: &str) -> SubtitleRecord {
        SubtitleRecord {
            index,
            start: AssTimestamp::parse(start).unwrap(),
            end: AssTimestamp::parse(end).unwrap(),
            text: "x".into(),
            original_text: "x".into(),
            style: CueStyle::Default,
        }
    }

    #[test]
    fn extends_backwards_cue_by_one_second() {
        let out = validate(vec![record(1, "0:00:05.00", "0:00:03.00")]);
        assert_eq!(out[0].end.to_string(), "0:00:06.00");
    }

    #[test]
    fn extends_zero_length_cue_across_minute() {
        let out = validate(vec![record(1, "0:00:59.50", "0:00:59.50")]);
        assert_eq!(out[0].end.to_string(), "0:01:00.50");
    }

    #[test]
    fn leaves_valid_cues_alone() {
        let input = vec![record(2, "0:00:01.00", "0:00:01.01"), record(1, "0:00:00.00", "0:00:02.00")];
        let out = validate(input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn unrepresentable_end_is_left_unchanged() {
        let mut cue = record(1, "0:00:00.00", "0:00:00.00");
        cue.start = AssTimestamp {
            hours: u32::MAX,
            minutes: 59,
            seconds: 59,
            centis: 99,
        };
        let out = validate(vec![cue.clone()]);
        assert_eq!(out[0], cue);
    }
}
