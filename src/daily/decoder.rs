//! Decodes GHCN-Daily `.dly` archives into [`RawDaySlot`]s.
//!
//! Each line of an archive holds one station, one month and one element, followed by 31
//! fixed-width day groups. Fields are located purely by byte offset:
//!
//! | field   | columns  | width |
//! |---------|----------|-------|
//! | station | 0..11    | 11    |
//! | year    | 11..15   | 4     |
//! | month   | 15..17   | 2     |
//! | element | 17..21   | 4     |
//! | day *n* | 21 + 8(n-1) | value 5, mflag 1, qflag 1, sflag 1 |

use crate::daily::error::DailyDataError;
use crate::fixed_width::{FieldError, FixedWidthLine};
use crate::types::day_slot::{Flags, RawDaySlot};
use log::warn;
use std::iter::Enumerate;
use std::slice::Split;

pub const DAYS_PER_RECORD: usize = 31;
const STATION: (usize, usize) = (0, 11);
const YEAR: (usize, usize) = (11, 4);
const MONTH: (usize, usize) = (15, 2);
const ELEMENT: (usize, usize) = (17, 4);
const HEADER_WIDTH: usize = 21;
const DAY_GROUP_WIDTH: usize = 8;
const VALUE_WIDTH: usize = 5;
/// Minimum length of a well-formed record line.
pub const RECORD_WIDTH: usize = HEADER_WIDTH + DAYS_PER_RECORD * DAY_GROUP_WIDTH;

type LineSplit<'a> = Split<'a, u8, fn(&u8) -> bool>;

fn is_newline(byte: &u8) -> bool {
    *byte == b'\n'
}

/// Lazily decodes an in-memory archive into day slots, 31 per record line.
///
/// Malformed lines are skipped and collected; inspect them with [`Self::malformed`] once the
/// iterator is exhausted. Decoding is restartable by constructing a new decoder over the
/// same bytes.
pub struct RecordDecoder<'a> {
    lines: Enumerate<LineSplit<'a>>,
    pending: std::vec::IntoIter<RawDaySlot>,
    records: usize,
    malformed: Vec<DailyDataError>,
}

impl<'a> RecordDecoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let split: LineSplit<'a> = input.split(is_newline as fn(&u8) -> bool);
        Self {
            lines: split.enumerate(),
            pending: Vec::new().into_iter(),
            records: 0,
            malformed: Vec::new(),
        }
    }

    /// Number of lines decoded successfully so far.
    pub fn records_decoded(&self) -> usize {
        self.records
    }

    /// `MalformedRecord` errors for the lines skipped so far.
    pub fn malformed(&self) -> &[DailyDataError] {
        &self.malformed
    }

    pub fn into_malformed(self) -> Vec<DailyDataError> {
        self.malformed
    }
}

impl Iterator for RecordDecoder<'_> {
    type Item = RawDaySlot;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.pending.next() {
                return Some(slot);
            }
            let (index, bytes) = self.lines.next()?;
            let line = FixedWidthLine::new(bytes);
            if line.is_blank() {
                continue;
            }
            match decode_record(&line, index + 1) {
                Ok(slots) => {
                    self.records += 1;
                    self.pending = slots.into_iter();
                }
                Err(e) => {
                    warn!("Skipping archive line: {}", e);
                    self.malformed.push(e);
                }
            }
        }
    }
}

/// Decodes a single record line into its 31 day slots.
///
/// `line_number` is 1-based and only used for error reporting.
pub fn decode_line(line: &str, line_number: usize) -> Result<Vec<RawDaySlot>, DailyDataError> {
    decode_record(&FixedWidthLine::new(line.as_bytes()), line_number)
}

fn decode_record(
    line: &FixedWidthLine<'_>,
    line_number: usize,
) -> Result<Vec<RawDaySlot>, DailyDataError> {
    let malformed = |reason: String| DailyDataError::MalformedRecord {
        line: line_number,
        reason,
    };
    if line.len() < RECORD_WIDTH {
        return Err(malformed(format!(
            "expected at least {} bytes, found {}",
            RECORD_WIDTH,
            line.len()
        )));
    }
    let field_error = |e: FieldError| malformed(e.to_string());

    let station = line.text("station", STATION.0, STATION.1).map_err(field_error)?;
    let year: i32 = line.number("year", YEAR.0, YEAR.1).map_err(field_error)?;
    let month: u32 = line.number("month", MONTH.0, MONTH.1).map_err(field_error)?;
    let element = line.text("element", ELEMENT.0, ELEMENT.1).map_err(field_error)?;

    (0..DAYS_PER_RECORD)
        .map(|position| {
            let offset = HEADER_WIDTH + position * DAY_GROUP_WIDTH;
            let raw_value: i32 = line.number("value", offset, VALUE_WIDTH)?;
            let flags = Flags::new(
                line.flag("mflag", offset + VALUE_WIDTH)?,
                line.flag("qflag", offset + VALUE_WIDTH + 1)?,
                line.flag("sflag", offset + VALUE_WIDTH + 2)?,
            );
            Ok(RawDaySlot {
                station: station.to_string(),
                year,
                month,
                element: element.to_string(),
                day: position as u32 + 1,
                raw_value,
                flags,
            })
        })
        .collect::<Result<Vec<_>, FieldError>>()
        .map_err(field_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{archive, dly_line};
    use crate::types::day_slot::MISSING_VALUE;

    #[test]
    fn decodes_reference_line() -> Result<(), Box<dyn std::error::Error>> {
        let line = dly_line("USW00014739", 1950, 1, "TMAX", &[(283, " 0 "), (-9999, "E  ")]);
        assert_eq!(line.len(), RECORD_WIDTH);
        assert!(line.starts_with("USW00014739195001TMAX  283 0 -9999E  "));

        let slots = decode_line(&line, 1)?;
        assert_eq!(slots.len(), DAYS_PER_RECORD);

        let first = &slots[0];
        assert_eq!(first.station, "USW00014739");
        assert_eq!((first.year, first.month, first.day), (1950, 1, 1));
        assert_eq!(first.element, "TMAX");
        assert_eq!(first.raw_value, 283);
        assert_eq!(first.flags, Flags::new(None, Some('0'), None));

        let second = &slots[1];
        assert_eq!(second.day, 2);
        assert!(second.is_missing());
        assert_eq!(second.flags.measurement, Some('E'));

        assert_eq!(slots[30].day, 31);
        assert_eq!(slots[30].raw_value, MISSING_VALUE);
        Ok(())
    }

    #[test]
    fn header_fields_re_encode_to_original_columns() -> Result<(), Box<dyn std::error::Error>> {
        for (station, year, month, element) in [
            ("USW00014739", 1950, 1, "TMAX"),
            ("ASN00008039", 2023, 12, "PRCP"),
            ("CA001012475", 1899, 2, "WT16"),
        ] {
            let line = dly_line(station, year, month, element, &[(0, "   ")]);
            let slot = &decode_line(&line, 1)?[0];
            let encoded = format!(
                "{:<11}{:04}{:02}{:<4}",
                slot.station, slot.year, slot.month, slot.element
            );
            assert_eq!(encoded, line[..HEADER_WIDTH]);
        }
        Ok(())
    }

    #[test]
    fn short_line_is_malformed() {
        let line = dly_line("USW00014739", 1950, 1, "TMAX", &[]);
        let err = decode_line(&line[..200], 7).unwrap_err();
        match err {
            DailyDataError::MalformedRecord { line, reason } => {
                assert_eq!(line, 7);
                assert!(reason.contains("269"), "unexpected reason: {}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn non_numeric_fields_are_malformed() {
        let mut line = dly_line("USW00014739", 1950, 1, "TMAX", &[(12, "   ")]);
        line.replace_range(11..15, "19X0");
        assert!(matches!(
            decode_line(&line, 3),
            Err(DailyDataError::MalformedRecord { line: 3, .. })
        ));

        let mut line = dly_line("USW00014739", 1950, 1, "TMAX", &[(12, "   ")]);
        line.replace_range(29..34, "  1.5");
        assert!(decode_line(&line, 4).is_err());
    }

    #[test]
    fn decoder_skips_bad_lines_and_counts_them() {
        let good_a = dly_line("USW00014739", 1950, 1, "TMAX", &[(283, " 0 ")]);
        let good_b = dly_line("USW00014739", 1950, 1, "PRCP", &[(0, "  X")]);
        let input = archive(&[
            good_a,
            "USW00014739195001TMIN  garbage".to_string(),
            String::new(),
            good_b,
        ]);

        let mut decoder = RecordDecoder::new(&input);
        let slots: Vec<RawDaySlot> = decoder.by_ref().collect();

        assert_eq!(slots.len(), 2 * DAYS_PER_RECORD);
        assert_eq!(decoder.records_decoded(), 2);
        assert_eq!(decoder.malformed().len(), 1);
        assert!(matches!(
            decoder.malformed()[0],
            DailyDataError::MalformedRecord { line: 2, .. }
        ));
        assert_eq!(slots[DAYS_PER_RECORD].element, "PRCP");
    }

    #[test]
    fn decoder_handles_crlf_and_missing_final_newline() {
        let line = dly_line("USW00014739", 1950, 1, "TMAX", &[(283, " 0 ")]);
        let input = format!("{}\r\n{}", line, line);
        let mut decoder = RecordDecoder::new(input.as_bytes());
        assert_eq!(decoder.by_ref().count(), 2 * DAYS_PER_RECORD);
        assert!(decoder.malformed().is_empty());
    }

    #[test]
    fn decoding_is_restartable() {
        let input = archive(&[dly_line("USW00014739", 1950, 1, "TMAX", &[(283, " 0 ")])]);
        let first: Vec<_> = RecordDecoder::new(&input).collect();
        let second: Vec<_> = RecordDecoder::new(&input).collect();
        assert_eq!(first, second);
    }
}
