use crate::daily::decoder::RecordDecoder;
use crate::daily::error::DailyDataError;
use crate::daily::reshaper::Reshaper;
use crate::daily::resolver::{DateResolver, SlotStatus};
use crate::types::frames::daily_table::DailyTable;
use log::{debug, warn};

/// Counters collected while converting one archive. Nothing is dropped silently: every
/// skipped line, discarded slot and overwritten duplicate is accounted for here.
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// Record lines decoded successfully.
    pub records_decoded: usize,
    /// One `MalformedRecord` per skipped line.
    pub malformed_records: Vec<DailyDataError>,
    /// Day slots carrying the missing-value sentinel.
    pub missing_slots: usize,
    /// Day slots with a value on a day that does not exist in their month.
    pub nonexistent_dates: usize,
    /// Observations handed to the reshaper.
    pub observations: usize,
    /// Observations overwritten by a later duplicate.
    pub duplicate_observations: usize,
    /// Station-days dropped by reindexing because they fall outside the range.
    pub outside_range: usize,
}

/// A converted archive together with its [`ConversionReport`].
#[derive(Debug)]
pub struct Converted {
    pub table: DailyTable,
    pub report: ConversionReport,
}

/// Converts the raw bytes of a `.dly` archive into a [`DailyTable`].
///
/// Runs the full decode, validate and reshape pipeline in a single pass over `input`.
/// Malformed lines are skipped and reported.
///
/// # Errors
///
/// * [`DailyDataError::EmptyInput`] when not a single line could be decoded.
/// * [`DailyDataError::DuplicateObservation`] when `reshaper` rejects duplicates.
/// * [`DailyDataError::DataFrameProcessing`] if assembling the table fails.
pub fn convert_dly(input: &[u8], reshaper: &Reshaper) -> Result<Converted, DailyDataError> {
    let resolver = DateResolver::new();
    let mut decoder = RecordDecoder::new(input);
    let mut report = ConversionReport::default();
    let mut observations = Vec::new();

    for slot in decoder.by_ref() {
        match resolver.classify(&slot) {
            SlotStatus::Valid(date) => observations.push(DateResolver::observation(slot, date)),
            SlotStatus::Missing => report.missing_slots += 1,
            SlotStatus::NonexistentDate => report.nonexistent_dates += 1,
        }
    }

    report.records_decoded = decoder.records_decoded();
    report.malformed_records = decoder.into_malformed();
    if report.records_decoded == 0 {
        warn!(
            "No decodable records in {} bytes of input ({} malformed lines)",
            input.len(),
            report.malformed_records.len()
        );
        return Err(DailyDataError::EmptyInput);
    }
    if report.nonexistent_dates > 0 {
        warn!(
            "Discarded {} values recorded on nonexistent dates",
            report.nonexistent_dates
        );
    }

    report.observations = observations.len();
    let reshaped = reshaper.reshape(observations)?;
    report.duplicate_observations = reshaped.duplicate_observations;
    report.outside_range = reshaped.outside_range;

    debug!(
        "Converted {} records ({} malformed) into {} observations, {} rows",
        report.records_decoded,
        report.malformed_records.len(),
        report.observations,
        reshaped.table.height()
    );

    Ok(Converted {
        table: reshaped.table,
        report,
    })
}
