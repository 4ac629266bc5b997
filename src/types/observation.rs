use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A validated day value: a sentinel-free measurement on a real calendar date.
///
/// `value` keeps the archive's scaling (tenths of mm, tenths of °C, ...); callers apply
/// units themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub station: String,
    pub date: NaiveDate,
    pub element: String,
    pub value: i32,
    /// Measurement, quality and source flags joined by `,` (e.g. `",0,"`).
    pub attributes: String,
}
