//! The decoded, not-yet-validated unit of a GHCN-Daily archive: one day position of one
//! monthly record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The value GHCN-Daily uses for "no measurement recorded".
pub const MISSING_VALUE: i32 = -9999;

/// Separator placed between the measurement, quality and source flags in an
/// attribute string.
pub const ATTRIBUTE_SEPARATOR: char = ',';

/// The three single-character annotation codes attached to every day value.
///
/// A blank code in the archive is represented as `None` and rendered as an empty field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flags {
    /// Measurement flag (e.g. `T` for trace precipitation).
    pub measurement: Option<char>,
    /// Quality flag; blank means the value passed all quality checks.
    pub quality: Option<char>,
    /// Source flag identifying the originating data set.
    pub source: Option<char>,
}

impl Flags {
    pub fn new(measurement: Option<char>, quality: Option<char>, source: Option<char>) -> Self {
        Self {
            measurement,
            quality,
            source,
        }
    }

    /// Concatenates the three flags with [`ATTRIBUTE_SEPARATOR`], keeping empty fields,
    /// so a value with only quality flag `0` renders as `",0,"`.
    pub fn attributes(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = |flag: Option<char>| flag.map(String::from).unwrap_or_default();
        write!(
            f,
            "{}{sep}{}{sep}{}",
            field(self.measurement),
            field(self.quality),
            field(self.source),
            sep = ATTRIBUTE_SEPARATOR
        )
    }
}

/// One of the 31 day positions of a decoded archive line.
///
/// `day` is the position within the record and is not checked against the length of the
/// month; see [`crate::DateResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDaySlot {
    /// Station identifier with padding removed (e.g. "USW00014739").
    pub station: String,
    pub year: i32,
    pub month: u32,
    /// Element code with padding removed (e.g. "PRCP", "TMAX").
    pub element: String,
    /// Day position, `1..=31`.
    pub day: u32,
    /// The value as stored, in the element's tenths-based unit; [`MISSING_VALUE`] when absent.
    pub raw_value: i32,
    pub flags: Flags,
}

impl RawDaySlot {
    pub fn is_missing(&self) -> bool {
        self.raw_value == MISSING_VALUE
    }
}
