mod archive;
mod daily;
mod error;
mod filtering;
mod fixed_width;
#[cfg(test)]
mod fixtures;
mod ghcnd;
mod stations;
mod types;
mod utils;

pub use error::GhcndError;
pub use ghcnd::*;

pub use daily::decoder::{decode_line, RecordDecoder, DAYS_PER_RECORD, RECORD_WIDTH};
pub use daily::pipeline::{convert_dly, ConversionReport, Converted};
pub use daily::reshaper::{element_column_names, DuplicatePolicy, Reshaped, Reshaper};
pub use daily::resolver::{DateResolver, SlotStatus};

pub use types::day_slot::{Flags, RawDaySlot, ATTRIBUTE_SEPARATOR, MISSING_VALUE};
pub use types::frames::daily_table::*;
pub use types::observation::Observation;
pub use types::station::*;

pub use types::traits::any::any_date::AnyDate;
pub use types::traits::period::date_period::DatePeriod;
pub use types::traits::types::{Month, StartEndDate, Year};
pub use types::traits::utils::days_in_month;

pub use filtering::GhcndFrameFilterExt;
pub use stations::station_index::{filter_stations, StationIndex};

pub use archive::loader::{ArchiveFile, ArchiveLoader, DEFAULT_BASE_URL, STATION_LIST_FILE};

pub use archive::error::FetchError;
pub use daily::error::DailyDataError;
pub use stations::error::StationIndexError;
