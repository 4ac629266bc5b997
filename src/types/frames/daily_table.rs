//! Contains the `DailyTable` structure, the wide per-station, per-day table produced by the
//! reshaping pipeline.

use crate::daily::error::DailyDataError;
use crate::filtering::GhcndFrameFilterExt;
use crate::types::traits::any::any_date::AnyDate;
use crate::types::traits::period::date_period::DatePeriod;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

pub const STATION_COLUMN: &str = "station";
pub const DATE_COLUMN: &str = "date";
/// Suffix of the column holding an element's joined flags, e.g. `PRCP_ATTRIBUTES`.
pub const ATTRIBUTES_SUFFIX: &str = "_ATTRIBUTES";

/// A wide table of daily GHCN observations.
///
/// Rows are keyed by `(station, date)` and are unique. After the identifying `station`
/// (String) and `date` (Date) columns come, sorted by name, one nullable Int32 column per
/// element and one nullable String column `<ELEMENT>_ATTRIBUTES` holding its
/// measurement, quality and source flags. Which elements appear depends entirely on the
/// source archive, so consumers should inspect [`DailyTable::columns`] rather than assume
/// a fixed schema.
///
/// Values keep the archive's scaling, e.g. tenths of a millimetre for `PRCP` and tenths of
/// a degree Celsius for `TMAX`.
///
/// # Errors
///
/// Filtering methods collect a lazy query and can return
/// [`DailyDataError::DataFrameProcessing`]; date-based methods return
/// [`DailyDataError::DateParsingError`] when their inputs do not resolve to dates.
#[derive(Debug, Clone)]
pub struct DailyTable {
    /// The underlying Polars DataFrame.
    pub frame: DataFrame,
}

impl DailyTable {
    /// Wraps a DataFrame assumed to follow the table layout described above.
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// All column names in table order.
    pub fn columns(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Element value columns (e.g. `PRCP`, `TMAX`), without identifiers or attributes.
    pub fn value_columns(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|name| !is_identifier(name) && !name.ends_with(ATTRIBUTES_SUFFIX))
            .collect()
    }

    pub fn attribute_columns(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|name| name.ends_with(ATTRIBUTES_SUFFIX))
            .collect()
    }

    /// The station of every row, in row order.
    pub fn stations(&self) -> Result<Vec<String>, DailyDataError> {
        let column = self.column(STATION_COLUMN)?;
        Ok(column
            .str()?
            .into_iter()
            .map(|station| station.unwrap_or_default().to_string())
            .collect())
    }

    /// The date of every row, in row order.
    pub fn dates(&self) -> Result<Vec<NaiveDate>, DailyDataError> {
        self.column(DATE_COLUMN)?
            .as_materialized_series()
            .date()?
            .as_date_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(DailyDataError::DateParsingError)
    }

    /// Filters the rows with a Polars predicate expression.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use ghcnd::{DailyTable, DailyDataError};
    /// use polars::prelude::{col, lit};
    ///
    /// # fn run(table: DailyTable) -> Result<(), DailyDataError> {
    /// // Days with more than 10 mm of precipitation (the archive stores tenths of mm).
    /// let wet_days = table.filter(col("PRCP").gt(lit(100)))?;
    /// println!("{}", wet_days.frame);
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter(&self, predicate: Expr) -> Result<DailyTable, DailyDataError> {
        let frame = self.frame.clone().lazy().filter(predicate).collect()?;
        Ok(DailyTable::new(frame))
    }

    /// Keeps the rows dated within `start..=end`.
    ///
    /// Both bounds accept anything implementing [`AnyDate`]: a `NaiveDate`, an ISO date
    /// string, a [`crate::Month`] or a [`crate::Year`]. The start bound uses the beginning
    /// of its range and the end bound the end of its range, so
    /// `get_range(Year(2020), Year(2021))` spans both years completely.
    pub fn get_range(
        &self,
        start: impl AnyDate,
        end: impl AnyDate,
    ) -> Result<DailyTable, DailyDataError> {
        let start_naive = start
            .get_date_range()
            .ok_or(DailyDataError::DateParsingError)?
            .start;
        let end_naive = end
            .get_date_range()
            .ok_or(DailyDataError::DateParsingError)?
            .end;
        let frame = self
            .frame
            .clone()
            .lazy()
            .filter_dates(start_naive, end_naive)
            .collect()?;
        Ok(DailyTable::new(frame))
    }

    /// Keeps the rows of a single day; when `date` resolves to a longer range its first day
    /// is used.
    pub fn get_at(&self, date: impl AnyDate) -> Result<DailyTable, DailyDataError> {
        let naive_date = date
            .get_date_range()
            .ok_or(DailyDataError::DateParsingError)?
            .start;
        self.get_range(naive_date, naive_date)
    }

    /// Keeps the rows dated within a [`DatePeriod`], such as a [`crate::Year`].
    pub fn get_for_period(&self, period: impl DatePeriod) -> Result<DailyTable, DailyDataError> {
        let date_period = period
            .get_date_period()
            .ok_or(DailyDataError::DateParsingError)?;
        self.get_range(date_period.start, date_period.end)
    }

    /// Keeps the rows of one station.
    pub fn for_station(&self, station: &str) -> Result<DailyTable, DailyDataError> {
        let frame = self.frame.clone().lazy().filter_station(station).collect()?;
        Ok(DailyTable::new(frame))
    }

    /// Selects columns by name. `station` and `date` are always kept and stay first; the
    /// remaining columns follow in the order requested.
    pub fn select<I, S>(&self, columns: I) -> Result<DailyTable, DailyDataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection: Vec<String> = vec![STATION_COLUMN.to_string(), DATE_COLUMN.to_string()];
        for name in columns {
            let name = name.as_ref();
            if !selection.iter().any(|selected| selected == name) {
                self.column(name)?;
                selection.push(name.to_string());
            }
        }
        Ok(DailyTable::new(self.frame.select(selection)?))
    }

    /// Removes element and attribute columns that hold no value at all.
    pub fn drop_empty_columns(&self) -> Result<DailyTable, DailyDataError> {
        let keep: Vec<String> = self
            .frame
            .get_columns()
            .iter()
            .filter(|column| {
                is_identifier(column.name()) || column.null_count() < column.len()
            })
            .map(|column| column.name().to_string())
            .collect();
        Ok(DailyTable::new(self.frame.select(keep)?))
    }

    /// Writes the table as comma-separated text with a header row. Absent values are
    /// written as empty fields and dates as `YYYY-MM-DD`.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), DailyDataError> {
        let mut frame = self.frame.clone();
        CsvWriter::new(writer)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut frame)?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, DailyDataError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Persists the table as a CSV file at `path`, replacing any existing file.
    pub fn save_csv(&self, path: &Path) -> Result<(), DailyDataError> {
        let file = File::create(path)
            .map_err(|e| DailyDataError::CsvWriteIo(path.to_path_buf(), e))?;
        let mut writer = BufWriter::new(file);
        self.write_csv(&mut writer)?;
        writer
            .flush()
            .map_err(|e| DailyDataError::CsvWriteIo(path.to_path_buf(), e))
    }

    /// Reads a table persisted with [`Self::save_csv`], restoring column types from the
    /// naming convention.
    pub fn read_csv(path: &Path) -> Result<DailyTable, DailyDataError> {
        let frame = csv_options()
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| DailyDataError::CsvRead(path.to_path_buf(), e))?
            .finish()
            .map_err(|e| DailyDataError::CsvRead(path.to_path_buf(), e))?;
        restore_schema(frame)
    }

    pub fn from_csv_bytes(bytes: Vec<u8>) -> Result<DailyTable, DailyDataError> {
        let frame = csv_options()
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;
        restore_schema(frame)
    }

    fn column(&self, name: &str) -> Result<&Column, DailyDataError> {
        self.frame
            .column(name)
            .map_err(|e| DailyDataError::ColumnNotFound(name.to_string(), e))
    }
}

fn is_identifier(name: &str) -> bool {
    name == STATION_COLUMN || name == DATE_COLUMN
}

fn csv_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|options| options.with_try_parse_dates(true))
}

fn restore_schema(frame: DataFrame) -> Result<DailyTable, DailyDataError> {
    let casts: Vec<Expr> = frame
        .get_column_names()
        .into_iter()
        .map(|name| {
            let dtype = if name.as_str() == DATE_COLUMN {
                DataType::Date
            } else if name.as_str() == STATION_COLUMN || name.ends_with(ATTRIBUTES_SUFFIX) {
                DataType::String
            } else {
                DataType::Int32
            };
            col(name.clone()).cast(dtype)
        })
        .collect();
    let frame = frame.lazy().with_columns(casts).collect()?;
    Ok(DailyTable::new(frame))
}
