use crate::types::frames::daily_table::{DATE_COLUMN, STATION_COLUMN};
use chrono::NaiveDate;
use polars::prelude::{col, lit, DataType, LazyFrame};

pub trait GhcndFrameFilterExt {
    /// Filters a daily LazyFrame by a NaiveDate range (inclusive).
    /// Assumes the 'date' column is a `Date` or an ISO 'YYYY-MM-DD' string.
    ///
    /// # Arguments
    /// * `start_date`: The start NaiveDate (inclusive).
    /// * `end_date`: The end NaiveDate (inclusive).
    ///
    /// # Returns
    /// A new `LazyFrame` with the filter applied. Potential parsing errors
    /// occur during execution (e.g., `collect`).
    fn filter_dates(self, start_date: NaiveDate, end_date: NaiveDate) -> LazyFrame;

    /// Keeps only the rows of one station.
    fn filter_station(self, station: &str) -> LazyFrame;
}

impl GhcndFrameFilterExt for LazyFrame {
    fn filter_dates(self, start_date: NaiveDate, end_date: NaiveDate) -> LazyFrame {
        self.filter(
            col(DATE_COLUMN)
                .cast(DataType::Date)
                .gt_eq(lit(start_date))
                .and(col(DATE_COLUMN).cast(DataType::Date).lt_eq(lit(end_date))),
        )
    }

    fn filter_station(self, station: &str) -> LazyFrame {
        self.filter(col(STATION_COLUMN).eq(lit(station.to_string())))
    }
}
