use crate::types::traits::types::{Month, StartEndDate, Year};
use crate::types::traits::utils::days_in_month;
use chrono::NaiveDate;

/// Anything that can be resolved into an inclusive range of calendar days.
pub trait AnyDate {
    fn get_date_range(self) -> Option<StartEndDate>;
}

impl AnyDate for NaiveDate {
    fn get_date_range(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: self,
            end: self,
        })
    }
}

impl AnyDate for &str {
    fn get_date_range(self) -> Option<StartEndDate> {
        NaiveDate::parse_from_str(self.trim(), "%Y-%m-%d")
            .ok()?
            .get_date_range()
    }
}

impl AnyDate for String {
    fn get_date_range(self) -> Option<StartEndDate> {
        self.as_str().get_date_range()
    }
}

impl AnyDate for Year {
    fn get_date_range(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: NaiveDate::from_ymd_opt(self.0, 1, 1)?,
            end: NaiveDate::from_ymd_opt(self.0, 12, 31)?,
        })
    }
}

impl AnyDate for Month {
    fn get_date_range(self) -> Option<StartEndDate> {
        let year = self.year();
        let month = self.month();
        Some(StartEndDate {
            start: NaiveDate::from_ymd_opt(year, month, 1)?,
            end: NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)?)?,
        })
    }
}

impl AnyDate for StartEndDate {
    fn get_date_range(self) -> Option<StartEndDate> {
        (self.start <= self.end).then_some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_resolves_to_full_month() {
        let range = Month::new(2, 2024).get_date_range().unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn string_dates_parse_iso_only() {
        assert!("2020-01-01".get_date_range().is_some());
        assert!("01/01/2020".get_date_range().is_none());
        assert!(String::from("2020-02-30").get_date_range().is_none());
    }

    #[test]
    fn inverted_span_does_not_resolve() {
        let span = StartEndDate::new(
            NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        );
        assert!(span.get_date_range().is_none());
    }
}
