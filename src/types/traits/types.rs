use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Year(pub i32);
impl Year {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl Display for Year {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Month(pub i32, pub u32);
impl Month {
    pub fn year(self) -> i32 {
        self.0
    }
    pub fn month(self) -> u32 {
        self.1
    }
    pub fn new(month: u32, year: i32) -> Self {
        Self(year, month)
    }
    pub fn get(self) -> u32 {
        self.1
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0, self.1)
    }
}

/// An inclusive span of calendar days.
///
/// Used both for filtering a [`crate::DailyTable`] and for reindexing the reshaped
/// output onto a fixed daily cadence.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StartEndDate {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StartEndDate {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the span; zero when `end` precedes `start`.
    pub fn len(&self) -> usize {
        let days = (self.end - self.start).num_days() + 1;
        days.max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every calendar day from `start` through `end`, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.len() as i64).map(move |offset| start + Duration::days(offset))
    }
}

impl Display for StartEndDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        let range = StartEndDate::new(
            NaiveDate::from_ymd_opt(2020, 2, 27).unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
        );
        assert_eq!(range.len(), 4);
        assert!(range.contains(range.start));
        assert!(range.contains(range.end));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2020, 3, 2).unwrap()));
        assert!(range.dates().all(|date| range.contains(date)));

        let inverted = StartEndDate::new(range.end, range.start);
        assert!(inverted.is_empty());
        assert!(!inverted.contains(range.start));
    }
}
