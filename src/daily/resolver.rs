use crate::types::day_slot::RawDaySlot;
use crate::types::observation::Observation;
use crate::types::traits::utils::days_in_month;
use chrono::NaiveDate;

/// Why a day slot did or did not become an [`Observation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Valid(NaiveDate),
    /// The slot carries the missing-value sentinel.
    Missing,
    /// The (year, month, day) triple is not a calendar date, e.g. February 30.
    NonexistentDate,
}

/// Turns raw day slots into dated observations.
///
/// A slot is valid when its value is not the sentinel *and* its day exists in its month
/// under the proleptic Gregorian calendar. The calendar check is applied even though the
/// archive normally marks impossible days as missing, so a slot that carries a value on
/// such a day is still discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateResolver;

impl DateResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, slot: &RawDaySlot) -> SlotStatus {
        if slot.is_missing() {
            return SlotStatus::Missing;
        }
        let in_month = days_in_month(slot.year, slot.month).is_some_and(|days| slot.day <= days);
        if slot.day == 0 || !in_month {
            return SlotStatus::NonexistentDate;
        }
        match NaiveDate::from_ymd_opt(slot.year, slot.month, slot.day) {
            Some(date) => SlotStatus::Valid(date),
            None => SlotStatus::NonexistentDate,
        }
    }

    pub fn resolve(&self, slot: RawDaySlot) -> Option<Observation> {
        match self.classify(&slot) {
            SlotStatus::Valid(date) => Some(Self::observation(slot, date)),
            SlotStatus::Missing | SlotStatus::NonexistentDate => None,
        }
    }

    /// Builds the observation for a slot already classified as [`SlotStatus::Valid`].
    pub(crate) fn observation(slot: RawDaySlot, date: NaiveDate) -> Observation {
        Observation {
            attributes: slot.flags.attributes(),
            station: slot.station,
            date,
            element: slot.element,
            value: slot.raw_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::day_slot::{Flags, MISSING_VALUE};

    fn slot(year: i32, month: u32, day: u32, raw_value: i32) -> RawDaySlot {
        RawDaySlot {
            station: "USW00014739".to_string(),
            year,
            month,
            element: "TMAX".to_string(),
            day,
            raw_value,
            flags: Flags::new(None, Some('0'), None),
        }
    }

    #[test]
    fn valid_slot_becomes_observation() {
        let observation = DateResolver::new().resolve(slot(1950, 1, 1, 283)).unwrap();
        assert_eq!(observation.date, NaiveDate::from_ymd_opt(1950, 1, 1).unwrap());
        assert_eq!(observation.value, 283);
        assert_eq!(observation.attributes, ",0,");
        assert_eq!(observation.element, "TMAX");
    }

    #[test]
    fn sentinel_is_always_dropped() {
        let resolver = DateResolver::new();
        for day in 1..=31 {
            assert_eq!(resolver.resolve(slot(1950, 1, day, MISSING_VALUE)), None);
        }
        assert_eq!(resolver.classify(&slot(1950, 2, 30, MISSING_VALUE)), SlotStatus::Missing);
    }

    #[test]
    fn impossible_days_are_dropped_even_with_values() {
        let resolver = DateResolver::new();
        assert_eq!(resolver.classify(&slot(1950, 2, 29, 0)), SlotStatus::NonexistentDate);
        assert_eq!(resolver.classify(&slot(1950, 4, 31, 12)), SlotStatus::NonexistentDate);
        assert_eq!(resolver.classify(&slot(1950, 13, 1, 12)), SlotStatus::NonexistentDate);
        assert_eq!(resolver.classify(&slot(1950, 1, 0, 12)), SlotStatus::NonexistentDate);
        assert!(resolver.resolve(slot(2000, 2, 29, 0)).is_some());
    }

    #[test]
    fn every_real_date_with_a_value_resolves() {
        let resolver = DateResolver::new();
        for month in 1..=12 {
            let days = days_in_month(2024, month).unwrap();
            for day in 1..=31 {
                let resolved = resolver.resolve(slot(2024, month, day, 5)).is_some();
                assert_eq!(resolved, day <= days, "2024-{month:02}-{day:02}");
            }
        }
    }
}
