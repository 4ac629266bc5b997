//! Pivots long-form observations into the wide daily table.
//!
//! Observations are grouped by `(station, date)` and then by element. Each element `E`
//! contributes a value column `E` and an annotation column `E_ATTRIBUTES`; the set of
//! element columns is the union over the whole input, so stations or days without a given
//! element simply hold nulls there.

use crate::daily::error::DailyDataError;
use crate::types::frames::daily_table::{DailyTable, ATTRIBUTES_SUFFIX, DATE_COLUMN, STATION_COLUMN};
use crate::types::observation::Observation;
use crate::types::traits::types::StartEndDate;
use bon::bon;
use chrono::NaiveDate;
use log::{debug, warn};
use polars::prelude::*;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// What to do when the input holds more than one observation for the same station, date
/// and element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DuplicatePolicy {
    /// Keep the observation seen last and count the overwritten ones.
    #[default]
    LastWins,
    /// Fail with [`DailyDataError::DuplicateObservation`] on the first duplicate.
    Reject,
}

/// Output of [`Reshaper::reshape`].
#[derive(Debug, Clone)]
pub struct Reshaped {
    pub table: DailyTable,
    /// Observations overwritten under [`DuplicatePolicy::LastWins`].
    pub duplicate_observations: usize,
    /// Station-days left out because they fall outside the reindexing range.
    pub outside_range: usize,
}

#[derive(Debug, Clone)]
struct Cell {
    value: i32,
    attributes: String,
}

type RowKey = (String, NaiveDate);

#[derive(Debug, Clone, Default)]
pub struct Reshaper {
    date_range: Option<StartEndDate>,
    duplicates: DuplicatePolicy,
}

#[bon]
impl Reshaper {
    /// Configures a reshaper.
    ///
    /// * `date_range` - when set, every station in the output gets exactly one row for each
    ///   day of the range (inclusive); days without observations become rows whose element
    ///   columns are all null, and observations outside the range are left out.
    /// * `duplicates` - the [`DuplicatePolicy`], last-wins by default.
    #[builder]
    pub fn new(date_range: Option<StartEndDate>, #[builder(default)] duplicates: DuplicatePolicy) -> Self {
        Self {
            date_range,
            duplicates,
        }
    }

    /// Groups and pivots `observations` into a [`DailyTable`].
    ///
    /// Input order does not matter, except that under [`DuplicatePolicy::LastWins`] the
    /// later of two duplicate observations is kept. Rows are ordered by station, then date;
    /// columns are `station`, `date`, then the element columns sorted by name.
    pub fn reshape<I>(&self, observations: I) -> Result<Reshaped, DailyDataError>
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut rows: BTreeMap<RowKey, BTreeMap<String, Cell>> = BTreeMap::new();
        let mut elements: BTreeSet<String> = BTreeSet::new();
        let mut duplicate_observations = 0;

        for observation in observations {
            if !elements.contains(&observation.element) {
                elements.insert(observation.element.clone());
            }
            let row = rows
                .entry((observation.station.clone(), observation.date))
                .or_default();
            let cell = Cell {
                value: observation.value,
                attributes: observation.attributes,
            };
            match row.entry(observation.element) {
                Entry::Vacant(entry) => {
                    entry.insert(cell);
                }
                Entry::Occupied(mut entry) => {
                    if self.duplicates == DuplicatePolicy::Reject {
                        return Err(DailyDataError::DuplicateObservation {
                            station: observation.station,
                            date: observation.date,
                            element: entry.key().clone(),
                        });
                    }
                    debug!(
                        "Duplicate {} for {} on {}, keeping the later value",
                        entry.key(),
                        observation.station,
                        observation.date
                    );
                    entry.insert(cell);
                    duplicate_observations += 1;
                }
            }
        }

        if duplicate_observations > 0 {
            warn!(
                "Overwrote {} duplicate observations while reshaping",
                duplicate_observations
            );
        }

        let outside_range = self.count_outside_range(&rows);
        if outside_range > 0 {
            debug!("Left out {} station-days outside the reindexing range", outside_range);
        }
        let keys = self.row_keys(&rows);
        let frame = build_frame(&keys, &rows, &elements)?;
        debug!(
            "Reshaped {} station-days into {} rows x {} columns",
            rows.len(),
            frame.height(),
            frame.width()
        );

        Ok(Reshaped {
            table: DailyTable::new(frame),
            duplicate_observations,
            outside_range,
        })
    }

    fn count_outside_range(&self, rows: &BTreeMap<RowKey, BTreeMap<String, Cell>>) -> usize {
        self.date_range.map_or(0, |range| {
            rows.keys()
                .filter(|(_, date)| !range.contains(*date))
                .count()
        })
    }

    /// The output rows in order: observed keys, or every station crossed with every day of
    /// the requested range.
    fn row_keys(&self, rows: &BTreeMap<RowKey, BTreeMap<String, Cell>>) -> Vec<RowKey> {
        match self.date_range {
            None => rows.keys().cloned().collect(),
            Some(range) => {
                let stations: BTreeSet<&String> = rows.keys().map(|(station, _)| station).collect();
                stations
                    .into_iter()
                    .flat_map(|station| range.dates().map(move |date| (station.clone(), date)))
                    .collect()
            }
        }
    }
}

/// Value and attribute column names for `elements`, sorted by name.
pub fn element_column_names<'a, I>(elements: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut names: Vec<String> = elements
        .into_iter()
        .flat_map(|element| [element.clone(), format!("{}{}", element, ATTRIBUTES_SUFFIX)])
        .collect();
    names.sort();
    names
}

fn build_frame(
    keys: &[RowKey],
    rows: &BTreeMap<RowKey, BTreeMap<String, Cell>>,
    elements: &BTreeSet<String>,
) -> Result<DataFrame, DailyDataError> {
    let row_cells: Vec<Option<&BTreeMap<String, Cell>>> = keys.iter().map(|key| rows.get(key)).collect();
    let stations: Vec<&str> = keys.iter().map(|(station, _)| station.as_str()).collect();
    let dates = DateChunked::from_naive_date(DATE_COLUMN.into(), keys.iter().map(|(_, date)| *date));

    let mut columns = Vec::with_capacity(2 * elements.len() + 2);
    columns.push(Column::new(STATION_COLUMN.into(), stations));
    columns.push(Column::from(dates.into_series()));
    for element in elements {
        let cells: Vec<Option<&Cell>> = row_cells
            .iter()
            .map(|cells| cells.and_then(|cells| cells.get(element)))
            .collect();
        let values: Vec<Option<i32>> = cells.iter().map(|cell| cell.map(|c| c.value)).collect();
        let attributes: Vec<Option<&str>> = cells
            .iter()
            .map(|cell| cell.map(|c| c.attributes.as_str()))
            .collect();
        columns.push(Column::new(element.as_str().into(), values));
        columns.push(Column::new(
            format!("{}{}", element, ATTRIBUTES_SUFFIX).into(),
            attributes,
        ));
    }

    // `PRCPX` sorts before `PRCP_ATTRIBUTES`, so the pairwise push order is not final.
    let order = [STATION_COLUMN.to_string(), DATE_COLUMN.to_string()]
        .into_iter()
        .chain(element_column_names(elements));
    Ok(DataFrame::new(columns)?.select(order)?)
}
