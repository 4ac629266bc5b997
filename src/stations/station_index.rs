//! Loads the fixed-width GHCN-Daily station list and answers name/region queries over it.
//!
//! Field layout, by byte offset (widths 11, 9, 10, 7, 3, 31, 4, 4, 6):
//! id, latitude, longitude, elevation, region (state), name, GSN flag, HCN/CRN flag, WMO id.
//! Each field after the id carries its leading separator blank, which trimming removes.

use crate::fixed_width::{FieldError, FixedWidthLine};
use crate::stations::error::StationIndexError;
use crate::types::station::{Location, Networks, StationRecord};
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{debug, warn};
use std::path::Path;

const ID: (usize, usize) = (0, 11);
const LATITUDE: (usize, usize) = (11, 9);
const LONGITUDE: (usize, usize) = (20, 10);
const ELEVATION: (usize, usize) = (30, 7);
const REGION: (usize, usize) = (37, 3);
const NAME: (usize, usize) = (40, 31);
const GSN: (usize, usize) = (71, 4);
const HCN: (usize, usize) = (75, 4);
const WMO: (usize, usize) = (79, 6);

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// The stations of one station list, in file order.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    stations: Vec<StationRecord>,
    malformed_lines: usize,
}

impl StationIndex {
    /// Parses the raw bytes of `ghcnd-stations.txt`.
    ///
    /// Lines whose identifier or coordinates cannot be decoded are skipped and counted.
    /// The trailing name and network columns may be cut short, as publishers strip
    /// trailing blanks.
    ///
    /// # Errors
    ///
    /// [`StationIndexError::EmptyInput`] when no line yields a station.
    pub fn load(input: &[u8]) -> Result<Self, StationIndexError> {
        let mut stations = Vec::new();
        let mut malformed_lines = 0;
        for (index, bytes) in input.split(|byte| *byte == b'\n').enumerate() {
            let line = FixedWidthLine::new(bytes);
            if line.is_blank() {
                continue;
            }
            match parse_station(&line) {
                Ok(station) => stations.push(station),
                Err(e) => {
                    warn!("Skipping station line {}: {}", index + 1, e);
                    malformed_lines += 1;
                }
            }
        }
        if stations.is_empty() {
            return Err(StationIndexError::EmptyInput);
        }
        debug!(
            "Loaded {} stations ({} malformed lines)",
            stations.len(),
            malformed_lines
        );
        Ok(Self {
            stations,
            malformed_lines,
        })
    }

    pub fn from_records(stations: Vec<StationRecord>) -> Self {
        Self {
            stations,
            malformed_lines: 0,
        }
    }

    pub fn stations(&self) -> &[StationRecord] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Lines skipped by [`Self::load`].
    pub fn malformed_lines(&self) -> usize {
        self.malformed_lines
    }

    /// Looks up a station by its exact identifier.
    pub fn get(&self, id: &str) -> Option<&StationRecord> {
        self.stations.iter().find(|station| station.id == id)
    }

    /// Stations whose name starts with `name_prefix` (case-insensitive) and, when given,
    /// whose region code equals `region` exactly. See [`filter_stations`].
    pub fn filter(&self, name_prefix: &str, region: Option<&str>) -> Vec<&StationRecord> {
        filter_stations(&self.stations, name_prefix, region)
    }

    /// Reads an index previously written with [`Self::write_cache`].
    pub fn read_cache(cache_path: &Path) -> Result<Self, StationIndexError> {
        let bytes = std::fs::read(cache_path)
            .map_err(|e| StationIndexError::CacheRead(cache_path.to_path_buf(), e))?;
        let (stations, _) =
            bincode::serde::decode_from_slice::<Vec<StationRecord>, _>(&bytes, BINCODE_CONFIG)
                .map_err(|e| {
                    StationIndexError::CacheDecode(cache_path.to_path_buf(), Box::from(e))
                })?;
        Ok(Self::from_records(stations))
    }

    pub fn write_cache(&self, cache_path: &Path) -> Result<(), StationIndexError> {
        let bytes = bincode::serde::encode_to_vec(&self.stations, BINCODE_CONFIG)
            .map_err(|e| StationIndexError::CacheEncode(Box::new(e)))?;
        std::fs::write(cache_path, bytes)
            .map_err(|e| StationIndexError::CacheWrite(cache_path.to_path_buf(), e))
    }
}

/// Filters `stations` by a case-insensitive name prefix and an optional exact region code,
/// preserving their order. No deduplication or fuzzy matching is applied.
pub fn filter_stations<'a>(
    stations: &'a [StationRecord],
    name_prefix: &str,
    region: Option<&str>,
) -> Vec<&'a StationRecord> {
    stations
        .iter()
        .filter(|station| station.name_starts_with(name_prefix))
        .filter(|station| region.map_or(true, |region| station.in_region(region)))
        .collect()
}

fn parse_station(line: &FixedWidthLine<'_>) -> Result<StationRecord, FieldError> {
    let optional = |text: &str| (!text.is_empty()).then(|| text.to_string());
    Ok(StationRecord {
        id: line.text("id", ID.0, ID.1)?.to_string(),
        location: Location {
            latitude: line.number("latitude", LATITUDE.0, LATITUDE.1)?,
            longitude: line.number("longitude", LONGITUDE.0, LONGITUDE.1)?,
            elevation: line.number("elevation", ELEVATION.0, ELEVATION.1)?,
        },
        region: optional(line.text_or_empty("region", REGION.0, REGION.1)?),
        name: line.text_or_empty("name", NAME.0, NAME.1)?.to_string(),
        networks: Networks {
            gsn: optional(line.text_or_empty("gsn", GSN.0, GSN.1)?),
            hcn: optional(line.text_or_empty("hcn", HCN.0, HCN.1)?),
            wmo: optional(line.text_or_empty("wmo", WMO.0, WMO.1)?),
        },
    })
}
