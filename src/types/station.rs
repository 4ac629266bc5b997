//! Defines the data structures describing GHCN-Daily stations as listed in the network's
//! fixed-width station file (`ghcnd-stations.txt`).

use serde::{Deserialize, Serialize};

// --- Data Structures ---

/// A single station entry of the GHCN-Daily station list.
///
/// Records are loaded once per station file and never mutated; see
/// [`crate::StationIndex`] for loading and querying.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StationRecord {
    /// The eleven-character GHCN station identifier (e.g. "USW00014739").
    pub id: String,
    /// Geographical location of the station.
    pub location: Location,
    /// State or province code (e.g. "MA"), if the station lies in a region that has one.
    pub region: Option<String>,
    /// Display name as published, upper case (e.g. "BOSTON LOGAN INTL AP").
    pub name: String,
    /// Memberships in the auxiliary station networks.
    pub networks: Networks,
}

/// Represents the geographical location of a station.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// Elevation above sea level in meters. The station file uses `-999.9` for unknown.
    pub elevation: f64,
}

/// Network-membership codes carried at the end of each station line.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Networks {
    /// `GSN` when the station belongs to the GCOS Surface Network.
    pub gsn: Option<String>,
    /// `HCN` or `CRN` for U.S. Historical Climatology / Climate Reference Network stations.
    pub hcn: Option<String>,
    /// World Meteorological Organization station number.
    pub wmo: Option<String>,
}

impl StationRecord {
    /// Case-insensitive check whether the display name starts with `prefix`. Blanks in
    /// `prefix` are significant.
    pub fn name_starts_with(&self, prefix: &str) -> bool {
        self.name.to_uppercase().starts_with(&prefix.to_uppercase())
    }

    /// Exact, case-sensitive comparison against the region code.
    pub fn in_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logan() -> StationRecord {
        StationRecord {
            id: "USW00014739".to_string(),
            location: Location {
                latitude: 42.3606,
                longitude: -71.0097,
                elevation: 3.2,
            },
            region: Some("MA".to_string()),
            name: "BOSTON LOGAN INTL AP".to_string(),
            networks: Networks {
                gsn: None,
                hcn: None,
                wmo: Some("72509".to_string()),
            },
        }
    }

    #[test]
    fn name_prefix_ignores_case() {
        let station = logan();
        assert!(station.name_starts_with("boston"));
        assert!(station.name_starts_with("BOSTON LOG"));
        assert!(!station.name_starts_with("LOGAN"));
    }

    #[test]
    fn name_prefix_keeps_blanks() {
        let mut bostonia = logan();
        bostonia.name = "BOSTONIA".to_string();
        assert!(bostonia.name_starts_with("boston"));
        assert!(!bostonia.name_starts_with("BOSTON "));
        assert!(logan().name_starts_with("BOSTON "));
        assert!(!logan().name_starts_with(" BOSTON"));
    }

    #[test]
    fn region_match_is_exact() {
        let station = logan();
        assert!(station.in_region("MA"));
        assert!(!station.in_region("ma"));
        assert!(!station.in_region("M"));
    }
}
