//! Builders for synthetic archive content used across the unit tests.

use crate::types::day_slot::MISSING_VALUE;

/// Formats one `.dly` line. `days` fills the leading day groups as `(value, "MQS")`; the
/// remaining groups are written as missing with blank flags.
pub(crate) fn dly_line(
    station: &str,
    year: i32,
    month: u32,
    element: &str,
    days: &[(i32, &str)],
) -> String {
    let mut line = format!("{:<11}{:04}{:02}{:<4}", station, year, month, element);
    for day in 0..31 {
        let (value, flags) = days.get(day).copied().unwrap_or((MISSING_VALUE, "   "));
        line.push_str(&format!("{:>5}{:<3}", value, flags));
    }
    line
}

/// Joins lines into archive bytes, newline-terminated.
pub(crate) fn archive(lines: &[String]) -> Vec<u8> {
    let mut out = lines.join("\n");
    out.push('\n');
    out.into_bytes()
}

/// Formats one `ghcnd-stations.txt` line.
pub(crate) fn station_line(
    id: &str,
    latitude: f64,
    longitude: f64,
    elevation: f64,
    region: &str,
    name: &str,
    networks: (&str, &str, &str),
) -> String {
    format!(
        "{:<11} {:>8.4} {:>9.4} {:>6.1} {:<2} {:<30} {:<3} {:<3} {:<5}",
        id, latitude, longitude, elevation, region, name, networks.0, networks.1, networks.2
    )
}
