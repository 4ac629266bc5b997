//! Finds the Boston stations in Massachusetts, converts the Logan airport archive from 2020
//! onwards and writes the populated value columns to a CSV file named after the station.

use chrono::{Local, NaiveDate};
use ghcnd::{Ghcnd, GhcndError, StartEndDate};
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), GhcndError> {
    configure_polars_display();
    let client = Ghcnd::new().await?;

    let stations = client
        .find_stations()
        .name_prefix("BOSTON")
        .region("MA")
        .call()
        .await?;
    for station in &stations {
        println!(
            "{} {:<30} ({:.4}, {:.4})",
            station.id, station.name, station.location.latitude, station.location.longitude
        );
    }

    let range = StartEndDate::new(
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        Local::now().date_naive(),
    );
    let station = "USW00014739";
    let converted = client
        .daily()
        .station(station)
        .reindex(range)
        .call()
        .await?;
    println!(
        "Decoded {} records, skipped {} malformed lines",
        converted.report.records_decoded,
        converted.report.malformed_records.len()
    );

    let populated = converted.table.drop_empty_columns()?;
    let values = populated.select(populated.value_columns())?;
    println!("{}", values.frame.head(Some(10)));

    let path = format!("{}.csv", station);
    values.save_csv(Path::new(&path))?;
    println!("Wrote {} rows to {}", values.height(), path);
    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
