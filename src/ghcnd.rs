//! The main entry point: a client that retrieves GHCN-Daily archives, caches them locally and
//! converts them into [`DailyTable`](crate::DailyTable)s.

use crate::archive::loader::{ArchiveFile, ArchiveLoader, DEFAULT_BASE_URL};
use crate::daily::pipeline::{convert_dly, Converted};
use crate::daily::reshaper::{DuplicatePolicy, Reshaper};
use crate::error::GhcndError;
use crate::stations::station_index::StationIndex;
use crate::types::station::StationRecord;
use crate::types::traits::types::StartEndDate;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::task;

const STATION_INDEX_CACHE: &str = "ghcnd-stations.bin";

/// Client for the GHCN-Daily archive.
///
/// Downloaded `.dly` files and the station list are kept in a cache folder and reused on
/// later calls. Archives are decoded again on every call, so the same cached file can be
/// converted with different reindexing or duplicate handling.
///
/// # Examples
///
/// ```no_run
/// # use ghcnd::{Ghcnd, GhcndError};
/// # async fn run() -> Result<(), GhcndError> {
/// let client = Ghcnd::new().await?;
/// let converted = client.daily().station("USW00014739").call().await?;
/// println!("{}", converted.table.frame);
/// # Ok(())
/// # }
/// ```
pub struct Ghcnd {
    loader: ArchiveLoader,
}

#[bon]
impl Ghcnd {
    /// Creates a client that caches into `cache_folder`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`GhcndError::CacheDirCreation`] if the folder cannot be created, or if the
    /// path exists and is not a directory.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, GhcndError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| GhcndError::CacheDirCreation(cache_folder.clone(), e))?;
        Ok(Self {
            loader: ArchiveLoader::new(&cache_folder, DEFAULT_BASE_URL),
        })
    }

    /// Creates a client using the platform cache directory (e.g. `~/.cache/ghcnd_rs_cache`
    /// on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`GhcndError::CacheDirResolution`] if no cache directory is known for this
    /// platform, or [`GhcndError::CacheDirCreation`] if it cannot be created.
    pub async fn new() -> Result<Self, GhcndError> {
        let cache_folder = get_cache_dir().map_err(GhcndError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder).await
    }

    /// Points the client at another archive root, such as a mirror.
    pub fn with_base_url(self, base_url: &str) -> Self {
        Self {
            loader: ArchiveLoader::new(self.loader.cache_dir(), base_url),
        }
    }

    pub fn cache_folder(&self) -> &Path {
        self.loader.cache_dir()
    }

    /// Retrieves and converts the `.dly` archive of one station.
    ///
    /// # Arguments
    ///
    /// * `.station(&str)`: **Required.** The 11-character station identifier.
    /// * `.reindex(StartEndDate)`: Optional. Emit a row for every date of the range, values
    ///   absent where the archive has none.
    /// * `.duplicates(DuplicatePolicy)`: Optional. Defaults to [`DuplicatePolicy::LastWins`].
    /// * `.reload(bool)`: Optional. Download again even when a cached copy exists.
    ///
    /// # Errors
    ///
    /// * [`GhcndError::Fetch`] when the archive is neither cached nor downloadable.
    /// * [`GhcndError::DailyData`] when the archive holds no decodable record, or holds a
    ///   duplicate under [`DuplicatePolicy::Reject`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use ghcnd::{Ghcnd, GhcndError, StartEndDate};
    /// # use chrono::NaiveDate;
    /// # async fn run() -> Result<(), GhcndError> {
    /// let client = Ghcnd::new().await?;
    /// let range = StartEndDate::new(
    ///     NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
    /// );
    /// let converted = client
    ///     .daily()
    ///     .station("USW00014739")
    ///     .reindex(range)
    ///     .call()
    ///     .await?;
    /// assert_eq!(converted.table.height(), 366);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn daily(
        &self,
        station: &str,
        reindex: Option<StartEndDate>,
        #[builder(default)] duplicates: DuplicatePolicy,
        #[builder(default)] reload: bool,
    ) -> Result<Converted, GhcndError> {
        let bytes = self
            .loader
            .get_bytes(&ArchiveFile::Daily(station.to_string()), reload)
            .await?;
        let reshaper = Reshaper::builder()
            .maybe_date_range(reindex)
            .duplicates(duplicates)
            .build();

        let converted = task::spawn_blocking(move || convert_dly(&bytes, &reshaper)).await??;
        if !converted.report.malformed_records.is_empty() {
            warn!(
                "Skipped {} malformed records in archive of {}",
                converted.report.malformed_records.len(),
                station
            );
        }
        info!(
            "Converted archive of {} into {} rows",
            station,
            converted.table.height()
        );
        Ok(converted)
    }

    /// Loads the station list.
    ///
    /// The parsed list is cached in binary form next to the raw file; `.reload(true)`
    /// discards both and downloads the list again.
    #[builder]
    pub async fn stations(&self, #[builder(default)] reload: bool) -> Result<StationIndex, GhcndError> {
        let cache_path = self.cache_folder().join(STATION_INDEX_CACHE);

        if !reload && tokio::fs::metadata(&cache_path).await.is_ok() {
            let path = cache_path.clone();
            match task::spawn_blocking(move || StationIndex::read_cache(&path)).await? {
                Ok(index) => {
                    info!("Loaded {} stations from {:?}", index.len(), cache_path);
                    return Ok(index);
                }
                Err(e) => warn!("Ignoring unreadable station cache: {}", e),
            }
        }

        let bytes = self
            .loader
            .get_bytes(&ArchiveFile::StationList, reload)
            .await?;
        let index = task::spawn_blocking(move || {
            let index = StationIndex::load(&bytes)?;
            if let Err(e) = index.write_cache(&cache_path) {
                warn!("Could not write station cache: {}", e);
            }
            Ok::<StationIndex, GhcndError>(index)
        })
        .await??;
        info!("Indexed {} stations", index.len());
        Ok(index)
    }

    /// Finds stations whose name starts with `name_prefix` (case-insensitive), optionally
    /// restricted to one region code. Stations are returned in station-list order.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use ghcnd::{Ghcnd, GhcndError};
    /// # async fn run() -> Result<(), GhcndError> {
    /// let client = Ghcnd::new().await?;
    /// let stations = client
    ///     .find_stations()
    ///     .name_prefix("boston")
    ///     .region("MA")
    ///     .call()
    ///     .await?;
    /// for station in stations {
    ///     println!("{} {}", station.id, station.name);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn find_stations(
        &self,
        name_prefix: &str,
        region: Option<&str>,
        #[builder(default)] reload: bool,
    ) -> Result<Vec<StationRecord>, GhcndError> {
        let index = self.stations().reload(reload).call().await?;
        Ok(index
            .filter(name_prefix, region)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::error::FetchError;
    use crate::daily::error::DailyDataError;
    use crate::fixtures::{archive, dly_line, station_line};
    use chrono::NaiveDate;

    const UNREACHABLE: &str = "http://127.0.0.1:9";

    async fn seeded_client(dir: &Path) -> Result<Ghcnd, Box<dyn std::error::Error>> {
        let dly = archive(&[
            dly_line("USW00014739", 2020, 1, "TMAX", &[(56, "  W"), (61, "  W")]),
            dly_line("USW00014739", 2020, 1, "PRCP", &[(3, "T W")]),
        ]);
        std::fs::write(dir.join("USW00014739.dly"), dly)?;
        let stations = [
            station_line("USW00014739", 42.3606, -71.0097, 3.2, "MA", "BOSTON LOGAN INTL AP", ("", "", "72509")),
            station_line("USC00300889", 42.7314, -73.6872, 122.0, "NY", "BOSTON CORNERS", ("", "", "")),
        ]
        .join("\n");
        std::fs::write(dir.join("ghcnd-stations.txt"), stations)?;
        Ok(Ghcnd::with_cache_folder(dir.to_path_buf())
            .await?
            .with_base_url(UNREACHABLE))
    }

    #[tokio::test]
    async fn creates_missing_cache_folder() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let folder = dir.path().join("nested").join("cache");
        let client = Ghcnd::with_cache_folder(folder.clone()).await?;
        assert!(folder.is_dir());
        assert_eq!(client.cache_folder(), folder.as_path());
        Ok(())
    }

    #[tokio::test]
    async fn daily_converts_cached_archive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = seeded_client(dir.path()).await?;
        let converted = client.daily().station("USW00014739").call().await?;
        assert_eq!(
            converted.table.columns(),
            ["station", "date", "PRCP", "PRCP_ATTRIBUTES", "TMAX", "TMAX_ATTRIBUTES"]
        );
        assert_eq!(converted.table.height(), 2);
        assert_eq!(converted.report.records_decoded, 2);
        Ok(())
    }

    #[tokio::test]
    async fn daily_reindexes_and_rejects_duplicates() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = seeded_client(dir.path()).await?;
        let range = StartEndDate::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 31).unwrap(),
        );
        let converted = client
            .daily()
            .station("USW00014739")
            .reindex(range)
            .call()
            .await?;
        assert_eq!(converted.table.height(), 31);

        let line = dly_line("USC00190120", 2020, 1, "TMAX", &[(56, "  W")]);
        std::fs::write(dir.path().join("USC00190120.dly"), archive(&[line.clone(), line]))?;
        let result = client
            .daily()
            .station("USC00190120")
            .duplicates(DuplicatePolicy::Reject)
            .call()
            .await;
        assert!(matches!(
            result,
            Err(GhcndError::DailyData(DailyDataError::DuplicateObservation { .. }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn daily_fails_when_archive_is_unavailable() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = seeded_client(dir.path()).await?;
        let missing = client.daily().station("USC00000000").call().await;
        assert!(matches!(missing, Err(GhcndError::Fetch(FetchError::NetworkRequest(..)))));
        let reload = client.daily().station("USW00014739").reload(true).call().await;
        assert!(matches!(reload, Err(GhcndError::Fetch(_))));
        Ok(())
    }

    #[tokio::test]
    async fn stations_are_indexed_and_cached() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = seeded_client(dir.path()).await?;

        let index = client.stations().call().await?;
        assert_eq!(index.len(), 2);
        assert!(dir.path().join(STATION_INDEX_CACHE).exists());

        std::fs::remove_file(dir.path().join("ghcnd-stations.txt"))?;
        let cached = client.stations().call().await?;
        assert_eq!(cached.stations(), index.stations());
        Ok(())
    }

    #[tokio::test]
    async fn find_stations_by_name_and_region() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let client = seeded_client(dir.path()).await?;

        let all = client.find_stations().name_prefix("Boston").call().await?;
        assert_eq!(all.len(), 2);
        let ma = client
            .find_stations()
            .name_prefix("boston")
            .region("MA")
            .call()
            .await?;
        assert_eq!(ma.len(), 1);
        assert_eq!(ma[0].id, "USW00014739");
        Ok(())
    }
}
