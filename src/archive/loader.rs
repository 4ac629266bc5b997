use crate::archive::error::FetchError;
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::Client;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::{fs, task};
use tokio_util::io::StreamReader;

pub const DEFAULT_BASE_URL: &str = "https://www.ncei.noaa.gov/pub/data/ghcn/daily";
pub const STATION_LIST_FILE: &str = "ghcnd-stations.txt";

/// A file published under the GHCN-Daily archive root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArchiveFile {
    /// The `.dly` archive of one station.
    Daily(String),
    /// The fixed-width list of all stations.
    StationList,
}

impl ArchiveFile {
    fn url_path(&self) -> String {
        match self {
            ArchiveFile::Daily(station) => format!("all/{}.dly", station),
            ArchiveFile::StationList => STATION_LIST_FILE.to_string(),
        }
    }

    fn cache_file_name(&self) -> String {
        match self {
            ArchiveFile::Daily(station) => format!("{}.dly", station),
            ArchiveFile::StationList => STATION_LIST_FILE.to_string(),
        }
    }

    fn validate(&self) -> Result<(), FetchError> {
        match self {
            ArchiveFile::Daily(station)
                if station.is_empty()
                    || !station.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                Err(FetchError::InvalidStationId(station.clone()))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ArchiveFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cache_file_name())
    }
}

/// Retrieves archive files over HTTP and keeps a copy of each in the cache directory.
pub struct ArchiveLoader {
    cache_dir: PathBuf,
    base_url: String,
    download_client: Client,
}

impl ArchiveLoader {
    pub fn new(cache_dir: &Path, base_url: &str) -> ArchiveLoader {
        ArchiveLoader {
            cache_dir: cache_dir.to_path_buf(),
            base_url: base_url.trim_end_matches('/').to_string(),
            download_client: Client::new(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache_path(&self, file: &ArchiveFile) -> PathBuf {
        self.cache_dir.join(file.cache_file_name())
    }

    /// Returns the bytes of `file`, reusing the cached copy unless `reload` is set.
    /// Downloaded files replace the cached copy.
    pub async fn get_bytes(&self, file: &ArchiveFile, reload: bool) -> Result<Vec<u8>, FetchError> {
        file.validate()?;
        let cache_path = self.cache_path(file);

        if !reload && fs::metadata(&cache_path).await.is_ok() {
            info!("Cache hit for {} at {:?}", file, cache_path);
            return fs::read(&cache_path)
                .await
                .map_err(|e| FetchError::CacheRead(cache_path, e));
        }

        if reload {
            info!("Reloading {}, ignoring any cached copy", file);
        } else {
            warn!("Cache miss for {}. Downloading.", file);
        }
        let bytes = self.download(file).await?;

        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| FetchError::CacheDirCreation(self.cache_dir.clone(), e))?;
        Self::cache_bytes(bytes.clone(), &self.cache_dir, &cache_path).await?;
        info!("Cached {} to {:?}", file, cache_path);
        Ok(bytes)
    }

    async fn download(&self, file: &ArchiveFile) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}/{}", self.base_url, file.url_path());
        info!("Downloading data from {}", url);

        let response = self
            .download_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url, e)
                });
            }
        };

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let mut reader = StreamReader::new(stream);
        let mut body = Vec::new();
        reader.read_to_end(&mut body).await?;
        info!("Downloaded {} bytes for {}", body.len(), file);
        Ok(body)
    }

    /// Writes through a temporary file in the cache directory so readers never observe a
    /// partially written archive.
    async fn cache_bytes(bytes: Vec<u8>, cache_dir: &Path, path: &Path) -> Result<(), FetchError> {
        let cache_dir = cache_dir.to_path_buf();
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || {
            let mut temp_file = NamedTempFile::new_in(&cache_dir)
                .map_err(|e| FetchError::CacheWrite(path_buf.clone(), e))?;
            temp_file
                .write_all(&bytes)
                .map_err(|e| FetchError::CacheWrite(path_buf.clone(), e))?;
            temp_file
                .persist(&path_buf)
                .map_err(|e| FetchError::CacheWrite(path_buf.clone(), e.error))?;
            Ok::<(), FetchError>(())
        })
        .await??;
        Ok(())
    }
}
