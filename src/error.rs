use crate::archive::error::FetchError;
use crate::daily::error::DailyDataError;
use crate::stations::error::StationIndexError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GhcndError {
    #[error(transparent)]
    DailyData(#[from] DailyDataError),

    #[error(transparent)]
    StationIndex(#[from] StationIndexError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
