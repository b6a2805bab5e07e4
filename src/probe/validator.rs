//! Media file validation utilities

use std::path::Path;

use crate::domain::errors::ProbeError;
use crate::domain::model::MediaInfo;

/// Checks around a probe call
pub struct MediaValidator;

impl MediaValidator {
    /// The path must be a regular file we can open
    pub async fn check_source(path: &Path) -> Result<(), ProbeError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ProbeError::NotFound(format!("{}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(ProbeError::NotFound(format!(
                "{}: not a regular file",
                path.display()
            )));
        }
        tokio::fs::File::open(path)
            .await
            .map_err(|e| ProbeError::NotFound(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// The engine's report must carry a usable duration
    pub fn check_report(path: &Path, info: &MediaInfo) -> Result<(), ProbeError> {
        if !info.duration_seconds.is_finite() || info.duration_seconds < 0.0 {
            return Err(ProbeError::UnreadableMedia(format!(
                "{}: invalid duration {}",
                path.display(),
                info.duration_seconds
            )));
        }
        Ok(())
    }
}
