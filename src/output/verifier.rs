//! Output verification implementation

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::domain::errors::ExecutionError;
use crate::utils::Utils;

/// Checks what the engine left on disk
pub struct OutputVerifier;

impl OutputVerifier {
    /// Size of the produced file; missing or empty files are failures
    pub async fn check_output(path: &Path) -> Result<u64, ExecutionError> {
        let missing = || ExecutionError::MissingOutput {
            path: path.display().to_string(),
        };

        let metadata = tokio::fs::metadata(path).await.map_err(|_| missing())?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(missing());
        }
        Ok(metadata.len())
    }

    /// Warnings for produced files larger than `limit_bytes`.
    ///
    /// Split boundaries come from an average bitrate estimate, so a segment
    /// may overshoot; this is reported but never fails the task.
    pub async fn oversized(files: &[PathBuf], limit_bytes: u64) -> Vec<String> {
        let mut warnings = Vec::new();
        for file in files {
            let Ok(metadata) = tokio::fs::metadata(file).await else {
                continue;
            };
            if metadata.len() > limit_bytes {
                let message = format!(
                    "{} is {} which exceeds the {} limit",
                    file.display(),
                    Utils::format_file_size(metadata.len()),
                    Utils::format_file_size(limit_bytes)
                );
                warn!(
                    file = %file.display(),
                    size = metadata.len(),
                    limit = limit_bytes,
                    "Segment exceeds size limit"
                );
                warnings.push(message);
            }
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_check_output_sizes() {
        let dir = TempDir::new().unwrap();
        let full = dir.path().join("full.mp4");
        let empty = dir.path().join("empty.mp4");
        std::fs::write(&full, b"12345").unwrap();
        std::fs::write(&empty, b"").unwrap();

        assert_eq!(OutputVerifier::check_output(&full).await.unwrap(), 5);
        assert!(matches!(
            OutputVerifier::check_output(&empty).await,
            Err(ExecutionError::MissingOutput { .. })
        ));
        assert!(OutputVerifier::check_output(&dir.path().join("none.mp4"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_oversized_reports_only_large_files() {
        let dir = TempDir::new().unwrap();
        let small = dir.path().join("a_000.mp4");
        let large = dir.path().join("a_001.mp4");
        std::fs::write(&small, vec![0u8; 10]).unwrap();
        std::fs::write(&large, vec![0u8; 100]).unwrap();

        let warnings = OutputVerifier::oversized(&[small, large.clone()], 50).await;
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("a_001.mp4"));
    }
}
