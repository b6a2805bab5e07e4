//! Media file inspection
//!
//! [`MediaProbe`] checks the source on disk, asks the engine for a report and
//! validates what came back. One engine process per call, no retries, no
//! caching.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::errors::ProbeError;
use crate::domain::model::MediaInfo;
use crate::ports::EnginePort;

pub mod validator;

use validator::MediaValidator;

#[derive(Clone)]
pub struct MediaProbe {
    engine: Arc<dyn EnginePort>,
}

impl MediaProbe {
    pub fn new(engine: Arc<dyn EnginePort>) -> Self {
        Self { engine }
    }

    pub async fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        MediaValidator::check_source(path).await?;

        let info = self.engine.probe(path).await.map_err(|e| {
            warn!(path = %path.display(), error = %e, "Probe failed");
            e
        })?;
        MediaValidator::check_report(path, &info)?;

        debug!(
            path = %path.display(),
            duration = info.duration_seconds,
            size = info.size_bytes,
            bitrate = info.average_bitrate_bps,
            "Media probed"
        );
        Ok(info)
    }
}
