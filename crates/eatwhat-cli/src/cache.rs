//! Client-side snapshot of the last fetch.
//!
//! The cache is one JSON document that is replaced wholesale on every
//! store; there is no merging with what was there before.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use eatwhat_core::{Candidate, LocationFix};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CandidateCache {
    pub fix: Option<LocationFix>,
    pub candidates: Vec<Candidate>,
    pub fetched_at: DateTime<Utc>,
}

impl CandidateCache {
    pub(crate) fn new(fix: Option<LocationFix>, candidates: Vec<Candidate>) -> Self {
        Self {
            fix,
            candidates,
            fetched_at: Utc::now(),
        }
    }

    /// Reads the snapshot at `path`. A missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub(crate) fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read cache {}", path.display()))
            }
        };
        let cache = serde_json::from_str(&raw)
            .with_context(|| format!("cache {} is not valid JSON", path.display()))?;
        Ok(Some(cache))
    }

    /// Overwrites the snapshot at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub(crate) fn store(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to encode cache")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write cache {}", path.display()))?;
        tracing::debug!(path = %path.display(), count = self.candidates.len(), "cache stored");
        Ok(())
    }
}
