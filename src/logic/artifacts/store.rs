//! Filesystem Artifact Store
//!
//! One directory, one active file per kind (`model.json`, `platt.json`,
//! `isotonic.json`) plus timestamped version files that are never rewritten.
//! Publishing is write-temp-then-rename so a concurrently reloading scorer
//! can never observe a partial artifact. Every file wraps its payload in an
//! envelope with a SHA-256 checksum verified at load.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::APP_NAME;
use crate::logic::error::EngineError;

use super::types::ArtifactKind;

// ============================================================================
// ENVELOPE
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    /// SHA-256 hex of the canonical JSON serialization of `artifact`
    checksum: String,
    artifact: serde_json::Value,
}

fn checksum_of(value: &serde_json::Value) -> Result<String, EngineError> {
    // serde_json::Value keeps object keys sorted, so this serialization is
    // canonical for a given payload.
    let bytes = serde_json::to_vec(value)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug)]
pub struct FsArtifactStore {
    base_dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Default artifact directory under the platform data dir
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join("artifacts")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn active_path(&self, kind: ArtifactKind) -> PathBuf {
        self.base_dir.join(format!("{}.json", kind.as_str()))
    }

    /// Persist a new artifact version and atomically republish the active
    /// pointer. Returns the version file name.
    pub fn write_new<T: Serialize>(
        &self,
        kind: ArtifactKind,
        artifact: &T,
    ) -> Result<String, EngineError> {
        let payload = serde_json::to_value(artifact)?;
        let envelope = ArtifactEnvelope {
            checksum: checksum_of(&payload)?,
            artifact: payload,
        };
        let body = serde_json::to_vec_pretty(&envelope)?;

        // Timestamp plus a process-wide sequence: two writes inside the
        // same millisecond must still get distinct version files.
        static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);
        let version = format!(
            "{}-{}-{:04}.json",
            kind.as_str(),
            Utc::now().format("%Y%m%d-%H%M%S%3f"),
            WRITE_SEQ.fetch_add(1, Ordering::Relaxed)
        );
        let version_path = self.base_dir.join(&version);
        let tmp_path = self.base_dir.join(format!(".{}.tmp", version));

        std::fs::write(&tmp_path, &body)?;
        std::fs::rename(&tmp_path, &version_path)?;

        // Publish: a second temp + rename keeps the active file whole at
        // every instant.
        let publish_tmp = self.base_dir.join(format!(".{}.publish.tmp", kind.as_str()));
        std::fs::write(&publish_tmp, &body)?;
        std::fs::rename(&publish_tmp, self.active_path(kind))?;

        log::info!("published {} artifact as {}", kind, version);
        Ok(version)
    }

    /// Read and verify the active artifact of a kind. `Ok(None)` when no
    /// artifact has ever been published; any corruption is an
    /// `ArtifactLoad` error for the caller to degrade on.
    pub fn read_active<T: DeserializeOwned>(
        &self,
        kind: ArtifactKind,
    ) -> Result<Option<(T, SystemTime)>, EngineError> {
        let path = self.active_path(kind);
        if !path.exists() {
            return Ok(None);
        }

        let modified = std::fs::metadata(&path)?.modified()?;
        let bytes = std::fs::read(&path)?;
        let envelope: ArtifactEnvelope = serde_json::from_slice(&bytes).map_err(|e| {
            EngineError::ArtifactLoad(format!("{}: {}", path.display(), e))
        })?;

        let expected = checksum_of(&envelope.artifact)?;
        if envelope.checksum != expected {
            return Err(EngineError::ArtifactLoad(format!(
                "{}: checksum mismatch ({} != {})",
                path.display(),
                envelope.checksum,
                expected
            )));
        }

        let artifact: T = serde_json::from_value(envelope.artifact).map_err(|e| {
            EngineError::ArtifactLoad(format!("{}: {}", path.display(), e))
        })?;
        Ok(Some((artifact, modified)))
    }

    /// Cheap staleness probe: the active file's modification time, if any
    pub fn active_marker(&self, kind: ArtifactKind) -> Option<SystemTime> {
        std::fs::metadata(self.active_path(kind))
            .and_then(|m| m.modified())
            .ok()
    }

    /// Version file names for a kind, oldest first
    pub fn list_versions(&self, kind: ArtifactKind) -> Result<Vec<String>, EngineError> {
        let prefix = format!("{}-", kind.as_str());
        let mut versions: Vec<String> = std::fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(&prefix) && name.ends_with(".json"))
            .collect();
        versions.sort();
        Ok(versions)
    }
}

// ============================================================================
// TESTS
// ============================================================================
