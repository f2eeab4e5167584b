//! Model snapshot persistence
//!
//! Snapshots carry architecture metadata and weights in one JSON document
//! wrapped with a SHA-256 checksum, validated before a load is applied.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{EngineError, Result};

use super::network::FeedForward;
use super::ModelInfo;

/// Everything needed to reconstruct a model losslessly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub info: ModelInfo,
    pub network: FeedForward,
}

/// On-disk wrapper: checksum over the serialized snapshot payload.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    checksum: String,
    snapshot: ModelSnapshot,
}

fn checksum_of(snapshot: &ModelSnapshot) -> Result<String> {
    let payload = serde_json::to_vec(snapshot)?;
    let mut hasher = Sha256::new();
    hasher.update(&payload);
    Ok(hex::encode(hasher.finalize()))
}

/// Writes a snapshot to `path`, creating parent directories as needed.
pub fn save_snapshot(snapshot: &ModelSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let envelope = SnapshotEnvelope {
        checksum: checksum_of(snapshot)?,
        snapshot: snapshot.clone(),
    };
    let bytes = serde_json::to_vec(&envelope)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Reads and integrity-checks a snapshot from `path`.
pub fn load_snapshot(path: &Path) -> Result<ModelSnapshot> {
    let bytes = fs::read(path)?;
    let envelope: SnapshotEnvelope = serde_json::from_slice(&bytes)?;

    let computed = checksum_of(&envelope.snapshot)?;
    if computed != envelope.checksum {
        return Err(EngineError::ChecksumMismatch {
            expected: envelope.checksum,
            actual: computed,
        });
    }
    Ok(envelope.snapshot)
}
