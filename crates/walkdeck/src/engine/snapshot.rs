use std::time::SystemTime;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Wire format version. Bumped whenever a field changes meaning or shape;
/// a mirror discards snapshots carrying a version it does not understand.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Idle,
    Running,
    Paused,
    Completed,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }
}

/// The complete, self-describing walkthrough state at one instant.
///
/// This is both the presenter's published unit of synchronization and the
/// audience's entire view-state: mirrors replace their copy wholesale on
/// every receipt, never merge. Slides are keyed by `slide_id`; `slide_index`
/// is carried as a fallback for catalogs where the id cannot be resolved
/// (e.g. a mirror loaded an older deck revision).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkthroughSnapshot {
    pub schema_version: u32,
    pub status: Status,
    pub slide_id: String,
    pub slide_index: usize,
    pub slide_elapsed_secs: u64,
    pub total_elapsed_secs: u64,
    pub progress_percent: f32,
    /// Wall-clock publish time in unix milliseconds. A staleness hint only;
    /// never used for elapsed-time arithmetic.
    pub source_timestamp_ms: u64,
}

impl WalkthroughSnapshot {
    pub fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_wire(payload: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(payload)?;
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            anyhow::bail!(
                "Unsupported snapshot schema version {} (expected {})",
                snapshot.schema_version,
                SNAPSHOT_SCHEMA_VERSION
            );
        }
        Ok(snapshot)
    }
}

/// Milliseconds since the unix epoch, for `source_timestamp_ms`.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
