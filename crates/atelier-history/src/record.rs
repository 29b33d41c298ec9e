//! Generation record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted (sketch, result) round-trip.
///
/// Filenames are derived from the id at creation and never change; the
/// history store owns the files they point at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Creation timestamp; the sole ordering key, newest first.
    pub created_at: DateTime<Utc>,
    /// Filename of the stored sketch bitmap.
    pub sketch_filename: String,
    /// Filename of the stored result bitmap.
    pub result_filename: String,
}

impl GenerationRecord {
    /// Create a record with fresh filenames derived from a new id.
    pub fn new(created_at: DateTime<Utc>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            created_at,
            sketch_filename: format!("{id}_sketch.png"),
            result_filename: format!("{id}_result.png"),
        }
    }
}
