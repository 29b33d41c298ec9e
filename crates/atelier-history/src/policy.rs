//! Retention limits for the history archive.

use atelier_config::RetentionConfig;

/// Count and size caps enforced after every insertion.
///
/// Eviction always removes the oldest record first, until both caps hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Maximum number of retained records.
    pub max_records: usize,
    /// Maximum total size of the history directory in bytes.
    pub max_total_bytes: u64,
}

impl Default for RetentionPolicy {
    /// Default retention settings: 50 records, 500 MiB.
    fn default() -> Self {
        Self {
            max_records: 50,
            max_total_bytes: 500 * 1024 * 1024,
        }
    }
}

impl From<RetentionConfig> for RetentionPolicy {
    fn from(config: RetentionConfig) -> Self {
        Self {
            max_records: config.max_records,
            max_total_bytes: config.max_total_bytes,
        }
    }
}
