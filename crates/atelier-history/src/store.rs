//! File-backed history store with retention enforcement.

use crate::error::HistoryError;
use crate::policy::RetentionPolicy;
use crate::record::GenerationRecord;
use atelier_config::SettingsStore;
use chrono::Utc;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings-store key holding the serialized record index.
const HISTORY_INDEX_KEY: &str = "generation_history";

/// Durable archive of generation round-trips.
///
/// The image directory is exclusively owned by this store. A record only
/// becomes visible in the index after both of its images were written, so a
/// partial write never surfaces a record; orphaned files from failed saves
/// are tolerated and invisible.
pub struct HistoryStore {
    /// Directory holding the image files.
    dir: PathBuf,
    /// Settings store hosting the record index.
    settings: Arc<SettingsStore>,
    /// Retention caps applied after each insertion.
    policy: RetentionPolicy,
    /// Serialize index mutations (save/delete/clear).
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Create a store rooted at the given image directory.
    pub fn new(
        dir: impl AsRef<Path>,
        settings: Arc<SettingsStore>,
        policy: RetentionPolicy,
    ) -> Result<Self, HistoryError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!(
            "initialized history store (dir={}, max_records={}, max_total_bytes={})",
            dir.display(),
            policy.max_records,
            policy.max_total_bytes
        );
        Ok(Self {
            dir,
            settings,
            policy,
            write_lock: Mutex::new(()),
        })
    }

    /// Persist a successful round-trip and enforce retention.
    ///
    /// Both images are written before the index is touched; if either write
    /// fails the index is left unchanged and no record is returned.
    pub fn save_generation(
        &self,
        sketch_png: &[u8],
        result_png: &[u8],
    ) -> Result<GenerationRecord, HistoryError> {
        let _guard = self.write_lock.lock();
        let record = GenerationRecord::new(Utc::now());

        self.write_image(&record.sketch_filename, sketch_png)?;
        self.write_image(&record.result_filename, result_png)?;

        let mut history = self.load_history();
        history.insert(0, record.clone());
        self.cleanup_if_needed(&mut history);
        self.save_index(&history)?;

        debug!(
            "saved generation (id={}, sketch_bytes={}, result_bytes={}, records={})",
            record.id,
            sketch_png.len(),
            result_png.len(),
            history.len()
        );
        Ok(record)
    }

    /// All known records, newest first.
    ///
    /// A missing or corrupt index reads as empty history.
    pub fn load_history(&self) -> Vec<GenerationRecord> {
        let mut records: Vec<GenerationRecord> =
            self.settings.get(HISTORY_INDEX_KEY).unwrap_or_default();
        // Stable sort: equal timestamps keep their prepend order.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Read image bytes for a filename reference.
    ///
    /// Missing or unreadable files read as absent.
    pub fn load_image(&self, filename: &str) -> Option<Vec<u8>> {
        fs::read(self.dir.join(filename)).ok()
    }

    /// Delete a record and its image files.
    ///
    /// File removal is best-effort; a missing file is not an error.
    pub fn delete_generation(&self, record: &GenerationRecord) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock();
        self.delete_image(&record.sketch_filename);
        self.delete_image(&record.result_filename);

        let mut history = self.load_history();
        history.retain(|known| known.id != record.id);
        self.save_index(&history)?;
        info!("deleted generation (id={})", record.id);
        Ok(())
    }

    /// Delete every record's images and empty the index.
    pub fn clear_all_history(&self) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock();
        let history = self.load_history();
        for record in &history {
            self.delete_image(&record.sketch_filename);
            self.delete_image(&record.result_filename);
        }
        self.save_index(&[])?;
        info!("cleared history (removed={})", history.len());
        Ok(())
    }

    /// Evict oldest records until both retention caps hold.
    ///
    /// The index is newest-first, so the oldest record is the last element.
    /// Total size is recomputed from disk after each deletion rather than
    /// estimated.
    fn cleanup_if_needed(&self, history: &mut Vec<GenerationRecord>) {
        while history.len() > self.policy.max_records {
            if let Some(oldest) = history.pop() {
                debug!("evicting over-count record (id={})", oldest.id);
                self.delete_image(&oldest.sketch_filename);
                self.delete_image(&oldest.result_filename);
            }
        }

        let mut total = self.total_size();
        while total > self.policy.max_total_bytes && history.len() > 1 {
            if let Some(oldest) = history.pop() {
                debug!("evicting over-size record (id={}, total={total})", oldest.id);
                self.delete_image(&oldest.sketch_filename);
                self.delete_image(&oldest.result_filename);
                total = self.total_size();
            }
        }
        if total > self.policy.max_total_bytes {
            warn!("most recent record alone exceeds the size cap (total={total})");
        }
    }

    /// Total on-disk size of the history directory.
    fn total_size(&self) -> u64 {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };
        entries
            .flatten()
            .filter_map(|entry| entry.metadata().ok())
            .map(|metadata| metadata.len())
            .sum()
    }

    /// Persist the record index to the settings store.
    fn save_index(&self, records: &[GenerationRecord]) -> Result<(), HistoryError> {
        self.settings.set(HISTORY_INDEX_KEY, &records)?;
        Ok(())
    }

    /// Write one image file.
    fn write_image(&self, filename: &str, bytes: &[u8]) -> Result<(), HistoryError> {
        fs::write(self.dir.join(filename), bytes)?;
        Ok(())
    }

    /// Remove one image file, ignoring absence.
    fn delete_image(&self, filename: &str) {
        let path = self.dir.join(filename);
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to delete image (path={}): {err}", path.display());
            }
        }
    }
}
