//! Per-run session state: undo/redo history per file and the upload log.
//!
//! A [`Session`] is created at the start of a run and passed explicitly to
//! everything that reads or changes history. Nothing here is global and
//! nothing is persisted.

mod history;

pub use history::FileHistory;

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::cleaner::CleaningOperation;
use crate::error::{Result, SweeperError};
use crate::ingest::{FileIngestor, Upload};
use crate::types::{FileMetadata, HistoryRecord, TabularData};

/// Result of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub metadata: FileMetadata,
    pub data: TabularData,
}

/// Result of applying a cleaning operation through the session.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub data: TabularData,
    pub steps: Vec<String>,
}

/// History of every file handled during one run.
#[derive(Debug, Default)]
pub struct Session {
    files: HashMap<String, FileHistory>,
    sizes: HashMap<String, u64>,
    uploads: Vec<HistoryRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a snapshot for `file_name`, creating its history if needed.
    ///
    /// Clears the file's redo stack.
    pub fn save_history(&mut self, file_name: &str, data: TabularData) {
        let history = self.files.entry(file_name.to_string()).or_default();
        history.push(data);
        debug!("Saved snapshot {} for '{}'", history.depth(), file_name);
    }

    /// Step back one snapshot. `None` when there is nothing to undo.
    pub fn undo(&mut self, file_name: &str) -> Option<TabularData> {
        self.files.get_mut(file_name)?.undo()
    }

    /// Re-apply the last undone snapshot. `None` when there is nothing to redo.
    pub fn redo(&mut self, file_name: &str) -> Option<TabularData> {
        self.files.get_mut(file_name)?.redo()
    }

    /// The current snapshot of `file_name`.
    pub fn current(&self, file_name: &str) -> Option<&TabularData> {
        self.files.get(file_name)?.current()
    }

    /// Run `operation` on the current snapshot and commit the result.
    pub fn apply(
        &mut self,
        file_name: &str,
        operation: &CleaningOperation,
    ) -> Result<CleaningOutcome> {
        let current = self
            .current(file_name)
            .ok_or_else(|| SweeperError::UnknownFile(file_name.to_string()))?;

        let (data, steps) = operation.apply(current)?;
        info!("Applied {} to '{}'", operation.label(), file_name);
        self.save_history(file_name, data.clone());

        Ok(CleaningOutcome { data, steps })
    }

    pub fn can_undo(&self, file_name: &str) -> bool {
        self.files.get(file_name).is_some_and(FileHistory::can_undo)
    }

    pub fn can_redo(&self, file_name: &str) -> bool {
        self.files.get(file_name).is_some_and(FileHistory::can_redo)
    }

    /// Undo stack depth for `file_name`, zero if unknown.
    pub fn depth(&self, file_name: &str) -> usize {
        self.files.get(file_name).map_or(0, FileHistory::depth)
    }

    /// Append an upload record unless one with this name already exists.
    pub fn record_upload(&mut self, file_name: &str, size_bytes: u64) -> bool {
        if self.uploads.iter().any(|r| r.file_name == file_name) {
            return false;
        }
        self.uploads.push(HistoryRecord::new(file_name, size_bytes));
        true
    }

    /// Upload records in upload order.
    pub fn history(&self) -> &[HistoryRecord] {
        &self.uploads
    }

    /// Size in bytes of the most recent upload named `file_name`.
    pub fn file_size(&self, file_name: &str) -> Option<u64> {
        self.sizes.get(file_name).copied()
    }

    /// Names of files with history, sorted.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        names
    }

    /// Decode an upload and make it the baseline of its file history.
    ///
    /// On failure nothing is recorded.
    pub fn ingest(&mut self, upload: &Upload, ingestor: &FileIngestor) -> Result<IngestOutcome> {
        let data = ingestor.read(upload)?;

        self.record_upload(&upload.name, upload.size());
        self.sizes.insert(upload.name.clone(), upload.size());
        self.save_history(&upload.name, data.clone());

        Ok(IngestOutcome {
            metadata: FileMetadata::new(&upload.name, upload.size(), &data),
            data,
        })
    }

    /// Ingest uploads in order; a failed file is logged and the rest continue.
    pub fn ingest_all(
        &mut self,
        uploads: &[Upload],
        ingestor: &FileIngestor,
    ) -> Vec<Result<IngestOutcome>> {
        uploads
            .iter()
            .map(|upload| {
                let result = self.ingest(upload, ingestor);
                if let Err(e) = &result {
                    warn!("Skipping '{}': {}", upload.name, e);
                }
                result
            })
            .collect()
    }
}
