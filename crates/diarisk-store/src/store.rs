//! The append-only results log.
//!
//! Every append reads the whole file, widens its header to the canonical
//! column set, adds one row and rewrites the file through a temporary file
//! that replaces the log atomically. Appends to the same path are serialised
//! by an in-process lock; separate processes writing the same file can still
//! lose updates.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use diarisk_model::StoredEvaluation;

use crate::error::{Result, StoreError};
use crate::row::{CANONICAL_COLUMNS, COL_EMAIL, evaluation_to_row, evaluations_from_table};
use crate::table::RecordTable;

static PATH_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut locks = PATH_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(key).or_default())
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = lock_for(&path);
        Self { path, lock }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one evaluation, widening the file's header if needed.
    ///
    /// # Errors
    ///
    /// Read, parse or write failures. On failure the log is left unchanged.
    pub fn append(&self, evaluation: &StoredEvaluation) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut table = RecordTable::read(&self.path)?
            .unwrap_or_else(|| RecordTable::with_headers(&CANONICAL_COLUMNS));
        let added = table.widen(&CANONICAL_COLUMNS);
        if !added.is_empty() && !table.is_empty() {
            info!(
                path = %self.path.display(),
                added_columns = ?added,
                "widened results log header"
            );
        }
        table.push_row(&evaluation_to_row(evaluation));
        write_atomic(&self.path, &table.to_csv_bytes())?;

        info!(
            path = %self.path.display(),
            row_count = table.len(),
            "evaluation appended"
        );
        Ok(())
    }

    /// Raw table with every column; `None` when the log does not exist.
    ///
    /// # Errors
    ///
    /// Read or CSV errors.
    pub fn load_table(&self) -> Result<Option<RecordTable>> {
        RecordTable::read(&self.path)
    }

    /// All stored evaluations in append order. A missing log has none.
    ///
    /// # Errors
    ///
    /// Read, CSV or row parsing errors.
    pub fn read_all(&self) -> Result<Vec<StoredEvaluation>> {
        match self.load_table()? {
            Some(table) => evaluations_from_table(&table, &self.path),
            None => {
                debug!(path = %self.path.display(), "results log not found");
                Ok(Vec::new())
            }
        }
    }

    /// Evaluations whose submitter email equals `email` exactly.
    ///
    /// # Errors
    ///
    /// See [`RecordStore::read_all`].
    pub fn read_filtered(&self, email: &str) -> Result<Vec<StoredEvaluation>> {
        match self.load_table()? {
            Some(table) => evaluations_from_table(&table.filter_eq(COL_EMAIL, email), &self.path),
            None => Ok(Vec::new()),
        }
    }
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The temporary file is removed on every failure path, so readers only ever
/// see the old or the new content.
///
/// # Errors
///
/// Directory creation, write, sync or rename failures.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StoreError::io("create directory", dir, e))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io("create", dir, e))?;
    temp.write_all(bytes)
        .map_err(|e| StoreError::io("write", temp.path().to_path_buf(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io("sync", temp.path().to_path_buf(), e))?;
    temp.persist(path)
        .map_err(|e| StoreError::AtomicWriteFailed {
            target_path: path.to_path_buf(),
            source: e.error,
        })?;
    debug!(path = %path.display(), bytes = bytes.len(), "file written");
    Ok(())
}
