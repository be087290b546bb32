//! Append-only CSV store of activity submissions.

use std::fs::{self, OpenOptions};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::record::{ActivityRecord, COL_EMPLOYEE_CODE, SUBMISSION_COLUMNS};
use crate::table::{csv_line, SubmissionTable};

/// How an employee code filter compares against the Employee Code column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeMatch {
    /// Case-insensitive substring containment (admin view).
    Contains,
    /// Case-insensitive equality (employee self-service view).
    Exact,
}

/// Where submissions are appended to and loaded from.
pub trait SubmissionRepository: Send + Sync {
    fn append(&self, records: &[ActivityRecord]) -> Result<usize>;

    fn load_all(&self) -> Result<SubmissionTable>;
}

pub struct SubmissionStore {
    path: PathBuf,
    // Serializes appends issued by sessions hosted in this process. Writers in
    // other processes are not coordinated.
    append_lock: Mutex<()>,
}

impl SubmissionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    /// Create the store at `path` and make sure the header exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        store.initialize()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header row if the file does not exist yet. Existing files are
    /// never touched.
    pub fn initialize(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.write_error(source))?;
        }
        fs::write(&self.path, csv_line(&SUBMISSION_COLUMNS))
            .map_err(|source| self.write_error(source))?;
        info!(path = %self.path.display(), "submissions store initialized");
        Ok(())
    }

    /// Append `records` as one write. Nothing is written for an empty batch.
    pub fn append(&self, records: &[ActivityRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut rows = String::new();
        for record in records {
            rows.push_str(&csv_line(&record.to_row()));
        }

        let _guard = self
            .append_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.initialize()?;
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.write_error(source))?;
        let mut buffer = self.separator(&mut file)?;
        buffer.push_str(&rows);
        file.write_all(buffer.as_bytes())
            .map_err(|source| self.write_error(source))?;

        info!(
            path = %self.path.display(),
            rows = records.len(),
            "appended activity submissions"
        );
        Ok(records.len())
    }

    /// Read the whole file. Zero-byte and header-only files load as empty.
    pub fn load_all(&self) -> Result<SubmissionTable> {
        let text = fs::read_to_string(&self.path).map_err(|source| {
            warn!(path = %self.path.display(), error = %source, "failed to read submissions");
            AppError::StoreRead {
                path: self.path.clone(),
                source,
            }
        })?;
        let table = SubmissionTable::parse_csv(&text)?;
        debug!(rows = table.len(), "loaded submissions");
        Ok(table)
    }

    /// What must precede new rows: the header for a zero-byte file, a line
    /// break when the last line was left unterminated, otherwise nothing.
    fn separator(&self, file: &mut File) -> Result<String> {
        let len = file
            .metadata()
            .map_err(|source| self.write_error(source))?
            .len();
        if len == 0 {
            return Ok(csv_line(&SUBMISSION_COLUMNS));
        }
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))
            .and_then(|_| file.read_exact(&mut last))
            .map_err(|source| self.write_error(source))?;
        if last[0] == b'\n' {
            Ok(String::new())
        } else {
            debug!(path = %self.path.display(), "store did not end with a newline");
            Ok("\n".to_string())
        }
    }

    fn write_error(&self, source: std::io::Error) -> AppError {
        warn!(path = %self.path.display(), error = %source, "failed to write submissions");
        AppError::StoreWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl SubmissionRepository for SubmissionStore {
    fn append(&self, records: &[ActivityRecord]) -> Result<usize> {
        SubmissionStore::append(self, records)
    }

    fn load_all(&self) -> Result<SubmissionTable> {
        SubmissionStore::load_all(self)
    }
}

/// Rows whose Employee Code matches `code`. Empty codes in the table never match.
pub fn filter_by_employee_code(
    table: &SubmissionTable,
    code: &str,
    mode: CodeMatch,
) -> SubmissionTable {
    let Some(idx) = table.column_index(COL_EMPLOYEE_CODE) else {
        return table.retain_rows(|_| false);
    };
    let needle = code.to_lowercase();
    table.retain_rows(|row| {
        let Some(cell) = row.get(idx).filter(|cell| !cell.is_empty()) else {
            return false;
        };
        let cell = cell.to_lowercase();
        match mode {
            CodeMatch::Contains => cell.contains(needle.as_str()),
            CodeMatch::Exact => cell == needle,
        }
    })
}
