//! File-backed click log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use newsroom::{ClickLog, ClickLogEntry, ClickLogError};
use tracing::debug;

/// Default location of the click log, relative to the working directory.
pub const DEFAULT_CLICK_LOG_PATH: &str = "click_log.txt";

/// Appends one `<timestamp>: <counter>` line per logout to a text file.
///
/// The file is opened in append mode for every entry, so lines written by
/// earlier runs are kept. Writes from this process are serialised; each entry
/// is a single `write_all` call.
#[derive(Debug)]
pub struct FileClickLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileClickLog {
    /// Creates a log that appends to `path`. The file is created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The file entries are appended to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClickLog for FileClickLog {
    fn append(&self, entry: &ClickLogEntry) -> Result<(), ClickLogError> {
        let to_error = |source| ClickLogError {
            path: self.path.clone(),
            source,
        };

        // A poisoned lock only means another writer panicked mid-append.
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_error)?;
        file.write_all(entry.to_line().as_bytes()).map_err(to_error)?;
        debug!(path = %self.path.display(), counter = %entry.counter, "click log entry appended");
        Ok(())
    }
}
