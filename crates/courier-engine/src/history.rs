//! Append-only run history, one JSON record per line.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use courier_types::RunRecord;
use tracing::info;

/// Failures reading or writing the history file.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The file could not be opened, read, or written.
    #[error("history I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A record could not be encoded.
    #[error("failed to encode run record: {source}")]
    Encode {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A stored line is not a run record.
    #[error("history line {line} is not a run record: {source}")]
    Decode {
        /// One-based line number.
        line: usize,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// The history file.
#[derive(Debug, Clone)]
pub struct RunHistory {
    path: PathBuf,
}

impl RunHistory {
    /// A history stored at `path`. Nothing is touched until the first
    /// append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where records are stored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `record`, creating the file and its directory if needed.
    pub fn append(&self, record: &RunRecord) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        info!(path = %self.path.display(), run_id = %record.run_id, "Run recorded");
        Ok(())
    }

    /// Every stored record, oldest first. A missing file is an empty
    /// history.
    pub fn load(&self) -> Result<Vec<RunRecord>, HistoryError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|source| HistoryError::Decode {
                    line: index.saturating_add(1),
                    source,
                })
            })
            .collect()
    }
}
