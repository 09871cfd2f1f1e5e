use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the history store inside the home directory.
pub const DEFAULT_FILE_NAME: &str = ".3sh_history";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("cannot open history file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("cannot read history file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write history file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Append-only text file holding one command per line.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Open (creating if needed) the store at `path` and read every entry.
    pub fn open(path: &Path) -> Result<(Self, Vec<String>), HistoryError> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .map_err(|source| HistoryError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let entries = BufReader::new(file)
            .lines()
            .filter(|line| !matches!(line, Ok(text) if text.trim().is_empty()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| HistoryError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!("loaded {} entries from {}", entries.len(), path.display());

        Ok((
            Self {
                path: path.to_path_buf(),
            },
            entries,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `entries` after whatever the file already holds.
    pub fn append(&self, entries: &[String]) -> Result<(), HistoryError> {
        let write_err = |source| HistoryError::Write {
            path: self.path.clone(),
            source,
        };
        let file: File = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(write_err)?;
        let mut out = BufWriter::new(file);
        for entry in entries {
            writeln!(out, "{entry}").map_err(write_err)?;
        }
        out.flush().map_err(write_err)?;
        log::debug!("appended {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}
