// Moderator turn log (JSONL, one entry per consultation)
//
// Audit trail only: the participant history stays the single source of truth
// for resuming. A moderator consultation whose participant turn never got
// recorded is logged again on resume, so rounds may repeat here.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::store::OpenMode;
use crate::errors::NegotiationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeratorTurn {
    pub round: usize,
    pub slot_prompt: String,
    pub response: String,
    /// Name extracted from the response.
    pub chosen: String,
    pub timestamp: DateTime<Utc>,
}

impl ModeratorTurn {
    pub fn new(
        round: usize,
        slot_prompt: impl Into<String>,
        response: impl Into<String>,
        chosen: impl Into<String>,
    ) -> Self {
        Self {
            round,
            slot_prompt: slot_prompt.into(),
            response: response.into(),
            chosen: chosen.into(),
            timestamp: Utc::now(),
        }
    }
}

pub struct ModeratorLog {
    log_path: PathBuf,
    entries: Vec<ModeratorTurn>,
}

impl ModeratorLog {
    pub fn open(log_path: PathBuf, mode: OpenMode) -> Result<Self> {
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent).context("Failed to create moderator log directory")?;
        }

        let entries = match mode {
            OpenMode::Resume if log_path.exists() => read_entries(&log_path)?,
            OpenMode::Resume => Vec::new(),
            // The history store has already refused an existing session, so
            // anything left here is from a run that never recorded a turn.
            OpenMode::Create | OpenMode::Overwrite => {
                if log_path.exists() {
                    fs::remove_file(&log_path).context("Failed to clear moderator log")?;
                }
                Vec::new()
            }
        };

        Ok(Self { log_path, entries })
    }

    /// Append one entry and sync it before returning.
    pub fn append(&mut self, turn: ModeratorTurn) -> Result<()> {
        let json = serde_json::to_string(&turn).context("Failed to serialize moderator turn")?;

        let persist = || -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_path)?;
            writeln!(file, "{}", json)?;
            file.sync_all()
        };
        persist().map_err(|source| NegotiationError::Persistence {
            path: self.log_path.clone(),
            source,
        })?;

        debug!("Logged moderator choice {} for round {}", turn.chosen, turn.round);
        self.entries.push(turn);
        Ok(())
    }

    pub fn entries(&self) -> &[ModeratorTurn] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ModeratorTurn> {
        self.entries.last()
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

fn read_entries(path: &Path) -> Result<Vec<ModeratorTurn>> {
    let contents = fs::read_to_string(path).context("Failed to read moderator log")?;
    let lines: Vec<&str> = contents.lines().filter(|l| !l.trim().is_empty()).collect();

    let mut entries = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        match serde_json::from_str::<ModeratorTurn>(line) {
            Ok(entry) => entries.push(entry),
            // torn final line from an interrupted write
            Err(e) if index + 1 == lines.len() => {
                warn!("Dropping truncated moderator log entry: {}", e);
                rewrite(path, &entries)?;
            }
            Err(e) => {
                return Err(NegotiationError::corrupt(
                    path,
                    format!("moderator log line {}: {}", index + 1, e),
                )
                .into())
            }
        }
    }
    Ok(entries)
}

/// Replace the log with `entries` so later appends start on a clean line.
fn rewrite(path: &Path, entries: &[ModeratorTurn]) -> Result<()> {
    let mut contents = String::new();
    for entry in entries {
        contents.push_str(&serde_json::to_string(entry)?);
        contents.push('\n');
    }
    fs::write(path, contents).map_err(|source| NegotiationError::Persistence {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("moderator_history.jsonl");

        let mut log = ModeratorLog::open(path.clone(), OpenMode::Create).unwrap();
        log.append(ModeratorTurn::new(1, "who next?", "<PARTY>Bob</PARTY>", "Bob"))
            .unwrap();
        log.append(ModeratorTurn::new(2, "who next?", "<PARTY>Carol</PARTY>", "Carol"))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);

        let reloaded = ModeratorLog::open(path.clone(), OpenMode::Resume).unwrap();
        assert_eq!(reloaded.entries().len(), 2);
        assert_eq!(reloaded.last().unwrap().chosen, "Carol");

        let fresh = ModeratorLog::open(path, OpenMode::Overwrite).unwrap();
        assert!(fresh.entries().is_empty());
    }

    #[test]
    fn test_truncated_tail_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("moderator_history.jsonl");
        let good = serde_json::to_string(&ModeratorTurn::new(1, "p", "r", "Bob")).unwrap();
        fs::write(&path, format!("{}\n{{\"round\":2,\"slot", good)).unwrap();

        let mut log = ModeratorLog::open(path.clone(), OpenMode::Resume).unwrap();
        assert_eq!(log.entries().len(), 1);

        log.append(ModeratorTurn::new(2, "p", "r", "Carol")).unwrap();
        let reloaded = ModeratorLog::open(path, OpenMode::Resume).unwrap();
        assert_eq!(reloaded.entries().len(), 2);
        assert_eq!(reloaded.last().unwrap().chosen, "Carol");
    }

    #[test]
    fn test_corrupt_middle_line_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("moderator_history.jsonl");
        let good = serde_json::to_string(&ModeratorTurn::new(1, "p", "r", "Bob")).unwrap();
        fs::write(&path, format!("garbage\n{}\n", good)).unwrap();

        assert!(ModeratorLog::open(path, OpenMode::Resume).is_err());
    }
}
