// Persistent session store
//
// The whole history is rewritten to a temp file, fsynced, then renamed over
// the session file on every append. A crash therefore leaves either the old
// document or the new one, never a turn without its prompt.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::record::{History, TurnRecord};
use crate::errors::NegotiationError;

const FORMAT_VERSION: u32 = 1;

/// How to treat state already present at the session path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Start a new session; existing state is an error.
    Create,
    /// Start a new session, discarding existing state.
    Overwrite,
    /// Continue from existing state.
    Resume,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionDocument {
    format_version: u32,
    turns: History,
}

/// Single-writer owner of the session history.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    history: History,
}

impl SessionStore {
    /// Open the session file at `path`.
    ///
    /// Fresh sessions start empty at round 0. Resumed sessions start at the
    /// number of rounds already recorded.
    pub fn open(path: impl Into<PathBuf>, mode: OpenMode) -> Result<Self> {
        let path = path.into();

        let store = match mode {
            OpenMode::Create | OpenMode::Overwrite => {
                if mode == OpenMode::Create && has_state(&path) {
                    return Err(NegotiationError::setup(format!(
                        "session state already exists at {}; resume it or request overwrite",
                        path.display()
                    ))
                    .into());
                }
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create session directory {}", parent.display())
                    })?;
                }
                let store = Self {
                    path,
                    history: History::new(),
                };
                store.persist()?;
                store
            }
            OpenMode::Resume => {
                let history = load_history(&path)?;
                info!(
                    "Resuming session {} at round {}",
                    path.display(),
                    history.completed_rounds()
                );
                Self { path, history }
            }
        };

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// First round that has not been recorded yet.
    pub fn start_round(&self) -> usize {
        self.history.completed_rounds()
    }

    /// Assignment snapshot from the persisted history; empty for a fresh session.
    pub fn round_assignment(&self) -> Vec<String> {
        self.history
            .round_assignment()
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    /// Append a record and flush it to disk before returning.
    ///
    /// The record must belong to the next unrecorded round, and the first
    /// record must carry the round assignment. If writing fails the in-memory
    /// history is left as it was.
    pub fn append(&mut self, turn: TurnRecord) -> Result<&History> {
        let expected = self.history.len();
        if turn.round != expected {
            bail!(
                "Out-of-order append: record for round {} but next round is {}",
                turn.round,
                expected
            );
        }
        if expected == 0 && turn.round_assignment.is_none() {
            bail!("First record must carry the round assignment");
        }

        self.history.push(turn);
        if let Err(e) = self.persist() {
            self.history.pop();
            return Err(e);
        }
        Ok(&self.history)
    }

    fn persist(&self) -> Result<()> {
        let document = SessionDocument {
            format_version: FORMAT_VERSION,
            turns: self.history.clone(),
        };
        let json =
            serde_json::to_string_pretty(&document).context("Failed to serialize session")?;

        write_atomic(&self.path, json.as_bytes()).map_err(|source| {
            NegotiationError::Persistence {
                path: self.path.clone(),
                source,
            }
        })?;

        debug!(
            "Persisted {} turns to {}",
            self.history.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn has_state(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

fn load_history(path: &Path) -> Result<History> {
    if !path.exists() {
        return Err(NegotiationError::corrupt(path, "no persisted session to resume").into());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file {}", path.display()))?;
    let document: SessionDocument = serde_json::from_str(&contents)
        .map_err(|e| NegotiationError::corrupt(path, format!("unreadable session file: {}", e)))?;

    if document.format_version != FORMAT_VERSION {
        return Err(NegotiationError::corrupt(
            path,
            format!(
                "unsupported format version {} (expected {})",
                document.format_version, FORMAT_VERSION
            ),
        )
        .into());
    }

    validate(path, &document.turns)?;
    Ok(document.turns)
}

/// Every record must sit on its own round, contiguous from 0, and the first
/// must carry the assignment snapshot.
fn validate(path: &Path, history: &History) -> Result<(), NegotiationError> {
    for (index, turn) in history.turns().iter().enumerate() {
        if turn.round != index {
            return Err(NegotiationError::corrupt(
                path,
                format!(
                    "record {} is for round {}; expected round {}",
                    index, turn.round, index
                ),
            ));
        }
    }

    if !history.is_empty() && history.round_assignment().is_none() {
        return Err(NegotiationError::corrupt(
            path,
            "first record has no round assignment snapshot",
        ));
    }

    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp_path = tmp_path_for(path);
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    sync_parent(path)
}

/// Flush the directory entry so the rename itself survives a power loss.
#[cfg(unix)]
fn sync_parent(path: &Path) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()
}

// Directories cannot be opened as files here.
#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
