//! Core SessionStore implementation

use eyre::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Unique identifier for a session
pub type SessionId = String;

/// Listing entry for a stored session
#[derive(Debug, Clone)]
pub struct SessionEntry {
    /// Session ID the checkpoint belongs to
    pub session_id: SessionId,
    /// Last modification time (unix ms)
    pub modified_at: i64,
    /// Stored checkpoint size in bytes
    pub bytes: u64,
}

enum Backend {
    /// One `{session_id}.json` file per session under a base directory
    Dir(PathBuf),
    /// Process-local map, values kept as serialized JSON with a timestamp
    Memory(Mutex<HashMap<SessionId, (String, i64)>>),
}

/// The checkpoint store
pub struct SessionStore {
    backend: Backend,
}

impl SessionStore {
    /// Open or create a directory-backed store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        debug!(?base_path, "Opened session store");
        Ok(Self {
            backend: Backend::Dir(base_path),
        })
    }

    /// Create a store that lives only in process memory
    pub fn in_memory() -> Self {
        debug!("Opened in-memory session store");
        Self {
            backend: Backend::Memory(Mutex::new(HashMap::new())),
        }
    }

    /// Persist a checkpoint, replacing any previous one for the session
    pub fn save<T: Serialize>(&self, session_id: &str, checkpoint: &T) -> Result<()> {
        validate_id(session_id)?;
        let json = serde_json::to_string_pretty(checkpoint).context("Failed to serialize checkpoint")?;

        match &self.backend {
            Backend::Dir(base) => {
                // Write-then-rename so a crash mid-save never leaves a torn checkpoint
                let path = session_path(base, session_id);
                let tmp = path.with_extension("json.tmp");
                fs::write(&tmp, &json).context("Failed to write checkpoint")?;
                fs::rename(&tmp, &path).context("Failed to commit checkpoint")?;
            }
            Backend::Memory(map) => {
                let mut map = map.lock().unwrap_or_else(|e| e.into_inner());
                map.insert(session_id.to_string(), (json, now_ms()));
            }
        }

        debug!(session_id, "Saved checkpoint");
        Ok(())
    }

    /// Load the checkpoint for a session, or `None` if nothing was saved
    pub fn load<T: DeserializeOwned>(&self, session_id: &str) -> Result<Option<T>> {
        validate_id(session_id)?;

        let json = match &self.backend {
            Backend::Dir(base) => {
                let path = session_path(base, session_id);
                if !path.exists() {
                    return Ok(None);
                }
                fs::read_to_string(&path).context("Failed to read checkpoint")?
            }
            Backend::Memory(map) => {
                let map = map.lock().unwrap_or_else(|e| e.into_inner());
                match map.get(session_id) {
                    Some((json, _)) => json.clone(),
                    None => return Ok(None),
                }
            }
        };

        let checkpoint = serde_json::from_str(&json).context(format!("Corrupt checkpoint for session {}", session_id))?;
        debug!(session_id, "Loaded checkpoint");
        Ok(Some(checkpoint))
    }

    /// Remove a session's checkpoint if present
    pub fn remove(&self, session_id: &str) -> Result<()> {
        validate_id(session_id)?;

        match &self.backend {
            Backend::Dir(base) => {
                let path = session_path(base, session_id);
                if path.exists() {
                    fs::remove_file(&path).context("Failed to remove checkpoint")?;
                    info!(session_id, "Removed checkpoint");
                }
            }
            Backend::Memory(map) => {
                let mut map = map.lock().unwrap_or_else(|e| e.into_inner());
                map.remove(session_id);
            }
        }

        Ok(())
    }

    /// List all stored sessions, most recently modified first
    pub fn list(&self) -> Result<Vec<SessionEntry>> {
        let mut entries = Vec::new();

        match &self.backend {
            Backend::Dir(base) => {
                for entry in fs::read_dir(base)? {
                    let entry = entry?;
                    let path = entry.path();
                    if path.extension().map(|e| e == "json").unwrap_or(false)
                        && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                    {
                        let meta = entry.metadata()?;
                        let modified_at = meta
                            .modified()
                            .ok()
                            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                            .map(|d| d.as_millis() as i64)
                            .unwrap_or(0);
                        entries.push(SessionEntry {
                            session_id: stem.to_string(),
                            modified_at,
                            bytes: meta.len(),
                        });
                    }
                }
            }
            Backend::Memory(map) => {
                let map = map.lock().unwrap_or_else(|e| e.into_inner());
                for (id, (json, modified_at)) in map.iter() {
                    entries.push(SessionEntry {
                        session_id: id.clone(),
                        modified_at: *modified_at,
                        bytes: json.len() as u64,
                    });
                }
            }
        }

        entries.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        Ok(entries)
    }
}

fn session_path(base: &Path, session_id: &str) -> PathBuf {
    base.join(format!("{}.json", session_id))
}

/// Session ids become file names, so restrict them to a safe alphabet
fn validate_id(session_id: &str) -> Result<()> {
    if session_id.is_empty() {
        return Err(eyre::eyre!("Session id must not be empty"));
    }
    if !session_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(eyre::eyre!("Invalid session id: {}", session_id));
    }
    Ok(())
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Checkpoint {
        node: String,
        turns: u32,
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::open(temp.path()).unwrap();

        let cp = Checkpoint {
            node: "present".to_string(),
            turns: 3,
        };
        store.save("sess-1", &cp).unwrap();

        let restored: Checkpoint = store.load("sess-1").unwrap().unwrap();
        assert_eq!(restored, cp);
    }

    #[test]
    fn test_load_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::open(temp.path()).unwrap();

        let restored: Option<Checkpoint> = store.load("nope").unwrap();
        assert!(restored.is_none());
    }

    #[test]
    fn test_save_overwrites() {
        let store = SessionStore::in_memory();

        store
            .save(
                "sess-1",
                &Checkpoint {
                    node: "gather".to_string(),
                    turns: 1,
                },
            )
            .unwrap();
        store
            .save(
                "sess-1",
                &Checkpoint {
                    node: "validate".to_string(),
                    turns: 2,
                },
            )
            .unwrap();

        let restored: Checkpoint = store.load("sess-1").unwrap().unwrap();
        assert_eq!(restored.node, "validate");
        assert_eq!(restored.turns, 2);
    }

    #[test]
    fn test_remove_and_list() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::open(temp.path()).unwrap();

        store.save("a", &Checkpoint { node: "x".into(), turns: 0 }).unwrap();
        store.save("b", &Checkpoint { node: "y".into(), turns: 0 }).unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|e| e.session_id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"a".to_string()));
        assert!(ids.contains(&"b".to_string()));

        store.remove("a").unwrap();
        let ids: Vec<_> = store.list().unwrap().into_iter().map(|e| e.session_id).collect();
        assert_eq!(ids, vec!["b".to_string()]);
    }

    #[test]
    fn test_in_memory_isolated_from_disk() {
        let store = SessionStore::in_memory();
        store.save("mem", &Checkpoint { node: "m".into(), turns: 9 }).unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].session_id, "mem");
        assert!(entries[0].bytes > 0);
    }

    #[test]
    fn test_rejects_unsafe_ids() {
        let store = SessionStore::in_memory();
        let cp = Checkpoint { node: "x".into(), turns: 0 };

        assert!(store.save("", &cp).is_err());
        assert!(store.save("../escape", &cp).is_err());
        assert!(store.save("a/b", &cp).is_err());
    }

    #[test]
    fn test_corrupt_checkpoint_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::open(temp.path()).unwrap();

        std::fs::write(temp.path().join("bad.json"), "{not json").unwrap();
        let result: Result<Option<Checkpoint>> = store.load("bad");
        assert!(result.is_err());
    }
}
