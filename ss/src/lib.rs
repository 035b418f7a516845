//! SessionStore - checkpoint store for suspendable conversation sessions
//!
//! Workflows that pause for human input serialize their state as a checkpoint
//! keyed by session id; this crate persists those checkpoints so a suspended
//! session can be restored later, across turns or across process restarts.
//!
//! # Architecture
//!
//! ```text
//! .sessionstore/
//! ├── {session_id}.json    # one pretty-printed checkpoint per session
//! └── ...
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sessionstore::SessionStore;
//!
//! let store = SessionStore::open(".sessionstore")?;
//! store.save(&session_id, &checkpoint)?;
//! let restored: Checkpoint = store.load(&session_id)?.expect("saved above");
//! ```
//!
//! An in-memory mode (`SessionStore::in_memory()`) backs single-process
//! sessions and tests without touching the filesystem.

mod store;

pub use store::{SessionEntry, SessionId, SessionStore};
