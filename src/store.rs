//! Process-wide console state with an explicit update/notify contract.
//!
//! All mutation goes through [`ConsoleStore`]; every update ends in a commit
//! that notifies subscribed [`StoreListener`]s. Persistence is one such
//! listener ([`Persister`]) attached when the store is opened, so the state
//! itself knows nothing about storage.
//!
//! # Persisted keys
//!
//! | key                          | content                  |
//! |------------------------------|--------------------------|
//! | `ticketing.console.session`  | `Session` or `null`      |
//! | `ticketing.console.history`  | list of `HistoryEntry`   |
//! | `ticketing.console.drafts`   | `DraftState`             |
//!
//! Absent or corrupt blobs silently fall back to defaults. There is no
//! schema versioning: an incompatible change requires deleting the keys.

use crate::drafts::DraftState;
use crate::error::{ConsoleError, Result};
use crate::health::{HealthBoard, ServiceHealth};
use crate::history::{HistoryEntry, HistoryLog};
use crate::session::Session;
use crate::types::ServiceKey;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use strum::Display;
use tracing::{debug, warn};

/// Projection of the most recent execution
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub title: String,
    pub data: Value,
    pub status: Option<u16>,
    pub duration_ms: Option<u64>,
}

impl Default for ResultView {
    fn default() -> Self {
        Self {
            title: "Ready".to_string(),
            data: json!({ "message": "Welcome. Please execute an action." }),
            status: None,
            duration_ms: None,
        }
    }
}

/// Everything the console knows
#[derive(Debug, Clone, Default)]
pub struct ConsoleState {
    pub session: Option<Session>,
    pub drafts: DraftState,
    pub history: HistoryLog,
    pub result: ResultView,
    pub health: HealthBoard,
}

/// Which part of the state a commit touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum StateChange {
    Session,
    Drafts,
    History,
    Result,
    Health,
}

/// Observer notified after every commit
pub trait StoreListener: Send {
    fn on_commit(&mut self, change: StateChange, state: &ConsoleState);
}

/// Storage keys for the persisted slices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Session,
    History,
    Drafts,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "ticketing.console.session",
            Self::History => "ticketing.console.history",
            Self::Drafts => "ticketing.console.drafts",
        }
    }
}

/// Key/value blob storage, the terminal counterpart of browser local storage
pub trait StateBackend: Send {
    fn read(&self, key: StoreKey) -> Option<String>;
    fn write(&mut self, key: StoreKey, blob: &str) -> Result<()>;
}

/// One JSON file per key inside a state directory
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl StateBackend for FileBackend {
    fn read(&self, key: StoreKey) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&mut self, key: StoreKey, blob: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), blob)?;
        Ok(())
    }
}

/// In-process backend; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    blobs: Arc<Mutex<HashMap<StoreKey, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw blob, e.g. to simulate corrupt storage
    pub fn insert_raw(&self, key: StoreKey, blob: &str) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(key, blob.to_string());
        }
    }
}

impl StateBackend for MemoryBackend {
    fn read(&self, key: StoreKey) -> Option<String> {
        self.blobs.lock().ok()?.get(&key).cloned()
    }

    fn write(&mut self, key: StoreKey, blob: &str) -> Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|e| ConsoleError::state(format!("Mutex poisoned: {}", e)))?;
        blobs.insert(key, blob.to_string());
        Ok(())
    }
}

/// Listener that mirrors persisted slices to a backend on every commit
pub struct Persister {
    backend: Box<dyn StateBackend>,
}

impl Persister {
    pub fn new(backend: Box<dyn StateBackend>) -> Self {
        Self { backend }
    }

    fn save(&mut self, key: StoreKey, value: serde_json::Result<String>) {
        let outcome = value
            .map_err(ConsoleError::from)
            .and_then(|blob| self.backend.write(key, &blob));
        if let Err(e) = outcome {
            warn!("Failed to persist {}: {}", key.as_str(), e);
        }
    }
}

impl StoreListener for Persister {
    fn on_commit(&mut self, change: StateChange, state: &ConsoleState) {
        match change {
            StateChange::Session => {
                self.save(StoreKey::Session, serde_json::to_string(&state.session));
            }
            StateChange::History => {
                self.save(StoreKey::History, serde_json::to_string(&state.history));
            }
            StateChange::Drafts => {
                self.save(StoreKey::Drafts, serde_json::to_string(&state.drafts));
            }
            StateChange::Result | StateChange::Health => {}
        }
    }
}

/// Parse a persisted blob, falling back to `fallback` when absent or corrupt
fn load_or<T: DeserializeOwned>(backend: &dyn StateBackend, key: StoreKey, fallback: T) -> T {
    let Some(raw) = backend.read(key) else {
        debug!("No persisted {}, using defaults", key.as_str());
        return fallback;
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            debug!("Discarding corrupt {}: {}", key.as_str(), e);
            fallback
        }
    }
}

/// The single owner of [`ConsoleState`]
pub struct ConsoleStore {
    state: ConsoleState,
    listeners: Vec<Box<dyn StoreListener>>,
}

/// Store shared between the UI thread and the task worker
pub type SharedStore = Arc<Mutex<ConsoleStore>>;

/// Lock a shared store, mapping poisoning to a state error
pub fn lock_store(store: &SharedStore) -> Result<MutexGuard<'_, ConsoleStore>> {
    store
        .lock()
        .map_err(|e| ConsoleError::state(format!("Mutex poisoned: {}", e)))
}

impl ConsoleStore {
    /// Store with the given state and no listeners
    pub fn new(state: ConsoleState) -> Self {
        Self {
            state,
            listeners: Vec::new(),
        }
    }

    /// Load persisted slices from `backend` and attach a [`Persister`] for it
    pub fn open(backend: Box<dyn StateBackend>) -> Self {
        let session: Option<Session> = load_or(backend.as_ref(), StoreKey::Session, None);
        let entries: Vec<HistoryEntry> = load_or(backend.as_ref(), StoreKey::History, Vec::new());
        let drafts: DraftState = load_or(backend.as_ref(), StoreKey::Drafts, DraftState::default());

        let state = ConsoleState {
            session,
            drafts,
            history: HistoryLog::from_entries(entries),
            ..ConsoleState::default()
        };

        let mut store = Self::new(state);
        store.subscribe(Box::new(Persister::new(backend)));
        store
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn subscribe(&mut self, listener: Box<dyn StoreListener>) {
        self.listeners.push(listener);
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }

    pub fn drafts(&self) -> &DraftState {
        &self.state.drafts
    }

    pub fn history(&self) -> &HistoryLog {
        &self.state.history
    }

    pub fn result(&self) -> &ResultView {
        &self.state.result
    }

    pub fn health(&self) -> &HealthBoard {
        &self.state.health
    }

    pub fn set_session(&mut self, session: Option<Session>) {
        self.state.session = session;
        self.commit(StateChange::Session);
    }

    /// Mutate drafts through `f`; the change is committed even if `f` fails
    pub fn update_drafts<T>(&mut self, f: impl FnOnce(&mut DraftState) -> T) -> T {
        let out = f(&mut self.state.drafts);
        self.commit(StateChange::Drafts);
        out
    }

    pub fn record_history(&mut self, entry: HistoryEntry) {
        self.state.history.record(entry);
        self.commit(StateChange::History);
    }

    pub fn clear_history(&mut self) {
        self.state.history.clear();
        self.commit(StateChange::History);
    }

    pub fn set_result(&mut self, result: ResultView) {
        self.state.result = result;
        self.commit(StateChange::Result);
    }

    pub fn set_health(&mut self, service: ServiceKey, health: ServiceHealth) {
        self.state.health.set(service, health);
        self.commit(StateChange::Health);
    }

    fn commit(&mut self, change: StateChange) {
        for listener in &mut self.listeners {
            listener.on_commit(change, &self.state);
        }
    }
}
