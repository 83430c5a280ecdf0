use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::table::ResultTable;

/// Opaque identifier for one analysis session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Holds one immutable result table per session.
///
/// Tables are replaced wholesale by a new analysis (or a CSV import);
/// readers get `Arc` snapshots, so concurrent sessions can never observe a
/// half-written table and never clobber each other.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Arc<ResultTable>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the session's table, returning the snapshot.
    #[allow(clippy::missing_panics_doc)]
    pub fn put(&self, id: SessionId, table: ResultTable) -> Arc<ResultTable> {
        let table = Arc::new(table);
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.insert(id, Arc::clone(&table));
        table
    }

    /// Current snapshot for a session, if an analysis has completed.
    pub fn get(&self, id: &SessionId) -> Option<Arc<ResultTable>> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.get(id).cloned()
    }

    /// Drop a session's results, ending its lifecycle.
    pub fn remove(&self, id: &SessionId) -> Option<Arc<ResultTable>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.remove(id)
    }

    pub fn len(&self) -> usize {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
