use std::sync::Arc;

use parking_lot::Mutex;

use crate::record::{SessionId, SessionRecord, SessionValue};

/// Request-scoped handle over one session record.
///
/// Cloning the handle shares the underlying record; the request pipeline and
/// the handler see the same attributes. Mutations only mark the session dirty,
/// persisting is left to [`SessionManager::save`](crate::SessionManager::save).
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

#[derive(Debug)]
struct SessionState {
    id: SessionId,
    record: SessionRecord,
    is_new: bool,
    modified: bool,
    // stored id replaced by `regenerate`, deleted on the next save
    retired: Option<SessionId>,
}

impl Session {
    /// A fresh session that has never been stored.
    pub fn new() -> Self {
        Self::with_state(SessionId::generate(), SessionRecord::default(), true)
    }

    /// A session loaded from a store.
    pub fn from_record(id: SessionId, record: SessionRecord) -> Self {
        Self::with_state(id, record, false)
    }

    fn with_state(id: SessionId, record: SessionRecord, is_new: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                id,
                record,
                is_new,
                modified: false,
                retired: None,
            })),
        }
    }

    pub fn id(&self) -> SessionId {
        self.inner.lock().id
    }

    pub fn is_new(&self) -> bool {
        self.inner.lock().is_new
    }

    pub fn is_modified(&self) -> bool {
        self.inner.lock().modified
    }

    pub fn get(&self, key: &str) -> Option<SessionValue> {
        self.inner.lock().record.values.get(key).cloned()
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .record
            .values
            .get(key)
            .and_then(SessionValue::as_str)
            .map(str::to_string)
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<SessionValue>) {
        let mut state = self.inner.lock();
        state.record.values.insert(key.into(), value.into());
        state.modified = true;
    }

    pub fn remove(&self, key: &str) -> Option<SessionValue> {
        let mut state = self.inner.lock();
        let removed = state.record.values.remove(key);
        if removed.is_some() {
            state.modified = true;
        }
        removed
    }

    /// Reads and removes a string attribute in one step.
    pub fn pop_str(&self, key: &str) -> Option<String> {
        let mut state = self.inner.lock();
        match state.record.values.remove(key) {
            Some(SessionValue::Str(value)) => {
                state.modified = true;
                Some(value)
            }
            Some(other) => {
                state.record.values.insert(key.to_string(), other);
                None
            }
            None => None,
        }
    }

    pub fn record(&self) -> SessionRecord {
        self.inner.lock().record.clone()
    }

    /// Moves the attributes to a freshly generated id.
    ///
    /// Called when the privilege level changes (login) so an id planted in the
    /// browser beforehand never becomes an authenticated session. The old
    /// record is removed from the store when the session is next saved.
    pub fn regenerate(&self) {
        let mut state = self.inner.lock();
        if !state.is_new && state.retired.is_none() {
            state.retired = Some(state.id);
        }
        state.id = SessionId::generate();
        state.is_new = true;
        state.modified = true;
    }

    pub(crate) fn take_retired(&self) -> Option<SessionId> {
        self.inner.lock().retired.take()
    }

    pub(crate) fn mark_saved(&self) {
        let mut state = self.inner.lock();
        state.is_new = false;
        state.modified = false;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
