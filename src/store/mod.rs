//! Process-lifetime session storage.
//!
//! Sessions live in memory only: nothing survives a restart and the store is
//! not shared between server processes. Each session sits behind its own
//! lock, so a `merge` is an atomic read-modify-write with respect to other
//! calls on the same session, while different sessions never contend beyond
//! the brief map lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use uuid::Uuid;

use crate::models::{NewSession, Session, SessionPatch};

type SessionCell = Arc<Mutex<Session>>;

pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionCell>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store a new session under a fresh random identifier.
    ///
    /// The session becomes visible to other callers only once it is fully
    /// built and inserted.
    pub fn create(&self, input: NewSession) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            filename: input.filename,
            file_path: input.file_path,
            text: input.text,
            summary: input.summary,
            challenges: Default::default(),
            answers: Default::default(),
            feedback: Default::default(),
            created_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().expect("session map lock poisoned");
        sessions.insert(session.id, Arc::new(Mutex::new(session.clone())));
        session
    }

    /// Snapshot of a session, or `None` if the id is unknown.
    pub fn get(&self, id: Uuid) -> Option<Session> {
        let cell = self.cell(id)?;
        let session = cell.lock().expect("session lock poisoned");
        Some(session.clone())
    }

    pub fn exists(&self, id: Uuid) -> bool {
        self.sessions
            .read()
            .expect("session map lock poisoned")
            .contains_key(&id)
    }

    /// Overwrite the fields set in `patch`. Returns `false` (and changes
    /// nothing) when the id is unknown.
    pub fn merge(&self, id: Uuid, patch: SessionPatch) -> bool {
        self.update(id, |session| {
            if let Some(summary) = patch.summary {
                session.summary = summary;
            }
            if let Some(challenges) = patch.challenges {
                session.challenges = challenges;
            }
            if let Some(answers) = patch.answers {
                session.answers = answers;
            }
            if let Some(feedback) = patch.feedback {
                session.feedback = feedback;
            }
        })
        .is_some()
    }

    /// Run `f` against a session while holding that session's lock.
    pub fn update<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let cell = self.cell(id)?;
        let mut session = cell.lock().expect("session lock poisoned");
        Some(f(&mut session))
    }

    pub fn len(&self) -> usize {
        self.sessions.read().expect("session map lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, id: Uuid) -> Option<SessionCell> {
        self.sessions
            .read()
            .expect("session map lock poisoned")
            .get(&id)
            .cloned()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
        }
    }
}
