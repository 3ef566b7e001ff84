//! Wizard sessions and their in-memory store.

use std::collections::HashSet;
use std::sync::Arc;

use moka::future::Cache;
use tokio::sync::Mutex;

use super::custom_id::SessionId;
use super::draft::DraftList;
use super::steps::WizardStep;
use crate::descriptor::{ButtonDescriptor, ControlKey};
use crate::host::{Actor, MessageRef};

/// Upper bound on concurrently open wizards.
const MAX_SESSIONS: u64 = 10_000;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Cancelled,
    Committed,
}

/// One operator's wizard on one target message.
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub id: SessionId,
    pub operator: Actor,
    pub target: MessageRef,
    /// Role buttons on the target when the wizard opened, in row order.
    pub existing: Vec<ButtonDescriptor>,
    /// Buttons staged for commit.
    pub draft: DraftList,
    /// The button being configured.
    pub current: ButtonDescriptor,
    pub step: WizardStep,
    pub state: SessionState,
}

impl WizardSession {
    /// Start a session at the first step with an empty draft.
    #[must_use]
    pub fn new(operator: Actor, target: MessageRef, existing: Vec<ButtonDescriptor>) -> Self {
        Self {
            id: SessionId::new(),
            operator,
            target,
            existing,
            draft: DraftList::new(),
            current: ButtonDescriptor::new(target),
            step: WizardStep::ChooseRole,
            state: SessionState::Active,
        }
    }

    /// Keys of the role buttons present when the wizard opened.
    #[must_use]
    pub fn baseline(&self) -> HashSet<ControlKey> {
        self.existing
            .iter()
            .filter_map(ButtonDescriptor::key)
            .collect()
    }

    /// Existing buttons other than the one being edited by `candidate`.
    pub fn existing_except<'a>(
        &'a self,
        candidate: &'a ButtonDescriptor,
    ) -> impl Iterator<Item = &'a ButtonDescriptor> + 'a {
        self.existing
            .iter()
            .filter(move |entry| candidate.replaces.is_none() || entry.key() != candidate.replaces)
    }
}

/// Shared handle to a session. The mutex serializes step transitions.
pub type SessionHandle = Arc<Mutex<WizardSession>>;

/// Open wizard sessions.
///
/// Sessions stay until the operator commits or cancels. The capacity bound
/// only evicts abandoned sessions once many wizards are open at once.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<SessionId, SessionHandle>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }

    #[must_use]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }

    /// Store a session and return its handle.
    pub async fn insert(&self, session: WizardSession) -> SessionHandle {
        let id = session.id;
        let handle = Arc::new(Mutex::new(session));
        self.cache.insert(id, Arc::clone(&handle)).await;
        handle
    }

    pub async fn get(&self, id: SessionId) -> Option<SessionHandle> {
        self.cache.get(&id).await
    }

    pub async fn remove(&self, id: SessionId) {
        self.cache.invalidate(&id).await;
    }
}
