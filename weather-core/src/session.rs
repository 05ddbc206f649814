use dashmap::DashMap;

use crate::{
    locale::DEFAULT_LANGUAGE,
    model::{ChatId, UnitSystem},
};

/// Per-chat conversational context.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub resolved_city: Option<String>,
    pub language: String,
    pub unit_system: UnitSystem,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            resolved_city: None,
            language: DEFAULT_LANGUAGE.to_string(),
            unit_system: UnitSystem::default(),
        }
    }
}

impl SessionState {
    /// City to query, if a non-empty one has been resolved.
    pub fn city(&self) -> Option<&str> {
        self.resolved_city.as_deref().filter(|c| !c.is_empty())
    }
}

/// Sessions keyed by chat id. Entries live for the whole process.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<ChatId, SessionState>,
    defaults: SessionState,
}

impl SessionStore {
    pub fn new(defaults: SessionState) -> Self {
        Self {
            sessions: DashMap::new(),
            defaults,
        }
    }

    /// Snapshot of the chat's session, created from defaults on first access.
    pub fn get(&self, chat_id: ChatId) -> SessionState {
        self.sessions
            .entry(chat_id)
            .or_insert_with(|| self.defaults.clone())
            .clone()
    }

    /// Apply `mutator` under the chat's entry lock and return the new state.
    pub fn update<F>(&self, chat_id: ChatId, mutator: F) -> SessionState
    where
        F: FnOnce(&mut SessionState),
    {
        let mut entry = self
            .sessions
            .entry(chat_id)
            .or_insert_with(|| self.defaults.clone());
        mutator(entry.value_mut());
        entry.clone()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionState::default())
    }
}
