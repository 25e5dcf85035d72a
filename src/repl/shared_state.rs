use std::sync::{Arc, PoisonError, RwLock};

use crate::mention::NetworkUser;

/// Upper bound on remembered candidates
const MAX_KNOWN_USERS: usize = 500;

/// State shared between the completer, the highlighter and the compose loop.
#[derive(Debug, Clone)]
pub struct SharedState {
    /// Every candidate offered during this session, oldest first
    known_users: Arc<RwLock<Vec<NetworkUser>>>,

    /// Host shown in the prompt
    api_host: Arc<RwLock<String>>,

    /// Number of posts composed so far
    composed: Arc<RwLock<usize>>,

    /// Color output setting
    color_enabled: Arc<RwLock<bool>>,
}

impl SharedState {
    pub fn new(api_host: String) -> Self {
        Self {
            known_users: Arc::new(RwLock::new(Vec::new())),
            api_host: Arc::new(RwLock::new(api_host)),
            composed: Arc::new(RwLock::new(0)),
            color_enabled: Arc::new(RwLock::new(true)),
        }
    }

    /// Remember offered candidates so a submitted body can be resolved.
    ///
    /// A user seen again replaces the older entry.
    pub fn remember(&self, users: &[NetworkUser]) {
        if users.is_empty() {
            return;
        }
        let mut known = self
            .known_users
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for user in users {
            known.retain(|k| k.id != user.id);
            known.push(user.clone());
        }
        if known.len() > MAX_KNOWN_USERS {
            let excess = known.len() - MAX_KNOWN_USERS;
            known.drain(..excess);
        }
    }

    pub fn known_users(&self) -> Vec<NetworkUser> {
        self.known_users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_api_host(&self) -> String {
        self.api_host
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn composed_count(&self) -> usize {
        *self.composed.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_composed(&self) {
        *self.composed.write().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    pub fn get_color_enabled(&self) -> bool {
        *self
            .color_enabled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_color_enabled(&self, enabled: bool) {
        *self
            .color_enabled
            .write()
            .unwrap_or_else(PoisonError::into_inner) = enabled;
    }
}
