//! Driven port for persisting the bearer token between runs.

use std::sync::{Mutex, PoisonError};

use super::define_port_error;
use crate::domain::BearerToken;

define_port_error! {
    /// Errors surfaced while reading or writing the persisted token.
    pub enum TokenStoreError {
        /// The backing storage could not be read or written.
        Io { message: String } =>
            "token store i/o failed: {message}",
        /// The stored value is not a usable token.
        Corrupt { message: String } =>
            "stored token is corrupt: {message}",
    }
}

/// Port for the persistence collaborator behind session hydration.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    /// Return the persisted token, if one exists.
    fn load(&self) -> Result<Option<BearerToken>, TokenStoreError>;

    /// Persist `token`, replacing any previous value.
    fn save(&self, token: &BearerToken) -> Result<(), TokenStoreError>;

    /// Forget the persisted token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-lifetime store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<BearerToken>>,
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<BearerToken>, TokenStoreError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &BearerToken) -> Result<(), TokenStoreError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the in-memory store.
    use super::*;

    #[test]
    fn in_memory_store_round_trips_and_clears() {
        let store = InMemoryTokenStore::default();
        assert_eq!(store.load().expect("load"), None);

        let token = BearerToken::new("tok123").expect("valid token");
        store.save(&token).expect("save");
        assert_eq!(store.load().expect("load"), Some(token));

        store.clear().expect("clear");
        store.clear().expect("clearing twice succeeds");
        assert_eq!(store.load().expect("load"), None);
    }
}
