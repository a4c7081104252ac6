use std::{cell::RefCell, rc::Rc};

use super::{
    Identity, Role, SessionError, SessionState, ACCESS_TOKEN_KEY, IDENTITY_KEY,
    REFRESH_TOKEN_KEY,
};
use crate::{
    api::{ApiClient, LoginRequest, RegisterRequest, TokenPair},
    config::ClientConfig,
    utils::storage::{self as storage_utils, SessionStorage},
};

const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, IDENTITY_KEY];

/// Owns the session: the in-memory [`SessionState`], the persisted tokens and
/// identity, and the default bearer header on the shared [`ApiClient`].
///
/// Clones are handles to the same session. No `RefCell` borrow is held
/// across an `.await`, so a pending login never blocks readers.
#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
    storage: Rc<dyn SessionStorage>,
    state: Rc<RefCell<SessionState>>,
}

impl SessionManager {
    pub fn new(api: ApiClient, storage: Rc<dyn SessionStorage>) -> Self {
        Self {
            api,
            storage,
            state: Rc::new(RefCell::new(SessionState::default())),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            ApiClient::from_config(config),
            storage_utils::default_storage(config),
        )
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn role(&self) -> Role {
        self.state.borrow().role
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Rebuilds the session from storage without touching the network.
    ///
    /// Anything short of a token plus a decodable identity counts as logged
    /// out; storage is left as found either way.
    pub fn restore(&self) -> SessionState {
        let restored = match self.read_key(ACCESS_TOKEN_KEY) {
            None => {
                self.api.clear_bearer_token();
                SessionState::logged_out()
            }
            Some(token) => match self.read_identity() {
                Some(identity) => {
                    self.api.set_bearer_token(&token);
                    log::info!("Restored session for {}", identity.username);
                    SessionState {
                        identity: Some(identity),
                        loading: false,
                        role: Role::from_access_token(&token),
                    }
                }
                None => {
                    log::warn!("Access token stored without a usable identity; starting logged out");
                    self.api.clear_bearer_token();
                    SessionState::logged_out()
                }
            },
        };
        *self.state.borrow_mut() = restored.clone();
        restored
    }

    /// Exchanges credentials for tokens and persists the new session.
    ///
    /// On any failure the in-memory state and storage are left as they were.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let request = LoginRequest::new(username, password);
        let tokens = self
            .api
            .obtain_token(&request)
            .await
            .map_err(SessionError::from_token_failure)?;
        if tokens.access.is_empty() {
            return Err(SessionError::Network(
                "Token endpoint returned an empty access token".into(),
            ));
        }

        let identity = Identity::from_username(username);
        self.persist_login(&tokens, &identity)?;
        self.api.set_bearer_token(&tokens.access);

        let role = Role::from_access_token(&tokens.access);
        {
            let mut state = self.state.borrow_mut();
            state.identity = Some(identity);
            state.role = role;
            state.loading = false;
        }
        log::info!("Logged in as {} (role={:?})", username, role);
        Ok(())
    }

    /// Creates the account only; the caller logs in separately.
    pub async fn register(&self, profile: &RegisterRequest) -> Result<(), SessionError> {
        self.api
            .register(profile)
            .await
            .map_err(SessionError::from_registration_failure)?;
        log::info!("Registered account {}", profile.username);
        Ok(())
    }

    /// Local teardown only; there is no server-side invalidation.
    pub fn logout(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.identity = None;
            state.role = Role::Unknown;
            state.loading = false;
        }
        for key in SESSION_KEYS {
            if let Err(err) = self.storage.remove_item(key) {
                log::warn!("Failed to clear {}: {}", key, err);
            }
        }
        self.api.clear_bearer_token();
        log::info!("Logged out");
    }

    /// Trades the stored refresh token for a new access token. Never called
    /// implicitly.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        if self.identity().is_none() {
            return Err(SessionError::CorruptedSession(
                "No active session to refresh".into(),
            ));
        }
        let refresh = self
            .storage
            .get_item(REFRESH_TOKEN_KEY)?
            .filter(|token| !token.is_empty())
            .ok_or_else(|| SessionError::CorruptedSession("No refresh token stored".into()))?;

        let refreshed = self
            .api
            .refresh_token(&refresh)
            .await
            .map_err(SessionError::from_token_failure)?;

        let mut entries = vec![(ACCESS_TOKEN_KEY, refreshed.access.as_str())];
        if let Some(rotated) = &refreshed.refresh {
            entries.push((REFRESH_TOKEN_KEY, rotated.as_str()));
        }
        self.write_entries(&entries)?;
        self.api.set_bearer_token(&refreshed.access);
        self.state.borrow_mut().role = Role::from_access_token(&refreshed.access);
        log::debug!("Access token refreshed");
        Ok(())
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(err) => {
                log::warn!("{}", err);
                None
            }
        }
    }

    fn read_identity(&self) -> Option<Identity> {
        let raw = self.read_key(IDENTITY_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(err) => {
                log::warn!("Stored identity is unreadable: {}", err);
                None
            }
        }
    }

    fn persist_login(&self, tokens: &TokenPair, identity: &Identity) -> Result<(), SessionError> {
        let identity_json = serde_json::to_string(identity).map_err(|e| {
            SessionError::CorruptedSession(format!("Failed to serialize identity: {}", e))
        })?;
        self.write_entries(&[
            (ACCESS_TOKEN_KEY, tokens.access.as_str()),
            (REFRESH_TOKEN_KEY, tokens.refresh.as_str()),
            (IDENTITY_KEY, identity_json.as_str()),
        ])
    }

    /// Writes every entry or none of them. On a failed write the entries
    /// already written get their previous values back.
    fn write_entries(&self, entries: &[(&'static str, &str)]) -> Result<(), SessionError> {
        let mut previous = Vec::with_capacity(entries.len());
        for (key, _) in entries {
            previous.push((*key, self.storage.get_item(key)?));
        }
        for (index, (key, value)) in entries.iter().enumerate() {
            if let Err(err) = self.storage.set_item(key, value) {
                self.put_back(&previous[..index]);
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn put_back(&self, previous: &[(&'static str, Option<String>)]) {
        for (key, value) in previous {
            let result = match value {
                Some(value) => self.storage.set_item(key, value),
                None => self.storage.remove_item(key),
            };
            if let Err(err) = result {
                log::warn!("Rollback of {} failed: {}", key, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        session::token_with_claims,
        test_support::helpers::FailingStorage,
        utils::storage::MemoryStorage,
    };
    use serde_json::json;

    fn manager_over(storage: &MemoryStorage) -> SessionManager {
        SessionManager::new(
            ApiClient::new("http://127.0.0.1:8000/api"),
            Rc::new(storage.clone()),
        )
    }

    #[test]
    fn new_manager_starts_loading() {
        let manager = manager_over(&MemoryStorage::new());
        assert!(manager.is_loading());
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn restore_with_token_and_identity_yields_identity() {
        let storage = MemoryStorage::new();
        let token = token_with_claims(json!({ "user_id": 7, "is_staff": true }));
        storage.set_item(ACCESS_TOKEN_KEY, &token).unwrap();
        storage.set_item(REFRESH_TOKEN_KEY, "refresh-1").unwrap();
        storage
            .set_item(IDENTITY_KEY, r#"{"username":"alice"}"#)
            .unwrap();

        let manager = manager_over(&storage);
        let state = manager.restore();

        assert_eq!(state.identity, Some(Identity::from_username("alice")));
        assert!(!state.loading);
        assert_eq!(state.role, Role::Admin);
        assert_eq!(manager.state(), state);
        assert_eq!(manager.api().bearer_token(), Some(token));
    }

    #[test]
    fn restore_with_token_but_no_identity_is_logged_out() {
        let storage = MemoryStorage::new();
        storage.set_item(ACCESS_TOKEN_KEY, "access-1").unwrap();

        let manager = manager_over(&storage);
        let state = manager.restore();

        assert_eq!(state, SessionState::logged_out());
        assert_eq!(manager.api().bearer_token(), None);
        assert!(storage.contains_key(ACCESS_TOKEN_KEY));
    }

    #[test]
    fn restore_with_undecodable_identity_is_logged_out() {
        let storage = MemoryStorage::new();
        storage.set_item(ACCESS_TOKEN_KEY, "access-1").unwrap();
        storage.set_item(IDENTITY_KEY, "{not json").unwrap();

        let state = manager_over(&storage).restore();
        assert_eq!(state, SessionState::logged_out());
    }

    #[test]
    fn restore_without_token_ignores_other_keys() {
        let storage = MemoryStorage::new();
        storage.set_item(REFRESH_TOKEN_KEY, "refresh-1").unwrap();
        storage
            .set_item(IDENTITY_KEY, r#"{"username":"alice"}"#)
            .unwrap();

        let state = manager_over(&storage).restore();
        assert_eq!(state, SessionState::logged_out());
    }

    #[test]
    fn restore_treats_empty_token_as_absent() {
        let storage = MemoryStorage::new();
        storage.set_item(ACCESS_TOKEN_KEY, "").unwrap();
        storage
            .set_item(IDENTITY_KEY, r#"{"username":"alice"}"#)
            .unwrap();

        assert_eq!(manager_over(&storage).restore(), SessionState::logged_out());
    }

    #[test]
    fn logout_clears_state_storage_and_header() {
        let storage = MemoryStorage::new();
        storage.set_item(ACCESS_TOKEN_KEY, "access-1").unwrap();
        storage.set_item(REFRESH_TOKEN_KEY, "refresh-1").unwrap();
        storage
            .set_item(IDENTITY_KEY, r#"{"username":"alice"}"#)
            .unwrap();
        let manager = manager_over(&storage);
        manager.restore();
        assert!(manager.is_authenticated());

        manager.logout();

        assert!(storage.is_empty());
        assert_eq!(manager.state(), SessionState::logged_out());
        assert_eq!(manager.api().bearer_token(), None);
        assert_eq!(manager_over(&storage).restore(), SessionState::logged_out());
    }

    #[test]
    fn persist_login_rolls_back_partial_writes() {
        let inner = MemoryStorage::new();
        let manager = SessionManager::new(
            ApiClient::new("http://127.0.0.1:8000/api"),
            Rc::new(FailingStorage {
                inner: inner.clone(),
                fail_on: IDENTITY_KEY,
            }),
        );
        let tokens = TokenPair {
            access: "access-1".into(),
            refresh: "refresh-1".into(),
        };

        let err = manager
            .persist_login(&tokens, &Identity::from_username("alice"))
            .unwrap_err();

        assert!(matches!(err, SessionError::CorruptedSession(_)));
        assert!(inner.is_empty());
    }

    #[test]
    fn logout_continues_past_storage_failures() {
        let inner = MemoryStorage::new();
        inner.set_item(ACCESS_TOKEN_KEY, "access-1").unwrap();
        inner.set_item(REFRESH_TOKEN_KEY, "refresh-1").unwrap();
        inner
            .set_item(IDENTITY_KEY, r#"{"username":"alice"}"#)
            .unwrap();
        let manager = SessionManager::new(
            ApiClient::new("http://127.0.0.1:8000/api"),
            Rc::new(FailingStorage {
                inner: inner.clone(),
                fail_on: REFRESH_TOKEN_KEY,
            }),
        );
        manager.restore();

        manager.logout();

        assert!(!inner.contains_key(ACCESS_TOKEN_KEY));
        assert!(!inner.contains_key(IDENTITY_KEY));
        assert!(manager.identity().is_none());
        assert_eq!(manager.api().bearer_token(), None);
    }
}
