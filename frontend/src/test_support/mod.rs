#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod ssr;

#[cfg(test)]
pub mod helpers {
    use std::rc::Rc;

    use crate::api::ApiClient;
    use crate::session::{Identity, Role, SessionManager, SessionState};
    use crate::state::session::SessionContext;
    use crate::utils::storage::{MemoryStorage, SessionStorage, StorageError};
    use leptos::*;

    pub fn with_runtime<T>(f: impl FnOnce() -> T) -> T {
        let runtime = create_runtime();
        let result = f();
        runtime.dispose();
        result
    }

    pub fn manager_with(storage: &MemoryStorage, base_url: &str) -> SessionManager {
        SessionManager::new(ApiClient::new(base_url), Rc::new(storage.clone()))
    }

    pub fn signed_in(username: &str, role: Role) -> SessionState {
        SessionState {
            identity: Some(Identity::from_username(username)),
            loading: false,
            role,
        }
    }

    pub fn provide_state(state: SessionState) -> SessionContext {
        let ctx = create_signal(state);
        provide_context::<SessionContext>(ctx);
        ctx
    }

    /// Memory storage whose writes and removals of one key always fail.
    pub struct FailingStorage {
        pub inner: MemoryStorage,
        pub fail_on: &'static str,
    }

    impl SessionStorage for FailingStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.fail_on {
                return Err(StorageError::Write {
                    key: key.to_string(),
                    reason: "quota exceeded".into(),
                });
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            if key == self.fail_on {
                return Err(StorageError::Write {
                    key: key.to_string(),
                    reason: "locked".into(),
                });
            }
            self.inner.remove_item(key)
        }
    }
}
