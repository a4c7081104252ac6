use std::{cell::RefCell, collections::HashMap, rc::Rc};

use thiserror::Error;

use crate::config::ClientConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read {key}: {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write {key}: {reason}")]
    Write { key: String, reason: String },
}

/// Durable key/value storage backing the session.
///
/// Mirrors the browser `Storage` surface so the session code reads the same
/// whether it runs against `localStorage`, a file on disk, or memory.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Clones share the same entries, which lets tests
/// simulate a reload by building a second manager over the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::{
        collections::BTreeMap,
        fs,
        path::{Path, PathBuf},
    };

    use super::{SessionStorage, StorageError};

    /// JSON object on disk holding every key. The file is removed once the
    /// last key is.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn read_map(&self, key: &str) -> Result<BTreeMap<String, String>, StorageError> {
            if !self.path.exists() {
                return Ok(BTreeMap::new());
            }
            let contents = fs::read_to_string(&self.path).map_err(|e| StorageError::Read {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            if contents.trim().is_empty() {
                return Ok(BTreeMap::new());
            }
            serde_json::from_str(&contents).map_err(|e| StorageError::Read {
                key: key.to_string(),
                reason: format!("Failed to parse session file: {}", e),
            })
        }

        fn write_map(&self, key: &str, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
            let write_err = |reason: String| StorageError::Write {
                key: key.to_string(),
                reason,
            };
            if map.is_empty() {
                if self.path.exists() {
                    fs::remove_file(&self.path).map_err(|e| write_err(e.to_string()))?;
                }
                return Ok(());
            }
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
                }
            }
            let contents =
                serde_json::to_string_pretty(map).map_err(|e| write_err(e.to_string()))?;
            fs::write(&self.path, contents).map_err(|e| write_err(e.to_string()))
        }
    }

    impl SessionStorage for FileStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.read_map(key)?.get(key).cloned())
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            let mut map = self.read_map(key)?;
            map.insert(key.to_string(), value.to_string());
            self.write_map(key, &map)
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            let mut map = self.read_map(key)?;
            if map.remove(key).is_some() {
                self.write_map(key, &map)?;
            }
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{local_storage, window, LocalStorage};

#[cfg(target_arch = "wasm32")]
mod browser {
    use web_sys::{Storage, Window};

    use super::{SessionStorage, StorageError};

    pub fn window() -> Result<Window, String> {
        web_sys::window().ok_or_else(|| "No window object".to_string())
    }

    pub fn local_storage() -> Result<Storage, String> {
        window()?
            .local_storage()
            .map_err(|_| "No localStorage".to_string())?
            .ok_or_else(|| "No localStorage".to_string())
    }

    pub struct LocalStorage {
        storage: Storage,
    }

    impl LocalStorage {
        pub fn open() -> Result<Self, StorageError> {
            let storage = local_storage().map_err(StorageError::Unavailable)?;
            Ok(Self { storage })
        }
    }

    impl SessionStorage for LocalStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage
                .get_item(key)
                .map_err(|_| StorageError::Read {
                    key: key.to_string(),
                    reason: "localStorage.getItem failed".into(),
                })
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage
                .set_item(key, value)
                .map_err(|_| StorageError::Write {
                    key: key.to_string(),
                    reason: "localStorage.setItem failed".into(),
                })
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.storage
                .remove_item(key)
                .map_err(|_| StorageError::Write {
                    key: key.to_string(),
                    reason: "localStorage.removeItem failed".into(),
                })
        }
    }
}

/// Storage the session uses when nothing is injected: `localStorage` in the
/// browser, the configured session file on native hosts, memory otherwise.
#[cfg(target_arch = "wasm32")]
pub fn default_storage(_config: &ClientConfig) -> Rc<dyn SessionStorage> {
    match LocalStorage::open() {
        Ok(storage) => Rc::new(storage),
        Err(err) => {
            log::warn!("{}; session will not survive a reload", err);
            Rc::new(MemoryStorage::new())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_storage(config: &ClientConfig) -> Rc<dyn SessionStorage> {
    match &config.storage_path {
        Some(path) => Rc::new(FileStorage::new(path.clone())),
        None => Rc::new(MemoryStorage::new()),
    }
}
