use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::OnceLock};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";

const API_URL_VAR: &str = "HRMS_API_URL";
const SESSION_FILE_VAR: &str = "HRMS_SESSION_FILE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Session file for native hosts. Ignored in the browser, where
    /// `localStorage` is used.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_path: None,
        }
    }
}

static CLIENT_CONFIG: OnceLock<ClientConfig> = OnceLock::new();

impl ClientConfig {
    /// Builds a config from a key lookup, falling back to defaults for
    /// missing keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_base_url = lookup(API_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(anyhow!("Invalid {} value: {}", API_URL_VAR, api_base_url));
        }

        let storage_path = lookup(SESSION_FILE_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            storage_path,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `window.__HRMS_CONFIG = { api_base_url: "..." }` when present.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> anyhow::Result<Self> {
        let api_base_url = get_from_window_config();
        Self::from_lookup(|key| if key == API_URL_VAR { api_base_url.clone() } else { None })
    }
}

#[cfg(target_arch = "wasm32")]
fn get_from_window_config() -> Option<String> {
    let w = web_sys::window()?;
    let any = js_sys::Reflect::get(&w, &"__HRMS_CONFIG".into()).ok()?;
    if any.is_undefined() || any.is_null() {
        return None;
    }
    let obj = js_sys::Object::from(any);
    let val = js_sys::Reflect::get(&obj, &"api_base_url".into())
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
        .or_else(|| js_sys::Reflect::get(&obj, &"API_BASE_URL".into()).ok());
    val.and_then(|v| v.as_string())
}

/// Process-wide config, resolved once. An invalid environment is logged and
/// replaced by the defaults.
pub fn client_config() -> &'static ClientConfig {
    CLIENT_CONFIG.get_or_init(|| match ClientConfig::load() {
        Ok(config) => {
            log::info!("Client config loaded (api_base_url={})", config.api_base_url);
            config
        }
        Err(err) => {
            log::warn!("{}; falling back to {}", err, DEFAULT_API_BASE_URL);
            ClientConfig::default()
        }
    })
}
