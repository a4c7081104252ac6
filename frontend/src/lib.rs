pub mod api;
pub mod components;
pub mod config;
#[cfg(target_arch = "wasm32")]
pub mod logging;
pub mod session;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use session::{Identity, Role, SessionError, SessionManager, SessionState};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    logging::init();
    let config = config::client_config();
    log::info!("Starting HRMS frontend against {}", config.api_base_url);
}
