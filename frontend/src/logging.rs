use log::Level;

/// Routes `log` records to the browser console. Safe to call more than once.
pub fn init() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        Level::Debug
    } else {
        Level::Info
    };
    if console_log::init_with_level(level).is_err() {
        log::debug!("Console logger already installed");
    }
}
