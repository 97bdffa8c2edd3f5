//! Logging through the `log` facade, configured with `RUST_LOG`
//!
//! Targets are module paths. The useful ones when debugging a scene:
//!
//! - `vrml_engine::assets::vrml::parser`: parse summary at `info`, unknown
//!   nodes and unresolved `USE` at `warn`, skipped fields at `trace`
//! - `vrml_engine::assets::loader`: inline fetch requests and stale results
//! - `vrml_engine::browser`: scene loads, inline status changes, viewpoints
//! - `vrml_engine::assets::texture_cache`: texture loads and failures
//! - `vrml_engine::render::traversal`: per-frame draw counts at `trace`
//!
//! For example `RUST_LOG=vrml_engine::browser=debug,vrml_engine=warn`.

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize logging with `filter` applying when `RUST_LOG` is unset.
///
/// Does nothing if a logger is already installed.
pub fn init_with_default(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
