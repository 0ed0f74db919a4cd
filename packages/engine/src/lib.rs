//! iGROWTHIC engine - tag cloud physics and site logic in WASM
//!
//! Architecture:
//! - core/       - clock, rng, errors, page cursor state
//! - systems/    - rigid bodies and the physics world
//! - simulation/ - the tag cloud: lifecycle, spawning, walls, input, drawing
//! - domain/     - strategy advisor, studio ideas, blog, app shell
//! - services/   - storage and remote text generation
//! - api/        - JS bindings for the domain

pub mod core;
pub mod systems;
pub mod simulation;
pub mod domain;
pub mod services;
pub mod api;

pub use systems::rigid_body;
pub use systems::rigid_body_system;

use wasm_bindgen::prelude::*;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    // A second init keeps the logger already installed.
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("iGROWTHIC engine {} initialized", version());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub use simulation::TagCloud;
