//! JS-facing bindings for everything outside the tag cloud.
//! The tag cloud's own binding lives next to its core in `simulation::facade`.

pub mod wasm;
