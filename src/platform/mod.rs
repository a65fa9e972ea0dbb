//! Platform abstraction layer
//!
//! Browser bindings for the experience core:
//! - Defense-only fire input (Space key, touch)
//! - Frame publication to the JS renderer
//! - DOM overlay updates (panels, counters, revealed text)

#[cfg(target_arch = "wasm32")]
pub mod web;
