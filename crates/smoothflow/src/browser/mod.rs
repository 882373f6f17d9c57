//! Browser runtime for smoothflow.
//!
//! Bridges the orchestrator to the live DOM: a [`Surface`](smoothflow_core::Surface)
//! implementation over `web_sys`, `transitionend` conversion, and the
//! `SmoothReflow` host object exported to JavaScript.

#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod events;

#[cfg(target_arch = "wasm32")]
pub use app::SmoothReflow;
#[cfg(target_arch = "wasm32")]
pub use dom::DomSurface;
#[cfg(target_arch = "wasm32")]
pub use events::transition_end_to_signal;
