//! Smoothflow: FLIP layout transitions for component hosts.
//!
//! When a host update moves or resizes an element, smoothflow measures it
//! before and after the update, writes an inverted starting style, and lets
//! the platform's native transition play it back to its new geometry.
//!
//! # Browser Usage (WASM)
//!
//! ```javascript
//! import init, { SmoothReflow } from './smoothflow.js';
//!
//! async function main() {
//!     await init();
//!     const reflow = new SmoothReflow('#app');
//!     reflow.registerElement('[{"element": ".list"}, {"element": ".card", "property": "transform"}]');
//!     reflow.mounted();
//! }
//! ```
//!
//! # Native Usage
//!
//! Any backend implementing [`Surface`] can drive a [`ReflowOrchestrator`]
//! directly; registrations can be loaded from a [`ReflowManifest`].

#![allow(clippy::doc_markdown, clippy::needless_pass_by_value, clippy::missing_const_for_fn)]

pub use smoothflow_core::*;

pub mod browser;
mod manifest;

pub use manifest::{OneOrMany, ReflowManifest};

#[cfg(target_arch = "wasm32")]
pub use browser::{DomSurface, SmoothReflow};
