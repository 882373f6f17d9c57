//! Core of smoothflow: FLIP layout transitions, independent of any
//! rendering backend.
//!
//! - Geometry snapshots: [`Rect`]
//! - Registration options: [`ReflowOptions`], validated into [`ReflowConfig`]
//! - Backend capability trait: [`Surface`]
//! - Per-element state machine: [`TrackedElement`]
//! - Per-host orchestration: [`ReflowOrchestrator`]
//!
//! # Update cycle
//!
//! ```text
//! host                     orchestrator                 surface
//!  | before update  ----->  before_phase  ---measure--->  |
//!  | mutate visual tree                                   |
//!  | commit (suspend)                                     |
//!  | after update   ----->  after_phase   ---invert/play> |
//!  | transitionend  ----->  on_completion ---finalize---> |
//! ```

mod config;
mod element;
mod error;
mod geometry;
mod orchestrator;
pub mod surface;
#[cfg(test)]
mod testing;

pub use config::{
    default_transition, CompletionFilter, ElementRef, ReflowConfig, ReflowOptions,
    WatchedProperty, DEFAULT_TIMING,
};
pub use element::{ReflowState, TrackedElement, DATA_UPDATE};
pub use error::{ConfigError, ReflowError};
pub use geometry::{px, translate, Rect};
pub use orchestrator::ReflowOrchestrator;
pub use surface::{ComputedStyle, Surface, TransitionEnd};
