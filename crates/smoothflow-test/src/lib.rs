#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::manual_assert)]
#![allow(clippy::doc_markdown)]
//! Testing harness for smoothflow.
//!
//! No browser required: [`FakeSurface`] is an in-memory element tree with
//! explicit layout boxes, and [`Harness`] drives the before/after update
//! cycle and completion signals against it.
//!
//! ```
//! use smoothflow_core::{Rect, ReflowOptions, ReflowState};
//! use smoothflow_test::Harness;
//!
//! let mut h = Harness::new("div#app", Rect::new(0.0, 0.0, 400.0, 400.0));
//! let root = h.root();
//! let panel = h.spawn(root, "div.panel", Rect::new(0.0, 0.0, 200.0, 50.0));
//! h.mount();
//! h.register(ReflowOptions::new().selector(".panel")).unwrap();
//!
//! h.update(|s| s.set_layout(panel, Rect::new(0.0, 0.0, 200.0, 120.0)));
//! h.assert_inline(panel, "height", Some("120px"))
//!     .assert_state(0, ReflowState::Active);
//! ```

mod harness;
mod selector;
mod surface;

pub use harness::Harness;
pub use selector::{Selector, SelectorError, SelectorParser};
pub use surface::{FakeSurface, Mutation, NodeId};
