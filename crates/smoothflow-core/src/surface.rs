//! Rendering-surface capability trait.
//!
//! The state machine never touches a platform API directly. Everything it
//! needs from the visual tree goes through [`Surface`]: resolving an
//! element, measuring it, reading its computed style, writing inline
//! style overrides, and forcing a synchronous layout flush. A browser
//! adapter implements this over the DOM; tests implement it in memory.

use crate::config::ElementRef;
use crate::geometry::Rect;

/// Inline style property names written by the state machine.
pub mod style {
    /// Horizontal overflow.
    pub const OVERFLOW_X: &str = "overflow-x";
    /// Vertical overflow.
    pub const OVERFLOW_Y: &str = "overflow-y";
    /// Transition declaration.
    pub const TRANSITION: &str = "transition";
    /// Value used to hide overflow during a transition.
    pub const HIDDEN: &str = "hidden";
}

/// The subset of an element's computed style the state machine reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    /// Computed `overflow-x`.
    pub overflow_x: String,
    /// Computed `overflow-y`.
    pub overflow_y: String,
    /// Computed `transition`, empty when none is in effect.
    pub transition: String,
}

/// Platform notification that a style transition finished.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionEnd<N> {
    /// Element whose transition finished.
    pub target: N,
    /// Name of the property that finished transitioning.
    pub property_name: String,
    /// Propagation path captured when the signal was raised, target first.
    ///
    /// Kept separately from the live tree so a target that has since been
    /// detached still reports the ancestors it had.
    pub path: Vec<N>,
}

impl<N: PartialEq> TransitionEnd<N> {
    /// Create a signal whose path is just the target.
    pub fn new(target: N, property_name: impl Into<String>) -> Self
    where
        N: Clone,
    {
        Self {
            path: vec![target.clone()],
            target,
            property_name: property_name.into(),
        }
    }

    /// Replace the propagation path.
    #[must_use]
    pub fn with_path(mut self, path: Vec<N>) -> Self {
        self.path = path;
        self
    }

    /// Whether the signal passed through `node` while propagating.
    pub fn passed_through(&self, node: &N) -> bool {
        self.path.iter().any(|n| n == node)
    }
}

/// Geometry and style access for one rendering backend.
pub trait Surface {
    /// Handle to a visual element. Cheap to clone; equality is identity.
    type Node: Clone + PartialEq + std::fmt::Debug;

    /// Locate `element` relative to `root`, or `None` if it is not rendered.
    fn resolve(&self, root: &Self::Node, element: &ElementRef<Self::Node>) -> Option<Self::Node>;

    /// Current bounding box of `node`.
    fn measure(&self, node: &Self::Node) -> Rect;

    /// Computed style of `node`.
    fn computed_style(&self, node: &Self::Node) -> ComputedStyle;

    /// Write an inline style property; `None` removes the override.
    fn set_style(&mut self, node: &Self::Node, property: &str, value: Option<&str>);

    /// Flush pending style changes to layout synchronously.
    fn force_layout(&mut self, node: &Self::Node);

    /// Whether `node` matches a CSS selector.
    fn matches(&self, node: &Self::Node, selector: &str) -> bool;

    /// Short label for diagnostics.
    fn describe(&self, node: &Self::Node) -> String {
        format!("{node:?}")
    }
}
