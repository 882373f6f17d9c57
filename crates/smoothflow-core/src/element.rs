//! Tracked-element state machine.
//!
//! One [`TrackedElement`] per registered element. It snapshots geometry
//! before an update, compares it with the geometry after the update, and
//! when a watched property changed it plays the FLIP sequence:
//!
//! ```text
//! Inactive --attempt_reflow (geometry changed)--> Active
//! Active   --own completion signal-------------> Inactive (+ re-capture)
//! Active   --capture_before (interruption)-----> Inactive (+ capture)
//! Active   --attempt_reflow (target missing)---> Inactive
//! ```

use std::fmt;

use crate::config::{ReflowConfig, WatchedProperty};
use crate::geometry::{px, translate, Rect};
use crate::surface::{style, Surface, TransitionEnd};

/// Trigger description used for reflows driven by the host update cycle.
pub const DATA_UPDATE: &str = "data update";

/// Whether a transition is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReflowState {
    /// No transition in flight.
    #[default]
    Inactive,
    /// Styles are mutated and a completion signal is awaited.
    Active,
}

/// Overflow pair saved while a transition hides scrollbars.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SavedOverflow {
    x: String,
    y: String,
}

/// One element under transition management.
#[derive(Debug, Clone)]
pub struct TrackedElement<N> {
    config: ReflowConfig<N>,
    /// Element the current (or last) transition was played on.
    target: Option<N>,
    before: Option<Rect>,
    after: Option<Rect>,
    state: ReflowState,
    pending_removal: bool,
    saved_overflow: Option<SavedOverflow>,
}

impl<N: Clone + PartialEq + fmt::Debug> TrackedElement<N> {
    /// Create an inactive element from validated configuration.
    #[must_use]
    pub const fn new(config: ReflowConfig<N>) -> Self {
        Self {
            config,
            target: None,
            before: None,
            after: None,
            state: ReflowState::Inactive,
            pending_removal: false,
            saved_overflow: None,
        }
    }

    /// Configuration captured at registration.
    #[must_use]
    pub const fn config(&self) -> &ReflowConfig<N> {
        &self.config
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ReflowState {
        self.state
    }

    /// Whether a transition is in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == ReflowState::Active
    }

    /// Geometry captured by the last `capture_before`; `None` if the target was absent.
    #[must_use]
    pub const fn before(&self) -> Option<&Rect> {
        self.before.as_ref()
    }

    /// Geometry captured by the current cycle's reflow attempt.
    #[must_use]
    pub const fn after(&self) -> Option<&Rect> {
        self.after.as_ref()
    }

    /// Element the last transition was played on.
    #[must_use]
    pub const fn target(&self) -> Option<&N> {
        self.target.as_ref()
    }

    /// Whether removal has been requested.
    #[must_use]
    pub const fn is_pending_removal(&self) -> bool {
        self.pending_removal
    }

    /// Flag for removal at the orchestrator's next flush point.
    pub fn schedule_removal(&mut self) {
        self.pending_removal = true;
    }

    /// Resolve the target against the host root.
    pub fn resolve<S>(&self, surface: &S, root: Option<&N>) -> Option<N>
    where
        S: Surface<Node = N>,
    {
        root.and_then(|root| surface.resolve(root, self.config.element()))
    }

    /// Snapshot geometry before the host mutates its visual tree.
    ///
    /// An in-flight transition is finalized first so the snapshot is never
    /// taken from a half-mutated style state.
    pub fn capture_before<S>(&mut self, surface: &mut S, root: Option<&N>)
    where
        S: Surface<Node = N>,
    {
        self.after = None;

        if self.is_active() {
            self.finalize(surface);
            self.log(format_args!("transition was interrupted"));
        }

        self.before = self
            .resolve(surface, root)
            .map(|node| surface.measure(&node));
    }

    /// Compare geometry with the before snapshot and play a transition if
    /// any watched property changed.
    ///
    /// Returns `true` when a transition was started.
    pub fn attempt_reflow<S>(&mut self, surface: &mut S, root: Option<&N>, trigger: &str) -> bool
    where
        S: Surface<Node = N>,
    {
        let Some(node) = self.resolve(surface, root) else {
            self.log(format_args!("could not find registered element"));
            self.state = ReflowState::Inactive;
            self.saved_overflow = None;
            return false;
        };

        if self.is_active() {
            return false;
        }

        self.log(format_args!("reflow triggered by: {trigger}"));

        let after = surface.measure(&node);
        self.after = Some(after);
        self.target = Some(node.clone());

        let Some(before) = self.before else {
            self.log(format_args!("no before geometry, nothing to invert"));
            return false;
        };

        let changed = self
            .config
            .properties()
            .iter()
            .any(|&p| before.differs(&after, p));
        if !changed {
            self.log(format_args!("property values did not change"));
            return false;
        }

        self.log(format_args!("before {before:?}, after {after:?}"));
        self.play(surface, &node, &before, &after);
        self.state = ReflowState::Active;
        true
    }

    /// Invert, flush, then play. The order of these writes is load-bearing.
    fn play<S>(&mut self, surface: &mut S, node: &N, before: &Rect, after: &Rect)
    where
        S: Surface<Node = N>,
    {
        let computed = surface.computed_style(node);

        if self.config.hide_scrollbar() {
            self.saved_overflow = Some(SavedOverflow {
                x: computed.overflow_x.clone(),
                y: computed.overflow_y.clone(),
            });
            surface.set_style(node, style::OVERFLOW_X, Some(style::HIDDEN));
            surface.set_style(node, style::OVERFLOW_Y, Some(style::HIDDEN));
        }

        for &property in self.config.properties() {
            let start = match property {
                WatchedProperty::Transform => {
                    let (dx, dy) = before.inverse_offset(after);
                    translate(dx, dy)
                }
                WatchedProperty::Height => px(before.height),
                WatchedProperty::Width => px(before.width),
            };
            surface.set_style(node, property.css_name(), Some(&start));
        }

        surface.force_layout(node);

        let transition = [computed.transition.as_str(), self.config.transition()]
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        surface.set_style(node, style::TRANSITION, Some(&transition));

        for &property in self.config.properties() {
            let end = match property {
                WatchedProperty::Transform => None,
                WatchedProperty::Height => Some(px(after.height)),
                WatchedProperty::Width => Some(px(after.width)),
            };
            surface.set_style(node, property.css_name(), end.as_deref());
        }
    }

    /// Revert every override written by the in-flight transition.
    ///
    /// A no-op unless a transition is active.
    pub fn finalize<S>(&mut self, surface: &mut S)
    where
        S: Surface<Node = N>,
    {
        if !self.is_active() {
            return;
        }
        if let Some(node) = self.target.clone() {
            for &property in self.config.properties() {
                surface.set_style(&node, property.css_name(), None);
            }
            if let Some(saved) = self.saved_overflow.take() {
                surface.set_style(&node, style::OVERFLOW_X, non_empty(&saved.x));
                surface.set_style(&node, style::OVERFLOW_Y, non_empty(&saved.y));
            }
            surface.set_style(&node, style::TRANSITION, None);
        }
        self.state = ReflowState::Inactive;
    }

    /// Handle a completion signal routed from the host root.
    ///
    /// The element's own signal for a watched property ends the transition
    /// and re-captures geometry for chained transitions. Other signals may
    /// trigger a reflow if they pass the configured completion filter.
    pub fn on_completion<S>(&mut self, surface: &mut S, root: Option<&N>, event: &TransitionEnd<N>)
    where
        S: Surface<Node = N>,
    {
        if self.target.as_ref() == Some(&event.target) {
            if self.config.watches_name(&event.property_name) {
                self.finalize(surface);
                self.capture_before(surface, root);
            }
            return;
        }

        if self.is_external_trigger(surface, root, event) {
            let trigger = surface.describe(&event.target);
            self.attempt_reflow(surface, root, &trigger);
        }
    }

    fn is_external_trigger<S>(&self, surface: &S, root: Option<&N>, event: &TransitionEnd<N>) -> bool
    where
        S: Surface<Node = N>,
    {
        let Some(filter) = self.config.completion_filter() else {
            return false;
        };

        if let Some(name) = &filter.property_name {
            if *name != event.property_name {
                return false;
            }
        }
        if let Some(selector) = &filter.selector {
            if !surface.matches(&event.target, selector) {
                return false;
            }
        }

        // Position transitions can be pushed around by anything; size
        // transitions only care about signals from inside the element.
        if self.config.watches(WatchedProperty::Transform) {
            return true;
        }
        let current = self.resolve(surface, root);
        current.as_ref().is_some_and(|own| event.passed_through(own))
            || self.target.as_ref().is_some_and(|own| event.passed_through(own))
    }

    fn log(&self, message: fmt::Arguments<'_>) {
        if self.config.debug() {
            tracing::debug!(element = %self.config.element().describe(), "{message}");
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
