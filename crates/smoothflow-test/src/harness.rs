//! Update-cycle driver for smoothflow hosts.
//!
//! Plays the part of a component host: it owns the surface and the
//! orchestrator, calls the before/after hooks around every mutation and
//! dispatches completion signals the way a browser would bubble them to the
//! host root.

use smoothflow_core::{
    ElementRef, Rect, ReflowError, ReflowOptions, ReflowOrchestrator, ReflowState, Surface,
    TransitionEnd,
};

use crate::surface::{FakeSurface, NodeId};

/// Test harness for a single smoothflow host.
#[derive(Debug)]
pub struct Harness {
    surface: FakeSurface,
    orchestrator: ReflowOrchestrator<NodeId>,
    root: NodeId,
}

impl Harness {
    /// Create a host whose root element is described by `root_descriptor`.
    ///
    /// The host is not mounted yet: completion signals are dropped until
    /// [`Harness::mount`] is called.
    #[must_use]
    pub fn new(root_descriptor: &str, layout: Rect) -> Self {
        let mut surface = FakeSurface::new();
        let root = surface.create(root_descriptor, layout);
        Self {
            surface,
            orchestrator: ReflowOrchestrator::with_root(root),
            root,
        }
    }

    /// Host root element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Rendering surface.
    #[must_use]
    pub const fn surface(&self) -> &FakeSurface {
        &self.surface
    }

    /// Mutable rendering surface, for building the tree or moving layout
    /// outside of an update cycle.
    pub fn surface_mut(&mut self) -> &mut FakeSurface {
        &mut self.surface
    }

    /// Orchestrator under test.
    #[must_use]
    pub const fn orchestrator(&self) -> &ReflowOrchestrator<NodeId> {
        &self.orchestrator
    }

    /// Create an element and append it under `parent`.
    pub fn spawn(&mut self, parent: NodeId, descriptor: &str, layout: Rect) -> NodeId {
        let node = self.surface.create(descriptor, layout);
        self.surface.append(parent, node);
        node
    }

    // === Lifecycle ===

    /// Attach the completion listener to the root.
    pub fn mount(&mut self) -> &mut Self {
        self.orchestrator.attach_listener(self.root);
        self
    }

    /// Detach the completion listener. Registrations survive.
    pub fn unmount(&mut self) -> &mut Self {
        self.orchestrator.detach_listener();
        self
    }

    /// Register one element.
    pub fn register(&mut self, options: ReflowOptions<NodeId>) -> Result<&mut Self, ReflowError> {
        self.orchestrator.register(options)?;
        Ok(self)
    }

    /// Register several elements.
    pub fn register_all(
        &mut self,
        options: impl IntoIterator<Item = ReflowOptions<NodeId>>,
    ) -> Result<&mut Self, ReflowError> {
        self.orchestrator.register_all(options)?;
        Ok(self)
    }

    /// Schedule removal of one element.
    pub fn unregister(&mut self, element: &ElementRef<NodeId>) -> Result<&mut Self, ReflowError> {
        self.orchestrator.unregister(&self.surface, element)?;
        Ok(self)
    }

    // === Update cycle ===

    /// Before-update hook.
    pub fn before_update(&mut self) -> &mut Self {
        self.orchestrator.before_phase(&mut self.surface);
        self
    }

    /// After-update hook. Returns the number of transitions started.
    pub fn after_update(&mut self) -> usize {
        self.orchestrator.after_phase(&mut self.surface)
    }

    /// Run a full update cycle around `mutate`.
    pub fn update(&mut self, mutate: impl FnOnce(&mut FakeSurface)) -> usize {
        self.before_update();
        mutate(&mut self.surface);
        self.after_update()
    }

    // === Completion signals ===

    /// Dispatch a completion signal raised on `node`, bubbling through its
    /// current ancestors.
    pub fn complete(&mut self, node: NodeId, property_name: &str) -> &mut Self {
        let path = self.surface.path(node);
        self.complete_with_path(node, property_name, path)
    }

    /// Dispatch a completion signal with an explicit propagation path, as
    /// captured when the signal was raised.
    pub fn complete_with_path(
        &mut self,
        node: NodeId,
        property_name: &str,
        path: Vec<NodeId>,
    ) -> &mut Self {
        let event = TransitionEnd::new(node, property_name).with_path(path);
        self.orchestrator.on_completion(&mut self.surface, &event);
        self
    }

    // === Assertions ===

    /// Assert the inline override of `property` on `node`.
    ///
    /// # Panics
    ///
    /// Panics if the inline value differs.
    pub fn assert_inline(&self, node: NodeId, property: &str, expected: Option<&str>) -> &Self {
        let actual = self.surface.inline(node, property);
        assert_eq!(
            actual,
            expected,
            "inline '{property}' on {} was {actual:?}, expected {expected:?}",
            self.surface.describe(&node)
        );
        self
    }

    /// Assert that `node` carries no inline overrides at all.
    ///
    /// # Panics
    ///
    /// Panics if any inline style is present.
    pub fn assert_clean(&self, node: NodeId) -> &Self {
        let styles = self.surface.inline_styles(node);
        assert!(
            styles.is_empty(),
            "expected no inline styles on {}, found {styles:?}",
            self.surface.describe(&node)
        );
        self
    }

    /// Assert the state of the element registered at `index`.
    ///
    /// # Panics
    ///
    /// Panics if no element is registered at `index` or its state differs.
    pub fn assert_state(&self, index: usize, expected: ReflowState) -> &Self {
        let actual = self.orchestrator.state_of(index);
        assert_eq!(
            actual,
            Some(expected),
            "element {index} was {actual:?}, expected {expected:?}"
        );
        self
    }

    /// Assert how many elements are tracked.
    ///
    /// # Panics
    ///
    /// Panics if the count differs.
    pub fn assert_tracked(&self, expected: usize) -> &Self {
        assert_eq!(self.orchestrator.len(), expected, "tracked element count");
        self
    }
}
