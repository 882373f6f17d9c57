//! Transition orchestrator: drives the before/after protocol for every
//! tracked element of one host.
//!
//! Per update cycle the host calls [`ReflowOrchestrator::before_phase`]
//! before mutating its visual tree, and [`ReflowOrchestrator::after_phase`]
//! once the mutation has been committed to the rendering surface.
//! Completion signals caught on the host root are handed to
//! [`ReflowOrchestrator::on_completion`] whenever they arrive.
//!
//! Removal is always deferred: `unregister` only flags an element, and the
//! flag is honored at the start of the next before phase or the end of the
//! current after phase.

use std::fmt;

use crate::config::{ElementRef, ReflowOptions};
use crate::element::{ReflowState, TrackedElement, DATA_UPDATE};
use crate::error::ReflowError;
use crate::surface::{Surface, TransitionEnd};

/// Ordered collection of tracked elements bound to one host root.
#[derive(Debug, Clone)]
pub struct ReflowOrchestrator<N> {
    root: Option<N>,
    listening: bool,
    elements: Vec<TrackedElement<N>>,
}

impl<N> Default for ReflowOrchestrator<N> {
    fn default() -> Self {
        Self {
            root: None,
            listening: false,
            elements: Vec::new(),
        }
    }
}

impl<N: Clone + PartialEq + fmt::Debug> ReflowOrchestrator<N> {
    /// Create an orchestrator with no root and no tracked elements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an orchestrator bound to `root`, not yet listening.
    #[must_use]
    pub fn with_root(root: N) -> Self {
        Self {
            root: Some(root),
            ..Self::default()
        }
    }

    /// Host root, if mounted.
    #[must_use]
    pub const fn root(&self) -> Option<&N> {
        self.root.as_ref()
    }

    /// Replace the host root. `None` makes every target resolve as absent.
    pub fn set_root(&mut self, root: Option<N>) {
        self.root = root;
    }

    /// Start routing completion signals caught on `root`.
    pub fn attach_listener(&mut self, root: N) {
        self.root = Some(root);
        self.listening = true;
    }

    /// Stop routing completion signals. Registrations are kept.
    pub fn detach_listener(&mut self) {
        self.listening = false;
    }

    /// Whether completion signals are being routed.
    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.listening
    }

    /// Number of tracked elements, including ones pending removal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Tracked elements in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedElement<N>> {
        self.elements.iter()
    }

    /// Tracked element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TrackedElement<N>> {
        self.elements.get(index)
    }

    /// State of the tracked element at `index`.
    #[must_use]
    pub fn state_of(&self, index: usize) -> Option<ReflowState> {
        self.elements.get(index).map(TrackedElement::state)
    }

    /// Track one element.
    pub fn register(&mut self, options: ReflowOptions<N>) -> Result<(), ReflowError> {
        self.register_all([options])
    }

    /// Track several elements, appended in order.
    ///
    /// Every entry is validated before any is appended, so an invalid entry
    /// leaves the collection untouched.
    pub fn register_all<I>(&mut self, options: I) -> Result<(), ReflowError>
    where
        I: IntoIterator<Item = ReflowOptions<N>>,
    {
        let configs = options
            .into_iter()
            .map(ReflowOptions::validate)
            .collect::<Result<Vec<_>, _>>()?;
        self.elements
            .extend(configs.into_iter().map(TrackedElement::new));
        Ok(())
    }

    /// Schedule removal of the element registered for `element`.
    ///
    /// Matching compares resolved targets; when neither side resolves the
    /// configured references are compared instead. Nothing is removed
    /// until the next flush point.
    pub fn unregister<S>(&mut self, surface: &S, element: &ElementRef<N>) -> Result<(), ReflowError>
    where
        S: Surface<Node = N>,
    {
        let requested = self
            .root
            .as_ref()
            .and_then(|root| surface.resolve(root, element));

        let found = self
            .elements
            .iter_mut()
            .filter(|el| !el.is_pending_removal())
            .find(|el| {
                let existing = el.resolve(surface, self.root.as_ref());
                match (&requested, &existing) {
                    (Some(a), Some(b)) => a == b,
                    (None, None) => el.config().element() == element,
                    _ => false,
                }
            });

        if let Some(el) = found {
            el.schedule_removal();
            Ok(())
        } else {
            let err = ReflowError::NotRegistered {
                element: element.describe(),
            };
            tracing::error!("{err}");
            Err(err)
        }
    }

    /// Schedule removal of several elements.
    ///
    /// Each request is handled independently; the first failure is
    /// returned after all requests have been processed.
    pub fn unregister_all<'a, S, I>(&mut self, surface: &S, elements: I) -> Result<(), ReflowError>
    where
        S: Surface<Node = N>,
        I: IntoIterator<Item = &'a ElementRef<N>>,
        N: 'a,
    {
        let mut first_err = None;
        for element in elements {
            if let Err(err) = self.unregister(surface, element) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Finalize and drop every element flagged for removal.
    pub fn flush_removals<S>(&mut self, surface: &mut S)
    where
        S: Surface<Node = N>,
    {
        self.elements.retain_mut(|el| {
            if el.is_pending_removal() {
                el.finalize(surface);
                false
            } else {
                true
            }
        });
    }

    /// Snapshot geometry before the host mutates its visual tree.
    pub fn before_phase<S>(&mut self, surface: &mut S)
    where
        S: Surface<Node = N>,
    {
        self.flush_removals(surface);
        tracing::trace!(elements = self.elements.len(), "before phase");
        for el in &mut self.elements {
            el.capture_before(surface, self.root.as_ref());
        }
    }

    /// Compare geometry and play transitions once the host's mutation has
    /// been committed. Returns the number of transitions started.
    pub fn after_phase<S>(&mut self, surface: &mut S) -> usize
    where
        S: Surface<Node = N>,
    {
        let mut started = 0;
        for el in self.elements.iter_mut().filter(|el| !el.is_pending_removal()) {
            if el.attempt_reflow(surface, self.root.as_ref(), DATA_UPDATE) {
                started += 1;
            }
        }
        tracing::trace!(started, "after phase");
        self.flush_removals(surface);
        started
    }

    /// Fan a completion signal out to every tracked element.
    pub fn on_completion<S>(&mut self, surface: &mut S, event: &TransitionEnd<N>)
    where
        S: Surface<Node = N>,
    {
        if !self.listening {
            return;
        }
        for el in self.elements.iter_mut().filter(|el| !el.is_pending_removal()) {
            el.on_completion(surface, self.root.as_ref(), event);
        }
    }
}
