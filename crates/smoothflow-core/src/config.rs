//! Registration options and their validated, immutable form.
//!
//! Callers build a [`ReflowOptions`] (directly or from a manifest) and the
//! orchestrator validates it once into a [`ReflowConfig`] at registration.
//! Nothing is re-merged per update cycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Default transition timing appended for each watched property.
pub const DEFAULT_TIMING: &str = ".5s";

/// A geometry-affecting style property that can be transitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchedProperty {
    /// Box height, transitioned through an explicit `height`.
    Height,
    /// Box width, transitioned through an explicit `width`.
    Width,
    /// Position, transitioned through an inverse `transform: translate(..)`.
    Transform,
}

impl WatchedProperty {
    /// All supported properties.
    pub const ALL: [Self; 3] = [Self::Height, Self::Width, Self::Transform];

    /// CSS property name, also the `propertyName` of its completion signal.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Height => "height",
            Self::Width => "width",
            Self::Transform => "transform",
        }
    }
}

impl fmt::Display for WatchedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

impl FromStr for WatchedProperty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "height" => Ok(Self::Height),
            "width" => Ok(Self::Width),
            "transform" => Ok(Self::Transform),
            other => Err(ConfigError::UnknownProperty(other.to_string())),
        }
    }
}

/// How a tracked element is located relative to the host root.
///
/// Resolution happens on demand every phase, since the referent may be
/// conditionally rendered out at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementRef<N> {
    /// The host root itself.
    Root,
    /// CSS selector; the root itself if it matches, else its first matching descendant.
    Selector(String),
    /// Direct reference to a node.
    Node(N),
}

impl<N> Default for ElementRef<N> {
    fn default() -> Self {
        Self::Root
    }
}

impl<N> ElementRef<N> {
    /// Short human-readable description for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Root => "host root".to_string(),
            Self::Selector(selector) => format!("selector '{selector}'"),
            Self::Node(_) => "direct element reference".to_string(),
        }
    }
}

/// Filter for external completion signals that should trigger a reflow.
///
/// Both fields are optional; an unset field matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionFilter {
    /// Selector the signal's target must match.
    #[serde(default)]
    pub selector: Option<String>,
    /// Property name the signal must carry.
    #[serde(default)]
    pub property_name: Option<String>,
}

impl CompletionFilter {
    /// Filter on a selector.
    #[must_use]
    pub fn selector(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            property_name: None,
        }
    }

    /// Also require a property name.
    #[must_use]
    pub fn with_property_name(mut self, name: impl Into<String>) -> Self {
        self.property_name = Some(name.into());
        self
    }

    /// A filter with no criteria reacts to nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.selector.is_none() && self.property_name.is_none()
    }
}

/// Caller-facing registration options.
///
/// Unset fields take their defaults during [`ReflowOptions::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReflowOptions<N> {
    /// Element to track.
    pub element: ElementRef<N>,
    /// Watched properties; `None` means the default (`height`).
    pub properties: Option<Vec<WatchedProperty>>,
    /// Transition declaration override.
    pub transition: Option<String>,
    /// External completion signals that also trigger a reflow.
    pub transition_event: Option<CompletionFilter>,
    /// Hide overflow while a transition runs.
    pub hide_scrollbar: bool,
    /// Emit per-element debug diagnostics.
    pub debug: bool,
}

impl<N> Default for ReflowOptions<N> {
    fn default() -> Self {
        Self {
            element: ElementRef::Root,
            properties: None,
            transition: None,
            transition_event: None,
            hide_scrollbar: true,
            debug: false,
        }
    }
}

impl<N> ReflowOptions<N> {
    /// Options tracking the host root's height.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the element matching `selector`.
    #[must_use]
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.element = ElementRef::Selector(selector.into());
        self
    }

    /// Track a node directly.
    #[must_use]
    pub fn node(mut self, node: N) -> Self {
        self.element = ElementRef::Node(node);
        self
    }

    /// Set the element reference.
    #[must_use]
    pub fn element(mut self, element: ElementRef<N>) -> Self {
        self.element = element;
        self
    }

    /// Add a watched property.
    #[must_use]
    pub fn property(mut self, property: WatchedProperty) -> Self {
        self.properties.get_or_insert_with(Vec::new).push(property);
        self
    }

    /// Replace the watched properties.
    #[must_use]
    pub fn properties(mut self, properties: impl IntoIterator<Item = WatchedProperty>) -> Self {
        self.properties = Some(properties.into_iter().collect());
        self
    }

    /// Override the transition declaration.
    #[must_use]
    pub fn transition(mut self, transition: impl Into<String>) -> Self {
        self.transition = Some(transition.into());
        self
    }

    /// React to external completion signals matching `filter`.
    #[must_use]
    pub fn transition_event(mut self, filter: CompletionFilter) -> Self {
        self.transition_event = Some(filter);
        self
    }

    /// Toggle overflow hiding.
    #[must_use]
    pub fn hide_scrollbar(mut self, hide: bool) -> Self {
        self.hide_scrollbar = hide;
        self
    }

    /// Toggle debug diagnostics.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Validate and apply defaults.
    pub fn validate(self) -> Result<ReflowConfig<N>, ConfigError> {
        if let ElementRef::Selector(selector) = &self.element {
            if selector.trim().is_empty() {
                return Err(ConfigError::EmptySelector);
            }
        }

        let properties = match self.properties {
            None => vec![WatchedProperty::Height],
            Some(list) if list.is_empty() => return Err(ConfigError::EmptyProperties),
            Some(list) => {
                let mut unique = Vec::with_capacity(list.len());
                for p in list {
                    if !unique.contains(&p) {
                        unique.push(p);
                    }
                }
                unique
            }
        };

        let transition = match self.transition {
            Some(t) if !t.trim().is_empty() => t,
            _ => default_transition(&properties),
        };

        Ok(ReflowConfig {
            element: self.element,
            properties,
            transition,
            completion_filter: self.transition_event.filter(|f| !f.is_empty()),
            hide_scrollbar: self.hide_scrollbar,
            debug: self.debug,
        })
    }
}

/// `"<property> .5s"` for each property, comma separated.
#[must_use]
pub fn default_transition(properties: &[WatchedProperty]) -> String {
    properties
        .iter()
        .map(|p| format!("{} {DEFAULT_TIMING}", p.css_name()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Validated configuration, immutable for the tracked element's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflowConfig<N> {
    element: ElementRef<N>,
    properties: Vec<WatchedProperty>,
    transition: String,
    completion_filter: Option<CompletionFilter>,
    hide_scrollbar: bool,
    debug: bool,
}

impl<N> ReflowConfig<N> {
    /// Element reference.
    #[must_use]
    pub const fn element(&self) -> &ElementRef<N> {
        &self.element
    }

    /// Watched properties, non-empty and without duplicates.
    #[must_use]
    pub fn properties(&self) -> &[WatchedProperty] {
        &self.properties
    }

    /// Whether `property` is watched.
    #[must_use]
    pub fn watches(&self, property: WatchedProperty) -> bool {
        self.properties.contains(&property)
    }

    /// Whether a completion signal's property name is watched.
    #[must_use]
    pub fn watches_name(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.css_name() == name)
    }

    /// Transition declaration appended while active.
    #[must_use]
    pub fn transition(&self) -> &str {
        &self.transition
    }

    /// External completion filter, if any.
    #[must_use]
    pub const fn completion_filter(&self) -> Option<&CompletionFilter> {
        self.completion_filter.as_ref()
    }

    /// Whether overflow is hidden during transitions.
    #[must_use]
    pub const fn hide_scrollbar(&self) -> bool {
        self.hide_scrollbar
    }

    /// Whether debug diagnostics are enabled.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }
}
