//! Declarative registration manifests.
//!
//! Hosts usually describe their tracked elements as data rather than code:
//!
//! ```yaml
//! - element: ".list"
//! - element: ".card"
//!   property: [transform, width]
//!   transitionEvent:
//!     selector: ".fade"
//!     propertyName: opacity
//!   hideScrollbar: false
//!   transition: "transform 300ms ease"
//!   debug: true
//! ```

use serde::{Deserialize, Serialize};
use smoothflow_core::{CompletionFilter, ElementRef, ReflowError, ReflowOptions, WatchedProperty};

/// A single value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// `property: height`
    One(String),
    /// `property: [height, width]`
    Many(Vec<String>),
}

impl OneOrMany {
    fn as_slice(&self) -> &[String] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }
}

/// Serialized form of [`ReflowOptions`].
///
/// Keys use the host-facing camelCase names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReflowManifest {
    /// Selector resolved against the host root. Absent means the root itself.
    #[serde(default, alias = "el", skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    /// Watched property or properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<OneOrMany>,
    /// Filter for external completion signals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_event: Option<CompletionFilter>,
    /// Hide scrollbars while a transition plays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_scrollbar: Option<bool>,
    /// Transition declaration overriding the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
    /// Emit diagnostic events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

impl ReflowManifest {
    /// Parse one manifest entry from JSON.
    pub fn from_json(json: &str) -> Result<Self, ReflowError> {
        serde_json::from_str(json).map_err(|e| ReflowError::Manifest(e.to_string()))
    }

    /// Parse one entry or a list of entries from JSON.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, ReflowError> {
        serde_json::from_str::<Entries>(json)
            .map(Entries::into_vec)
            .map_err(|e| ReflowError::Manifest(e.to_string()))
    }

    /// Parse one entry or a list of entries from YAML.
    pub fn list_from_yaml(yaml: &str) -> Result<Vec<Self>, ReflowError> {
        serde_yaml_ng::from_str::<Entries>(yaml)
            .map(Entries::into_vec)
            .map_err(|e| ReflowError::Manifest(e.to_string()))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, ReflowError> {
        serde_json::to_string(self).map_err(|e| ReflowError::Manifest(e.to_string()))
    }

    /// Convert into registration options.
    ///
    /// Property names are checked here; everything else is validated at
    /// registration.
    pub fn into_options<N>(self) -> Result<ReflowOptions<N>, ReflowError> {
        let mut options = ReflowOptions::new();
        if let Some(selector) = self.element {
            options = options.selector(selector);
        }
        if let Some(property) = &self.property {
            let properties = property
                .as_slice()
                .iter()
                .map(|name| name.parse::<WatchedProperty>())
                .collect::<Result<Vec<_>, _>>()?;
            options = options.properties(properties);
        }
        if let Some(transition) = self.transition {
            options = options.transition(transition);
        }
        if let Some(filter) = self.transition_event {
            options = options.transition_event(filter);
        }
        if let Some(hide) = self.hide_scrollbar {
            options = options.hide_scrollbar(hide);
        }
        if let Some(debug) = self.debug {
            options = options.debug(debug);
        }
        Ok(options)
    }

    /// Convert into registration options tracking `node` directly.
    ///
    /// The manifest must not name an `element` of its own.
    pub fn into_options_for<N>(self, node: N) -> Result<ReflowOptions<N>, ReflowError> {
        if let Some(selector) = &self.element {
            return Err(ReflowError::Manifest(format!(
                "element '{selector}' conflicts with the given node"
            )));
        }
        Ok(self.into_options()?.node(node))
    }
}

impl<N> TryFrom<&ReflowOptions<N>> for ReflowManifest {
    type Error = ReflowError;

    /// Fails for a direct node reference, which has no serialized form.
    fn try_from(options: &ReflowOptions<N>) -> Result<Self, Self::Error> {
        let element = match &options.element {
            ElementRef::Selector(selector) => Some(selector.clone()),
            ElementRef::Root => None,
            ElementRef::Node(_) => {
                return Err(ReflowError::Manifest(
                    "a node reference cannot be written to a manifest".to_string(),
                ))
            }
        };
        Ok(Self {
            element,
            property: options.properties.as_ref().map(|list| {
                OneOrMany::Many(list.iter().map(ToString::to_string).collect())
            }),
            transition_event: options.transition_event.clone(),
            hide_scrollbar: Some(options.hide_scrollbar),
            transition: options.transition.clone(),
            debug: Some(options.debug),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Entries {
    Many(Vec<ReflowManifest>),
    One(ReflowManifest),
}

impl Entries {
    fn into_vec(self) -> Vec<ReflowManifest> {
        match self {
            Self::Many(list) => list,
            Self::One(entry) => vec![entry],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smoothflow_core::ConfigError;

    const EXAMPLE_YAML: &str = r#"
- element: ".list"
- element: ".card"
  property: [transform, width]
  transitionEvent:
    selector: ".fade"
    propertyName: opacity
  hideScrollbar: false
  transition: "transform 300ms ease"
  debug: true
"#;

    #[test]
    fn test_parse_yaml_list() {
        let entries = ReflowManifest::list_from_yaml(EXAMPLE_YAML).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].element.as_deref(), Some(".list"));
        assert!(entries[0].property.is_none());
        assert_eq!(
            entries[1].property,
            Some(OneOrMany::Many(vec!["transform".into(), "width".into()]))
        );
        assert_eq!(
            entries[1].transition_event,
            Some(CompletionFilter::selector(".fade").with_property_name("opacity"))
        );
    }

    #[test]
    fn test_single_property_string() {
        let entry = ReflowManifest::from_json(r##"{"element":"#a","property":"width"}"##).unwrap();
        let config = entry.into_options::<u32>().unwrap().validate().unwrap();
        assert_eq!(config.properties(), &[WatchedProperty::Width]);
        assert_eq!(config.transition(), "width .5s");
    }

    #[test]
    fn test_list_from_json_accepts_single_object() {
        let entries = ReflowManifest::list_from_json(r#"{"element":".a"}"#).unwrap();
        assert_eq!(entries.len(), 1);
        let entries = ReflowManifest::list_from_json(r#"[{"element":".a"},{}]"#).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[1].element.is_none());
    }

    #[test]
    fn test_defaults_when_empty() {
        let options = ReflowManifest::from_json("{}")
            .unwrap()
            .into_options::<u32>()
            .unwrap();
        assert_eq!(options.element, ElementRef::Root);
        assert!(options.hide_scrollbar);
        assert!(!options.debug);
        let config = options.validate().unwrap();
        assert_eq!(config.properties(), &[WatchedProperty::Height]);
    }

    #[test]
    fn test_unknown_property_rejected() {
        let entry = ReflowManifest::from_json(r#"{"property":["height","opacity"]}"#).unwrap();
        let err = entry.into_options::<u32>().unwrap_err();
        assert_eq!(
            err,
            ReflowError::InvalidConfig(ConfigError::UnknownProperty("opacity".into()))
        );
    }

    #[test]
    fn test_el_alias() {
        let entry = ReflowManifest::from_json(r#"{"el":".panel"}"#).unwrap();
        assert_eq!(entry.element.as_deref(), Some(".panel"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ReflowManifest::from_json(r#"{"elment":".a"}"#).unwrap_err();
        assert!(matches!(err, ReflowError::Manifest(_)));
    }

    #[test]
    fn test_malformed_json_reports_manifest_error() {
        let err = ReflowManifest::list_from_json("[{").unwrap_err();
        assert!(err.to_string().starts_with("manifest error"));
    }

    #[test]
    fn test_from_options_roundtrip() {
        let options: ReflowOptions<u32> = ReflowOptions::new()
            .selector(".card")
            .properties([WatchedProperty::Transform])
            .hide_scrollbar(false);
        let manifest = ReflowManifest::try_from(&options).unwrap();
        let json = manifest.to_json().unwrap();
        let back = ReflowManifest::from_json(&json)
            .unwrap()
            .into_options::<u32>()
            .unwrap();
        assert_eq!(back.element, options.element);
        assert_eq!(back.properties, options.properties);
        assert_eq!(back.hide_scrollbar, options.hide_scrollbar);
    }

    #[test]
    fn test_node_reference_has_no_manifest_form() {
        let options: ReflowOptions<u32> = ReflowOptions::new().node(7);
        let err = ReflowManifest::try_from(&options).unwrap_err();
        assert!(matches!(err, ReflowError::Manifest(_)));

        let root: ReflowOptions<u32> = ReflowOptions::new();
        let manifest = ReflowManifest::try_from(&root).unwrap();
        assert!(manifest.element.is_none());
    }

    #[test]
    fn test_options_for_node() {
        let entry = ReflowManifest::from_json(r#"{"property":"width"}"#).unwrap();
        let options = entry.into_options_for(7u32).unwrap();
        assert_eq!(options.element, ElementRef::Node(7));
        assert_eq!(options.properties, Some(vec![WatchedProperty::Width]));
    }

    #[test]
    fn test_options_for_node_rejects_second_element() {
        let entry = ReflowManifest::from_json(r#"{"element":".a"}"#).unwrap();
        let err = entry.into_options_for(7u32).unwrap_err();
        assert!(matches!(err, ReflowError::Manifest(_)));
    }
}
