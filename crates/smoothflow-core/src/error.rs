//! Error types for smoothflow.

use thiserror::Error;

/// Invalid registration options, rejected before any element is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Property list was given but empty.
    #[error("at least one watched property is required")]
    EmptyProperties,

    /// Property name outside the supported set.
    #[error("unknown watched property '{0}' (expected height, width or transform)")]
    UnknownProperty(String),

    /// Element selector was an empty string.
    #[error("element selector must not be empty")]
    EmptySelector,
}

/// Errors reported by the orchestrator's public API.
///
/// None of these are fatal: the orchestrator's state is unchanged when one
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflowError {
    /// Registration options failed validation.
    #[error("invalid options: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Unregister request matched no tracked element.
    #[error("unregister failed: no tracked element matches {element}")]
    NotRegistered {
        /// Description of the requested element.
        element: String,
    },

    /// Registration manifest could not be decoded.
    #[error("manifest error: {0}")]
    Manifest(String),
}
