/// Authentication helpers for the OAuth2 client credentials flow.
pub mod auth;
/// Error type shared by the token and registry clients.
pub mod error;
/// NGSI-LD entity classification, projection and registry access.
pub mod ngsild;

pub use error::{Error, Result};

/// Logging verbosity for registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Emit request URLs and frame sizes at debug level.
    Debug,
    /// Emit standard informational output.
    #[default]
    Information,
}
