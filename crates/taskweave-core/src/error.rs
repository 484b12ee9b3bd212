//! Core error types for taskweave-core.
//!
//! Hard errors only exist at collaborator boundaries (config I/O, OAuth,
//! HTTP). The scheduling core itself never fails: degraded situations are
//! reported through the non-fatal [`Warning`] type instead.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for taskweave-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// OAuth-related errors
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// Task breakdown collaborator errors
    #[error("Breakdown error: {0}")]
    Breakdown(#[from] BreakdownError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// No platform configuration directory available
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

/// OAuth-specific errors.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// Authorization failed
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Token exchange failed
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Token refresh failed
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// Invalid callback
    #[error("Invalid OAuth callback: {0}")]
    InvalidCallback(String),

    /// Access token expired
    #[error("Access token expired and no refresh token available")]
    TokenExpired,

    /// Not authenticated
    #[error("Not authenticated with {service}")]
    NotAuthenticated { service: String },

    /// Credentials not configured
    #[error("OAuth client credentials not configured for {service}")]
    CredentialsNotConfigured { service: String },

    /// Keyring access failed
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local callback listener failed
    #[error("Callback listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Task breakdown collaborator errors.
#[derive(Error, Debug)]
pub enum BreakdownError {
    /// The model endpoint could not be reached
    #[error("Breakdown request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The model endpoint answered with an error payload
    #[error("Breakdown API error: {0}")]
    Api(String),

    /// Async runtime could not be set up for the blocking call
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Non-fatal diagnostics surfaced alongside a best-effort schedule.
///
/// A scheduling run never aborts over these; the caller decides whether to
/// show them to the user.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// No candidate slot finishes the total work before the deadline.
    #[error("deadline {deadline} is unreachable; using the earliest available slot")]
    DeadlineUnreachable { deadline: DateTime<Utc> },

    /// A calendar record could not be normalized and was skipped.
    #[error("skipped malformed calendar event: {detail}")]
    SkippedEvent { detail: String },

    /// An item below the minimum duration reached the placer and was skipped.
    #[error("skipped item '{title}': {minutes} min is below the minimum duration")]
    SkippedShortItem { title: String, minutes: i64 },

    /// The calendar collaborator was unavailable; the range is treated as free.
    #[error("calendar unavailable, treating the search range as free: {detail}")]
    CalendarUnavailable { detail: String },

    /// The external event insert failed; the placement itself stands.
    #[error("failed to create calendar event for '{title}': {detail}")]
    InsertFailed { title: String, detail: String },

    /// The search window produced no free slots at all.
    #[error("no free slots in the search window; falling back to the next business day")]
    NoSlotsInWindow,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
