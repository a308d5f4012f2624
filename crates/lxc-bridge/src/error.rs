// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for lxc-bridge.

use thiserror::Error;

use crate::messages::Locale;
use crate::types::UnsupportedOperation;

/// Result type using BridgeError.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while bridging a panel event to the remote service.
///
/// None of these are retried by the bridge. Every panel entry point turns
/// them into a structured error value via [`BridgeError::panel_message`].
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration error (missing base URL, image or template).
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection, DNS or timeout failure talking to the remote service.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote service answered with `status == "error"`.
    #[error("{0}")]
    RemoteDeclared(String),

    /// The remote service answered with an empty body.
    #[error("empty response")]
    EmptyResponse,

    /// HTTP failure status without a recognizable envelope.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Successful HTTP status but the body is not a recognizable envelope.
    #[error("unrecognized response (HTTP {status}): {body}")]
    Unrecognized { status: u16, body: String },

    /// Operation the remote service does not implement.
    #[error("operation not implemented: {}", .0.as_str())]
    Unsupported(UnsupportedOperation),

    /// A required local field is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Reconciling remote state failed.
    #[error("sync failed: {0}")]
    Sync(Box<BridgeError>),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A presentation template failed to render.
    #[error("template error: {0}")]
    Template(String),
}

impl BridgeError {
    /// Whether the error came from the remote side (transport, remote or protocol).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            BridgeError::Transport(_)
                | BridgeError::RemoteDeclared(_)
                | BridgeError::EmptyResponse
                | BridgeError::Http { .. }
                | BridgeError::Unrecognized { .. }
        )
    }

    /// Human-readable message shown in the panel.
    pub fn panel_message(&self, locale: Locale) -> String {
        match self {
            BridgeError::Unsupported(op) => locale.not_implemented(*op),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

impl From<minijinja::Error> for BridgeError {
    fn from(err: minijinja::Error) -> Self {
        BridgeError::Template(err.to_string())
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Transport(err.to_string())
    }
}

/// Configuration errors raised while loading from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}

impl From<ConfigError> for BridgeError {
    fn from(err: ConfigError) -> Self {
        BridgeError::Config(err.to_string())
    }
}
