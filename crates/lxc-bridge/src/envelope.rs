// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Remote call envelope.
//!
//! Performs one HTTP request against the remote service and folds every
//! possible outcome (configuration gap, transport failure, HTTP failure,
//! remote-declared error, malformed body) into a single
//! `Result<serde_json::Value, BridgeError>`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value, json};
use tracing::{debug, error, instrument, warn};

use crate::audit::{AuditEvent, AuditSink};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Message used when the remote declares an error without explaining it.
pub const GENERIC_REMOTE_ERROR: &str = "remote service reported an error";

/// Strict classification of a remote response body.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteReply {
    /// `status` is `success` or `warning`; carries the full decoded body.
    Success { payload: Value, warning: bool },
    /// `status` is `error`.
    Error { message: String },
    /// No body at all.
    Empty,
    /// Body is not JSON or has no usable `status`.
    Malformed {
        http_status: u16,
        message: Option<String>,
        raw: String,
    },
}

impl RemoteReply {
    /// Classify a raw HTTP response.
    pub fn decode(response: &HttpResponse) -> Self {
        let raw = response.body.trim();
        if raw.is_empty() {
            return RemoteReply::Empty;
        }

        let parsed = serde_json::from_str::<Value>(raw).ok();
        let status = parsed
            .as_ref()
            .and_then(|body| body.get("status"))
            .and_then(Value::as_str);

        match (status, parsed.clone()) {
            (Some("success"), Some(payload)) => RemoteReply::Success {
                payload,
                warning: false,
            },
            (Some("warning"), Some(payload)) => RemoteReply::Success {
                payload,
                warning: true,
            },
            (Some("error"), body) => RemoteReply::Error {
                message: body
                    .as_ref()
                    .and_then(message_of)
                    .unwrap_or_else(|| GENERIC_REMOTE_ERROR.to_string()),
            },
            _ => RemoteReply::Malformed {
                http_status: response.status,
                message: parsed.as_ref().and_then(message_of),
                raw: raw.to_string(),
            },
        }
    }

    /// Collapse into the envelope result.
    pub fn into_result(self) -> Result<Value> {
        match self {
            RemoteReply::Success { payload, .. } => Ok(payload),
            RemoteReply::Error { message } => Err(BridgeError::RemoteDeclared(message)),
            RemoteReply::Empty => Err(BridgeError::EmptyResponse),
            RemoteReply::Malformed {
                http_status,
                message,
                raw,
            } => {
                if http_status >= 400 {
                    Err(BridgeError::Http {
                        status: http_status,
                        message: message.unwrap_or(raw),
                    })
                } else {
                    Err(BridgeError::Unrecognized {
                        status: http_status,
                        body: raw,
                    })
                }
            }
        }
    }
}

/// Human-readable message of a remote body: `message`, else FastAPI's `detail`.
fn message_of(body: &Value) -> Option<String> {
    ["message", "detail"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Null | Value::String(_) => None,
            other => Some(other.to_string()),
        })
}

/// Client for the remote container service.
///
/// Holds no mutable state; every call is independent.
pub struct RemoteClient {
    config: BridgeConfig,
    transport: Arc<dyn Transport>,
    audit: Arc<dyn AuditSink>,
}

impl RemoteClient {
    pub fn new(
        config: BridgeConfig,
        transport: Arc<dyn Transport>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            config,
            transport,
            audit,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Perform one remote call.
    ///
    /// `operation` names the panel-level operation for logs and audit.
    #[instrument(skip(self, form_fields))]
    pub fn call(
        &self,
        operation: &str,
        endpoint: &str,
        method: HttpMethod,
        form_fields: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Value> {
        let form: Vec<(String, String)> = form_fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let base_url = self.config.normalized_base_url();
        if base_url.is_empty() {
            error!(operation, endpoint, "Remote base URL is not configured; call not attempted");
            let err = BridgeError::Config("remote service base URL is not configured".to_string());
            self.audit.record(&AuditEvent::new(
                operation,
                audit_request(method, endpoint, &form),
                err.to_string(),
            ));
            return Err(err);
        }

        let request = HttpRequest {
            method,
            url: format!("{base_url}{endpoint}"),
            form,
            timeout,
        };
        debug!(url = %request.url, timeout_secs = timeout.as_secs(), "Sending remote request");

        let (result, summary) = match self.transport.send(&request) {
            Ok(response) => {
                let result = RemoteReply::decode(&response).into_result();
                let summary = match &result {
                    Ok(payload) => format!(
                        "HTTP {}: {}",
                        response.status,
                        payload.get("status").and_then(Value::as_str).unwrap_or("success")
                    ),
                    Err(e) => format!("HTTP {}: {}", response.status, e),
                };
                (result, summary)
            }
            Err(e) => {
                let err = BridgeError::Transport(e.to_string());
                let summary = err.to_string();
                (Err(err), summary)
            }
        };

        if let Err(e) = &result {
            warn!(operation, url = %request.url, error = %e, "Remote call failed");
        }

        self.audit.record(&AuditEvent::new(
            operation,
            audit_request(method, &request.url, &request.form),
            summary,
        ));

        result
    }
}

fn audit_request(method: HttpMethod, target: &str, form: &[(String, String)]) -> Value {
    let fields: Map<String, Value> = form
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    json!({
        "method": method.as_str(),
        "url": target,
        "fields": fields,
    })
}
