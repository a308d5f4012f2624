// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP transport to the remote container service.
//!
//! The envelope only needs "send this request, give me status and body".
//! Keeping that behind a trait lets tests count and inspect outgoing calls.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP methods used by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// Whether form fields are sent as a request body.
    pub fn carries_body(&self) -> bool {
        matches!(self, Self::Post | Self::Delete)
    }
}

/// A fully resolved outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Form fields; encoded as one `application/x-www-form-urlencoded` body.
    pub form: Vec<(String, String)>,
    pub timeout: Duration,
}

/// Raw response from the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Transport-level failure (connection, DNS, TLS, timeout).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Sends requests to the remote service.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking reqwest-backed transport.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
}

impl ReqwestTransport {
    /// Build a transport. With `verify_tls == false` self-signed certificates
    /// are accepted.
    pub fn new(verify_tls: bool, api_key: Option<String>) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .user_agent(concat!("lxc-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, api_key })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        if request.method.carries_body() && !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}
