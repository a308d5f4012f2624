// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared test helpers: a transport that records requests and replays
//! queued responses.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use lxc_bridge::{
    Bridge, BridgeConfig, HttpRequest, HttpResponse, MemoryAuditSink, Transport, TransportError,
};

pub const BASE_URL: &str = "https://lxc.example.test:8000";

#[derive(Default)]
pub struct SpyTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
}

impl SpyTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a JSON response with the given HTTP status.
    pub fn respond(&self, status: u16, body: serde_json::Value) {
        self.respond_raw(status, &body.to_string());
    }

    pub fn respond_raw(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError(message.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for SpyTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(HttpResponse {
                    status: 200,
                    body: r#"{"status":"success"}"#.to_string(),
                })
            })
    }
}

pub struct Harness {
    pub bridge: Bridge,
    pub transport: Arc<SpyTransport>,
    pub audit: Arc<MemoryAuditSink>,
}

pub fn harness() -> Harness {
    harness_with(BridgeConfig::new().with_base_url(BASE_URL))
}

pub fn harness_with(config: BridgeConfig) -> Harness {
    let transport = SpyTransport::new();
    let audit = Arc::new(MemoryAuditSink::new());
    let bridge = Bridge::new(config, transport.clone(), audit.clone());
    Harness {
        bridge,
        transport,
        audit,
    }
}

/// Form fields of a request as `(&str, &str)` pairs.
pub fn form(request: &HttpRequest) -> Vec<(&str, &str)> {
    request
        .form
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}
