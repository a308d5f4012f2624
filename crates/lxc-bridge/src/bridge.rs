// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bridge entry point.
//!
//! `Bridge` is the single object the panel integration talks to. Lifecycle,
//! reconciliation, passthrough and presentation operations are implemented
//! as `impl Bridge` blocks in their own modules.

use std::sync::Arc;

use tracing::warn;

use crate::audit::{AuditSink, JsonLinesAuditSink, TracingAuditSink};
use crate::config::BridgeConfig;
use crate::envelope::RemoteClient;
use crate::error::{BridgeError, Result};
use crate::identity::ContainerIdentity;
use crate::messages::Locale;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::PanelOutcome;

/// Bridge between panel events and the remote container service.
pub struct Bridge {
    remote: RemoteClient,
}

impl Bridge {
    /// Create a bridge with explicit collaborators.
    pub fn new(
        config: BridgeConfig,
        transport: Arc<dyn Transport>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            remote: RemoteClient::new(config, transport, audit),
        }
    }

    /// Create a bridge using the HTTP transport and the configured audit sink.
    ///
    /// Records go to the JSON-lines file when `audit_log` is set, otherwise
    /// to tracing.
    pub fn from_config(config: BridgeConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.verify_tls, config.api_key.clone())
            .map_err(|e| BridgeError::Config(e.to_string()))?;

        let audit: Arc<dyn AuditSink> = match &config.audit_log {
            Some(path) => Arc::new(JsonLinesAuditSink::new(path)),
            None => Arc::new(TracingAuditSink),
        };

        Ok(Self::new(config, Arc::new(transport), audit))
    }

    /// Create a bridge from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = BridgeConfig::from_env()?;
        Self::from_config(config)
    }

    /// Get the bridge configuration.
    pub fn config(&self) -> &BridgeConfig {
        self.remote.config()
    }

    pub fn locale(&self) -> Locale {
        self.config().locale
    }

    pub(crate) fn remote(&self) -> &RemoteClient {
        &self.remote
    }

    /// Turn an operation result into the value handed to the panel.
    pub(crate) fn outcome(&self, operation: &str, result: Result<PanelOutcome>) -> PanelOutcome {
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(operation, error = %e, "Operation failed");
                PanelOutcome::Error(e.panel_message(self.locale()))
            }
        }
    }
}

/// `/container/{identity}{suffix}`
pub(crate) fn container_endpoint(identity: &ContainerIdentity, suffix: &str) -> String {
    format!("/container/{}{}", urlencoding::encode(identity.as_str()), suffix)
}

/// `/container/nat_rule/{rule_id}`
pub(crate) fn nat_rule_endpoint(rule_id: &str) -> String {
    format!("/container/nat_rule/{}", urlencoding::encode(rule_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BillingContext;

    #[test]
    fn test_container_endpoint() {
        let identity = ContainerIdentity::derive(&BillingContext::new(5));
        assert_eq!(container_endpoint(&identity, "/info"), "/container/whmcs-5/info");
    }

    #[test]
    fn test_nat_rule_endpoint_encodes_segment() {
        assert_eq!(nat_rule_endpoint("12"), "/container/nat_rule/12");
        assert_eq!(nat_rule_endpoint("a/b"), "/container/nat_rule/a%2Fb");
    }

    #[test]
    fn test_from_config_without_audit_file() {
        let bridge = Bridge::from_config(BridgeConfig::new().with_base_url("https://127.0.0.1:8000"))
            .unwrap();
        assert_eq!(bridge.config().base_url, "https://127.0.0.1:8000");
        assert_eq!(bridge.locale(), Locale::En);
    }
}
