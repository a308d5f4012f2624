// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! State reconciler.
//!
//! Fetches remote container state and translates it into two panel
//! vocabularies: the coarse lifecycle status used by sync, and the UI flag
//! used by the status widget. The tables are independent: `Starting` is
//! `Active` for sync but `process` for the UI.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::bridge::{Bridge, container_endpoint};
use crate::error::{BridgeError, Result};
use crate::identity::ContainerIdentity;
use crate::messages::Locale;
use crate::transport::HttpMethod;
use crate::types::{
    BillingContext, LifecycleStatus, RemoteState, StatusProbe, SyncResult, UiStatusFlag,
};

/// Longest remote error text kept in a degraded status description.
pub const MAX_ERROR_DETAIL_CHARS: usize = 120;

/// Lifecycle table: remote state -> coarse panel status.
pub fn lifecycle_status(state: RemoteState) -> LifecycleStatus {
    match state {
        RemoteState::Running => LifecycleStatus::Active,
        RemoteState::Starting => LifecycleStatus::Active,
        RemoteState::Stopped => LifecycleStatus::Suspended,
        RemoteState::Stopping => LifecycleStatus::Suspended,
        RemoteState::Error => LifecycleStatus::Suspended,
        RemoteState::Pending => LifecycleStatus::Pending,
        RemoteState::Unknown => LifecycleStatus::Pending,
    }
}

/// UI table: remote state -> status flag.
pub fn ui_status_flag(state: RemoteState) -> UiStatusFlag {
    match state {
        RemoteState::Running => UiStatusFlag::On,
        RemoteState::Stopped => UiStatusFlag::Off,
        RemoteState::Starting => UiStatusFlag::Process,
        RemoteState::Stopping => UiStatusFlag::Process,
        RemoteState::Pending => UiStatusFlag::Waiting,
        RemoteState::Error => UiStatusFlag::Unknown,
        RemoteState::Unknown => UiStatusFlag::Unknown,
    }
}

/// Flag plus localized description for a remote state.
pub fn ui_status(state: RemoteState, locale: Locale) -> StatusProbe {
    StatusProbe {
        flag: ui_status_flag(state),
        description: locale.status_description(state).to_string(),
    }
}

/// Container details as returned by `GET /container/{id}/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub identity: ContainerIdentity,
    pub state: RemoteState,
    /// `status` exactly as the remote reported it.
    pub raw_status: String,
    pub ip: Option<String>,
    /// The container object from the payload, for display.
    pub details: Value,
}

impl ContainerInfo {
    /// Read the container from a success payload. The container object lives
    /// under `data` when present, otherwise at the payload root.
    pub fn from_payload(identity: ContainerIdentity, payload: &Value) -> Self {
        let container = match payload.get("data") {
            Some(data) if data.is_object() => data,
            _ => payload,
        };

        let raw_status = container
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let ip = ["ip", "ip_address"]
            .iter()
            .filter_map(|key| container.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|ip| !ip.is_empty())
            .map(str::to_string);

        Self {
            identity,
            state: RemoteState::from_remote(&raw_status),
            raw_status,
            ip,
            details: container.clone(),
        }
    }
}

impl Bridge {
    /// Fetch container details.
    pub fn container_info(&self, context: &BillingContext, timeout: Duration) -> Result<ContainerInfo> {
        let identity = ContainerIdentity::derive(context);
        let payload = self.remote().call(
            "info",
            &container_endpoint(&identity, "/info"),
            HttpMethod::Get,
            &[],
            timeout,
        )?;
        Ok(ContainerInfo::from_payload(identity, &payload))
    }

    /// Reconcile the panel's lifecycle status with the remote container.
    ///
    /// There is no cached state to fall back on; failures are reported.
    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn sync(&self, context: &BillingContext) -> Result<SyncResult> {
        let info = self
            .container_info(context, self.config().default_timeout)
            .map_err(|e| BridgeError::Sync(Box::new(e)))?;

        let status = lifecycle_status(info.state);
        debug!(container = %info.identity, remote = %info.raw_status, status = status.as_str(), "Synced");
        Ok(SyncResult {
            status,
            ip: info.ip,
        })
    }

    /// Status for the panel's status widget. Never fails.
    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn probe_status(&self, context: &BillingContext) -> StatusProbe {
        match self.container_info(context, self.config().probe_timeout) {
            Ok(info) => ui_status(info.state, self.locale()),
            Err(e) => {
                warn!(error = %e, "Status probe degraded to unknown");
                StatusProbe {
                    flag: UiStatusFlag::Unknown,
                    description: self
                        .locale()
                        .status_unavailable(&truncate(&e.to_string(), MAX_ERROR_DETAIL_CHARS)),
                }
            }
        }
    }
}

/// Truncate on a character boundary, marking the cut with `...`.
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_both_tables_are_total() {
        for state in RemoteState::ALL {
            let _ = lifecycle_status(state);
            let probe = ui_status(state, Locale::En);
            assert!(!probe.description.is_empty());
        }
    }

    #[test]
    fn test_starting_differs_between_tables() {
        assert_eq!(lifecycle_status(RemoteState::Starting), LifecycleStatus::Active);
        assert_eq!(ui_status_flag(RemoteState::Starting), UiStatusFlag::Process);
    }

    #[test]
    fn test_unknown_values_use_default_bucket() {
        let state = RemoteState::from_remote("hibernating");
        assert_eq!(ui_status_flag(state), UiStatusFlag::Unknown);
        assert_eq!(lifecycle_status(state), LifecycleStatus::Pending);
    }

    #[test]
    fn test_container_info_reads_data_object() {
        let identity = ContainerIdentity::derive(&BillingContext::new(1));
        let info = ContainerInfo::from_payload(
            identity,
            &json!({"status": "success", "data": {"status": "Stopped", "ip_address": "10.1.1.2"}}),
        );
        assert_eq!(info.state, RemoteState::Stopped);
        assert_eq!(info.ip.as_deref(), Some("10.1.1.2"));
    }

    #[test]
    fn test_container_info_reads_root() {
        let identity = ContainerIdentity::derive(&BillingContext::new(1));
        let info = ContainerInfo::from_payload(identity, &json!({"status": "success", "ip": ""}));
        // The envelope status is not a container state.
        assert_eq!(info.state, RemoteState::Unknown);
        assert_eq!(info.ip, None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
        assert_eq!(truncate("容器服务不可用", 2), "容器...");
    }
}
