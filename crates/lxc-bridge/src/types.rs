// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Data model shared by the lifecycle, reconciler and passthrough operations.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fixed marker returned by lifecycle operations on success.
pub const SUCCESS_SENTINEL: &str = "success";

/// Product options configured in the panel for a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOptions {
    /// Container name template. Defaults to `whmcs-{hostid}` when absent or empty.
    pub name_template: Option<String>,
    /// Remote image identifier, e.g. `ubuntu/20.04`. Required for provisioning.
    pub image: Option<String>,
}

impl ProductOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name_template(mut self, template: impl Into<String>) -> Self {
        self.name_template = Some(template.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Image identifier, `None` when unset or blank.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Free-form request parameters sent by the panel's client area.
///
/// All values arrive as text; validation happens in the passthrough operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    pub command: Option<String>,
    pub host_port: Option<String>,
    pub container_port: Option<String>,
    pub protocol: Option<String>,
    pub rule_id: Option<String>,
}

/// Immutable per-invocation input supplied by the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingContext {
    /// Panel service (hosting) id.
    pub host_id: u64,
    /// Panel product id.
    pub product_id: u64,
    /// Panel client id.
    pub user_id: u64,
    /// Current product options.
    #[serde(default)]
    pub options: ProductOptions,
    /// Product options before a change event (change plan only).
    #[serde(default)]
    pub previous_options: Option<ProductOptions>,
    /// Client-area request parameters.
    #[serde(default)]
    pub params: RequestParams,
}

impl BillingContext {
    pub fn new(host_id: u64) -> Self {
        Self {
            host_id,
            ..Self::default()
        }
    }

    pub fn with_product_id(mut self, product_id: u64) -> Self {
        self.product_id = product_id;
        self
    }

    pub fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_options(mut self, options: ProductOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_previous_options(mut self, options: ProductOptions) -> Self {
        self.previous_options = Some(options);
        self
    }

    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }
}

/// Container state as reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteState {
    Running,
    Stopped,
    Error,
    Pending,
    Starting,
    Stopping,
    /// Default bucket for anything the remote reports that is not listed above.
    Unknown,
}

impl RemoteState {
    pub const ALL: [RemoteState; 7] = [
        RemoteState::Running,
        RemoteState::Stopped,
        RemoteState::Error,
        RemoteState::Pending,
        RemoteState::Starting,
        RemoteState::Stopping,
        RemoteState::Unknown,
    ];

    /// Parse a remote `status` value (case-insensitive). Never fails.
    pub fn from_remote(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" => RemoteState::Running,
            "stopped" => RemoteState::Stopped,
            "error" => RemoteState::Error,
            "pending" => RemoteState::Pending,
            "starting" => RemoteState::Starting,
            "stopping" => RemoteState::Stopping,
            _ => RemoteState::Unknown,
        }
    }
}

/// Coarse lifecycle status reported to the panel by a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleStatus {
    Active,
    Suspended,
    Terminated,
    Pending,
}

impl LifecycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Active => "Active",
            LifecycleStatus::Suspended => "Suspended",
            LifecycleStatus::Terminated => "Terminated",
            LifecycleStatus::Pending => "Pending",
        }
    }
}

/// Status flag driving the panel's status widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiStatusFlag {
    On,
    Off,
    Unknown,
    Waiting,
    Process,
}

impl UiStatusFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiStatusFlag::On => "on",
            UiStatusFlag::Off => "off",
            UiStatusFlag::Unknown => "unknown",
            UiStatusFlag::Waiting => "waiting",
            UiStatusFlag::Process => "process",
        }
    }
}

/// Result of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub status: LifecycleStatus,
    pub ip: Option<String>,
}

/// Result of a status probe. Always present, even when the remote is unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusProbe {
    pub flag: UiStatusFlag,
    pub description: String,
}

/// A NAT port-forward rule, owned and persisted by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatRule {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub host_port: u16,
    pub container_port: u16,
    pub protocol: String,
    #[serde(default, alias = "container_ip_at_creation")]
    pub ip_at_creation: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Outcome of a command executed inside the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOutcome {
    /// Whether the command itself succeeded (not just the remote call).
    pub succeeded: bool,
    pub output: String,
}

/// Panel lifecycle actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Provision,
    Suspend,
    Resume,
    Terminate,
    Renew,
    ChangePlan,
    PowerOn,
    PowerOff,
    Reboot,
}

impl LifecycleAction {
    pub const ALL: [LifecycleAction; 9] = [
        LifecycleAction::Provision,
        LifecycleAction::Suspend,
        LifecycleAction::Resume,
        LifecycleAction::Terminate,
        LifecycleAction::Renew,
        LifecycleAction::ChangePlan,
        LifecycleAction::PowerOn,
        LifecycleAction::PowerOff,
        LifecycleAction::Reboot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Provision => "provision",
            LifecycleAction::Suspend => "suspend",
            LifecycleAction::Resume => "resume",
            LifecycleAction::Terminate => "terminate",
            LifecycleAction::Renew => "renew",
            LifecycleAction::ChangePlan => "change-plan",
            LifecycleAction::PowerOn => "power-on",
            LifecycleAction::PowerOff => "power-off",
            LifecycleAction::Reboot => "reboot",
        }
    }
}

impl FromStr for LifecycleAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown lifecycle action: {s}"))
    }
}

/// Operations the remote service does not implement. Never attempted remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedOperation {
    Reinstall,
    RescueMode,
    ResetPassword,
    Console,
    UsageUpdate,
    Charts,
    Tickets,
}

impl UnsupportedOperation {
    pub const ALL: [UnsupportedOperation; 7] = [
        UnsupportedOperation::Reinstall,
        UnsupportedOperation::RescueMode,
        UnsupportedOperation::ResetPassword,
        UnsupportedOperation::Console,
        UnsupportedOperation::UsageUpdate,
        UnsupportedOperation::Charts,
        UnsupportedOperation::Tickets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnsupportedOperation::Reinstall => "reinstall",
            UnsupportedOperation::RescueMode => "rescue",
            UnsupportedOperation::ResetPassword => "reset-password",
            UnsupportedOperation::Console => "console",
            UnsupportedOperation::UsageUpdate => "usage-update",
            UnsupportedOperation::Charts => "charts",
            UnsupportedOperation::Tickets => "tickets",
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            UnsupportedOperation::Reinstall => "Reinstall",
            UnsupportedOperation::RescueMode => "Rescue mode",
            UnsupportedOperation::ResetPassword => "Password reset",
            UnsupportedOperation::Console => "Console (VNC) access",
            UnsupportedOperation::UsageUpdate => "Usage metrics",
            UnsupportedOperation::Charts => "Charts",
            UnsupportedOperation::Tickets => "Ticket integration",
        }
    }

    pub(crate) fn label_zh(&self) -> &'static str {
        match self {
            UnsupportedOperation::Reinstall => "重装系统",
            UnsupportedOperation::RescueMode => "救援模式",
            UnsupportedOperation::ResetPassword => "重置密码",
            UnsupportedOperation::Console => "控制台 (VNC) 访问",
            UnsupportedOperation::UsageUpdate => "用量统计",
            UnsupportedOperation::Charts => "图表",
            UnsupportedOperation::Tickets => "工单集成",
        }
    }
}

impl FromStr for UnsupportedOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnsupportedOperation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operation: {s}"))
    }
}

/// Value handed back to the panel by every operation entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOutcome {
    /// Serializes as the bare `"success"` sentinel.
    Success,
    /// Success carrying an informational message.
    Advisory(String),
    /// Serializes as `{"status": "error", "msg": ...}`.
    Error(String),
}

impl PanelOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, PanelOutcome::Error(_))
    }
}

impl fmt::Display for PanelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelOutcome::Success => f.write_str(SUCCESS_SENTINEL),
            PanelOutcome::Advisory(msg) | PanelOutcome::Error(msg) => f.write_str(msg),
        }
    }
}

impl Serialize for PanelOutcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (status, msg) = match self {
            PanelOutcome::Success => return serializer.serialize_str(SUCCESS_SENTINEL),
            PanelOutcome::Advisory(msg) => ("success", msg),
            PanelOutcome::Error(msg) => ("error", msg),
        };
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("status", status)?;
        map.serialize_entry("msg", msg)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_panel_outcome_serialization() {
        assert_eq!(serde_json::to_value(PanelOutcome::Success).unwrap(), json!("success"));
        assert_eq!(
            serde_json::to_value(PanelOutcome::Error("boom".into())).unwrap(),
            json!({"status": "error", "msg": "boom"})
        );
        assert_eq!(
            serde_json::to_value(PanelOutcome::Advisory("note".into())).unwrap(),
            json!({"status": "success", "msg": "note"})
        );
    }

    #[test]
    fn test_remote_state_default_bucket() {
        assert_eq!(RemoteState::from_remote("Running"), RemoteState::Running);
        assert_eq!(RemoteState::from_remote("running"), RemoteState::Running);
        assert_eq!(RemoteState::from_remote(""), RemoteState::Unknown);
        assert_eq!(RemoteState::from_remote("Frozen"), RemoteState::Unknown);
    }

    #[test]
    fn test_nat_rule_accepts_numeric_id() {
        let rule: NatRule = serde_json::from_value(json!({
            "id": 12,
            "host_port": 20022,
            "container_port": 22,
            "protocol": "tcp",
            "container_ip_at_creation": "10.0.0.5",
            "created_at": "2024-05-01T10:00:00"
        }))
        .unwrap();
        assert_eq!(rule.id, "12");
        assert_eq!(rule.ip_at_creation.as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn test_lifecycle_action_round_trips_through_str() {
        for action in LifecycleAction::ALL {
            assert_eq!(action.as_str().parse::<LifecycleAction>().unwrap(), action);
        }
        assert!("explode".parse::<LifecycleAction>().is_err());
    }

    #[test]
    fn test_product_options_blank_image_is_none() {
        assert_eq!(ProductOptions::new().with_image("  ").image(), None);
        assert_eq!(
            ProductOptions::new().with_image("ubuntu/20.04").image(),
            Some("ubuntu/20.04")
        );
    }
}
