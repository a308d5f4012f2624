// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Passthrough operations.
//!
//! Exec and NAT rule management forwarded to the remote service. Required
//! fields are validated locally; a validation failure never reaches the
//! transport.

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::bridge::{Bridge, container_endpoint, nat_rule_endpoint};
use crate::capabilities::{EndUserAction, Role, is_permitted};
use crate::error::{BridgeError, Result};
use crate::identity::ContainerIdentity;
use crate::transport::HttpMethod;
use crate::types::{BillingContext, ExecOutcome, NatRule, PanelOutcome, SUCCESS_SENTINEL};

const PROTOCOLS: [&str; 2] = ["tcp", "udp"];

/// Validated input for a new NAT rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatRuleRequest {
    pub host_port: u16,
    pub container_port: u16,
    pub protocol: String,
}

impl NatRuleRequest {
    /// Validate the request parameters of an add-rule action.
    pub fn from_context(context: &BillingContext) -> Result<Self> {
        let host_port = required(context.params.host_port.as_deref(), "host_port")?;
        let container_port = required(context.params.container_port.as_deref(), "container_port")?;
        let protocol = required(context.params.protocol.as_deref(), "protocol")?.to_ascii_lowercase();

        if !PROTOCOLS.contains(&protocol.as_str()) {
            return Err(BridgeError::Validation(format!(
                "protocol must be tcp or udp, got '{protocol}'"
            )));
        }

        Ok(Self {
            host_port: parse_port(host_port, "host_port")?,
            container_port: parse_port(container_port, "container_port")?,
            protocol,
        })
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BridgeError::Validation(format!("{field} is required")))
}

fn parse_port(value: &str, field: &str) -> Result<u16> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(BridgeError::Validation(format!(
            "{field} must be a port between 1 and 65535, got '{value}'"
        ))),
    }
}

/// Read the exec result from a success payload.
///
/// The command's own result sits in a nested `status` (under `data` when
/// present); anything but `success` means the command failed even though
/// the remote call itself went through.
pub fn exec_outcome(payload: &Value) -> ExecOutcome {
    let nested = match payload.get("data") {
        Some(data) if data.is_object() => data,
        _ => payload,
    };

    let succeeded = nested.get("status").and_then(Value::as_str) == Some(SUCCESS_SENTINEL);
    let output = [nested, payload]
        .iter()
        .find_map(|v| v.get("output").and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    ExecOutcome { succeeded, output }
}

/// Read NAT rules from a success payload: `data` array, else `rules`.
pub fn nat_rules_from_payload(payload: &Value) -> Result<Vec<NatRule>> {
    let rules = ["data", "rules"]
        .iter()
        .filter_map(|key| payload.get(*key))
        .find(|v| v.is_array())
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    Ok(serde_json::from_value(rules)?)
}

impl Bridge {
    /// Run a shell command inside the container.
    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn exec_command(&self, context: &BillingContext) -> Result<ExecOutcome> {
        let command = required(context.params.command.as_deref(), "command")?;
        let identity = ContainerIdentity::derive(context);

        let payload = self.remote().call(
            EndUserAction::ExecCommand.as_str(),
            &container_endpoint(&identity, "/exec"),
            HttpMethod::Post,
            &[("command", command)],
            self.config().long_timeout,
        )?;

        let outcome = exec_outcome(&payload);
        info!(container = %identity, succeeded = outcome.succeeded, "Command executed");
        Ok(outcome)
    }

    /// Create a port-forward rule.
    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn add_nat_rule(&self, context: &BillingContext) -> Result<Value> {
        let request = NatRuleRequest::from_context(context)?;
        let identity = ContainerIdentity::derive(context);
        let host_port = request.host_port.to_string();
        let container_port = request.container_port.to_string();

        let payload = self.remote().call(
            EndUserAction::AddNatRule.as_str(),
            &container_endpoint(&identity, "/add_nat_rule"),
            HttpMethod::Post,
            &[
                ("host_port", host_port.as_str()),
                ("container_port", container_port.as_str()),
                ("protocol", request.protocol.as_str()),
            ],
            self.config().default_timeout,
        )?;

        info!(container = %identity, host_port = request.host_port, container_port = request.container_port, protocol = %request.protocol, "NAT rule added");
        Ok(payload)
    }

    /// Delete a port-forward rule by id. The remote service checks ownership.
    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn delete_nat_rule(&self, context: &BillingContext) -> Result<Value> {
        let rule_id = required(context.params.rule_id.as_deref(), "rule_id")?;

        let payload = self.remote().call(
            EndUserAction::DeleteNatRule.as_str(),
            &nat_rule_endpoint(rule_id),
            HttpMethod::Delete,
            &[],
            self.config().default_timeout,
        )?;

        info!(rule_id, "NAT rule deleted");
        Ok(payload)
    }

    /// Rules currently attached to the container.
    pub fn list_nat_rules(&self, context: &BillingContext) -> Result<Vec<NatRule>> {
        let identity = ContainerIdentity::derive(context);
        let payload = self.remote().call(
            "list_nat_rules",
            &container_endpoint(&identity, "/nat_rules"),
            HttpMethod::Get,
            &[],
            self.config().default_timeout,
        )?;
        nat_rules_from_payload(&payload)
    }

    /// Gated entry point for end-user actions.
    ///
    /// A successful exec returns the command output as an advisory; a failed
    /// command is reported as an error carrying its output.
    pub fn perform(&self, role: Role, action: EndUserAction, context: &BillingContext) -> PanelOutcome {
        if !is_permitted(role, action) {
            warn!(?role, action = action.as_str(), "End-user action denied");
            return PanelOutcome::Error(self.locale().permission_denied(action.as_str()));
        }

        let result = match action {
            EndUserAction::ExecCommand => self.exec_command(context).map(|outcome| {
                if outcome.succeeded {
                    PanelOutcome::Advisory(outcome.output)
                } else {
                    PanelOutcome::Error(format!("command failed: {}", outcome.output))
                }
            }),
            EndUserAction::AddNatRule => self.add_nat_rule(context).map(|_| PanelOutcome::Success),
            EndUserAction::DeleteNatRule => {
                self.delete_nat_rule(context).map(|_| PanelOutcome::Success)
            }
        };
        self.outcome(action.as_str(), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestParams;
    use serde_json::json;

    fn nat_context(host_port: &str, container_port: &str, protocol: &str) -> BillingContext {
        BillingContext::new(3).with_params(RequestParams {
            host_port: Some(host_port.to_string()),
            container_port: Some(container_port.to_string()),
            protocol: Some(protocol.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_nat_rule_request_normalizes_protocol() {
        let request = NatRuleRequest::from_context(&nat_context("2222", "22", "TCP")).unwrap();
        assert_eq!(request.host_port, 2222);
        assert_eq!(request.container_port, 22);
        assert_eq!(request.protocol, "tcp");
    }

    #[test]
    fn test_nat_rule_request_rejects_bad_input() {
        for (host, container, proto) in [
            ("", "22", "tcp"),
            ("2222", "22", ""),
            ("0", "22", "tcp"),
            ("70000", "22", "tcp"),
            ("2222", "ssh", "tcp"),
            ("2222", "22", "icmp"),
        ] {
            let err = NatRuleRequest::from_context(&nat_context(host, container, proto)).unwrap_err();
            assert!(matches!(err, BridgeError::Validation(_)), "{host}/{container}/{proto}");
        }
    }

    #[test]
    fn test_exec_outcome_nested_status() {
        let ok = exec_outcome(&json!({"status": "success", "data": {"status": "success", "output": "hi\n"}}));
        assert!(ok.succeeded);
        assert_eq!(ok.output, "hi\n");

        let failed = exec_outcome(&json!({"status": "success", "data": {"status": "error", "output": "not found"}}));
        assert!(!failed.succeeded);
        assert_eq!(failed.output, "not found");
    }

    #[test]
    fn test_exec_outcome_flat_payload() {
        let outcome = exec_outcome(&json!({"status": "success", "output": "done"}));
        assert!(outcome.succeeded);
        assert_eq!(outcome.output, "done");

        let outcome = exec_outcome(&json!({"status": "warning"}));
        assert!(!outcome.succeeded);
        assert_eq!(outcome.output, "");
    }

    #[test]
    fn test_nat_rules_from_payload() {
        let rules = nat_rules_from_payload(&json!({
            "status": "success",
            "data": [{"id": 1, "host_port": 8080, "container_port": 80, "protocol": "tcp"}]
        }))
        .unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "1");

        let rules = nat_rules_from_payload(&json!({"status": "success", "rules": []})).unwrap();
        assert!(rules.is_empty());

        let rules = nat_rules_from_payload(&json!({"status": "success"})).unwrap();
        assert!(rules.is_empty());
    }
}
