// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Passthrough operation tests for lxc-bridge.

mod common;

use std::time::Duration;

use common::{BASE_URL, form, harness};
use lxc_bridge::{
    BillingContext, BridgeError, EndUserAction, HttpMethod, PanelOutcome, RequestParams, Role,
};
use serde_json::json;

fn with_params(params: RequestParams) -> BillingContext {
    BillingContext::new(21).with_params(params)
}

fn command(cmd: &str) -> BillingContext {
    with_params(RequestParams {
        command: Some(cmd.to_string()),
        ..Default::default()
    })
}

fn nat(host_port: Option<&str>, container_port: Option<&str>, protocol: Option<&str>) -> BillingContext {
    with_params(RequestParams {
        host_port: host_port.map(str::to_string),
        container_port: container_port.map(str::to_string),
        protocol: protocol.map(str::to_string),
        ..Default::default()
    })
}

#[test]
fn test_exec_sends_command() {
    let h = harness();
    h.transport.respond(
        200,
        json!({"status": "success", "data": {"status": "success", "output": "Linux\n"}}),
    );

    let outcome = h.bridge.exec_command(&command("uname")).unwrap();
    assert!(outcome.succeeded);
    assert_eq!(outcome.output, "Linux\n");

    let request = h.transport.last_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, format!("{BASE_URL}/container/whmcs-21/exec"));
    assert_eq!(form(&request), vec![("command", "uname")]);
    assert_eq!(request.timeout, Duration::from_secs(180));
}

#[test]
fn test_exec_command_failure_is_surfaced() {
    let h = harness();
    h.transport.respond(
        200,
        json!({"status": "success", "data": {"status": "error", "output": "sh: foo: not found"}}),
    );

    let outcome = h.bridge.exec_command(&command("foo")).unwrap();
    assert!(!outcome.succeeded);
    assert_eq!(outcome.output, "sh: foo: not found");
}

#[test]
fn test_exec_empty_command_is_rejected_locally() {
    let h = harness();
    for context in [command(""), command("   "), BillingContext::new(21)] {
        let err = h.bridge.exec_command(&context).unwrap_err();
        assert!(matches!(err, BridgeError::Validation(_)));
    }
    assert_eq!(h.transport.call_count(), 0);
}

#[test]
fn test_add_nat_rule() {
    let h = harness();
    h.transport.respond(200, json!({"status": "success", "data": {"id": 4}}));

    let payload = h
        .bridge
        .add_nat_rule(&nat(Some("2222"), Some("22"), Some("TCP")))
        .unwrap();
    assert_eq!(payload["data"]["id"], 4);

    let request = h.transport.last_request();
    assert_eq!(request.url, format!("{BASE_URL}/container/whmcs-21/add_nat_rule"));
    assert_eq!(
        form(&request),
        vec![("host_port", "2222"), ("container_port", "22"), ("protocol", "tcp")]
    );
}

#[test]
fn test_add_nat_rule_validation_makes_no_call() {
    let h = harness();
    for context in [
        nat(None, Some("22"), Some("tcp")),
        nat(Some("2222"), None, Some("tcp")),
        nat(Some("2222"), Some("22"), None),
        nat(Some("2222"), Some("99999"), Some("tcp")),
        nat(Some("2222"), Some("22"), Some("sctp")),
    ] {
        let err = h.bridge.add_nat_rule(&context).unwrap_err();
        assert!(matches!(err, BridgeError::Validation(_)), "{err}");
    }
    assert_eq!(h.transport.call_count(), 0);
}

#[test]
fn test_delete_nat_rule() {
    let h = harness();
    let context = with_params(RequestParams {
        rule_id: Some("17".to_string()),
        ..Default::default()
    });

    h.bridge.delete_nat_rule(&context).unwrap();
    let request = h.transport.last_request();
    assert_eq!(request.method, HttpMethod::Delete);
    assert_eq!(request.url, format!("{BASE_URL}/container/nat_rule/17"));
    assert!(request.form.is_empty());
}

#[test]
fn test_delete_nat_rule_requires_rule_id() {
    let h = harness();
    let err = h.bridge.delete_nat_rule(&BillingContext::new(21)).unwrap_err();
    assert!(matches!(err, BridgeError::Validation(_)));
    assert_eq!(h.transport.call_count(), 0);
}

#[test]
fn test_delete_nat_rule_ownership_error_from_remote() {
    let h = harness();
    h.transport.respond(403, json!({"status": "error", "message": "rule belongs to another container"}));
    let context = with_params(RequestParams {
        rule_id: Some("17".to_string()),
        ..Default::default()
    });

    let err = h.bridge.delete_nat_rule(&context).unwrap_err();
    assert_eq!(err.to_string(), "rule belongs to another container");
}

#[test]
fn test_list_nat_rules() {
    let h = harness();
    h.transport.respond(
        200,
        json!({"status": "success", "data": [
            {"id": 1, "host_port": 2222, "container_port": 22, "protocol": "tcp"},
            {"id": "2", "host_port": 8080, "container_port": 80, "protocol": "udp",
             "container_ip_at_creation": "10.0.0.9", "created_at": "2024-05-01 10:00:00"}
        ]}),
    );

    let rules = h.bridge.list_nat_rules(&BillingContext::new(21)).unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].id, "1");
    assert_eq!(rules[1].protocol, "udp");
    assert_eq!(rules[1].ip_at_creation.as_deref(), Some("10.0.0.9"));
    assert_eq!(
        h.transport.last_request().url,
        format!("{BASE_URL}/container/whmcs-21/nat_rules")
    );
}

#[test]
fn test_perform_exec_returns_output() {
    let h = harness();
    h.transport.respond(200, json!({"status": "success", "data": {"status": "success", "output": "ok"}}));
    h.transport.respond(200, json!({"status": "success", "data": {"status": "error", "output": "denied"}}));

    let outcome = h.bridge.perform(Role::Client, EndUserAction::ExecCommand, &command("id"));
    assert_eq!(outcome, PanelOutcome::Advisory("ok".to_string()));

    let outcome = h.bridge.perform(Role::Client, EndUserAction::ExecCommand, &command("id"));
    assert!(matches!(outcome, PanelOutcome::Error(msg) if msg.contains("denied")));
}

#[test]
fn test_perform_nat_actions() {
    let h = harness();
    let outcome = h.bridge.perform(
        Role::Admin,
        EndUserAction::AddNatRule,
        &nat(Some("2222"), Some("22"), Some("udp")),
    );
    assert_eq!(outcome, PanelOutcome::Success);

    let outcome = h.bridge.perform(Role::Admin, EndUserAction::DeleteNatRule, &BillingContext::new(21));
    assert!(matches!(outcome, PanelOutcome::Error(msg) if msg.contains("rule_id")));
    assert_eq!(h.transport.call_count(), 1);
}
