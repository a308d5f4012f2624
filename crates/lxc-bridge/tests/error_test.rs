// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error type tests for lxc-bridge.

use lxc_bridge::{BridgeError, ConfigError, Locale, UnsupportedOperation};

#[test]
fn test_config_error_display() {
    let err = BridgeError::Config("remote service base URL is not configured".to_string());
    assert!(err.to_string().contains("configuration error"));
    assert!(err.to_string().contains("base URL"));
}

#[test]
fn test_remote_declared_is_verbatim() {
    let err = BridgeError::RemoteDeclared("container not found".to_string());
    assert_eq!(err.to_string(), "container not found");
}

#[test]
fn test_http_error_display() {
    let err = BridgeError::Http {
        status: 502,
        message: "Bad Gateway".to_string(),
    };
    assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
}

#[test]
fn test_sync_error_wraps_cause() {
    let err = BridgeError::Sync(Box::new(BridgeError::Transport("timed out".to_string())));
    assert_eq!(err.to_string(), "sync failed: transport error: timed out");
}

#[test]
fn test_is_remote() {
    assert!(BridgeError::Transport("x".into()).is_remote());
    assert!(BridgeError::EmptyResponse.is_remote());
    assert!(
        BridgeError::Unrecognized {
            status: 200,
            body: String::new()
        }
        .is_remote()
    );
    assert!(!BridgeError::Config("x".into()).is_remote());
    assert!(!BridgeError::Validation("x".into()).is_remote());
    assert!(!BridgeError::Unsupported(UnsupportedOperation::Console).is_remote());
}

#[test]
fn test_unsupported_panel_message_is_localized() {
    let err = BridgeError::Unsupported(UnsupportedOperation::ResetPassword);
    assert_eq!(
        err.panel_message(Locale::En),
        Locale::En.not_implemented(UnsupportedOperation::ResetPassword)
    );
    assert_ne!(err.panel_message(Locale::En), err.panel_message(Locale::ZhCn));
    assert!(err.to_string().contains("reset-password"));
}

#[test]
fn test_from_serde_json_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: BridgeError = json_err.into();
    assert!(matches!(err, BridgeError::Serialization(_)));
}

#[test]
fn test_from_config_error() {
    let err: BridgeError = ConfigError::Invalid("LXC_BRIDGE_LOCALE", "must be en or zh-CN").into();
    assert!(matches!(err, BridgeError::Config(_)));
    assert!(err.to_string().contains("LXC_BRIDGE_LOCALE"));
}
