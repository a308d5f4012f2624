// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! LXC Bridge
//!
//! Connects a hosting billing panel to a remote LXC container management
//! service over HTTP(S).
//!
//! Panel events (provision, suspend, terminate, ...) are translated into
//! remote calls, remote container state is reconciled back into panel
//! statuses, and end-user actions (exec, NAT port forwarding) are forwarded
//! to the service.
//!
//! # Architecture
//!
//! - Identity: deterministic container name per hosting account
//! - Envelope: one remote call, normalized into `Result<Value, BridgeError>`
//! - Lifecycle: panel actions mapped onto remote container actions
//! - Reconciler: remote state mapped onto lifecycle and UI statuses
//! - Passthrough: exec and NAT rule management, gated by role
//! - Presentation: client-area tabs rendered through a template renderer
//!
//! Every call is synchronous and stateless: at most one HTTP request per
//! operation, no retries, no cached state.
//!
//! # Example
//!
//! ```no_run
//! use lxc_bridge::{BillingContext, Bridge, BridgeConfig, LifecycleAction, ProductOptions};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bridge = Bridge::from_config(
//!     BridgeConfig::new()
//!         .with_base_url("https://10.0.0.2:8000")
//!         .with_api_key("secret"),
//! )?;
//!
//! let context = BillingContext::new(101)
//!     .with_options(ProductOptions::new().with_image("ubuntu/22.04"));
//!
//! let outcome = bridge.dispatch(LifecycleAction::Provision, &context);
//! println!("{}", serde_json::to_string(&outcome)?);
//!
//! let sync = bridge.sync(&context)?;
//! println!("Status: {}", sync.status.as_str());
//! # Ok(())
//! # }
//! ```

mod audit;
mod bridge;
mod capabilities;
mod config;
mod envelope;
mod error;
mod identity;
mod lifecycle;
mod messages;
mod metadata;
mod passthrough;
mod presentation;
mod reconciler;
mod transport;
mod types;

pub use audit::{
    AuditEvent, AuditSink, JsonLinesAuditSink, MemoryAuditSink, NoopAuditSink, TracingAuditSink,
};
pub use bridge::Bridge;
pub use capabilities::{EndUserAction, Role, is_permitted, permitted_actions};
pub use config::BridgeConfig;
pub use envelope::{GENERIC_REMOTE_ERROR, RemoteClient, RemoteReply};
pub use error::{BridgeError, ConfigError, Result};
pub use identity::{ContainerIdentity, DEFAULT_NAME_TEMPLATE};
pub use lifecycle::ContainerAction;
pub use messages::Locale;
pub use metadata::{ConfigOption, ModuleMetadata, OptionKind, config_options, module_metadata};
pub use passthrough::{NatRuleRequest, exec_outcome, nat_rules_from_payload};
pub use presentation::{MiniJinjaRenderer, Tab, TabView, TemplateRenderer, error_fragment};
pub use reconciler::{ContainerInfo, lifecycle_status, ui_status, ui_status_flag};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError,
};
pub use types::{
    BillingContext, ExecOutcome, LifecycleAction, LifecycleStatus, NatRule, PanelOutcome,
    ProductOptions, RemoteState, RequestParams, SUCCESS_SENTINEL, StatusProbe, SyncResult,
    UiStatusFlag, UnsupportedOperation,
};
