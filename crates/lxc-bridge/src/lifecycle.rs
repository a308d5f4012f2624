// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lifecycle controller.
//!
//! | Panel action      | Remote call                                   |
//! |-------------------|-----------------------------------------------|
//! | provision         | POST /container/create {name, image}          |
//! | suspend           | POST /container/{id}/action {action: stop}    |
//! | resume            | POST /container/{id}/action {action: start}   |
//! | terminate         | POST /container/{id}/action {action: delete}  |
//! | power on/off      | POST /container/{id}/action {action: start/stop} |
//! | reboot            | POST /container/{id}/action {action: restart} |
//! | renew             | none, always succeeds                         |
//! | change plan       | none, advisory message                        |

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::bridge::{Bridge, container_endpoint};
use crate::error::{BridgeError, Result};
use crate::identity::ContainerIdentity;
use crate::transport::HttpMethod;
use crate::types::{BillingContext, LifecycleAction, PanelOutcome, UnsupportedOperation};

/// Actions understood by the remote `/container/{id}/action` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerAction {
    Start,
    Stop,
    Restart,
    Delete,
}

impl ContainerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Restart => "restart",
            ContainerAction::Delete => "delete",
        }
    }
}

impl LifecycleAction {
    /// Remote action issued for this panel action, if any.
    pub fn remote_action(&self) -> Option<ContainerAction> {
        match self {
            LifecycleAction::Suspend | LifecycleAction::PowerOff => Some(ContainerAction::Stop),
            LifecycleAction::Resume | LifecycleAction::PowerOn => Some(ContainerAction::Start),
            LifecycleAction::Terminate => Some(ContainerAction::Delete),
            LifecycleAction::Reboot => Some(ContainerAction::Restart),
            LifecycleAction::Provision | LifecycleAction::Renew | LifecycleAction::ChangePlan => {
                None
            }
        }
    }
}

impl Bridge {
    /// Run a panel lifecycle action.
    pub fn dispatch(&self, action: LifecycleAction, context: &BillingContext) -> PanelOutcome {
        match action {
            LifecycleAction::Provision => self.provision(context),
            LifecycleAction::Suspend => self.suspend(context),
            LifecycleAction::Resume => self.resume(context),
            LifecycleAction::Terminate => self.terminate(context),
            LifecycleAction::Renew => self.renew(context),
            LifecycleAction::ChangePlan => self.change_plan(context),
            LifecycleAction::PowerOn => self.power_on(context),
            LifecycleAction::PowerOff => self.power_off(context),
            LifecycleAction::Reboot => self.reboot(context),
        }
    }

    /// Create the container from the product's image.
    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn provision(&self, context: &BillingContext) -> PanelOutcome {
        let result = self.try_provision(context);
        self.outcome(LifecycleAction::Provision.as_str(), result)
    }

    fn try_provision(&self, context: &BillingContext) -> Result<PanelOutcome> {
        let image = context.options.image().ok_or_else(|| {
            BridgeError::Config("no image configured for this product".to_string())
        })?;
        let identity = ContainerIdentity::derive(context);

        self.remote().call(
            LifecycleAction::Provision.as_str(),
            "/container/create",
            HttpMethod::Post,
            &[("name", identity.as_str()), ("image", image)],
            self.config().long_timeout,
        )?;

        info!(container = %identity, image, "Container provisioned");
        Ok(PanelOutcome::Success)
    }

    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn suspend(&self, context: &BillingContext) -> PanelOutcome {
        self.run_container_action(LifecycleAction::Suspend, context, self.config().default_timeout)
    }

    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn resume(&self, context: &BillingContext) -> PanelOutcome {
        self.run_container_action(LifecycleAction::Resume, context, self.config().default_timeout)
    }

    /// Delete the container. Teardown can be slow, so the long timeout applies.
    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn terminate(&self, context: &BillingContext) -> PanelOutcome {
        self.run_container_action(LifecycleAction::Terminate, context, self.config().long_timeout)
    }

    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn power_on(&self, context: &BillingContext) -> PanelOutcome {
        self.run_container_action(LifecycleAction::PowerOn, context, self.config().default_timeout)
    }

    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn power_off(&self, context: &BillingContext) -> PanelOutcome {
        self.run_container_action(LifecycleAction::PowerOff, context, self.config().default_timeout)
    }

    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn reboot(&self, context: &BillingContext) -> PanelOutcome {
        self.run_container_action(LifecycleAction::Reboot, context, self.config().default_timeout)
    }

    /// Renewal needs nothing from the remote service.
    pub fn renew(&self, context: &BillingContext) -> PanelOutcome {
        info!(host_id = context.host_id, "Renewal acknowledged");
        PanelOutcome::Success
    }

    /// The remote service cannot resize a live container; report what changed.
    pub fn change_plan(&self, context: &BillingContext) -> PanelOutcome {
        let old_image = context
            .previous_options
            .as_ref()
            .and_then(|o| o.image())
            .unwrap_or("-");
        let new_image = context.options.image().unwrap_or("-");

        info!(host_id = context.host_id, old_image, new_image, "Plan change recorded");
        PanelOutcome::Advisory(self.locale().change_plan_advisory(old_image, new_image))
    }

    /// Fixed not-implemented error; no remote call is made.
    pub fn unsupported(&self, operation: UnsupportedOperation) -> PanelOutcome {
        PanelOutcome::Error(BridgeError::Unsupported(operation).panel_message(self.locale()))
    }

    fn run_container_action(
        &self,
        action: LifecycleAction,
        context: &BillingContext,
        timeout: Duration,
    ) -> PanelOutcome {
        let result = match action.remote_action() {
            Some(remote_action) => self.try_container_action(action, remote_action, context, timeout),
            None => Err(BridgeError::Validation(format!(
                "{} has no remote action",
                action.as_str()
            ))),
        };
        self.outcome(action.as_str(), result)
    }

    fn try_container_action(
        &self,
        action: LifecycleAction,
        remote_action: ContainerAction,
        context: &BillingContext,
        timeout: Duration,
    ) -> Result<PanelOutcome> {
        let identity = ContainerIdentity::derive(context);

        self.remote().call(
            action.as_str(),
            &container_endpoint(&identity, "/action"),
            HttpMethod::Post,
            &[("action", remote_action.as_str())],
            timeout,
        )?;

        info!(container = %identity, action = remote_action.as_str(), "Container action completed");
        Ok(PanelOutcome::Success)
    }
}
