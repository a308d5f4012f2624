// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! End-user actions and the role allow-list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Who is invoking an end-user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Admin,
}

/// Actions a panel user can trigger from the container's service page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndUserAction {
    ExecCommand,
    AddNatRule,
    DeleteNatRule,
}

impl EndUserAction {
    pub const ALL: [EndUserAction; 3] = [
        EndUserAction::ExecCommand,
        EndUserAction::AddNatRule,
        EndUserAction::DeleteNatRule,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EndUserAction::ExecCommand => "exec_command",
            EndUserAction::AddNatRule => "add_nat_rule",
            EndUserAction::DeleteNatRule => "delete_nat_rule",
        }
    }
}

impl fmt::Display for EndUserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndUserAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        EndUserAction::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| format!("unknown action: {s}"))
    }
}

const CLIENT_ACTIONS: &[EndUserAction] = &[
    EndUserAction::ExecCommand,
    EndUserAction::AddNatRule,
    EndUserAction::DeleteNatRule,
];

const ADMIN_ACTIONS: &[EndUserAction] = &[
    EndUserAction::ExecCommand,
    EndUserAction::AddNatRule,
    EndUserAction::DeleteNatRule,
];

/// Actions a role may invoke.
pub fn permitted_actions(role: Role) -> &'static [EndUserAction] {
    match role {
        Role::Client => CLIENT_ACTIONS,
        Role::Admin => ADMIN_ACTIONS,
    }
}

pub fn is_permitted(role: Role, action: EndUserAction) -> bool {
    permitted_actions(role).contains(&action)
}
