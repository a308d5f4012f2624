// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Static module metadata and product configuration options.

use serde::Serialize;

use crate::identity::DEFAULT_NAME_TEMPLATE;

/// Module description registered with the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleMetadata {
    pub display_name: &'static str,
    #[serde(rename = "APIVersion")]
    pub api_version: &'static str,
    pub requires_server: bool,
}

/// Kind of input the panel renders for a product option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Text,
}

/// A per-product configuration option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigOption {
    /// Key the option's value is stored under.
    pub key: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub size: u16,
    pub default: &'static str,
    pub description: &'static str,
}

pub fn module_metadata() -> ModuleMetadata {
    ModuleMetadata {
        display_name: "LXC Container",
        api_version: "1.1",
        requires_server: true,
    }
}

/// Product options, in display order.
pub fn config_options() -> [ConfigOption; 2] {
    [
        ConfigOption {
            key: "name_template",
            label: "Container name template",
            kind: OptionKind::Text,
            size: 40,
            default: DEFAULT_NAME_TEMPLATE,
            description: "Placeholders: {hostid}, {productid}, {uid}",
        },
        ConfigOption {
            key: "image",
            label: "Image",
            kind: OptionKind::Text,
            size: 40,
            default: "",
            description: "Image identifier, e.g. ubuntu/22.04",
        },
    ]
}
