// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Container identity derivation.
//!
//! There is no mapping table between panel services and remote containers:
//! the same billing context must always name the same container, so
//! derivation is pure and total.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::BillingContext;

/// Template used when the product has none configured.
pub const DEFAULT_NAME_TEMPLATE: &str = "whmcs-{hostid}";

/// Canonical container name at the remote service.
///
/// Always non-empty, starts with a lowercase letter and contains only
/// `[a-z0-9-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerIdentity(String);

impl ContainerIdentity {
    /// Derive the identity for a billing context using its product template.
    pub fn derive(context: &BillingContext) -> Self {
        let template = context
            .options
            .name_template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_NAME_TEMPLATE);
        Self::derive_with_template(context, template)
    }

    /// Derive the identity with an explicit template.
    pub fn derive_with_template(context: &BillingContext, template: &str) -> Self {
        let substituted = template
            .replace("{hostid}", &context.host_id.to_string())
            .replace("{productid}", &context.product_id.to_string())
            .replace("{uid}", &context.user_id.to_string());

        let sanitized: String = substituted
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
            .collect();
        let trimmed = sanitized.trim_matches('-');

        let mut name = if trimmed.is_empty() {
            format!("container-{}", context.host_id)
        } else {
            trimmed.to_string()
        };

        if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
            name.insert(0, 'c');
        }

        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContainerIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductOptions;

    fn ctx(host_id: u64, template: &str) -> BillingContext {
        BillingContext::new(host_id)
            .with_product_id(3)
            .with_user_id(9)
            .with_options(ProductOptions::new().with_name_template(template))
    }

    #[test]
    fn test_default_template() {
        let identity = ContainerIdentity::derive(&BillingContext::new(101));
        assert_eq!(identity.as_str(), "whmcs-101");
    }

    #[test]
    fn test_all_placeholders() {
        let identity = ContainerIdentity::derive(&ctx(42, "Srv-{uid}-{productid}-{hostid}"));
        assert_eq!(identity.as_str(), "srv-9-3-42");
    }

    #[test]
    fn test_fallback_when_sanitized_empty() {
        assert_eq!(ContainerIdentity::derive(&ctx(7, "???")).as_str(), "container-7");
        assert_eq!(ContainerIdentity::derive(&ctx(7, "---")).as_str(), "container-7");
    }

    #[test]
    fn test_letter_prefix() {
        assert_eq!(ContainerIdentity::derive(&ctx(42, "{hostid}")).as_str(), "c42");
        assert_eq!(ContainerIdentity::derive(&ctx(5, "-9box-")).as_str(), "c9box");
    }

    #[test]
    fn test_strips_disallowed_characters() {
        let identity = ContainerIdentity::derive(&ctx(1, "My_Box.{hostid} é"));
        assert_eq!(identity.as_str(), "mybox1");
    }

    #[test]
    fn test_blank_template_uses_default() {
        assert_eq!(ContainerIdentity::derive(&ctx(8, "  ")).as_str(), "whmcs-8");
    }
}
