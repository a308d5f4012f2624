// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Presentation adapter for the panel's client-area tabs.
//!
//! Each tab fetches its data, builds a fixed set of template variables and
//! hands them to a [`TemplateRenderer`]. A failed fetch produces an inline
//! error fragment instead of a failed render.

use std::fmt;
use std::str::FromStr;

use minijinja::Environment;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{instrument, warn};

use crate::bridge::Bridge;
use crate::error::Result;
use crate::identity::ContainerIdentity;
use crate::messages::Locale;
use crate::reconciler::{MAX_ERROR_DETAIL_CHARS, truncate, ui_status};
use crate::types::{BillingContext, RemoteState};

const INFO_TEMPLATE: &str = include_str!("../templates/info.html");
const NAT_RULES_TEMPLATE: &str = include_str!("../templates/nat_rules.html");
const EXEC_CONSOLE_TEMPLATE: &str = include_str!("../templates/exec_console.html");

/// Client-area tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Info,
    NatRules,
    ExecConsole,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Info, Tab::NatRules, Tab::ExecConsole];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Info => "info",
            Tab::NatRules => "nat_rules",
            Tab::ExecConsole => "exec_console",
        }
    }

    /// Name of the template rendering this tab.
    pub fn template_name(&self) -> &'static str {
        match self {
            Tab::Info => "info.html",
            Tab::NatRules => "nat_rules.html",
            Tab::ExecConsole => "exec_console.html",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "info" => Ok(Tab::Info),
            "nat" | "nat_rules" => Ok(Tab::NatRules),
            "exec" | "exec_console" => Ok(Tab::ExecConsole),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

/// What a tab shows: a template with its variables, or an error fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum TabView {
    Template {
        template: &'static str,
        vars: Value,
    },
    ErrorFragment(String),
}

/// Renders a named template with a set of variables.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, vars: &Value) -> Result<String>;
}

/// Renderer backed by `minijinja` with the built-in tab templates.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(Tab::Info.template_name(), INFO_TEMPLATE)?;
        env.add_template(Tab::NatRules.template_name(), NAT_RULES_TEMPLATE)?;
        env.add_template(Tab::ExecConsole.template_name(), EXEC_CONSOLE_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Register or replace a template, e.g. to restyle a tab.
    pub fn with_template(mut self, name: &'static str, source: &'static str) -> Result<Self> {
        self.env.add_template(name, source)?;
        Ok(self)
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, template: &str, vars: &Value) -> Result<String> {
        let tmpl = self.env.get_template(template)?;
        Ok(tmpl.render(vars)?)
    }
}

impl Bridge {
    /// Fetch the data for a tab and build its view.
    #[instrument(skip(self, context), fields(host_id = context.host_id))]
    pub fn tab_view(&self, tab: Tab, context: &BillingContext) -> TabView {
        let locale = self.locale();
        let vars = match tab {
            Tab::Info => self.info_vars(context),
            Tab::NatRules => self.nat_rule_vars(context),
            Tab::ExecConsole => self.exec_console_vars(context),
        };

        match vars {
            Ok(mut vars) => {
                vars["labels"] = labels(tab, locale);
                TabView::Template {
                    template: tab.template_name(),
                    vars,
                }
            }
            Err(e) => {
                warn!(tab = tab.as_str(), error = %e, "Tab data unavailable");
                let detail = truncate(&e.panel_message(locale), MAX_ERROR_DETAIL_CHARS);
                TabView::ErrorFragment(error_fragment(&locale.tab_error(&detail)))
            }
        }
    }

    /// Render a tab to HTML. Never fails; render errors become an error fragment.
    pub fn render_tab(
        &self,
        tab: Tab,
        context: &BillingContext,
        renderer: &dyn TemplateRenderer,
    ) -> String {
        match self.tab_view(tab, context) {
            TabView::Template { template, vars } => {
                renderer.render(template, &vars).unwrap_or_else(|e| {
                    warn!(template, error = %e, "Template render failed");
                    error_fragment(&self.locale().tab_error(&e.to_string()))
                })
            }
            TabView::ErrorFragment(html) => html,
        }
    }

    fn info_vars(&self, context: &BillingContext) -> Result<Value> {
        let info = self.container_info(context, self.config().probe_timeout)?;
        let status = ui_status(info.state, self.locale());
        Ok(json!({
            "container": info.identity,
            "status": info.raw_status,
            "flag": status.flag,
            "description": status.description,
            "ip": info.ip,
            "image": context.options.image(),
            "details": info.details,
        }))
    }

    fn nat_rule_vars(&self, context: &BillingContext) -> Result<Value> {
        let rules = self.list_nat_rules(context)?;
        Ok(json!({
            "container": ContainerIdentity::derive(context),
            "rules": rules,
            "protocols": ["tcp", "udp"],
        }))
    }

    fn exec_console_vars(&self, context: &BillingContext) -> Result<Value> {
        let info = self.container_info(context, self.config().probe_timeout)?;
        let status = ui_status(info.state, self.locale());
        Ok(json!({
            "container": info.identity,
            "flag": status.flag,
            "description": status.description,
            "running": info.state == RemoteState::Running,
        }))
    }
}

fn labels(tab: Tab, locale: Locale) -> Value {
    match (tab, locale) {
        (Tab::Info, Locale::En) => json!({
            "title": "Container", "container": "Name", "status": "Status",
            "ip": "IP address", "image": "Image",
        }),
        (Tab::Info, Locale::ZhCn) => json!({
            "title": "容器", "container": "名称", "status": "状态",
            "ip": "IP 地址", "image": "镜像",
        }),
        (Tab::NatRules, Locale::En) => json!({
            "title": "Port forwarding", "host_port": "Host port",
            "container_port": "Container port", "protocol": "Protocol",
            "created_at": "Created", "delete": "Delete", "add": "Add rule",
            "empty": "No port forwarding rules.",
        }),
        (Tab::NatRules, Locale::ZhCn) => json!({
            "title": "端口转发", "host_port": "主机端口",
            "container_port": "容器端口", "protocol": "协议",
            "created_at": "创建时间", "delete": "删除", "add": "添加规则",
            "empty": "暂无端口转发规则。",
        }),
        (Tab::ExecConsole, Locale::En) => json!({
            "title": "Console", "container": "Container", "placeholder": "Command",
            "run": "Run", "not_running": "The container must be running to execute commands.",
        }),
        (Tab::ExecConsole, Locale::ZhCn) => json!({
            "title": "控制台", "container": "容器", "placeholder": "命令",
            "run": "执行", "not_running": "容器运行中才能执行命令。",
        }),
    }
}

/// Minimal inline fragment shown in place of a tab.
pub fn error_fragment(message: &str) -> String {
    format!(
        "<div class=\"alert alert-danger lxc-bridge-error\">{}</div>",
        escape_html(message)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
