// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Localized panel-facing text.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{RemoteState, UnsupportedOperation};

/// Language used for messages shown to panel users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-CN")]
    ZhCn,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::ZhCn => "zh-CN",
        }
    }

    /// Fixed error for operations the remote service does not support.
    pub fn not_implemented(&self, op: UnsupportedOperation) -> String {
        match self {
            Locale::En => format!("{} is not implemented by the container service", op.label()),
            Locale::ZhCn => format!("容器服务暂不支持{}", op.label_zh()),
        }
    }

    /// Description paired with the UI status flag.
    pub fn status_description(&self, state: RemoteState) -> &'static str {
        match (self, state) {
            (Locale::En, RemoteState::Running) => "Running",
            (Locale::En, RemoteState::Stopped) => "Stopped",
            (Locale::En, RemoteState::Error) => "Error",
            (Locale::En, RemoteState::Pending) => "Pending",
            (Locale::En, RemoteState::Starting) => "Starting",
            (Locale::En, RemoteState::Stopping) => "Stopping",
            (Locale::En, RemoteState::Unknown) => "Unknown",
            (Locale::ZhCn, RemoteState::Running) => "运行中",
            (Locale::ZhCn, RemoteState::Stopped) => "已停止",
            (Locale::ZhCn, RemoteState::Error) => "错误",
            (Locale::ZhCn, RemoteState::Pending) => "等待中",
            (Locale::ZhCn, RemoteState::Starting) => "启动中",
            (Locale::ZhCn, RemoteState::Stopping) => "停止中",
            (Locale::ZhCn, RemoteState::Unknown) => "未知",
        }
    }

    pub fn status_unavailable(&self, detail: &str) -> String {
        match self {
            Locale::En => format!("status unavailable: {detail}"),
            Locale::ZhCn => format!("状态不可用: {detail}"),
        }
    }

    /// Advisory returned on plan changes; containers are not resized live.
    pub fn change_plan_advisory(&self, old_image: &str, new_image: &str) -> String {
        match self {
            Locale::En => format!(
                "Plan changed from image '{old_image}' to '{new_image}'. \
                 Live resize is not supported; reprovision the container to apply it."
            ),
            Locale::ZhCn => format!(
                "套餐已从镜像 '{old_image}' 变更为 '{new_image}'。容器服务不支持在线调整，请重新开通以生效。"
            ),
        }
    }

    pub fn tab_error(&self, detail: &str) -> String {
        match self {
            Locale::En => format!("Unable to load container data: {detail}"),
            Locale::ZhCn => format!("无法加载容器数据: {detail}"),
        }
    }

    pub fn permission_denied(&self, action: &str) -> String {
        match self {
            Locale::En => format!("action '{action}' is not permitted for this role"),
            Locale::ZhCn => format!("当前角色无权执行操作 '{action}'"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" | "english" => Ok(Locale::En),
            "zh" | "zh-cn" | "chinese" => Ok(Locale::ZhCn),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}
