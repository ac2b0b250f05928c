use crate::constants::messages;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 响应信封，所有端点共用
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// 信封中的错误描述
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// 单台服务器可用性快照
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerAvailability {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub last_checked_at: Option<String>,
}

impl ServerAvailability {
    pub fn display_last_checked_at(&self) -> &str {
        self.last_checked_at
            .as_deref()
            .unwrap_or(messages::PLACEHOLDER)
    }
}

/// 可用性汇总，由服务端计算
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AvailabilitySummary {
    #[serde(default)]
    pub up: u32,
    #[serde(default)]
    pub down: u32,
    #[serde(default)]
    pub unknown: u32,
}

impl fmt::Display for AvailabilitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UP: {}, DOWN: {}, UNKNOWN: {}",
            self.up, self.down, self.unknown
        )
    }
}

/// 可用性查询响应
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub servers: Vec<ServerAvailability>,
    #[serde(default)]
    pub summary: AvailabilitySummary,
}

/// 控制命令请求
#[derive(Debug, Clone, Serialize)]
pub struct ControlActionRequest {
    pub action: String,
}

/// 控制命令执行结果，提交后不再跟踪任务
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ControlActionResult {
    pub accepted: bool,
    pub message: String,
    #[serde(default)]
    pub queued_job_id: Option<String>,
}

/// 客户端内置的控制命令
///
/// 服务端决定可接受的命令集合，仓库层接受任意字符串，
/// 这里只是界面上常用的几个。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    PauseMonitoring,
    ResumeMonitoring,
    SendMorningReport,
    ForceQuiet,
}

impl ControlAction {
    pub const ALL: [ControlAction; 4] = [
        ControlAction::PauseMonitoring,
        ControlAction::ResumeMonitoring,
        ControlAction::SendMorningReport,
        ControlAction::ForceQuiet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlAction::PauseMonitoring => "pause_monitoring",
            ControlAction::ResumeMonitoring => "resume_monitoring",
            ControlAction::SendMorningReport => "send_morning_report",
            ControlAction::ForceQuiet => "force_quiet",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControlAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown control action: {s}"))
    }
}

/// 监控设置局部更新，未设置的字段不发送
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonitoringSettingsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_interval_sec: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_sec: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_downtime_sec: Option<u32>,
}

impl MonitoringSettingsRequest {
    /// 从表单文本构造，无法解析为整数的字段视为未设置
    pub fn from_form(check_interval: &str, timeout: &str, max_downtime: &str) -> Self {
        fn parse(value: &str) -> Option<u32> {
            value.trim().parse().ok()
        }

        Self {
            check_interval_sec: parse(check_interval),
            timeout_sec: parse(timeout),
            max_downtime_sec: parse(max_downtime),
        }
    }
}

/// 服务端返回的完整监控设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct MonitoringSettings {
    pub check_interval_sec: u32,
    pub timeout_sec: u32,
    pub max_downtime_sec: u32,
}

/// 备份记录，远端数据不完全可信，缺失字段给默认值
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackupItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default = "default_backup_status")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub size_human: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_backup_status() -> String {
    "unknown".to_string()
}

impl BackupItem {
    pub fn display_source(&self) -> &str {
        if self.source.trim().is_empty() {
            messages::PLACEHOLDER
        } else {
            &self.source
        }
    }

    pub fn display_created_at(&self) -> &str {
        self.created_at.as_deref().unwrap_or(messages::PLACEHOLDER)
    }

    pub fn display_size(&self) -> &str {
        self.size_human.as_deref().unwrap_or(messages::PLACEHOLDER)
    }
}

/// 备份列表响应
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProxmoxBackupsResponse {
    #[serde(default)]
    pub backups: Vec<BackupItem>,
}
