use crate::constants::api;
use serde::{Deserialize, Serialize};
/// API配置模块 - 内置服务器端点配置
use std::fmt;

/// API端点配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEndpoints {
    /// 服务器可用性端点
    pub availability: String,
    /// 控制命令端点
    pub control_actions: String,
    /// 监控设置端点
    pub monitoring_settings: String,
    /// Proxmox备份列表端点
    pub proxmox_backups: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            availability: api::endpoints::AVAILABILITY.to_string(),
            control_actions: api::endpoints::CONTROL_ACTIONS.to_string(),
            monitoring_settings: api::endpoints::MONITORING_SETTINGS.to_string(),
            proxmox_backups: api::endpoints::PROXMOX_BACKUPS.to_string(),
        }
    }
}

/// API配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 基础URL
    pub base_url: String,
    /// API端点
    pub endpoints: ApiEndpoints,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::with_base_url(api::DEFAULT_BASE_URL)
    }
}

impl ApiConfig {
    /// 使用指定服务器地址，端点保持默认
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoints: ApiEndpoints::default(),
        }
    }

    /// 获取完整的端点URL
    pub fn get_endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    pub fn get_availability_url(&self) -> String {
        self.get_endpoint_url(&self.endpoints.availability)
    }

    pub fn get_control_actions_url(&self) -> String {
        self.get_endpoint_url(&self.endpoints.control_actions)
    }

    pub fn get_monitoring_settings_url(&self) -> String {
        self.get_endpoint_url(&self.endpoints.monitoring_settings)
    }

    pub fn get_proxmox_backups_url(&self) -> String {
        self.get_endpoint_url(&self.endpoints.proxmox_backups)
    }

    /// 获取所有端点信息，用于诊断显示
    pub fn get_endpoints_info(&self) -> Vec<(&str, String)> {
        vec![
            ("服务器地址", self.base_url.clone()),
            ("服务器可用性", self.get_availability_url()),
            ("控制命令", self.get_control_actions_url()),
            ("监控设置", self.get_monitoring_settings_url()),
            ("Proxmox备份", self.get_proxmox_backups_url()),
        ]
    }
}

impl fmt::Display for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "当前API配置:")?;
        writeln!(f, "服务器地址: {}", self.base_url)?;
        writeln!(f, "\n主要端点:")?;
        for (name, url) in self.get_endpoints_info() {
            writeln!(f, "  {name}: {url}")?;
        }
        Ok(())
    }
}
