use crate::api_config::ApiConfig;
use crate::constants::{api, config, storage};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 应用配置结构
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// 后端服务配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiSection {
    pub base_url: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: api::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// HTTP超时配置（秒）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    api::http::CONNECT_TIMEOUT
}

fn default_request_timeout() -> u64 {
    api::http::REQUEST_TIMEOUT
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// 本地存储配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: storage::get_default_data_dir()
                .to_string_lossy()
                .to_string(),
        }
    }
}

impl AppConfig {
    /// 智能查找并加载配置文件
    /// 按优先级查找：monitor-client.toml -> .monitor-client.toml
    pub fn find_and_load_config() -> Result<Self> {
        Self::find_and_load_config_in(".")
    }

    /// 在指定目录中查找配置文件，找不到时写入默认配置
    pub fn find_and_load_config_in<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        for config_file in &config::CONFIG_FILE_NAMES {
            let path = dir.join(config_file);
            if path.exists() {
                tracing::info!("找到配置文件: {}", path.display());
                return Self::load_from_file(&path);
            }
        }

        let default_path = dir.join(config::DEFAULT_CONFIG_FILE);
        tracing::warn!("未找到配置文件，创建默认配置: {}", default_path.display());
        let default_config = Self::default();
        default_config.save_to_file(&default_path)?;
        Ok(default_config)
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_with_comments();
        fs::write(&path, content)?;
        Ok(())
    }

    /// 生成带注释的TOML配置
    fn to_toml_with_comments(&self) -> String {
        const TEMPLATE: &str = include_str!("../templates/monitor-client.toml.template");

        TEMPLATE
            .replace("{base_url}", &self.api.base_url)
            .replace(
                "{connect_timeout_secs}",
                &self.http.connect_timeout_secs.to_string(),
            )
            .replace(
                "{request_timeout_secs}",
                &self.http.request_timeout_secs.to_string(),
            )
            .replace("{data_dir}", &self.storage.data_dir.replace('\\', "\\\\"))
    }

    /// 构建API配置
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::with_base_url(self.api.base_url.clone())
    }

    /// 获取令牌存储目录
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir)
    }
}
