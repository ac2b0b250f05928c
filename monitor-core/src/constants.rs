/// API服务相关常量
pub mod api {
    /// 默认API服务器地址
    pub const DEFAULT_BASE_URL: &str = "https://api.202020.ru:8443";

    /// API端点路径
    pub mod endpoints {
        /// 服务器可用性端点
        pub const AVAILABILITY: &str = "/v1/monitoring/availability";

        /// 控制命令端点
        pub const CONTROL_ACTIONS: &str = "/v1/control/actions";

        /// 监控设置端点
        pub const MONITORING_SETTINGS: &str = "/v1/settings/monitoring";

        /// Proxmox备份列表端点
        pub const PROXMOX_BACKUPS: &str = "/v1/backups/proxmox";
    }

    /// 查询参数
    pub mod query {
        /// 可用性查询范围参数名
        pub const SCOPE: &str = "scope";

        /// 客户端总是请求全部服务器
        pub const SCOPE_ALL: &str = "all";

        /// 备份起始日期参数名
        pub const FROM: &str = "from";

        /// 备份结束日期参数名
        pub const TO: &str = "to";
    }

    /// HTTP相关常量
    pub mod http {
        /// 连接建立超时时间（秒）
        pub const CONNECT_TIMEOUT: u64 = 15;

        /// 完整请求超时时间（秒）
        pub const REQUEST_TIMEOUT: u64 = 30;

        /// 请求ID头
        pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
        /// 状态错误消息中保留的响应体最大字符数
        pub const MAX_ERROR_BODY_CHARS: usize = 200;

        /// Bearer认证前缀
        pub const BEARER_PREFIX: &str = "Bearer ";

        /// User-Agent头
        pub const USER_AGENT: &str = concat!("monitor-core/", env!("CARGO_PKG_VERSION"));
    }
}

/// 本地凭据存储相关常量
pub mod storage {
    use std::path::PathBuf;

    /// 应用私有存储名
    pub const STORE_NAME: &str = "monitoring_mobile";

    /// 存储文件扩展名
    pub const STORE_EXTENSION: &str = "toml";

    /// Bearer 令牌键
    pub const KEY_API_TOKEN: &str = "api_token";

    /// 应用数据目录名
    pub const APP_DIR_NAME: &str = "monitoring-client";

    /// 获取默认数据目录（跨平台，找不到系统目录时退回当前目录）
    pub fn get_default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME))
    }
}

/// 应用配置相关常量
pub mod config {
    /// 配置文件查找顺序
    pub const CONFIG_FILE_NAMES: [&str; 2] = ["monitor-client.toml", ".monitor-client.toml"];

    /// 默认配置文件名
    pub const DEFAULT_CONFIG_FILE: &str = "monitor-client.toml";
}

/// 日志相关常量
pub mod logging {
    /// 默认日志级别
    pub const DEFAULT_LOG_LEVEL: &str = "info";

    /// 详细模式日志级别
    pub const VERBOSE_LOG_LEVEL: &str = "debug";

    /// 日志文件环境变量
    pub const LOG_FILE_ENV: &str = "MONITOR_LOG_FILE";
}

/// 界面提示文案
pub mod messages {
    /// 响应中既无数据也无错误描述
    pub const EMPTY_RESPONSE: &str = "empty response";

    pub const REQUEST_ERROR: &str = "Request error";
    pub const COMMAND_ERROR: &str = "Command error";
    pub const SAVE_ERROR: &str = "Save error";
    pub const BACKUPS_ERROR: &str = "Backup fetch error";

    pub const TOKEN_SAVED: &str = "Token saved";
    pub const TOKEN_CLEARED: &str = "Token cleared";
    pub const DATA_REFRESHED: &str = "Data refreshed";

    /// 备份日期范围缺失
    pub const BACKUPS_RANGE_REQUIRED: &str = "Specify both dates (from/to)";

    /// 首次打开时的状态摘要
    pub const SUMMARY_PLACEHOLDER: &str = "Press \"Refresh\" to get status";

    /// 缺失字段占位符
    pub const PLACEHOLDER: &str = "-";
}

/// 备份查询相关常量
pub mod backup {
    /// 默认备份查询跨度（天）
    pub const DEFAULT_RANGE_DAYS: i64 = 7;

    /// 日期格式 YYYY-MM-DD
    pub const DATE_FORMAT: &str = "%Y-%m-%d";
}
