use crate::{
    api::{BackupItem, MonitoringSettingsRequest, ServerAvailability},
    authenticated_client::AuthenticatedClient,
    config::AppConfig,
    constants::{backup, messages},
    credential_store::{CredentialStore, FileCredentialStore},
    error::{MonitorError, Result},
    repository::MonitoringRepository,
};
use chrono::{Duration, Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// 界面标签页
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppTab {
    #[default]
    Dashboard,
    Control,
    Backups,
    Settings,
}

impl AppTab {
    pub const ALL: [AppTab; 4] = [
        AppTab::Dashboard,
        AppTab::Control,
        AppTab::Backups,
        AppTab::Settings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AppTab::Dashboard => "Status",
            AppTab::Control => "Control",
            AppTab::Backups => "Backups",
            AppTab::Settings => "Settings",
        }
    }
}

/// 界面可见状态，只存在于内存中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainUiState {
    pub token: String,
    pub is_loading: bool,
    pub selected_tab: AppTab,
    pub summary_text: String,
    pub servers: Vec<ServerAvailability>,
    pub backups: Vec<BackupItem>,
    pub backups_from: String,
    pub backups_to: String,
    /// 最近一次操作的结果，下一次操作时被覆盖
    pub message: String,
}

impl Default for MainUiState {
    fn default() -> Self {
        Self {
            token: String::new(),
            is_loading: false,
            selected_tab: AppTab::default(),
            summary_text: messages::SUMMARY_PLACEHOLDER.to_string(),
            servers: Vec::new(),
            backups: Vec::new(),
            backups_from: String::new(),
            backups_to: String::new(),
            message: String::new(),
        }
    }
}

/// 应用状态持有者
///
/// 每个用户操作对应一次请求序列。多个操作并发时互不排斥，
/// 各自完成时写入 loading 标志和消息，以最后一次写入为准。
#[derive(Clone)]
pub struct MainViewModel {
    store: Arc<dyn CredentialStore>,
    repository: MonitoringRepository,
    state: Arc<RwLock<MainUiState>>,
}

impl MainViewModel {
    /// 根据配置创建，令牌在每次请求时从存储中重新读取
    pub fn new(store: Arc<dyn CredentialStore>, config: &AppConfig) -> Result<Self> {
        let provider_store = store.clone();
        let client = AuthenticatedClient::new(
            config.api_config(),
            &config.http,
            Arc::new(move || provider_store.get_token()),
        )?;
        Ok(Self::with_repository(store, MonitoringRepository::new(client)))
    }

    /// 按配置文件打开 `[storage] data_dir` 下的凭据存储并创建
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = FileCredentialStore::open(config.get_data_dir())?;
        info!("凭据存储: {}", store.path().display());
        Self::new(Arc::new(store), config)
    }

    /// 在当前目录查找并加载配置文件（找不到时写入默认配置），再按配置创建
    pub fn open_default() -> Result<Self> {
        let config = AppConfig::find_and_load_config()?;
        Self::from_config(&config)
    }

    pub fn with_repository(store: Arc<dyn CredentialStore>, repository: MonitoringRepository) -> Self {
        Self {
            store,
            repository,
            state: Arc::new(RwLock::new(MainUiState::default())),
        }
    }

    /// 当前状态快照
    pub async fn state(&self) -> MainUiState {
        self.state.read().await.clone()
    }

    async fn update(&self, f: impl FnOnce(&mut MainUiState)) {
        let mut state = self.state.write().await;
        f(&mut state);
    }

    async fn begin_request(&self) {
        self.update(|state| {
            state.is_loading = true;
            state.message.clear();
        })
        .await;
    }

    async fn end_request(&self, message: String) {
        self.update(|state| {
            state.message = message;
            state.is_loading = false;
        })
        .await;
    }

    /// 读取已保存的令牌，备份日期范围默认为最近7天
    pub async fn load_initial_state(&self) {
        self.load_initial_state_at(Local::now().date_naive()).await;
    }

    pub async fn load_initial_state_at(&self, today: NaiveDate) {
        let token = self.store.get_token();
        let from = today - Duration::days(backup::DEFAULT_RANGE_DAYS);
        self.update(|state| {
            state.token = token;
            state.backups_from = from.format(backup::DATE_FORMAT).to_string();
            state.backups_to = today.format(backup::DATE_FORMAT).to_string();
        })
        .await;
    }

    /// 保存令牌（去除首尾空白），空令牌同样会被保存。
    /// 写入失败时界面上的令牌保持不变
    pub async fn save_token(&self, token: &str) {
        let normalized = token.trim().to_string();
        match self.store.set_token(&normalized) {
            Ok(()) => {
                let message = if normalized.is_empty() {
                    messages::TOKEN_CLEARED
                } else {
                    messages::TOKEN_SAVED
                };
                self.update(|state| {
                    state.token = normalized;
                    state.message = message.to_string();
                })
                .await;
            }
            Err(e) => {
                warn!("令牌保存失败: {}", e);
                let message = e.user_message(messages::SAVE_ERROR);
                self.update(|state| state.message = message).await;
            }
        }
    }

    pub async fn refresh_availability(&self) {
        self.begin_request().await;
        match self.repository.get_availability().await {
            Ok(payload) => {
                let summary_text = payload.summary.to_string();
                self.update(|state| {
                    state.servers = payload.servers;
                    state.summary_text = summary_text;
                })
                .await;
                self.end_request(messages::DATA_REFRESHED.to_string()).await;
            }
            Err(e) => self.fail_request("刷新可用性", e, messages::REQUEST_ERROR).await,
        }
    }

    pub async fn send_action(&self, action: &str) {
        self.begin_request().await;
        match self.repository.run_action(action).await {
            Ok(result) => self.end_request(result.message).await,
            Err(e) => self.fail_request("控制命令", e, messages::COMMAND_ERROR).await,
        }
    }

    /// 表单中无法解析为整数的字段不会发送
    pub async fn update_settings(&self, check_interval: &str, timeout: &str, max_downtime: &str) {
        let request = MonitoringSettingsRequest::from_form(check_interval, timeout, max_downtime);

        self.begin_request().await;
        match self.repository.update_monitoring_settings(&request).await {
            Ok(settings) => {
                let message = format!(
                    "Saved: interval={}, timeout={}, maxDown={}",
                    settings.check_interval_sec, settings.timeout_sec, settings.max_downtime_sec
                );
                self.end_request(message).await;
            }
            Err(e) => self.fail_request("保存监控设置", e, messages::SAVE_ERROR).await,
        }
    }

    pub async fn set_backups_range(&self, from: &str, to: &str) {
        let (from, to) = (from.to_string(), to.to_string());
        self.update(|state| {
            state.backups_from = from;
            state.backups_to = to;
        })
        .await;
    }

    /// 日期范围不完整时直接提示，不发请求
    pub async fn load_backups(&self) {
        let (from, to) = {
            let state = self.state.read().await;
            (state.backups_from.clone(), state.backups_to.clone())
        };

        if let Err(e) = validate_backups_range(&from, &to) {
            self.update(|state| state.message = e.to_string()).await;
            return;
        }

        self.begin_request().await;
        match self.repository.get_proxmox_backups(&from, &to).await {
            Ok(payload) => {
                let message = format!("Backups loaded: {}", payload.backups.len());
                self.update(|state| state.backups = payload.backups).await;
                self.end_request(message).await;
            }
            Err(e) => self.fail_request("获取备份", e, messages::BACKUPS_ERROR).await,
        }
    }

    pub async fn set_tab(&self, tab: AppTab) {
        self.update(|state| state.selected_tab = tab).await;
    }

    async fn fail_request(&self, operation: &str, error: MonitorError, fallback: &str) {
        warn!("{}失败: {}", operation, error);
        self.end_request(error.user_message(fallback)).await;
    }
}

/// 备份查询前的日期范围校验
pub fn validate_backups_range(from: &str, to: &str) -> Result<()> {
    if from.trim().is_empty() || to.trim().is_empty() {
        info!("备份日期范围不完整: from={:?}, to={:?}", from, to);
        return Err(MonitorError::validation(messages::BACKUPS_RANGE_REQUIRED));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_config::ApiConfig;
    use crate::config::HttpConfig;
    use crate::credential_store::MemoryCredentialStore;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn view_model_for(server: &MockServer, store: Arc<MemoryCredentialStore>) -> MainViewModel {
        let mut config = AppConfig::default();
        config.api.base_url = server.uri();
        MainViewModel::new(store, &config).unwrap()
    }

    #[tokio::test]
    async fn test_initial_state() {
        let store = Arc::new(MemoryCredentialStore::new("saved"));
        let repository = MonitoringRepository::new(
            AuthenticatedClient::new(
                ApiConfig::default(),
                &HttpConfig::default(),
                Arc::new(String::new),
            )
            .unwrap(),
        );
        let vm = MainViewModel::with_repository(store, repository);

        let state = vm.state().await;
        assert_eq!(state.summary_text, "Press \"Refresh\" to get status");
        assert_eq!(state.selected_tab, AppTab::Dashboard);

        let today = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        vm.load_initial_state_at(today).await;
        let state = vm.state().await;
        assert_eq!(state.token, "saved");
        assert_eq!(state.backups_from, "2024-01-01");
        assert_eq!(state.backups_to, "2024-01-08");
    }

    #[tokio::test]
    async fn test_refresh_availability_renders_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/monitoring/availability"))
            .and(query_param("scope", "all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "servers": [
                        {"id": "1", "name": "web", "status": "up", "last_checked_at": "2024-01-01T10:00:00Z"},
                        {"id": "2", "name": "db", "status": "down"}
                    ],
                    "summary": {"up": 1, "down": 1, "unknown": 0}
                }
            })))
            .mount(&server)
            .await;

        let vm = view_model_for(&server, Arc::new(MemoryCredentialStore::default()));
        vm.refresh_availability().await;

        let state = vm.state().await;
        assert_eq!(state.summary_text, "UP: 1, DOWN: 1, UNKNOWN: 0");
        assert_eq!(state.servers.len(), 2);
        assert_eq!(state.message, "Data refreshed");
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_servers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "error": {"code": "unavailable", "message": "backend is down"}
            })))
            .mount(&server)
            .await;

        let vm = view_model_for(&server, Arc::new(MemoryCredentialStore::default()));
        vm.refresh_availability().await;

        let state = vm.state().await;
        assert_eq!(state.message, "backend is down");
        assert!(state.servers.is_empty());
        assert_eq!(state.summary_text, "Press \"Refresh\" to get status");
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_load_backups_rejects_blank_range_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"backups": []}})))
            .expect(0)
            .mount(&server)
            .await;

        let vm = view_model_for(&server, Arc::new(MemoryCredentialStore::default()));
        vm.set_backups_range("", "2024-01-08").await;
        vm.load_backups().await;

        let state = vm.state().await;
        assert_eq!(state.message, "Specify both dates (from/to)");
        assert!(!state.is_loading);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_backups() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/backups/proxmox"))
            .and(query_param("from", "2024-01-01"))
            .and(query_param("to", "2024-01-08"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"backups": [{"id": "b1", "source": "pve", "status": "ok"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vm = view_model_for(&server, Arc::new(MemoryCredentialStore::default()));
        vm.set_backups_range("2024-01-01", "2024-01-08").await;
        vm.load_backups().await;

        let state = vm.state().await;
        assert_eq!(state.message, "Backups loaded: 1");
        assert_eq!(state.backups[0].source, "pve");
    }

    #[tokio::test]
    async fn test_update_settings_sends_only_parsed_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v1/settings/monitoring"))
            .and(body_json(json!({"timeout_sec": 20})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"check_interval_sec": 60, "timeout_sec": 20, "max_downtime_sec": 300}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vm = view_model_for(&server, Arc::new(MemoryCredentialStore::default()));
        vm.update_settings("", "20", "not a number").await;

        let state = vm.state().await;
        assert_eq!(state.message, "Saved: interval=60, timeout=20, maxDown=300");
    }

    #[tokio::test]
    async fn test_send_action_shows_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/control/actions"))
            .and(body_json(json!({"action": "force_quiet"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"accepted": true, "message": "Quiet mode enabled"}
            })))
            .mount(&server)
            .await;

        let vm = view_model_for(&server, Arc::new(MemoryCredentialStore::default()));
        vm.send_action(crate::api::ControlAction::ForceQuiet.as_str()).await;
        assert_eq!(vm.state().await.message, "Quiet mode enabled");
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let mut config = AppConfig::default();
        config.api.base_url = "http://127.0.0.1:1".to_string();
        config.http.connect_timeout_secs = 2;
        let vm = MainViewModel::new(Arc::new(MemoryCredentialStore::default()), &config).unwrap();
        vm.send_action("pause_monitoring").await;

        let state = vm.state().await;
        assert!(!state.message.is_empty());
        assert_ne!(state.message, "Command error");
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_saved_token_applies_to_next_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::default());
        let vm = view_model_for(&server, store.clone());

        vm.save_token("  new-token  ").await;
        assert_eq!(vm.state().await.message, "Token saved");
        assert_eq!(store.get_token(), "new-token");
        vm.refresh_availability().await;

        vm.save_token("   ").await;
        let state = vm.state().await;
        assert_eq!(state.message, "Token cleared");
        assert_eq!(state.token, "");
        vm.refresh_availability().await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].headers.get("authorization").unwrap().to_str().unwrap(),
            "Bearer new-token"
        );
        assert!(requests[1].headers.get("authorization").is_none());
        assert_eq!(vm.state().await.message, "Data refreshed");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_displayed_token() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut config = AppConfig::default();
        config.storage.data_dir = blocker.join("sub").to_string_lossy().to_string();
        let vm = MainViewModel::from_config(&config).unwrap();
        vm.load_initial_state().await;

        vm.save_token("new-token").await;
        let state = vm.state().await;
        assert_eq!(state.token, "");
        assert!(!state.message.is_empty());
        assert_ne!(state.message, "Token saved");
    }

    #[tokio::test]
    async fn test_from_config_uses_storage_data_dir() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .mount(&server)
            .await;

        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.api.base_url = server.uri();
        config.storage.data_dir = temp_dir.path().to_string_lossy().to_string();

        let vm = MainViewModel::from_config(&config).unwrap();
        vm.save_token("persisted-token").await;
        assert!(temp_dir.path().join("monitoring_mobile.toml").exists());

        let reopened = MainViewModel::from_config(&config).unwrap();
        reopened.load_initial_state().await;
        assert_eq!(reopened.state().await.token, "persisted-token");
        reopened.refresh_availability().await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].headers.get("authorization").unwrap().to_str().unwrap(),
            "Bearer persisted-token"
        );
    }

    #[tokio::test]
    async fn test_concurrent_actions_both_complete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"accepted": true, "message": "Report queued"}
            })))
            .mount(&server)
            .await;

        let vm = view_model_for(&server, Arc::new(MemoryCredentialStore::default()));
        tokio::join!(vm.refresh_availability(), vm.send_action("send_morning_report"));

        // 最终消息取决于完成顺序，不做断言
        let state = vm.state().await;
        assert!(!state.is_loading);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_tab() {
        let server = MockServer::start().await;
        let vm = view_model_for(&server, Arc::new(MemoryCredentialStore::default()));
        vm.set_tab(AppTab::Backups).await;
        assert_eq!(vm.state().await.selected_tab, AppTab::Backups);
        assert_eq!(AppTab::Backups.title(), "Backups");
    }

    #[test]
    fn test_validate_backups_range() {
        assert!(validate_backups_range("2024-01-01", "2024-01-08").is_ok());
        let err = validate_backups_range("  ", "2024-01-08").unwrap_err();
        assert!(err.is_validation());
        assert!(validate_backups_range("2024-01-01", "").is_err());
    }
}
