use crate::{
    api::{
        ApiEnvelope, AvailabilityResponse, ControlActionRequest, ControlActionResult,
        MonitoringSettings, MonitoringSettingsRequest, ProxmoxBackupsResponse,
    },
    authenticated_client::{AuthenticatedClient, Endpoint},
    constants::api::query,
    error::{MonitorError, Result},
};
use std::future::Future;
use tracing::{debug, info};

/// 解开响应信封
///
/// data 存在即成功（忽略同时存在的 error），否则用 error.message 原样构造失败，
/// message 缺失或为空串时返回 EmptyResponse。
pub fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T> {
    if let Some(data) = envelope.data {
        return Ok(data);
    }

    match envelope.error {
        Some(error) => match error.message {
            Some(message) if !message.is_empty() => Err(MonitorError::Api {
                code: error.code,
                message,
                request_id: error.request_id,
            }),
            _ => Err(MonitorError::EmptyResponse),
        },
        None => Err(MonitorError::EmptyResponse),
    }
}

/// 执行一次调用并解开信封，调用本身的失败原样向上传递
pub async fn run_catching_envelope<T, F>(call: F) -> Result<T>
where
    F: Future<Output = Result<ApiEnvelope<T>>>,
{
    unwrap_envelope(call.await?)
}

/// 监控服务仓库
///
/// 每个方法恰好发起一次网络请求，不做重试。
#[derive(Debug, Clone)]
pub struct MonitoringRepository {
    client: AuthenticatedClient,
}

impl MonitoringRepository {
    pub fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    /// 获取全部服务器的可用性
    pub async fn get_availability(&self) -> Result<AvailabilityResponse> {
        let endpoints = &self.client.get_config().endpoints;
        let endpoint = Endpoint::get(&endpoints.availability).query(query::SCOPE, query::SCOPE_ALL);

        let payload: AvailabilityResponse = run_catching_envelope(self.client.call(endpoint)).await?;
        debug!(
            "可用性已获取: {} 台服务器, {}",
            payload.servers.len(),
            payload.summary
        );
        Ok(payload)
    }

    /// 提交控制命令，命令是否有效由服务端判断
    pub async fn run_action(&self, action: &str) -> Result<ControlActionResult> {
        let endpoints = &self.client.get_config().endpoints;
        let endpoint = Endpoint::post(&endpoints.control_actions).json(&ControlActionRequest {
            action: action.to_string(),
        })?;

        let result: ControlActionResult = run_catching_envelope(self.client.call(endpoint)).await?;
        info!(
            "控制命令 {} 已提交: accepted={}, job={:?}",
            action, result.accepted, result.queued_job_id
        );
        Ok(result)
    }

    /// 局部更新监控设置，返回服务端的完整设置
    pub async fn update_monitoring_settings(
        &self,
        request: &MonitoringSettingsRequest,
    ) -> Result<MonitoringSettings> {
        let endpoints = &self.client.get_config().endpoints;
        let endpoint = Endpoint::patch(&endpoints.monitoring_settings).json(request)?;

        run_catching_envelope(self.client.call(endpoint)).await
    }

    /// 获取指定日期范围内的 Proxmox 备份
    pub async fn get_proxmox_backups(&self, from: &str, to: &str) -> Result<ProxmoxBackupsResponse> {
        let endpoints = &self.client.get_config().endpoints;
        let endpoint = Endpoint::get(&endpoints.proxmox_backups)
            .query(query::FROM, from)
            .query(query::TO, to);

        run_catching_envelope(self.client.call(endpoint)).await
    }
}
