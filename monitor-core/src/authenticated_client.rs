use crate::{
    api::ApiEnvelope,
    api_config::ApiConfig,
    config::HttpConfig,
    constants::api::http,
    error::{MonitorError, Result},
};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// 令牌提供者，每次请求时调用，拿到的是当时的令牌而不是构造时的快照
pub type TokenProvider = Arc<dyn Fn() -> String + Send + Sync>;

/// 端点描述：方法、路径、查询参数和可选的JSON请求体
#[derive(Debug, Clone)]
pub struct Endpoint {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl Endpoint {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// 追加查询参数
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// 设置JSON请求体
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// 认证客户端包装器
/// 每个请求附带新的请求ID，令牌非空时附带 Bearer 认证头
#[derive(Clone)]
pub struct AuthenticatedClient {
    client: Client,
    config: ApiConfig,
    token_provider: TokenProvider,
}

impl fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl AuthenticatedClient {
    /// 创建新的认证客户端，超时在此固定，不支持按请求覆盖
    pub fn new(config: ApiConfig, http_config: &HttpConfig, token_provider: TokenProvider) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(http_config.connect_timeout_secs))
            .timeout(Duration::from_secs(http_config.request_timeout_secs))
            .user_agent(http::USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            config,
            token_provider,
        })
    }

    /// 获取当前API配置
    pub fn get_config(&self) -> &ApiConfig {
        &self.config
    }

    /// 获取当前令牌（去除首尾空白），为空时返回 None
    fn current_token(&self) -> Option<String> {
        let token = (self.token_provider)().trim().to_string();
        if token.is_empty() { None } else { Some(token) }
    }

    /// 构建请求并添加请求ID与认证头
    fn build_request(&self, endpoint: &Endpoint, request_id: &str) -> RequestBuilder {
        let url = self.config.get_endpoint_url(&endpoint.path);
        let mut request_builder = self
            .client
            .request(endpoint.method.clone(), url)
            .header(http::REQUEST_ID_HEADER, request_id);

        if !endpoint.query.is_empty() {
            request_builder = request_builder.query(&endpoint.query);
        }
        if let Some(token) = self.current_token() {
            request_builder = request_builder.bearer_auth(token);
        }
        if let Some(ref body) = endpoint.body {
            request_builder = request_builder.json(body);
        }
        request_builder
    }

    /// 执行一次请求并解码响应信封
    ///
    /// 非2xx状态时，如果响应体仍是带 error 的信封，则返回该信封，
    /// 由仓库层按业务错误处理；否则返回状态错误。
    pub async fn call<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<ApiEnvelope<T>> {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        debug!(
            "--> {} {} (request_id={})",
            endpoint.method, endpoint.path, request_id
        );

        let response = self.build_request(&endpoint, &request_id).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(
            "<-- {} {} ({}ms, {} bytes)",
            status.as_u16(),
            endpoint.path,
            started.elapsed().as_millis(),
            body.len()
        );

        if status.is_success() {
            return serde_json::from_slice(&body).map_err(|e| {
                warn!("响应解码失败: {} {} - {}", endpoint.method, endpoint.path, e);
                MonitorError::from(e)
            });
        }

        match serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&body) {
            Ok(ApiEnvelope {
                error: Some(error), ..
            }) => {
                warn!(
                    "请求失败: {} {} - {} ({})",
                    status.as_u16(),
                    endpoint.path,
                    error.code,
                    request_id
                );
                Ok(ApiEnvelope {
                    data: None,
                    error: Some(error),
                })
            }
            _ => {
                let text = String::from_utf8_lossy(&body);
                debug!("非信封错误响应体: {}", text);
                let body = truncate_body(text.trim());
                warn!("请求失败: {} {} - {}", status.as_u16(), endpoint.path, body);
                Err(MonitorError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

/// 错误页面可能是整页HTML，只保留开头部分，按字符边界截断
fn truncate_body(text: &str) -> String {
    match text.char_indices().nth(http::MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
