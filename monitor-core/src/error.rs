use crate::constants::messages;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Error, Debug)]
pub enum MonitorError {
    /// 网络、超时或TLS错误，直接展示底层描述
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// 非2xx状态且响应体不是带error的信封
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    /// 服务端在信封中返回的业务错误
    #[error("{message}")]
    Api {
        code: String,
        message: String,
        request_id: Option<String>,
    },

    #[error("{}", messages::EMPTY_RESPONSE)]
    EmptyResponse,

    /// 客户端校验失败，请求未发出
    #[error("{0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::Decode(err.to_string())
    }
}

impl MonitorError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// 界面展示用的单行消息，为空时使用调用方给出的兜底文案
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }

    /// 是否在发出请求之前就失败了
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
