//! 统一错误模型
//! 定义客户端所有错误类型，以及转换为用户可见文本的规则

use thiserror::Error;

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// 网络失败时展示给用户的通用提示
pub const GENERIC_RETRY_MESSAGE: &str = "An error occurred. Please try again.";

/// 未登录时展示给用户的提示
pub const AUTHORIZATION_MISSING_MESSAGE: &str =
    "Authorization token not found. Please log in again.";

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 需要会话的操作在未登录时被触发
    #[error("Authorization missing")]
    AuthorizationMissing,

    /// 必填字段为空，在发起网络请求前拦截
    #[error("Validation error: {0}")]
    Validation(String),

    /// 服务端返回非 2xx
    #[error("Remote rejected request with status {status}")]
    RemoteRejected {
        status: u16,
        message: Option<String>,
    },

    /// 传输层失败（无响应、超时或响应体无法解析）
    #[error("Network failure: {0}")]
    Network(String),

    /// 持久化存储读写失败
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// 同一工作流已有请求在途
    #[error("A submission is already in progress")]
    Busy,
}

impl AppError {
    pub fn validation(msg: &str) -> Self {
        AppError::Validation(msg.to_string())
    }

    pub fn network(msg: &str) -> Self {
        AppError::Network(msg.to_string())
    }

    pub fn persistence(msg: &str) -> Self {
        AppError::Persistence(msg.to_string())
    }

    /// 服务端拒绝时附带的原始消息
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            AppError::RemoteRejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// 获取用户友好的错误消息
    ///
    /// `fallback` 用于服务端拒绝但未给出消息的情况，各工作流有各自的默认文案。
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::AuthorizationMissing => AUTHORIZATION_MISSING_MESSAGE.to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::RemoteRejected { message, .. } => message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(fallback)
                .to_string(),
            AppError::Network(_) => GENERIC_RETRY_MESSAGE.to_string(),
            AppError::Busy => "Please wait for the current request to finish.".to_string(),
            // 持久化与配置错误不直接展示给用户
            AppError::Persistence(_) | AppError::Config(_) => GENERIC_RETRY_MESSAGE.to_string(),
        }
    }

    /// 是否属于网络层失败
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::Network(_))
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 从 validator::ValidationErrors 转换，只保留首个出错字段（按字段名排序）
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let errors = e.field_errors();
        let mut fields: Vec<_> = errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        let message = fields.first().map(|(field, errs)| {
            errs.iter()
                .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("{} is required", field))
        });

        AppError::Validation(message.unwrap_or_else(|| "Invalid input".to_string()))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Network(format!("request timed out: {}", e))
        } else if e.is_decode() {
            AppError::Network(format!("invalid response body: {}", e))
        } else {
            AppError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Persistence(e.to_string())
    }
}
