//! 错误类型定义

use thiserror::Error;

/// 错误类型
///
/// `Display` 输出即面向用户的提示文本，通知组件直接展示它。
#[derive(Debug, Error)]
pub enum Error {
    /// 网络错误（连接失败等）
    #[error("Network error: {0}")]
    Network(String),

    /// 请求超时
    #[error("Request timed out, please retry later")]
    Timeout,

    /// HTTP 状态码错误（非 2xx）
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 业务错误（HTTP 200 但 code != 200）
    #[error("{message}")]
    Api { code: i32, message: String },

    /// 响应解析错误
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// 参数错误
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// 未认证错误
    #[error("Not authenticated")]
    NotAuthenticated,

    /// 本地凭据存储错误
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// 由 reqwest 传输层错误构造
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_connect() {
            Error::Network("connection failed, please check network settings".to_string())
        } else {
            Error::Network(err.to_string())
        }
    }

    /// 是否为 401（HTTP 状态或业务码）
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Error::Http { status: 401, .. } | Error::Api { code: 401, .. }
        )
    }

    /// HTTP 状态码（仅 `Http` 变体）
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 结果类型
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_detection() {
        let http = Error::Http {
            status: 401,
            message: "unauthorized".to_string(),
        };
        let api = Error::Api {
            code: 401,
            message: "token expired".to_string(),
        };
        let other = Error::Http {
            status: 403,
            message: "forbidden".to_string(),
        };

        assert!(http.is_unauthorized());
        assert!(api.is_unauthorized());
        assert!(!other.is_unauthorized());
        assert_eq!(other.status(), Some(403));
        assert_eq!(api.status(), None);
    }

    #[test]
    fn test_display_is_server_message() {
        let err = Error::Api {
            code: 4001,
            message: "用户名已存在".to_string(),
        };
        assert_eq!(err.to_string(), "用户名已存在");
    }
}
