//! 客户端配置

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// 默认服务器地址
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// 默认请求超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 服务器 URL
    pub base_url: String,
    /// 请求超时（秒）
    pub timeout: u64,
    /// 是否验证 TLS 证书
    pub verify_tls: bool,
    /// 本地凭据目录（token 与用户信息缓存）
    pub state_dir: PathBuf,
    /// 下载文件保存目录
    pub download_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            verify_tls: true,
            state_dir: PathBuf::from("."),
            download_dir: PathBuf::from("."),
        }
    }
}

impl ClientConfig {
    /// 从环境变量加载配置（先读取 `.env`）
    ///
    /// - `API_BASE_URL`：服务器地址
    /// - `API_TIMEOUT_SECS`：请求超时
    /// - `API_STATE_DIR`：凭据目录
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(url) = std::env::var("API_BASE_URL") {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }

        if let Ok(raw) = std::env::var("API_TIMEOUT_SECS") {
            match parse_timeout(&raw) {
                Some(secs) => config.timeout = secs,
                None => warn!("Ignoring invalid API_TIMEOUT_SECS: {}", raw),
            }
        }

        if let Ok(dir) = std::env::var("API_STATE_DIR") {
            config.state_dir = PathBuf::from(dir);
        }

        config
    }

    /// 设置服务器地址
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// 去掉末尾斜杠的服务器地址
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// 超时秒数必须为正整数
fn parse_timeout(raw: &str) -> Option<u64> {
    raw.trim().parse().ok().filter(|secs| *secs > 0)
}
