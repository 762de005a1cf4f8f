//! 本地凭据存储
//!
//! token 存放在固定键 `token` 下；用户信息缓存为可选的 JSON 数据。
//! - [`FileTokenStore`]：持久化到目录（"记住我"）
//! - [`MemoryTokenStore`]：仅存于进程内存（会话级）

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::UserProfile;

/// token 存储键
pub const TOKEN_KEY: &str = "token";

/// 用户信息缓存键
pub const USER_INFO_KEY: &str = "user_info.json";

/// 凭据存储
pub trait TokenStore: Send + Sync {
    fn load_token(&self) -> Option<String>;
    fn save_token(&self, token: &str) -> Result<()>;
    fn load_user(&self) -> Option<UserProfile>;
    fn save_user(&self, user: &UserProfile) -> Result<()>;
    /// 清除 token 与用户信息缓存
    fn clear(&self) -> Result<()>;
}

/// 文件存储
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_KEY)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_INFO_KEY)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn remove(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load_token(&self) -> Option<String> {
        let token = std::fs::read_to_string(self.token_path()).ok()?;
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn save_token(&self, token: &str) -> Result<()> {
        debug!("Persisting token to {:?}", self.token_path());
        self.write(&self.token_path(), token.as_bytes())
    }

    fn load_user(&self) -> Option<UserProfile> {
        let raw = std::fs::read(self.user_path()).ok()?;
        match serde_json::from_slice(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Ignoring corrupt user cache: {}", e);
                None
            }
        }
    }

    fn save_user(&self, user: &UserProfile) -> Result<()> {
        let raw = serde_json::to_vec(user).map_err(|e| Error::Storage(e.to_string()))?;
        self.write(&self.user_path(), &raw)
    }

    fn clear(&self) -> Result<()> {
        Self::remove(&self.token_path())?;
        Self::remove(&self.user_path())
    }
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
    user: Mutex<Option<UserProfile>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load_token(&self) -> Option<String> {
        self.token.lock().ok()?.clone()
    }

    fn save_token(&self, token: &str) -> Result<()> {
        let mut slot = self
            .token
            .lock()
            .map_err(|e| Error::Storage(e.to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn load_user(&self) -> Option<UserProfile> {
        self.user.lock().ok()?.clone()
    }

    fn save_user(&self, user: &UserProfile) -> Result<()> {
        let mut slot = self.user.lock().map_err(|e| Error::Storage(e.to_string()))?;
        *slot = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.token
            .lock()
            .map_err(|e| Error::Storage(e.to_string()))?
            .take();
        self.user.lock().map_err(|e| Error::Storage(e.to_string()))?.take();
        Ok(())
    }
}
