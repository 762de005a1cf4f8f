//! 会话上下文
//!
//! 应用启动时显式创建一个 [`SessionContext`]，再注入到 [`ApiClient`](crate::ApiClient)
//! 与 [`Router`](crate::Router)。请求发出时读取 token，路由守卫读取登录态与角色。
//!
//! 不变式：`is_logged_in` 当且仅当 token 非空且用户信息获取未失败。

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::Result;
use crate::storage::{MemoryTokenStore, TokenStore};
use crate::types::{Role, UserProfile};

/// 管理员首页
pub const ADMIN_HOME: &str = "/dashboard";

/// 用户首页
pub const USER_HOME: &str = "/user/dashboard";

/// 会话信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: Option<UserProfile>,
    pub is_logged_in: bool,
}

impl Session {
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().map_or(false, UserProfile::is_admin)
    }

    pub fn is_vip(&self) -> bool {
        self.user.as_ref().map_or(false, UserProfile::is_vip)
    }

    /// 按角色选择登录后的落地页
    pub fn landing_path(&self) -> &'static str {
        if self.is_admin() {
            ADMIN_HOME
        } else {
            USER_HOME
        }
    }
}

#[derive(Debug, Default)]
struct State {
    session: Session,
    /// token 是否写入持久化存储
    remember: bool,
}

/// 会话上下文（可克隆，克隆共享同一状态）
#[derive(Clone)]
pub struct SessionContext {
    state: Arc<RwLock<State>>,
    persistent: Arc<dyn TokenStore>,
    volatile: Arc<MemoryTokenStore>,
}

impl SessionContext {
    /// 创建会话上下文，`persistent` 用于"记住我"
    pub fn new(persistent: Arc<dyn TokenStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            persistent,
            volatile: Arc::new(MemoryTokenStore::new()),
        }
    }

    /// 不落盘的会话上下文
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// 当前会话快照
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.session.clone()
    }

    /// 当前 token（为空时返回 `None`）
    pub async fn token(&self) -> Option<String> {
        let state = self.state.read().await;
        (!state.session.token.is_empty()).then(|| state.session.token.clone())
    }

    pub async fn is_logged_in(&self) -> bool {
        self.state.read().await.session.is_logged_in
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.state.read().await.session.user.clone()
    }

    fn store(&self, remember: bool) -> &dyn TokenStore {
        if remember {
            self.persistent.as_ref()
        } else {
            self.volatile.as_ref()
        }
    }

    /// 从存储恢复 token（启动时调用）
    ///
    /// 返回是否恢复到 token；用户信息需随后获取。
    pub async fn rehydrate(&self) -> bool {
        let (token, remember) = match self.volatile.load_token() {
            Some(token) => (token, false),
            None => match self.persistent.load_token() {
                Some(token) => (token, true),
                None => return false,
            },
        };

        let cached_user = self.store(remember).load_user();
        let mut state = self.state.write().await;
        state.session = Session {
            token,
            user: cached_user,
            is_logged_in: true,
        };
        state.remember = remember;
        info!("Session restored from storage");
        true
    }

    /// 登录成功后保存会话
    pub async fn login(&self, token: &str, user: Option<UserProfile>, remember: bool) -> Result<()> {
        let mut state = self.state.write().await;

        // 切换存储位置时清理另一处
        let stale = self.store(!remember);
        if let Err(e) = stale.clear() {
            warn!("Failed to clear stale credentials: {}", e);
        }

        let store = self.store(remember);
        store.save_token(token)?;
        if let Some(user) = &user {
            store.save_user(user)?;
        }

        state.session = Session {
            token: token.to_string(),
            user,
            is_logged_in: !token.is_empty(),
        };
        state.remember = remember;
        info!("Session established");
        Ok(())
    }

    /// 更新 token（刷新后调用），存储位置保持不变
    pub async fn update_token(&self, token: &str) -> Result<()> {
        let mut state = self.state.write().await;
        self.store(state.remember).save_token(token)?;
        state.session.token = token.to_string();
        state.session.is_logged_in = !token.is_empty();
        Ok(())
    }

    /// 用户信息获取成功
    pub async fn set_user(&self, user: UserProfile) -> Result<()> {
        let mut state = self.state.write().await;
        if state.session.token.is_empty() {
            // 已登出，丢弃迟到的用户信息
            return Ok(());
        }
        self.store(state.remember).save_user(&user)?;
        state.session.user = Some(user);
        state.session.is_logged_in = true;
        Ok(())
    }

    /// 用户信息获取失败：会话失效
    pub async fn profile_fetch_failed(&self) {
        warn!("Profile fetch failed, dropping session");
        self.clear().await;
    }

    /// 清除会话与所有存储（登出或 401）
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        for store in [self.volatile.as_ref() as &dyn TokenStore, self.persistent.as_ref()] {
            if let Err(e) = store.clear() {
                warn!("Failed to clear stored credentials: {}", e);
            }
        }
        state.session = Session::default();
        state.remember = false;
    }
}
