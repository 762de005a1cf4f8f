//! 导航抽象
//!
//! [`Navigator`] 表示"当前页面"：路径、跳转和标题。
//! 请求客户端在 401 时通过它跳转登录页，路由器通过它提交导航结果。

use std::sync::Mutex;

use reqwest::Url;

/// 登录页路径
pub const LOGIN_PATH: &str = "/login";

/// 导航器
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// 当前完整路径（含查询串）
    fn current_path(&self) -> String;
    /// 跳转
    fn push(&self, path: &str);
    /// 设置页面标题
    fn set_title(&self, title: &str);
}

/// 去掉查询串与锚点
pub fn path_only(full: &str) -> &str {
    full.split(['?', '#']).next().unwrap_or(full)
}

/// 构造 `/login?redirect=<current>`
pub fn login_redirect(current: &str) -> String {
    // 借助 Url 做查询参数编码，主机部分不会出现在结果里
    match Url::parse("http://localhost/login") {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("redirect", current);
            match url.query() {
                Some(query) => format!("{}?{}", LOGIN_PATH, query),
                None => LOGIN_PATH.to_string(),
            }
        }
        Err(_) => LOGIN_PATH.to_string(),
    }
}

#[derive(Debug)]
struct NavState {
    history: Vec<String>,
    title: Option<String>,
}

/// 内存导航器（CLI 与测试使用）
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavState>,
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::starting_at("/")
    }
}

impl MemoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(path: &str) -> Self {
        Self {
            state: Mutex::new(NavState {
                history: vec![path.to_string()],
                title: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 历史记录（首项为起始路径）
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    pub fn title(&self) -> Option<String> {
        self.lock().title.clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.lock().history.last().cloned().unwrap_or_else(|| "/".to_string())
    }

    fn push(&self, path: &str) {
        self.lock().history.push(path.to_string());
    }

    fn set_title(&self, title: &str) {
        self.lock().title = Some(title.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_only() {
        assert_eq!(path_only("/login?redirect=%2Fuser"), "/login");
        assert_eq!(path_only("/user/history#top"), "/user/history");
        assert_eq!(path_only("/"), "/");
    }

    #[test]
    fn test_login_redirect_encodes_current_path() {
        assert_eq!(
            login_redirect("/user/history?page=2"),
            "/login?redirect=%2Fuser%2Fhistory%3Fpage%3D2"
        );
    }

    #[test]
    fn test_memory_navigator() {
        let nav = MemoryNavigator::starting_at("/user/dashboard");
        nav.push("/user/history");
        nav.set_title("历史记录");
        assert_eq!(nav.current_path(), "/user/history");
        assert_eq!(nav.history().len(), 2);
        assert_eq!(nav.title().as_deref(), Some("历史记录"));
    }
}
