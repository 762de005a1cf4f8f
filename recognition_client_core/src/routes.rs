//! 路由表
//!
//! 纯数据层：每条路由的路径、名称与元信息（标题、是否需要登录、是否需要 VIP）。
//! 子路由的元信息已与父路由合并（例如 `/user/*` 全部需要登录）。

use crate::navigation::{path_only, LOGIN_PATH};

/// 路由元信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub title: Option<&'static str>,
    pub requires_auth: bool,
    pub requires_vip: bool,
}

/// 路由定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    /// 路径模式，`:name` 段匹配任意非空段
    pub path: &'static str,
    pub name: &'static str,
    pub meta: RouteMeta,
}

/// 路径解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// 命中路由
    Route(RouteMatch<'a>),
    /// 路由表级重定向（`/` 与未知路径）
    Redirect(&'static str),
}

/// 命中的路由及路径参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub record: &'a RouteRecord,
    pub params: Vec<(&'static str, String)>,
}

impl RouteMatch<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// 路由表
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteRecord>,
    redirects: Vec<(&'static str, &'static str)>,
    fallback: Option<&'static str>,
}

const PUBLIC: RouteMeta = RouteMeta {
    title: None,
    requires_auth: false,
    requires_vip: false,
};

const AUTHED: RouteMeta = RouteMeta {
    title: None,
    requires_auth: true,
    requires_vip: false,
};

const VIP: RouteMeta = RouteMeta {
    title: None,
    requires_auth: true,
    requires_vip: true,
};

fn page(path: &'static str, name: &'static str, title: &'static str, base: RouteMeta) -> RouteRecord {
    RouteRecord {
        path,
        name,
        meta: RouteMeta {
            title: Some(title),
            ..base
        },
    }
}

impl RouteTable {
    pub fn new(routes: Vec<RouteRecord>) -> Self {
        Self {
            routes,
            redirects: Vec::new(),
            fallback: None,
        }
    }

    /// 精确路径重定向
    pub fn with_redirect(mut self, from: &'static str, to: &'static str) -> Self {
        self.redirects.push((from, to));
        self
    }

    /// 未命中任何路由时的重定向目标
    pub fn with_fallback(mut self, to: &'static str) -> Self {
        self.fallback = Some(to);
        self
    }

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    /// 应用的完整路由表
    pub fn standard() -> Self {
        let routes = vec![
            // 认证页
            page("/login", "Login", "登录 - 智能图像识别系统", PUBLIC),
            page("/register", "Register", "注册 - 智能图像识别系统", PUBLIC),
            page("/forgot-password", "ForgotPassword", "找回密码 - 智能图像识别系统", PUBLIC),
            // 管理端
            page("/dashboard", "Dashboard", "仪表板 - 智能图像识别系统", AUTHED),
            page("/users", "Users", "用户管理 - 智能图像识别系统", AUTHED),
            page("/orders", "Orders", "订单管理 - 智能图像识别系统", AUTHED),
            page("/analytics", "Analytics", "数据分析 - 智能图像识别系统", AUTHED),
            page("/settings", "Settings", "系统设置 - 智能图像识别系统", AUTHED),
            page("/posts-management", "PostsManagement", "帖子管理 - 智能图像识别系统", AUTHED),
            page("/knowledge-management", "KnowledgeManagement", "知识库管理 - 智能图像识别系统", AUTHED),
            page("/category-management", "CategoryManagement", "分类管理 - 智能图像识别系统", AUTHED),
            page("/vip-management", "VipManagement", "VIP管理 - 智能图像识别系统", AUTHED),
            page("/recognition-management", "RecognitionManagement", "识别记录管理 - 智能图像识别系统", AUTHED),
            page("/admin-profile", "AdminProfile", "管理员信息 - 智能图像识别系统", AUTHED),
            // 用户端
            page("/user/dashboard", "UserDashboard", "用户首页 - 智能图像识别系统", AUTHED),
            page("/user/recognition", "ImageRecognition", "图像识别 - 智能图像识别系统", AUTHED),
            page("/user/recognition/batch", "BatchRecognition", "批量识别 - 智能图像识别系统", AUTHED),
            page("/user/recognition/:id", "RecognitionDetail", "识别详情 - 智能图像识别系统", AUTHED),
            page("/user/history", "History", "历史记录 - 智能图像识别系统", AUTHED),
            page("/user/knowledge", "Knowledge", "知识库 - 智能图像识别系统", AUTHED),
            page("/user/knowledge/:id", "KnowledgeDetail", "知识详情 - 智能图像识别系统", AUTHED),
            page("/user/community", "Community", "社区 - 智能图像识别系统", AUTHED),
            page("/user/community/post/:id", "PostDetail", "帖子详情 - 智能图像识别系统", AUTHED),
            page("/user/profile", "UserProfile", "个人中心 - 智能图像识别系统", AUTHED),
            page("/user/favorites", "UserFavorites", "我的收藏 - 智能图像识别系统", AUTHED),
            page("/user/settings", "UserSettings", "我的设置 - 智能图像识别系统", AUTHED),
            // VIP 专享
            page("/user/advanced-recognition", "AdvancedRecognition", "高级识别 - 智能图像识别系统", VIP),
            page("/user/vip-analytics", "VipAnalytics", "VIP数据分析 - 智能图像识别系统", VIP),
            page("/user/ai-training", "AiTraining", "AI模型训练 - 智能图像识别系统", VIP),
            page("/user/api-access", "ApiAccess", "API访问管理 - 智能图像识别系统", VIP),
            // 公共页
            page("/about", "About", "关于我们 - 智能图像识别系统", PUBLIC),
            page("/contact", "Contact", "联系我们 - 智能图像识别系统", PUBLIC),
            page("/privacy", "Privacy", "隐私政策 - 智能图像识别系统", PUBLIC),
            page("/terms", "Terms", "服务条款 - 智能图像识别系统", PUBLIC),
        ];

        Self::new(routes)
            .with_redirect("/", LOGIN_PATH)
            .with_fallback(LOGIN_PATH)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RouteRecord> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// 解析路径：精确路由优先于带参数的路由
    pub fn resolve(&self, full_path: &str) -> Resolution<'_> {
        let path = normalize(path_only(full_path));

        if let Some((_, to)) = self.redirects.iter().find(|(from, _)| *from == path) {
            return Resolution::Redirect(*to);
        }

        if let Some(record) = self.routes.iter().find(|r| r.path == path) {
            return Resolution::Route(RouteMatch {
                record,
                params: Vec::new(),
            });
        }

        for record in self.routes.iter().filter(|r| r.path.contains(':')) {
            if let Some(params) = match_pattern(record.path, path) {
                return Resolution::Route(RouteMatch { record, params });
            }
        }

        match self.fallback {
            Some(to) => Resolution::Redirect(to),
            None => Resolution::Redirect(LOGIN_PATH),
        }
    }
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else if path.is_empty() {
        "/"
    } else {
        path
    }
}

fn match_pattern(pattern: &'static str, path: &str) -> Option<Vec<(&'static str, String)>> {
    let pattern_segments: Vec<&'static str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = Vec::new();
    for (expected, actual) in pattern_segments.into_iter().zip(path_segments) {
        match expected.strip_prefix(':') {
            Some(name) if !actual.is_empty() => params.push((name, actual.to_string())),
            Some(_) => return None,
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}
