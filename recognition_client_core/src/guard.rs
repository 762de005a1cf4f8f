//! 路由守卫与路由器
//!
//! 流程：解析 -> 守卫 -> (重定向则对新目标重新守卫) -> 提交。
//! 只有最终通过守卫的路径会提交给 [`Navigator`]，被拒绝的目标页面不会成为当前页。
//!
//! 这里的角色判断只影响界面跳转，真正的权限校验在服务端。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::navigation::{Navigator, LOGIN_PATH};
use crate::notify::Notifier;
use crate::routes::{Resolution, RouteMeta, RouteTable};
use crate::session::{Session, SessionContext, USER_HOME};

/// VIP 页面拦截提示
pub const VIP_ONLY_WARNING: &str = "this feature is for VIP users only";

/// 已登录用户不应停留的认证页
pub const AUTH_PAGES: [&str; 3] = ["/login", "/register", "/forgot-password"];

/// 单次导航最多跟随的重定向次数
const MAX_REDIRECTS: usize = 8;

/// 重定向原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    NotAuthenticated,
    VipRequired,
    AlreadyAuthenticated,
}

/// 守卫结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect {
        to: &'static str,
        reason: RedirectReason,
    },
}

/// 路由守卫
#[derive(Clone)]
pub struct RouteGuard {
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl RouteGuard {
    pub fn new(notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self { notifier, navigator }
    }

    /// **核心守卫逻辑**
    ///
    /// 标题总是先设置；之后按顺序命中第一条规则即返回。
    pub fn before_each(&self, target_path: &str, meta: &RouteMeta, session: &Session) -> GuardDecision {
        if let Some(title) = meta.title {
            self.navigator.set_title(title);
        }

        if meta.requires_auth && !session.is_logged_in {
            debug!("[Guard] {} requires login", target_path);
            return GuardDecision::Redirect {
                to: LOGIN_PATH,
                reason: RedirectReason::NotAuthenticated,
            };
        }

        if meta.requires_vip && !(session.is_vip() || session.is_admin()) {
            self.notifier.warning(VIP_ONLY_WARNING);
            return GuardDecision::Redirect {
                to: USER_HOME,
                reason: RedirectReason::VipRequired,
            };
        }

        if AUTH_PAGES.contains(&target_path) && session.is_logged_in {
            return GuardDecision::Redirect {
                to: session.landing_path(),
                reason: RedirectReason::AlreadyAuthenticated,
            };
        }

        GuardDecision::Proceed
    }
}

/// 导航结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// 最终提交的路径
    pub path: String,
    /// 最终路由名称
    pub route: Option<&'static str>,
    /// 是否发生过重定向
    pub redirected: bool,
}

/// 路由器
#[derive(Clone)]
pub struct Router {
    table: Arc<RouteTable>,
    guard: RouteGuard,
    session: SessionContext,
    navigator: Arc<dyn Navigator>,
}

impl Router {
    pub fn new(
        table: RouteTable,
        session: SessionContext,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            table: Arc::new(table),
            guard: RouteGuard::new(notifier, navigator.clone()),
            session,
            navigator,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// 导航到指定路径
    ///
    /// 重定向超过上限时提交会话对应的首页（未登录则为登录页），该回退不经过守卫。
    pub async fn navigate(&self, path: &str) -> NavigationOutcome {
        let session = self.session.snapshot().await;
        let mut target = path.to_string();
        let mut redirected = false;

        for _ in 0..MAX_REDIRECTS {
            let matched = match self.table.resolve(&target) {
                Resolution::Redirect(to) => {
                    target = to.to_string();
                    redirected = true;
                    continue;
                }
                Resolution::Route(matched) => matched,
            };

            // 用路由模式判断，`/login/` 与 `/login` 等价
            match self.guard.before_each(matched.record.path, &matched.record.meta, &session) {
                GuardDecision::Proceed => {
                    self.navigator.push(&target);
                    return NavigationOutcome {
                        path: target,
                        route: Some(matched.record.name),
                        redirected,
                    };
                }
                GuardDecision::Redirect { to, reason } => {
                    debug!("[Router] {} -> {} ({:?})", target, to, reason);
                    target = to.to_string();
                    redirected = true;
                }
            }
        }

        warn!("[Router] Too many redirects while navigating to {}", path);
        let fallback = if session.is_logged_in {
            session.landing_path()
        } else {
            LOGIN_PATH
        };
        let route = match self.table.resolve(fallback) {
            Resolution::Route(matched) => {
                if let Some(title) = matched.record.meta.title {
                    self.navigator.set_title(title);
                }
                Some(matched.record.name)
            }
            Resolution::Redirect(_) => None,
        };
        self.navigator.push(fallback);
        NavigationOutcome {
            path: fallback.to_string(),
            route,
            redirected: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{MemoryNavigator, MockNavigator};
    use crate::routes::RouteRecord;
    use crate::notify::MockNotifier;
    use crate::session::ADMIN_HOME;
    use crate::types::{Role, UserProfile};
    use mockall::predicate::eq;

    fn logged_in(role: Role) -> Session {
        Session {
            token: "tok".to_string(),
            user: Some(UserProfile {
                id: 9,
                username: "erin".to_string(),
                nickname: None,
                email: None,
                phone: None,
                avatar: None,
                role,
                vip_level: None,
                vip_expire_time: None,
            }),
            is_logged_in: true,
        }
    }

    fn quiet_navigator() -> Arc<MockNavigator> {
        let mut nav = MockNavigator::new();
        nav.expect_set_title().return_const(());
        Arc::new(nav)
    }

    fn meta(requires_auth: bool, requires_vip: bool) -> RouteMeta {
        RouteMeta {
            title: Some("页面"),
            requires_auth,
            requires_vip,
        }
    }

    #[test]
    fn test_requires_auth_without_session_redirects_to_login() {
        let guard = RouteGuard::new(Arc::new(MockNotifier::new()), quiet_navigator());
        let decision = guard.before_each("/user/history", &meta(true, false), &Session::default());
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/login",
                reason: RedirectReason::NotAuthenticated
            }
        );
    }

    #[test]
    fn test_user_on_vip_route_is_warned_and_redirected() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_warning()
            .with(eq(VIP_ONLY_WARNING))
            .times(1)
            .return_const(());
        let guard = RouteGuard::new(Arc::new(notifier), quiet_navigator());

        let decision = guard.before_each("/user/ai-training", &meta(true, true), &logged_in(Role::User));
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: USER_HOME,
                reason: RedirectReason::VipRequired
            }
        );
    }

    #[test]
    fn test_admin_and_vip_pass_vip_route() {
        let guard = RouteGuard::new(Arc::new(MockNotifier::new()), quiet_navigator());
        for role in [Role::Admin, Role::Vip] {
            let decision = guard.before_each("/user/ai-training", &meta(true, true), &logged_in(role));
            assert_eq!(decision, GuardDecision::Proceed);
        }
    }

    #[test]
    fn test_logged_in_users_leave_auth_pages() {
        let guard = RouteGuard::new(Arc::new(MockNotifier::new()), quiet_navigator());
        let public = meta(false, false);

        for page in AUTH_PAGES {
            let admin = guard.before_each(page, &public, &logged_in(Role::Admin));
            let user = guard.before_each(page, &public, &logged_in(Role::User));
            assert!(matches!(admin, GuardDecision::Redirect { to: ADMIN_HOME, .. }));
            assert!(matches!(user, GuardDecision::Redirect { to: USER_HOME, .. }));
        }

        assert_eq!(
            guard.before_each("/login", &public, &Session::default()),
            GuardDecision::Proceed
        );
    }

    #[test]
    fn test_title_is_set_even_when_redirecting() {
        let mut nav = MockNavigator::new();
        nav.expect_set_title()
            .with(eq("页面"))
            .times(1)
            .return_const(());
        let guard = RouteGuard::new(Arc::new(MockNotifier::new()), Arc::new(nav));
        guard.before_each("/dashboard", &meta(true, false), &Session::default());
    }

    async fn router_with(session: Option<Session>) -> (Router, Arc<MemoryNavigator>) {
        let ctx = SessionContext::in_memory();
        if let Some(session) = session {
            ctx.login(&session.token, session.user, false).await.unwrap();
        }
        let navigator = Arc::new(MemoryNavigator::new());
        let mut notifier = MockNotifier::new();
        notifier.expect_warning().return_const(());
        let router = Router::new(RouteTable::standard(), ctx, Arc::new(notifier), navigator.clone());
        (router, navigator)
    }

    #[tokio::test]
    async fn test_vip_target_never_committed_for_user() {
        let (router, nav) = router_with(Some(logged_in(Role::User))).await;
        let outcome = router.navigate("/user/advanced-recognition").await;

        assert_eq!(outcome.path, USER_HOME);
        assert_eq!(outcome.route, Some("UserDashboard"));
        assert!(outcome.redirected);
        assert!(!nav.history().iter().any(|p| p == "/user/advanced-recognition"));
        assert_eq!(nav.title().as_deref(), Some("用户首页 - 智能图像识别系统"));
    }

    #[tokio::test]
    async fn test_admin_reaches_vip_route() {
        let (router, nav) = router_with(Some(logged_in(Role::Admin))).await;
        let outcome = router.navigate("/user/advanced-recognition").await;
        assert_eq!(outcome.path, "/user/advanced-recognition");
        assert!(!outcome.redirected);
        assert_eq!(nav.current_path(), "/user/advanced-recognition");
    }

    #[tokio::test]
    async fn test_anonymous_is_sent_to_login() {
        let (router, nav) = router_with(None).await;
        let outcome = router.navigate("/user/community/post/12").await;
        assert_eq!(outcome.path, "/login");
        assert_eq!(nav.current_path(), "/login");
        assert_eq!(nav.title().as_deref(), Some("登录 - 智能图像识别系统"));
    }

    #[tokio::test]
    async fn test_admin_on_login_goes_to_dashboard() {
        let (router, _) = router_with(Some(logged_in(Role::Admin))).await;
        assert_eq!(router.navigate("/login").await.path, "/dashboard");

        let (router, _) = router_with(Some(logged_in(Role::User))).await;
        assert_eq!(router.navigate("/login?redirect=%2Fx").await.path, "/user/dashboard");
    }

    #[tokio::test]
    async fn test_trailing_slash_auth_page_still_redirects() {
        let (router, nav) = router_with(Some(logged_in(Role::Admin))).await;
        let outcome = router.navigate("/login/").await;
        assert_eq!(outcome.path, "/dashboard");
        assert!(outcome.redirected);
        assert!(!nav.history().iter().any(|p| p.starts_with("/login")));

        let (router, _) = router_with(Some(logged_in(Role::User))).await;
        assert_eq!(router.navigate("/register/").await.path, "/user/dashboard");

        let (router, nav) = router_with(None).await;
        assert_eq!(router.navigate("/login/").await.path, "/login/");
        assert_eq!(nav.title().as_deref(), Some("登录 - 智能图像识别系统"));
    }

    fn looping_table() -> RouteTable {
        let guarded = RouteMeta {
            title: Some("循环页"),
            requires_auth: true,
            requires_vip: true,
        };
        RouteTable::new(vec![
            RouteRecord {
                path: "/login",
                name: "Login",
                meta: RouteMeta {
                    title: Some("登录"),
                    requires_auth: true,
                    requires_vip: false,
                },
            },
            RouteRecord {
                path: USER_HOME,
                name: "UserDashboard",
                meta: RouteMeta {
                    title: Some("用户首页"),
                    ..guarded
                },
            },
        ])
    }

    fn looping_router(ctx: SessionContext) -> (Router, Arc<MemoryNavigator>) {
        let navigator = Arc::new(MemoryNavigator::new());
        let mut notifier = MockNotifier::new();
        notifier.expect_warning().return_const(());
        let router = Router::new(looping_table(), ctx, Arc::new(notifier), navigator.clone());
        (router, navigator)
    }

    #[tokio::test]
    async fn test_redirect_loop_falls_back_by_session() {
        let (router, nav) = looping_router(SessionContext::in_memory());
        let outcome = router.navigate("/login").await;
        assert_eq!(outcome.path, "/login");
        assert_eq!(outcome.route, Some("Login"));
        assert_eq!(nav.title().as_deref(), Some("登录"));

        let ctx = SessionContext::in_memory();
        let user = logged_in(Role::User);
        ctx.login(&user.token, user.user, false).await.unwrap();
        let (router, nav) = looping_router(ctx);
        let outcome = router.navigate(USER_HOME).await;
        assert_eq!(outcome.path, USER_HOME);
        assert_eq!(outcome.route, Some("UserDashboard"));
        assert_eq!(nav.current_path(), USER_HOME);
        assert_eq!(nav.title().as_deref(), Some("用户首页"));
    }
}
