//! 智能图像识别平台客户端核心库
//!
//! 提供平台 REST API 的类型化客户端，包括：
//! - 统一请求管道（token 注入、响应解包、加载计数、401 处理）
//! - 会话上下文与 token 存储
//! - 路由表与路由守卫
//! - 各业务模块接口（认证、用户、社区、知识库、识别、管理、VIP、文件、通知）

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod guard;
pub mod loading;
pub mod navigation;
pub mod notify;
pub mod permission;
pub mod routes;
pub mod session;
pub mod storage;
pub mod types;
pub mod urls;

pub use client::{ApiClient, ApiRequest, RequestOptions};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use form::{FilePart, FileUploadConfig, FormData};
pub use guard::{GuardDecision, NavigationOutcome, RouteGuard, Router};
pub use loading::LoadingCounter;
pub use navigation::{MemoryNavigator, Navigator};
pub use notify::{Notifier, TracingNotifier};
pub use routes::{RouteMeta, RouteTable};
pub use session::{Session, SessionContext};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::*;

/// 使用的 HTTP 方法类型
pub use reqwest::Method;
