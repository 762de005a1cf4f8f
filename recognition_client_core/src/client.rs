//! 图像识别平台 API 客户端
//!
//! 所有接口调用都经过 [`ApiClient::send`]：
//! 注入 token、计数加载状态、解包统一响应、转换错误、处理 401。

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::form::FormData;
use crate::loading::LoadingCounter;
use crate::navigation::{login_redirect, path_only, MemoryNavigator, Navigator, LOGIN_PATH};
use crate::notify::{Notifier, TracingNotifier};
use crate::session::SessionContext;
use crate::types::{Envelope, UserProfile};
use crate::urls;

/// 健康检查路径
const HEALTH_PATH: &str = "/api/v1/health";

/// 下载默认文件名
const DEFAULT_DOWNLOAD_NAME: &str = "download";

/// 单次请求选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// 失败时是否发出错误提示
    pub show_error: bool,
    /// 是否计入全局加载状态
    pub show_loading: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            show_error: true,
            show_loading: true,
        }
    }
}

impl RequestOptions {
    /// 不提示、不计入加载状态
    pub fn silent() -> Self {
        Self {
            show_error: false,
            show_loading: false,
        }
    }

    pub fn without_error(mut self) -> Self {
        self.show_error = false;
        self
    }

    pub fn without_loading(mut self) -> Self {
        self.show_loading = false;
        self
    }
}

#[derive(Debug, Default)]
enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart(FormData),
}

/// 请求描述
#[derive(Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Body,
    options: RequestOptions,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            options: RequestOptions::default(),
        }
    }

    /// 查询参数，`None` 字段会被跳过
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        let value = serde_json::to_value(query).map_err(|e| Error::InvalidParam(e.to_string()))?;
        self.query.extend(query_pairs(value)?);
        Ok(self)
    }

    /// JSON 请求体
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| Error::InvalidParam(e.to_string()))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    /// multipart 请求体
    pub fn multipart(mut self, form: FormData) -> Self {
        self.body = Body::Multipart(form);
        self
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// 将对象展开为查询参数对
fn query_pairs(value: Value) -> Result<Vec<(String, String)>> {
    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(Error::InvalidParam(format!(
                "query must be an object, got {}",
                other
            )))
        }
    };

    let mut pairs = Vec::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((key, text));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// 错误响应体中可能带有的提示
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// 非 2xx 响应转换为错误
fn http_error(status: StatusCode, body: &[u8]) -> Error {
    let server_message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());

    let message = server_message.unwrap_or_else(|| match status.as_u16() {
        400 => "bad request parameters".to_string(),
        401 => "unauthorized, please log in again".to_string(),
        403 => "permission denied".to_string(),
        404 => "requested resource not found".to_string(),
        500 => "internal server error".to_string(),
        502 => "bad gateway".to_string(),
        503 => "service unavailable".to_string(),
        code => format!("request failed (HTTP {})", code),
    });

    Error::Http {
        status: status.as_u16(),
        message,
    }
}

/// 解包统一响应，返回 `data`
fn unwrap_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let envelope: Envelope<Value> =
        serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))?;

    if !envelope.is_success() {
        let message = if envelope.message.trim().is_empty() {
            format!("request failed (code {})", envelope.code)
        } else {
            envelope.message
        };
        return Err(Error::Api {
            code: envelope.code,
            message,
        });
    }

    serde_json::from_value(envelope.data.unwrap_or(Value::Null)).map_err(|e| Error::Decode(e.to_string()))
}

/// API 客户端
pub struct ApiClient {
    config: ClientConfig,
    http_client: Client,
    session: SessionContext,
    loading: LoadingCounter,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// 创建新的客户端实例
    pub fn new(config: ClientConfig, session: SessionContext) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            session,
            loading: LoadingCounter::new(),
            notifier: Arc::new(TracingNotifier),
            navigator: Arc::new(MemoryNavigator::new()),
        })
    }

    /// 使用默认配置与内存会话创建客户端
    pub fn with_server_url(server_url: &str) -> Result<Self> {
        let config = ClientConfig::default().with_base_url(server_url);
        Self::new(config, SessionContext::in_memory())
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn loading(&self) -> &LoadingCounter {
        &self.loading
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    pub fn navigator(&self) -> Arc<dyn Navigator> {
        self.navigator.clone()
    }

    /// 服务器相对路径转为完整 URL；完整 URL 原样返回
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.config.base(), path)
        } else {
            format!("{}/{}", self.config.base(), path)
        }
    }

    /// 图片地址补全
    pub fn image_url(&self, url: &str) -> String {
        urls::image_url(self.config.base(), url)
    }

    // ==================== 请求入口 ====================

    /// 发送请求并返回解包后的 `data`
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let options = request.options;
        self.settle(options, async move {
            let body = self.execute(request).await?;
            unwrap_envelope(&body)
        })
        .await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::new(Method::GET, path)).await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(ApiRequest::new(Method::GET, path).query(query)?).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::new(Method::POST, path).json(body)?).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::new(Method::POST, path)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::new(Method::PUT, path).json(body)?).await
    }

    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::new(Method::PUT, path)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::new(Method::DELETE, path)).await
    }

    pub async fn delete_with_body<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::new(Method::DELETE, path).json(body)?).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::new(Method::PATCH, path).json(body)?).await
    }

    /// 上传（multipart/form-data）
    ///
    /// 单个 [`FilePart`](crate::FilePart) 会放入字段 `file`。
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: impl Into<FormData>,
        options: RequestOptions,
    ) -> Result<T> {
        let request = ApiRequest::new(Method::POST, path)
            .multipart(payload.into())
            .options(options);
        self.send(request).await
    }

    /// 下载二进制内容到 `download_dir`，不解包统一响应
    pub async fn download(
        &self,
        path: &str,
        filename: Option<&str>,
        options: RequestOptions,
    ) -> Result<PathBuf> {
        let request = ApiRequest::new(Method::GET, path).options(options);
        self.settle(options, async move {
            let bytes = self.execute(request).await?;
            let dest = self.config.download_dir.join(download_name(filename));
            tokio::fs::create_dir_all(&self.config.download_dir).await?;
            tokio::fs::write(&dest, &bytes).await?;
            info!("Downloaded {} bytes to {:?}", bytes.len(), dest);
            Ok(dest)
        })
        .await
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .http_client
            .get(self.url(HEALTH_PATH))
            .send()
            .await
            .map_err(Error::from_transport)?;

        Ok(response.status().is_success())
    }

    /// 启动时恢复会话：读取存储的 token 并获取用户信息，失败则清除
    pub async fn bootstrap(&self) -> bool {
        if !self.session.rehydrate().await {
            return false;
        }

        match self.user().profile_with(RequestOptions::default().without_error()).await {
            Ok(profile) => match self.session.set_user(profile).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to cache user profile: {}", e);
                    true
                }
            },
            Err(e) => {
                warn!("Session restore failed: {}", e);
                self.session.profile_fetch_failed().await;
                false
            }
        }
    }

    /// 恢复会话并返回当前用户，未登录时返回 [`Error::NotAuthenticated`]
    pub async fn require_session(&self) -> Result<UserProfile> {
        if !self.bootstrap().await {
            return Err(Error::NotAuthenticated);
        }
        self.session.user().await.ok_or(Error::NotAuthenticated)
    }

    // ==================== 内部实现 ====================

    /// 加载计数与失败副作用
    async fn settle<T, F>(&self, options: RequestOptions, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _loading = options.show_loading.then(|| self.loading.begin());
        let result = fut.await;
        if let Err(err) = &result {
            self.report(err, options).await;
        }
        result
    }

    /// 发出请求，返回 2xx 响应体
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let ApiRequest {
            method,
            path,
            query,
            body,
            ..
        } = request;

        let url = self.url(&path);
        let mut builder = self.http_client.request(method.clone(), &url);

        if !query.is_empty() {
            builder = builder.query(&query);
        }

        // 每次派发时读取，刷新后的 token 只影响之后的请求
        if let Some(token) = self.session.token().await {
            builder = builder.bearer_auth(token);
        }

        builder = match body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => builder.multipart(form.into_multipart()?),
        };

        debug!("[Request] {} {}", method, path);

        let response = builder.send().await.map_err(Error::from_transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(Error::from_transport)?;

        debug!("[Response] {} {} ({} bytes)", status.as_u16(), path, bytes.len());

        if !status.is_success() {
            return Err(http_error(status, &bytes));
        }

        Ok(bytes.to_vec())
    }

    async fn report(&self, err: &Error, options: RequestOptions) {
        if err.is_unauthorized() {
            self.handle_unauthorized().await;
        }
        if options.show_error {
            self.notifier.error(&err.to_string());
        }
    }

    /// 清除会话并跳转登录页（已在登录页时不跳转）
    async fn handle_unauthorized(&self) {
        warn!("Unauthorized response, clearing session");
        self.session.clear().await;

        let current = self.navigator.current_path();
        if path_only(&current) != LOGIN_PATH {
            self.navigator.push(&login_redirect(&current));
        }
    }
}

fn download_name(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string())
}
