//! 集成测试 - 连接进程内的模拟后台

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use recognition_client_core::api::recognition::RecognitionType;
use recognition_client_core::{
    ApiClient, ApiRequest, ClientConfig, Error, FilePart, FileTokenStore, MemoryNavigator, Method, Navigator,
    Notifier, RequestOptions, Role, SessionContext, TokenStore,
};
use serde_json::{json, Value};

const GOOD_TOKEN: &str = "good-token";
const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Clone, Default)]
struct Backend {
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "code": 200, "message": "success", "data": data, "timestamp": "2024-06-01T12:00:00" }))
}

async fn profile(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend.auth_headers.lock().unwrap().push(auth.clone());

    if auth.as_deref() == Some(&format!("Bearer {}", GOOD_TOKEN)) {
        ok(json!({ "id": 7, "username": "alice", "nickname": "Alice", "role": 1, "vipLevel": 1 })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": 401, "message": "token expired", "data": null })),
        )
            .into_response()
    }
}

async fn login(Json(body): Json<Value>) -> Json<Value> {
    if body["password"] == "secret" {
        ok(json!({ "token": GOOD_TOKEN }))
    } else {
        Json(json!({ "code": 400, "message": "用户名或密码错误", "data": null }))
    }
}

async fn stats() -> Json<Value> {
    ok(json!({ "total": 5, "thisMonth": 2, "averageConfidence": 0.91, "favorites": 1 }))
}

async fn business_error() -> Json<Value> {
    Json(json!({ "code": 4003, "message": "余额不足", "data": null }))
}

async fn envelope_unauthorized() -> Json<Value> {
    Json(json!({ "code": 401, "message": "login required", "data": null }))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(20)).await;
    ok(json!(true))
}

async fn slow_business_error() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(100)).await;
    Json(json!({ "code": 4003, "message": "余额不足", "data": null }))
}

async fn server_error() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

/// 回显 multipart 字段名与文件名
async fn recognize(mut multipart: Multipart) -> Json<Value> {
    let mut fields = Vec::new();
    let mut file_name = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        fields.push(field.name().unwrap_or_default().to_string());
        if let Some(name) = field.file_name() {
            file_name = Some(name.to_string());
        }
        let _ = field.bytes().await.unwrap();
    }
    ok(json!({
        "id": 1,
        "imageUrl": "/uploads/1.png",
        "imageName": file_name,
        "objectName": "猫",
        "confidence": 0.98,
        "status": 1,
        "description": fields.join(",")
    }))
}

async fn download() -> Vec<u8> {
    b"binary-content".to_vec()
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = axum::Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/user/profile", get(profile))
        .route("/api/recognition/stats", get(stats))
        .route("/api/recognition/recognize", post(recognize))
        .route("/api/test/echo-upload", post(recognize))
        .route("/api/test/business-error", get(business_error))
        .route("/api/test/envelope-401", get(envelope_unauthorized))
        .route("/api/test/slow", get(slow))
        .route("/api/test/slow-error", get(slow_business_error))
        .route("/api/test/unavailable", get(server_error))
        .route("/api/v1/files/{id}/download", get(download))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), backend)
}

#[derive(Default)]
struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}

struct Harness {
    client: ApiClient,
    backend: Backend,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<MemoryNavigator>,
}

async fn harness_at(current_path: &str) -> Harness {
    let (url, backend) = spawn_backend().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(MemoryNavigator::starting_at(current_path));
    let client = ApiClient::with_server_url(&url)
        .unwrap()
        .with_notifier(notifier.clone())
        .with_navigator(navigator.clone());
    Harness {
        client,
        backend,
        notifier,
        navigator,
    }
}

fn temp_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("recognition-it-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[tokio::test]
async fn test_health_check() {
    let h = harness_at("/").await;
    assert!(h.client.health_check().await.unwrap());
}

#[tokio::test]
async fn test_success_resolves_to_data() {
    let h = harness_at("/").await;
    let stats = h.client.recognition().stats().await.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.this_month, 2);
    assert!(h.notifier.errors().is_empty());
}

#[tokio::test]
async fn test_bearer_token_injected_when_present() {
    let h = harness_at("/").await;
    h.client.session().login(GOOD_TOKEN, None, false).await.unwrap();

    let user = h.client.user().profile().await.unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.role, Role::Vip);

    let seen = h.backend.auth_headers.lock().unwrap().clone();
    assert_eq!(seen, vec![Some(format!("Bearer {}", GOOD_TOKEN))]);
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let h = harness_at("/login").await;
    let _ = h.client.user().profile().await;
    let seen = h.backend.auth_headers.lock().unwrap().clone();
    assert_eq!(seen, vec![None]);
}

#[tokio::test]
async fn test_login_fetches_profile_when_response_has_no_user() {
    let h = harness_at("/login").await;
    let response = h
        .client
        .auth()
        .login(&recognition_client_core::api::auth::LoginRequest::new("alice", "secret"), false)
        .await
        .unwrap();

    assert_eq!(response.token, GOOD_TOKEN);
    assert_eq!(response.user.as_ref().map(|u| u.id), Some(7));
    let session = h.client.session().snapshot().await;
    assert!(session.is_logged_in);
    assert!(session.is_vip());
}

#[tokio::test]
async fn test_login_failure_is_business_error() {
    let h = harness_at("/login").await;
    let err = h
        .client
        .auth()
        .login(&recognition_client_core::api::auth::LoginRequest::new("alice", "wrong"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { code: 400, .. }));
    assert_eq!(h.notifier.errors(), vec!["用户名或密码错误".to_string()]);
    assert!(!h.client.session().is_logged_in().await);
}

#[tokio::test]
async fn test_http_401_clears_session_and_redirects_once() {
    let h = harness_at("/user/history?page=2").await;
    h.client.session().login("stale-token", None, false).await.unwrap();

    let err = h.client.user().profile().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "token expired");
    assert_eq!(h.client.session().token().await, None);
    assert_eq!(
        h.navigator.current_path(),
        "/login?redirect=%2Fuser%2Fhistory%3Fpage%3D2"
    );

    // 已在登录页，不再跳转
    let before = h.navigator.history().len();
    let _ = h.client.user().profile().await.unwrap_err();
    assert_eq!(h.navigator.history().len(), before);
}

#[tokio::test]
async fn test_envelope_401_is_handled_like_http_401() {
    let h = harness_at("/user/community").await;
    h.client.session().login(GOOD_TOKEN, None, false).await.unwrap();

    let err = h.client.get::<Value>("/api/test/envelope-401").await.unwrap_err();
    assert!(matches!(err, Error::Api { code: 401, .. }));
    assert!(!h.client.session().is_logged_in().await);
    assert_eq!(h.navigator.current_path(), "/login?redirect=%2Fuser%2Fcommunity");
}

#[tokio::test]
async fn test_business_error_notifies_unless_silent() {
    let h = harness_at("/").await;

    let err = h.client.get::<Value>("/api/test/business-error").await.unwrap_err();
    match err {
        Error::Api { code, message } => {
            assert_eq!(code, 4003);
            assert_eq!(message, "余额不足");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(h.notifier.errors(), vec!["余额不足".to_string()]);

    let request = ApiRequest::new(Method::GET, "/api/test/business-error")
        .options(RequestOptions::silent());
    assert!(h.client.send::<Value>(request).await.is_err());
    assert_eq!(h.notifier.errors().len(), 1);
}

#[tokio::test]
async fn test_without_loading_skips_counter_but_still_notifies() {
    let h = harness_at("/").await;
    let notifier = h.notifier.clone();
    let client = Arc::new(h.client);
    let visible = client.loading().subscribe();

    let task = {
        let client = client.clone();
        tokio::spawn(async move {
            let request = ApiRequest::new(Method::GET, "/api/test/slow-error")
                .options(RequestOptions::default().without_loading());
            client.send::<Value>(request).await
        })
    };

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!task.is_finished());
    assert_eq!(client.loading().count(), 0);
    assert!(!client.loading().is_visible());

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Api { code: 4003, .. }));
    assert_eq!(client.loading().count(), 0);
    assert!(!visible.has_changed().unwrap());
    assert_eq!(notifier.errors(), vec!["余额不足".to_string()]);
}

#[tokio::test]
async fn test_status_message_used_when_body_has_none() {
    let h = harness_at("/").await;
    let err = h.client.get::<Value>("/api/test/unavailable").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "service unavailable");
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    let notifier = Arc::new(RecordingNotifier::default());
    let client = ApiClient::with_server_url("http://127.0.0.1:9")
        .unwrap()
        .with_notifier(notifier.clone());

    let err = client.get::<Value>("/api/anything").await.unwrap_err();
    assert!(matches!(err, Error::Network(_) | Error::Timeout));
    assert_eq!(notifier.errors().len(), 1);
    assert_eq!(client.loading().count(), 0);
}

#[tokio::test]
async fn test_loading_counter_settles_after_concurrent_calls() {
    let h = harness_at("/").await;
    let client = Arc::new(h.client);
    let mut visible = client.loading().subscribe();

    let mut handles = Vec::new();
    for i in 0..16 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            if i % 4 == 0 {
                client.get::<Value>("/api/test/business-error").await.map(|_| ())
            } else {
                client.get::<bool>("/api/test/slow").await.map(|_| ())
            }
        }));
    }

    // 至少发生过一次显示
    visible.changed().await.unwrap();

    let mut failures = 0;
    for handle in handles {
        if handle.await.unwrap().is_err() {
            failures += 1;
        }
    }

    assert_eq!(failures, 4);
    assert_eq!(client.loading().count(), 0);
    assert!(!client.loading().is_visible());
}

#[tokio::test]
async fn test_bare_file_upload_uses_file_field() {
    let h = harness_at("/").await;
    let part = FilePart::new("cat.png", PNG_HEADER.to_vec());

    let info: recognition_client_core::api::recognition::RecognitionInfo = h
        .client
        .upload("/api/test/echo-upload", part, RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(info.description.as_deref(), Some("file"));
    assert_eq!(info.image_name.as_deref(), Some("cat.png"));
}

#[tokio::test]
async fn test_recognize_sends_type_alongside_file() {
    let h = harness_at("/").await;
    let info = h
        .client
        .recognition()
        .recognize(FilePart::new("cat.png", PNG_HEADER.to_vec()), RecognitionType::Advanced)
        .await
        .unwrap();

    assert_eq!(info.description.as_deref(), Some("file,recognitionType"));
    assert_eq!(info.label(), "猫");
    assert_eq!(h.client.image_url(&info.image_url), format!("{}/uploads/1.png", h.client.config().base()));
}

#[tokio::test]
async fn test_download_writes_raw_bytes() {
    let (url, _) = spawn_backend().await;
    let dir = temp_dir("download");
    let mut config = ClientConfig::default().with_base_url(&url);
    config.download_dir = dir.clone();
    let client = ApiClient::new(config, SessionContext::in_memory()).unwrap();

    let path = client.file().download("abc", Some("result.bin")).await.unwrap();
    assert_eq!(path, dir.join("result.bin"));
    assert_eq!(std::fs::read(&path).unwrap(), b"binary-content");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_bootstrap_restores_or_drops_stored_session() {
    let (url, _) = spawn_backend().await;

    let good_dir = temp_dir("bootstrap-good");
    FileTokenStore::new(&good_dir).save_token(GOOD_TOKEN).unwrap();
    let store = Arc::new(FileTokenStore::new(&good_dir));
    let client = ApiClient::new(ClientConfig::default().with_base_url(&url), SessionContext::new(store)).unwrap();
    assert!(client.bootstrap().await);
    assert_eq!(client.session().user().await.map(|u| u.username), Some("alice".to_string()));
    assert!(good_dir.join("user_info.json").exists());

    let bad_dir = temp_dir("bootstrap-bad");
    FileTokenStore::new(&bad_dir).save_token("expired").unwrap();
    let store = Arc::new(FileTokenStore::new(&bad_dir));
    let client = ApiClient::new(ClientConfig::default().with_base_url(&url), SessionContext::new(store.clone()))
        .unwrap()
        .with_notifier(Arc::new(RecordingNotifier::default()));
    assert!(!client.bootstrap().await);
    assert!(!client.session().is_logged_in().await);
    assert_eq!(store.load_token(), None);

    let _ = std::fs::remove_dir_all(&good_dir);
    let _ = std::fs::remove_dir_all(&bad_dir);
}

#[tokio::test]
async fn test_require_session_reports_not_authenticated() {
    let (url, _) = spawn_backend().await;

    let empty = ApiClient::new(ClientConfig::default().with_base_url(&url), SessionContext::in_memory()).unwrap();
    assert!(matches!(empty.require_session().await, Err(Error::NotAuthenticated)));

    let dir = temp_dir("require-session");
    FileTokenStore::new(&dir).save_token("expired").unwrap();
    let expired = ApiClient::new(
        ClientConfig::default().with_base_url(&url),
        SessionContext::new(Arc::new(FileTokenStore::new(&dir))),
    )
    .unwrap()
    .with_notifier(Arc::new(RecordingNotifier::default()));
    assert!(matches!(expired.require_session().await, Err(Error::NotAuthenticated)));

    FileTokenStore::new(&dir).save_token(GOOD_TOKEN).unwrap();
    let restored = ApiClient::new(
        ClientConfig::default().with_base_url(&url),
        SessionContext::new(Arc::new(FileTokenStore::new(&dir))),
    )
    .unwrap();
    let user = restored.require_session().await.unwrap();
    assert_eq!(user.username, "alice");

    let _ = std::fs::remove_dir_all(&dir);
}
