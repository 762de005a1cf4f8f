//! 认证接口

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{OperationResult, UserProfile};

const AUTH_PREFIX: &str = "/api/v1/auth";

/// 登录请求
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha: Option<String>,
    pub remember_me: bool,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            ..Default::default()
        }
    }
}

/// 登录 / 刷新 / 第三方登录响应
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// 注册请求
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// 找回密码
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub email_code: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// 邮箱验证码用途
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailCodeType {
    Register,
    ResetPassword,
    BindEmail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenValidation {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsCodeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub expire_seconds: Option<u64>,
}

/// 第三方登录平台
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Github,
    Gitee,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Github => "github",
            OAuthProvider::Gitee => "gitee",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthUrl {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthBinding {
    pub provider: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bind_time: Option<String>,
}

/// 认证接口
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn path(tail: &str) -> String {
        format!("{}{}", AUTH_PREFIX, tail)
    }

    /// 登录并建立会话
    ///
    /// 响应未携带用户信息时再请求一次 `/api/v1/user/profile`。
    /// `remember` 决定 token 是否写入持久化存储。
    pub async fn login(&self, request: &LoginRequest, remember: bool) -> Result<LoginResponse> {
        info!("Logging in user: {}", request.username);

        let mut response: LoginResponse = self.client.post(&Self::path("/login"), request).await?;
        self.client
            .session()
            .login(&response.token, response.user.clone(), remember)
            .await?;

        if response.user.is_none() {
            match self.client.user().profile().await {
                Ok(profile) => {
                    self.client.session().set_user(profile.clone()).await?;
                    response.user = Some(profile);
                }
                Err(e) => {
                    self.client.session().profile_fetch_failed().await;
                    return Err(e);
                }
            }
        }

        info!("User logged in successfully");
        Ok(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        info!("Registering user: {}", request.username);
        self.client.post(&Self::path("/register"), request).await
    }

    /// 登出；服务端请求失败时本地会话仍会清除
    pub async fn logout(&self) -> Result<()> {
        let result: Result<IgnoredAny> = self.client.post_empty(&Self::path("/logout")).await;
        if let Err(e) = &result {
            warn!("Logout request failed, but continuing anyway: {}", e);
        }

        self.client.session().clear().await;
        info!("User logged out successfully");
        Ok(())
    }

    pub async fn validate(&self) -> Result<TokenValidation> {
        self.client.get(&Self::path("/validate")).await
    }

    /// 刷新 token，之后的请求使用新 token
    pub async fn refresh_token(&self) -> Result<LoginResponse> {
        let response: LoginResponse = self.client.post_empty(&Self::path("/refresh")).await?;
        self.client.session().update_token(&response.token).await?;
        if let Some(user) = &response.user {
            self.client.session().set_user(user.clone()).await?;
        }
        Ok(response)
    }

    pub async fn send_email_code(&self, email: &str, kind: EmailCodeType) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .post(&Self::path("/email-code"), &json!({ "email": email, "type": kind }))
            .await?;
        Ok(())
    }

    pub async fn send_forgot_password_code(&self, email: &str) -> Result<()> {
        self.send_email_code(email, EmailCodeType::ResetPassword).await
    }

    pub async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<()> {
        let _: IgnoredAny = self.client.post(&Self::path("/forgot-password"), request).await?;
        Ok(())
    }

    pub async fn send_sms_code(&self, phone: &str, kind: &str) -> Result<SmsCodeResponse> {
        self.client
            .post(&Self::path("/sms-code"), &json!({ "phone": phone, "type": kind }))
            .await
    }

    pub async fn verify_sms_code(&self, phone: &str, code: &str) -> Result<bool> {
        self.client
            .post(&Self::path("/sms-code/verify"), &json!({ "phone": phone, "code": code }))
            .await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<Option<OperationResult>> {
        self.client.post(&Self::path("/change-password"), request).await
    }

    pub async fn bind_phone(&self, phone: &str, code: &str) -> Result<Option<OperationResult>> {
        self.client
            .post(&Self::path("/bind-phone"), &json!({ "phone": phone, "code": code }))
            .await
    }

    pub async fn bind_email(&self, email: &str, code: &str) -> Result<Option<OperationResult>> {
        self.client
            .post(&Self::path("/bind-email"), &json!({ "email": email, "code": code }))
            .await
    }

    /// 第三方登录（授权码换 token），成功后建立会话
    pub async fn oauth_login(&self, provider: OAuthProvider, code: &str, remember: bool) -> Result<LoginResponse> {
        let path = Self::path(&format!("/oauth/{}", provider.as_str()));
        let response: LoginResponse = self.client.post(&path, &json!({ "code": code })).await?;
        self.client
            .session()
            .login(&response.token, response.user.clone(), remember)
            .await?;
        Ok(response)
    }

    pub async fn oauth_url(&self, provider: OAuthProvider) -> Result<String> {
        let path = Self::path(&format!("/oauth/{}/url", provider.as_str()));
        let url: OAuthUrl = self.client.get(&path).await?;
        Ok(url.url)
    }

    pub async fn oauth_unbind(&self, provider: OAuthProvider) -> Result<Option<OperationResult>> {
        let path = Self::path(&format!("/oauth/{}/unbind", provider.as_str()));
        self.client.delete(&path).await
    }

    pub async fn oauth_bindings(&self) -> Result<Vec<OAuthBinding>> {
        self.client.get(&Self::path("/oauth/bindings")).await
    }

    /// 验证码图片地址，`t` 参数避免缓存
    pub fn captcha_url(&self) -> String {
        let t = chrono::Utc::now().timestamp_millis();
        format!("{}?t={}", self.client.url(&Self::path("/captcha")), t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_wire_format() {
        let req = LoginRequest {
            remember_me: true,
            ..LoginRequest::new("alice", "secret")
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["username"], "alice");
        assert_eq!(value["rememberMe"], true);
        assert!(value.get("captcha").is_none());
    }

    #[test]
    fn test_email_code_type_wire_names() {
        assert_eq!(serde_json::to_value(EmailCodeType::ResetPassword).unwrap(), "reset_password");
        assert_eq!(serde_json::to_value(EmailCodeType::BindEmail).unwrap(), "bind_email");
    }

    #[test]
    fn test_captcha_url() {
        let client = ApiClient::with_server_url("http://localhost:8080").unwrap();
        let url = client.auth().captcha_url();
        assert!(url.starts_with("http://localhost:8080/api/v1/auth/captcha?t="));
    }
}
