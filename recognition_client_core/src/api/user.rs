//! 用户接口（个人信息、账号管理、VIP 生命周期）

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{ApiClient, ApiRequest, RequestOptions};
use crate::error::Result;
use crate::types::{PageResponse, Role, UserProfile};

const USER_PREFIX: &str = "/api/v1/user";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub recognition_count: i64,
    pub post_count: i64,
    pub comment_count: i64,
    pub collect_count: i64,
    pub like_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// 个人资料修改
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// 管理员创建 / 修改用户
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

/// 批量操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    Enable,
    Disable,
    Delete,
}

#[derive(Debug, Deserialize)]
struct CreatedId {
    id: i64,
}

/// 用户接口
pub struct UserApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UserApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn path(tail: &str) -> String {
        format!("{}{}", USER_PREFIX, tail)
    }

    async fn ack(&self, request: ApiRequest) -> Result<()> {
        let _: IgnoredAny = self.client.send(request).await?;
        Ok(())
    }

    // ==================== 个人 ====================

    /// 当前用户信息
    pub async fn profile(&self) -> Result<UserProfile> {
        self.profile_with(RequestOptions::default()).await
    }

    pub async fn profile_with(&self, options: RequestOptions) -> Result<UserProfile> {
        let request = ApiRequest::new(reqwest::Method::GET, Self::path("/profile")).options(options);
        self.client.send(request).await
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<()> {
        self.ack(ApiRequest::new(reqwest::Method::PUT, Self::path("/profile")).json(request)?)
            .await
    }

    pub async fn stats(&self) -> Result<UserStats> {
        self.client.get(&Self::path("/stats")).await
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        let body = json!({ "oldPassword": old_password, "newPassword": new_password });
        self.ack(ApiRequest::new(reqwest::Method::PUT, Self::path("/password")).json(&body)?)
            .await
    }

    /// 个人设置（结构由服务端决定）
    pub async fn settings(&self) -> Result<Value> {
        self.client.get(&Self::path("/settings")).await
    }

    pub async fn update_settings(&self, settings: &Value) -> Result<()> {
        self.ack(ApiRequest::new(reqwest::Method::PUT, Self::path("/settings")).json(settings)?)
            .await
    }

    pub async fn activities(&self, limit: u32) -> Result<Vec<UserActivity>> {
        self.client
            .get_query(&Self::path("/activities"), &json!({ "limit": limit }))
            .await
    }

    // ==================== 管理 ====================

    pub async fn list(&self, query: &UserQuery) -> Result<PageResponse<UserProfile>> {
        self.client.get_query(&Self::path("/list"), query).await
    }

    pub async fn search(&self, keyword: &str, page: u32, size: u32) -> Result<PageResponse<UserProfile>> {
        let query = json!({ "keyword": keyword, "page": page, "size": size });
        self.client.get_query(&Self::path("/search"), &query).await
    }

    pub async fn get(&self, id: i64) -> Result<UserProfile> {
        self.client.get(&Self::path(&format!("/{}", id))).await
    }

    /// 返回新用户 ID
    pub async fn create(&self, form: &UserForm) -> Result<i64> {
        let created: CreatedId = self.client.post(&Self::path("/create"), form).await?;
        Ok(created.id)
    }

    pub async fn update(&self, id: i64, form: &UserForm) -> Result<()> {
        self.ack(ApiRequest::new(reqwest::Method::PUT, Self::path(&format!("/{}", id))).json(form)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.ack(ApiRequest::new(reqwest::Method::DELETE, Self::path(&format!("/{}", id))))
            .await
    }

    pub async fn set_status(&self, id: i64, status: i32) -> Result<()> {
        let path = Self::path(&format!("/{}/status", id));
        self.ack(ApiRequest::new(reqwest::Method::PUT, path).json(&json!({ "status": status }))?)
            .await
    }

    pub async fn reset_password(&self, id: i64, new_password: &str) -> Result<()> {
        let path = Self::path(&format!("/{}/password", id));
        let body = json!({ "newPassword": new_password });
        self.ack(ApiRequest::new(reqwest::Method::PUT, path).json(&body)?).await
    }

    pub async fn batch(&self, user_ids: &[i64], action: BatchAction) -> Result<()> {
        let body = json!({ "userIds": user_ids, "action": action });
        self.ack(ApiRequest::new(reqwest::Method::POST, Self::path("/batch")).json(&body)?)
            .await
    }

    pub async fn overview(&self) -> Result<Value> {
        self.client.get(&Self::path("/overview")).await
    }

    // ==================== VIP 生命周期 ====================

    pub async fn vip_list(&self, query: &UserQuery) -> Result<PageResponse<UserProfile>> {
        self.client.get_query(&Self::path("/vip/list"), query).await
    }

    pub async fn vip_stats(&self) -> Result<Value> {
        self.client.get(&Self::path("/vip/stats")).await
    }

    pub async fn extend_vip(&self, id: i64, days: u32, reason: Option<&str>) -> Result<()> {
        self.vip_action(id, "extend", json!({ "days": days, "reason": reason }))
            .await
    }

    pub async fn upgrade_vip(&self, id: i64, new_level: i32, reason: Option<&str>) -> Result<()> {
        self.vip_action(id, "upgrade", json!({ "newLevel": new_level, "reason": reason }))
            .await
    }

    pub async fn downgrade_vip(&self, id: i64, new_level: i32, reason: Option<&str>) -> Result<()> {
        self.vip_action(id, "downgrade", json!({ "newLevel": new_level, "reason": reason }))
            .await
    }

    pub async fn toggle_vip(&self, id: i64, status: &str, reason: Option<&str>) -> Result<()> {
        self.vip_action(id, "toggle", json!({ "status": status, "reason": reason }))
            .await
    }

    pub async fn reset_vip_usage(&self, id: i64, reset_type: &str, reason: Option<&str>) -> Result<()> {
        self.vip_action(id, "reset-usage", json!({ "resetType": reset_type, "reason": reason }))
            .await
    }

    pub async fn revoke_vip(&self, id: i64, reason: Option<&str>) -> Result<()> {
        let path = Self::path(&format!("/vip/{}/revoke", id));
        let request = ApiRequest::new(reqwest::Method::DELETE, path).json(&json!({ "reason": reason }))?;
        self.ack(request).await
    }

    async fn vip_action(&self, id: i64, action: &str, body: Value) -> Result<()> {
        let path = Self::path(&format!("/vip/{}/{}", id, action));
        self.ack(ApiRequest::new(reqwest::Method::PUT, path).json(&body)?).await
    }
}
