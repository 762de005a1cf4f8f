//! 管理后台接口

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::community::{AdminPostQuery, PostForm, PostInfo};
use crate::api::knowledge::KnowledgeItem;
use crate::api::user::{UserForm, UserQuery};
use crate::api::vip::VipOrderInfo;
use crate::client::{ApiClient, ApiRequest};
use crate::error::Result;
use crate::types::{PageResponse, UserProfile};

const ADMIN_PREFIX: &str = "/api/admin";

/// 系统概览
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemOverview {
    pub total_users: i64,
    pub active_users: i64,
    pub total_recognitions: i64,
    pub today_recognitions: i64,
    pub total_posts: i64,
    pub total_knowledge: i64,
    pub total_orders: i64,
    pub total_revenue: f64,
    pub user_growth: f64,
    pub recognition_growth: f64,
    pub post_growth: f64,
    pub revenue_growth: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrendData {
    pub dates: Vec<String>,
    pub values: Option<Vec<f64>>,
    pub series: Option<std::collections::HashMap<String, Vec<f64>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryStatsItem {
    pub category: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryStats {
    pub recognition_categories: Vec<CategoryStatsItem>,
    pub post_categories: Vec<CategoryStatsItem>,
    pub knowledge_categories: Vec<CategoryStatsItem>,
}

/// 系统日志
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemLogInfo {
    pub id: i64,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub request_url: Option<String>,
    #[serde(default)]
    pub response_status: Option<i32>,
    #[serde(default)]
    pub execution_time: Option<i64>,
    #[serde(default)]
    pub create_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// 识别记录（管理端视图）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionRecordInfo {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub main_category: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub recognition_type: i32,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// 通用分页 + 关键字 + 状态查询
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// 知识条目编辑
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

/// VIP 用户列表（该接口不使用通用分页结构）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VipUserPage {
    pub users: Vec<UserProfile>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn path(tail: &str) -> String {
        format!("{}{}", ADMIN_PREFIX, tail)
    }

    async fn ack(&self, request: ApiRequest) -> Result<()> {
        let _: IgnoredAny = self.client.send(request).await?;
        Ok(())
    }

    /// 路径参数之外还带查询参数的 PUT/POST
    async fn ack_with_query(&self, method: reqwest::Method, path: String, query: Value) -> Result<()> {
        self.ack(ApiRequest::new(method, path).query(&query)?).await
    }

    // ==================== 统计 ====================

    pub async fn overview(&self) -> Result<SystemOverview> {
        self.client.get(&Self::path("/stats/overview")).await
    }

    pub async fn trends(&self, days: u32) -> Result<TrendData> {
        self.client
            .get_query(&Self::path("/stats/trends"), &json!({ "days": days }))
            .await
    }

    pub async fn category_stats(&self) -> Result<CategoryStats> {
        self.client.get(&Self::path("/stats/categories")).await
    }

    pub async fn logs(&self, query: &LogQuery) -> Result<PageResponse<SystemLogInfo>> {
        self.client.get_query(&Self::path("/stats/logs"), query).await
    }

    // ==================== 用户 ====================

    pub async fn users(&self, query: &UserQuery) -> Result<PageResponse<UserProfile>> {
        self.client.get_query(&Self::path("/users"), query).await
    }

    /// 返回新用户 ID
    pub async fn create_user(&self, form: &UserForm) -> Result<i64> {
        self.client.post(&Self::path("/users"), form).await
    }

    pub async fn update_user(&self, id: i64, form: &UserForm) -> Result<()> {
        let path = Self::path(&format!("/users/{}", id));
        self.ack(ApiRequest::new(reqwest::Method::PUT, path).json(form)?).await
    }

    pub async fn set_user_status(&self, id: i64, status: i32) -> Result<()> {
        let path = Self::path(&format!("/users/{}/status", id));
        self.ack_with_query(reqwest::Method::PUT, path, json!({ "status": status }))
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        let path = Self::path(&format!("/users/{}", id));
        self.ack(ApiRequest::new(reqwest::Method::DELETE, path)).await
    }

    pub async fn reset_user_password(&self, id: i64, new_password: &str) -> Result<()> {
        let path = Self::path(&format!("/users/{}/reset-password", id));
        self.ack_with_query(reqwest::Method::POST, path, json!({ "newPassword": new_password }))
            .await
    }

    // ==================== 帖子 ====================

    pub async fn posts(&self, query: &AdminPostQuery) -> Result<PageResponse<PostInfo>> {
        self.client.get_query(&Self::path("/community/posts"), query).await
    }

    pub async fn post(&self, id: i64) -> Result<PostInfo> {
        self.client
            .get(&Self::path(&format!("/community/posts/{}", id)))
            .await
    }

    pub async fn create_post(&self, form: &PostForm) -> Result<i64> {
        self.client.post(&Self::path("/community/posts"), form).await
    }

    pub async fn update_post(&self, id: i64, form: &PostForm) -> Result<()> {
        let path = Self::path(&format!("/community/posts/{}", id));
        self.ack(ApiRequest::new(reqwest::Method::PUT, path).json(form)?).await
    }

    pub async fn set_post_status(&self, id: i64, status: i32) -> Result<()> {
        let path = Self::path(&format!("/community/posts/{}/status", id));
        self.ack_with_query(reqwest::Method::PUT, path, json!({ "status": status }))
            .await
    }

    pub async fn set_post_top(&self, id: i64, is_top: bool) -> Result<()> {
        let path = Self::path(&format!("/community/posts/{}/top", id));
        self.ack_with_query(reqwest::Method::PUT, path, json!({ "isTop": i32::from(is_top) }))
            .await
    }

    pub async fn delete_post(&self, id: i64) -> Result<()> {
        let path = Self::path(&format!("/community/posts/{}", id));
        self.ack(ApiRequest::new(reqwest::Method::DELETE, path)).await
    }

    // ==================== 知识库 ====================

    pub async fn knowledge(&self, query: &AdminQuery) -> Result<PageResponse<KnowledgeItem>> {
        self.client.get_query(&Self::path("/knowledge"), query).await
    }

    pub async fn knowledge_categories(&self) -> Result<Vec<String>> {
        self.client.get(&Self::path("/knowledge/categories")).await
    }

    pub async fn knowledge_tags(&self) -> Result<Vec<String>> {
        self.client.get(&Self::path("/knowledge/tags")).await
    }

    pub async fn create_knowledge(&self, form: &KnowledgeForm) -> Result<i64> {
        self.client.post(&Self::path("/knowledge"), form).await
    }

    pub async fn update_knowledge(&self, id: i64, form: &KnowledgeForm) -> Result<()> {
        let path = Self::path(&format!("/knowledge/{}", id));
        self.ack(ApiRequest::new(reqwest::Method::PUT, path).json(form)?).await
    }

    pub async fn delete_knowledge(&self, id: i64) -> Result<()> {
        let path = Self::path(&format!("/knowledge/{}", id));
        self.ack(ApiRequest::new(reqwest::Method::DELETE, path)).await
    }

    // ==================== VIP ====================

    pub async fn vip_orders(&self, query: &AdminQuery) -> Result<PageResponse<VipOrderInfo>> {
        self.client.get_query(&Self::path("/vip/orders"), query).await
    }

    pub async fn set_order_status(&self, id: i64, status: i32) -> Result<()> {
        let path = Self::path(&format!("/vip/orders/{}/status", id));
        self.ack_with_query(reqwest::Method::PUT, path, json!({ "status": status }))
            .await
    }

    pub async fn vip_users(&self, query: &AdminQuery) -> Result<VipUserPage> {
        self.client.get_query(&Self::path("/vip/users"), query).await
    }

    pub async fn vip_stats(&self) -> Result<Value> {
        self.client.get(&Self::path("/vip/stats")).await
    }

    pub async fn extend_vip(&self, user_id: i64, days: u32, reason: Option<&str>) -> Result<()> {
        self.vip_user_action(reqwest::Method::POST, user_id, "extend", json!({ "days": days, "reason": reason }))
            .await
    }

    pub async fn upgrade_vip(&self, user_id: i64, new_level: i32, reason: Option<&str>) -> Result<()> {
        let body = json!({ "newLevel": new_level, "reason": reason });
        self.vip_user_action(reqwest::Method::POST, user_id, "upgrade", body)
            .await
    }

    pub async fn downgrade_vip(&self, user_id: i64, new_level: i32, reason: Option<&str>) -> Result<()> {
        let body = json!({ "newLevel": new_level, "reason": reason });
        self.vip_user_action(reqwest::Method::POST, user_id, "downgrade", body)
            .await
    }

    pub async fn set_vip_status(&self, user_id: i64, status: &str, reason: Option<&str>) -> Result<()> {
        let body = json!({ "status": status, "reason": reason });
        self.vip_user_action(reqwest::Method::PUT, user_id, "status", body)
            .await
    }

    pub async fn reset_vip_usage(&self, user_id: i64, reset_type: &str, reason: Option<&str>) -> Result<()> {
        let body = json!({ "resetType": reset_type, "reason": reason });
        self.vip_user_action(reqwest::Method::POST, user_id, "reset-usage", body)
            .await
    }

    pub async fn revoke_vip(&self, user_id: i64, reason: Option<&str>) -> Result<()> {
        self.vip_user_action(reqwest::Method::POST, user_id, "revoke", json!({ "reason": reason }))
            .await
    }

    async fn vip_user_action(&self, method: reqwest::Method, user_id: i64, action: &str, body: Value) -> Result<()> {
        let path = Self::path(&format!("/vip/users/{}/{}", user_id, action));
        self.ack(ApiRequest::new(method, path).json(&body)?).await
    }

    // ==================== 识别记录 ====================

    pub async fn recognition_records(&self, query: &AdminQuery) -> Result<PageResponse<RecognitionRecordInfo>> {
        self.client
            .get_query(&Self::path("/recognition/records"), query)
            .await
    }

    pub async fn delete_recognition_record(&self, id: i64) -> Result<()> {
        let path = Self::path(&format!("/recognition/records/{}", id));
        self.ack(ApiRequest::new(reqwest::Method::DELETE, path)).await
    }

    pub async fn delete_recognition_records(&self, ids: &[i64]) -> Result<()> {
        let path = Self::path("/recognition/records/batch-delete");
        self.ack(ApiRequest::new(reqwest::Method::POST, path).json(&json!({ "ids": ids }))?)
            .await
    }

    // ==================== 管理员信息 ====================

    pub async fn profile(&self) -> Result<UserProfile> {
        self.client.get(&Self::path("/profile")).await
    }

    pub async fn update_profile(&self, form: &UserForm) -> Result<()> {
        self.ack(ApiRequest::new(reqwest::Method::PUT, Self::path("/profile")).json(form)?)
            .await
    }

    /// 返回新头像地址
    pub async fn update_avatar(&self, avatar_url: &str) -> Result<String> {
        let request = ApiRequest::new(reqwest::Method::PUT, Self::path("/profile/avatar"))
            .query(&json!({ "avatarUrl": avatar_url }))?;
        self.client.send(request).await
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        let body = json!({ "oldPassword": old_password, "newPassword": new_password });
        self.ack(ApiRequest::new(reqwest::Method::PUT, Self::path("/profile/password")).json(&body)?)
            .await
    }
}
