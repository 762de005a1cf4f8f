//! 社区接口

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::form::{FilePart, FormData, FILES_FIELD};
use crate::types::{OperationResult, PageQuery, PageResponse};

const COMMUNITY_PREFIX: &str = "/api/v1/community";

/// 帖子
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInfo {
    pub id: i64,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Option<String>,
    #[serde(default)]
    pub recognition_id: Option<i64>,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub is_top: Option<i32>,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_collected: bool,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// 服务端新旧字段并存，读取时两者取其一
impl PostInfo {
    pub fn author_id(&self) -> Option<i64> {
        self.author_id.or(self.user_id)
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author_name.as_deref().or(self.username.as_deref())
    }

    pub fn created(&self) -> Option<&str> {
        self.create_time.as_deref().or(self.created_at.as_deref())
    }
}

/// 发帖 / 修改帖子
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognition_id: Option<i64>,
}

/// 帖子排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    Latest,
    Hot,
    Top,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<PostSort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

/// 管理端帖子查询
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPostQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

/// 举报类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Spam,
    Abuse,
    Inappropriate,
    Copyright,
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotTopic {
    pub tag: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub trend: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCategory {
    pub id: Value,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub post_count: i64,
}

#[derive(Debug, Deserialize)]
struct UploadedImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadedImages {
    urls: Vec<String>,
}

/// 社区接口
pub struct CommunityApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CommunityApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn path(tail: &str) -> String {
        format!("{}{}", COMMUNITY_PREFIX, tail)
    }

    fn post_path(id: i64, action: &str) -> String {
        Self::path(&format!("/posts/{}{}", id, action))
    }

    // ==================== 帖子 ====================

    pub async fn posts(&self, query: &PostQuery) -> Result<PageResponse<PostInfo>> {
        self.client.get_query(&Self::path("/posts"), query).await
    }

    pub async fn post_detail(&self, id: i64) -> Result<PostInfo> {
        self.client.get(&Self::post_path(id, "")).await
    }

    /// 发帖，返回服务端数据（通常含新帖 ID）
    pub async fn create_post(&self, form: &PostForm) -> Result<Value> {
        self.client.post(&Self::path("/posts"), form).await
    }

    pub async fn update_post(&self, id: i64, form: &PostForm) -> Result<Option<OperationResult>> {
        self.client.put(&Self::post_path(id, ""), form).await
    }

    pub async fn delete_post(&self, id: i64) -> Result<()> {
        let _: IgnoredAny = self.client.delete(&Self::post_path(id, "")).await?;
        Ok(())
    }

    pub async fn like_post(&self, id: i64) -> Result<()> {
        let _: IgnoredAny = self.client.post_empty(&Self::post_path(id, "/like")).await?;
        Ok(())
    }

    pub async fn unlike_post(&self, id: i64) -> Result<()> {
        let _: IgnoredAny = self.client.delete(&Self::post_path(id, "/like")).await?;
        Ok(())
    }

    pub async fn collect_post(&self, id: i64) -> Result<()> {
        let _: IgnoredAny = self.client.post_empty(&Self::post_path(id, "/collect")).await?;
        Ok(())
    }

    pub async fn uncollect_post(&self, id: i64) -> Result<()> {
        let _: IgnoredAny = self.client.delete(&Self::post_path(id, "/collect")).await?;
        Ok(())
    }

    pub async fn share_post(&self, id: i64, platform: Option<&str>) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .post(&Self::post_path(id, "/share"), &json!({ "platform": platform }))
            .await?;
        Ok(())
    }

    pub async fn report_post(&self, id: i64, kind: ReportKind, description: &str) -> Result<()> {
        let body = json!({ "type": kind, "description": description });
        let _: IgnoredAny = self.client.post(&Self::post_path(id, "/report"), &body).await?;
        Ok(())
    }

    pub async fn related_posts(&self, id: i64, limit: u32) -> Result<Vec<PostInfo>> {
        self.client
            .get_query(&Self::post_path(id, "/related"), &json!({ "limit": limit }))
            .await
    }

    pub async fn search(&self, keyword: &str, page: &PageQuery) -> Result<PageResponse<PostInfo>> {
        let query = json!({ "keyword": keyword, "page": page.page, "size": page.size });
        self.client.get_query(&Self::path("/search"), &query).await
    }

    pub async fn hot_topics(&self, limit: u32) -> Result<Vec<HotTopic>> {
        self.client
            .get_query(&Self::path("/hot-topics"), &json!({ "limit": limit }))
            .await
    }

    pub async fn recommendations(&self, limit: u32) -> Result<Vec<PostInfo>> {
        self.client
            .get_query(&Self::path("/recommendations"), &json!({ "limit": limit }))
            .await
    }

    pub async fn categories(&self) -> Result<Vec<PostCategory>> {
        self.client.get(&Self::path("/categories")).await
    }

    pub async fn stats(&self) -> Result<Value> {
        self.client.get(&Self::path("/stats")).await
    }

    pub async fn user_stats(&self) -> Result<Value> {
        self.client.get(&Self::path("/user-stats")).await
    }

    // ==================== 用户 ====================

    pub async fn follow_user(&self, user_id: i64) -> Result<()> {
        let path = Self::path(&format!("/users/{}/follow", user_id));
        let _: IgnoredAny = self.client.post_empty(&path).await?;
        Ok(())
    }

    pub async fn unfollow_user(&self, user_id: i64) -> Result<()> {
        let path = Self::path(&format!("/users/{}/follow", user_id));
        let _: IgnoredAny = self.client.delete(&path).await?;
        Ok(())
    }

    pub async fn user_posts(&self, user_id: i64, page: &PageQuery) -> Result<PageResponse<PostInfo>> {
        let path = Self::path(&format!("/users/{}/posts", user_id));
        self.client.get_query(&path, page).await
    }

    /// 我的收藏
    pub async fn collections(&self, page: &PageQuery) -> Result<PageResponse<PostInfo>> {
        self.client.get_query(&Self::path("/collections"), page).await
    }

    /// 我点赞的帖子
    pub async fn likes(&self, page: &PageQuery) -> Result<PageResponse<PostInfo>> {
        self.client.get_query(&Self::path("/likes"), page).await
    }

    // ==================== 图片 ====================

    /// 上传帖子图片，返回图片地址
    pub async fn upload_image(&self, image: FilePart) -> Result<String> {
        let uploaded: UploadedImage = self
            .client
            .upload(&Self::path("/upload/image"), image, RequestOptions::default())
            .await?;
        Ok(uploaded.url)
    }

    pub async fn upload_images(&self, images: Vec<FilePart>) -> Result<Vec<String>> {
        let form = FormData::new().files(FILES_FIELD, images);
        let uploaded: UploadedImages = self
            .client
            .upload(&Self::path("/upload/images"), form, RequestOptions::default())
            .await?;
        Ok(uploaded.urls)
    }

    // ==================== 审核 ====================

    pub async fn admin_posts(&self, query: &AdminPostQuery) -> Result<PageResponse<PostInfo>> {
        self.client.get_query(&Self::path("/admin/posts"), query).await
    }

    pub async fn approve_post(&self, id: i64) -> Result<()> {
        let path = Self::path(&format!("/admin/posts/{}/approve", id));
        let _: IgnoredAny = self.client.post_empty(&path).await?;
        Ok(())
    }

    pub async fn reject_post(&self, id: i64, reason: Option<&str>) -> Result<()> {
        let path = Self::path(&format!("/admin/posts/{}/reject", id));
        let _: IgnoredAny = self.client.post(&path, &json!({ "reason": reason })).await?;
        Ok(())
    }

    pub async fn set_top(&self, id: i64, is_top: bool) -> Result<()> {
        let path = Self::path(&format!("/admin/posts/{}/top", id));
        let _: IgnoredAny = self.client.put(&path, &json!({ "isTop": is_top })).await?;
        Ok(())
    }

    pub async fn set_hidden(&self, id: i64, is_hidden: bool) -> Result<()> {
        let path = Self::path(&format!("/admin/posts/{}/visibility", id));
        let _: IgnoredAny = self.client.put(&path, &json!({ "isHidden": is_hidden })).await?;
        Ok(())
    }

    pub async fn admin_delete_post(&self, id: i64) -> Result<()> {
        let path = Self::path(&format!("/admin/posts/{}", id));
        let _: IgnoredAny = self.client.delete(&path).await?;
        Ok(())
    }
}
