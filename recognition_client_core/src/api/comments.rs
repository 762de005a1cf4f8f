//! 评论接口

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{PageQuery, PageResponse};

const COMMUNITY_PREFIX: &str = "/api/v1/community";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInfo {
    pub id: i64,
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub content: String,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub create_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

pub struct CommentApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CommentApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn path(tail: &str) -> String {
        format!("{}{}", COMMUNITY_PREFIX, tail)
    }

    pub async fn post_comments(&self, post_id: i64, page: &PageQuery) -> Result<PageResponse<CommentInfo>> {
        let path = Self::path(&format!("/posts/{}/comments", post_id));
        self.client.get_query(&path, page).await
    }

    /// 发表评论，`parent_id` 为回复的评论
    pub async fn add(&self, post_id: i64, request: &AddCommentRequest) -> Result<Value> {
        let path = Self::path(&format!("/posts/{}/comments", post_id));
        self.client.post(&path, request).await
    }

    pub async fn update(&self, comment_id: i64, content: &str) -> Result<()> {
        let path = Self::path(&format!("/comments/{}", comment_id));
        let _: IgnoredAny = self.client.put(&path, &json!({ "content": content })).await?;
        Ok(())
    }

    pub async fn delete(&self, comment_id: i64) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .delete(&Self::path(&format!("/comments/{}", comment_id)))
            .await?;
        Ok(())
    }

    pub async fn like(&self, comment_id: i64) -> Result<()> {
        let path = Self::path(&format!("/comments/{}/like", comment_id));
        let _: IgnoredAny = self.client.post_empty(&path).await?;
        Ok(())
    }

    pub async fn unlike(&self, comment_id: i64) -> Result<()> {
        let path = Self::path(&format!("/comments/{}/like", comment_id));
        let _: IgnoredAny = self.client.delete(&path).await?;
        Ok(())
    }

    pub async fn report(&self, comment_id: i64, kind: &str, description: &str) -> Result<()> {
        let path = Self::path(&format!("/comments/{}/report", comment_id));
        let body = json!({ "type": kind, "description": description });
        let _: IgnoredAny = self.client.post(&path, &body).await?;
        Ok(())
    }

    pub async fn user_comments(&self, user_id: i64, page: &PageQuery) -> Result<PageResponse<CommentInfo>> {
        let path = Self::path(&format!("/users/{}/comments", user_id));
        self.client.get_query(&path, page).await
    }
}
