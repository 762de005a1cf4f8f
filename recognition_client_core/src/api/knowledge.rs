//! 知识库接口

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{PageQuery, PageResponse};

const KNOWLEDGE_PREFIX: &str = "/api/v1/knowledge";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeCategory {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub description: Option<String>,
}

impl KnowledgeCategory {
    pub fn label(&self) -> &str {
        self.category
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }
}

/// 知识条目
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeItem {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub collect_count: i64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_collected: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

/// 学习进度
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningProgress {
    pub total_items: i64,
    pub learned_items: i64,
    pub progress: f64,
    pub learned_ids: Vec<i64>,
}

pub struct KnowledgeApi<'a> {
    client: &'a ApiClient,
}

impl<'a> KnowledgeApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn path(tail: &str) -> String {
        format!("{}{}", KNOWLEDGE_PREFIX, tail)
    }

    async fn ack_post(&self, path: &str, body: Option<Value>) -> Result<()> {
        let _: IgnoredAny = match body {
            Some(body) => self.client.post(path, &body).await?,
            None => self.client.post_empty(path).await?,
        };
        Ok(())
    }

    async fn ack_delete(&self, path: &str) -> Result<()> {
        let _: IgnoredAny = self.client.delete(path).await?;
        Ok(())
    }

    pub async fn categories(&self) -> Result<Vec<KnowledgeCategory>> {
        self.client.get(&Self::path("/categories")).await
    }

    pub async fn items(&self, query: &KnowledgeQuery) -> Result<PageResponse<KnowledgeItem>> {
        self.client.get_query(&Self::path("/items"), query).await
    }

    pub async fn item(&self, id: i64) -> Result<KnowledgeItem> {
        self.client.get(&Self::path(&format!("/items/{}", id))).await
    }

    pub async fn search(&self, keyword: &str, page: &PageQuery) -> Result<PageResponse<KnowledgeItem>> {
        let query = json!({ "keyword": keyword, "page": page.page, "size": page.size });
        self.client.get_query(&Self::path("/search"), &query).await
    }

    pub async fn popular(&self, limit: u32) -> Result<Vec<KnowledgeItem>> {
        self.client
            .get_query(&Self::path("/popular"), &json!({ "limit": limit }))
            .await
    }

    pub async fn latest(&self, limit: u32) -> Result<Vec<KnowledgeItem>> {
        self.client
            .get_query(&Self::path("/latest"), &json!({ "limit": limit }))
            .await
    }

    pub async fn recommendations(&self, limit: u32) -> Result<Vec<KnowledgeItem>> {
        self.client
            .get_query(&Self::path("/recommendations"), &json!({ "limit": limit }))
            .await
    }

    pub async fn related(&self, id: i64, limit: u32) -> Result<Vec<KnowledgeItem>> {
        self.client
            .get_query(&Self::path(&format!("/{}/related", id)), &json!({ "limit": limit }))
            .await
    }

    pub async fn stats(&self) -> Result<Value> {
        self.client.get(&Self::path("/stats")).await
    }

    pub async fn like(&self, id: i64) -> Result<()> {
        self.ack_post(&Self::path(&format!("/{}/like", id)), None).await
    }

    pub async fn unlike(&self, id: i64) -> Result<()> {
        self.ack_delete(&Self::path(&format!("/{}/like", id))).await
    }

    pub async fn collect(&self, id: i64) -> Result<()> {
        self.ack_post(&Self::path(&format!("/{}/collect", id)), None).await
    }

    pub async fn uncollect(&self, id: i64) -> Result<()> {
        self.ack_delete(&Self::path(&format!("/{}/collect", id))).await
    }

    pub async fn collections(&self, page: &PageQuery) -> Result<PageResponse<KnowledgeItem>> {
        self.client.get_query(&Self::path("/collections"), page).await
    }

    /// 浏览历史
    pub async fn history(&self, page: &PageQuery) -> Result<PageResponse<KnowledgeItem>> {
        self.client.get_query(&Self::path("/history"), page).await
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.ack_delete(&Self::path("/history")).await
    }

    pub async fn feedback(&self, id: i64, rating: u8, comment: Option<&str>) -> Result<()> {
        let body = json!({ "rating": rating, "comment": comment });
        self.ack_post(&Self::path(&format!("/{}/feedback", id)), Some(body))
            .await
    }

    pub async fn progress(&self) -> Result<LearningProgress> {
        self.client.get(&Self::path("/progress")).await
    }

    pub async fn mark_learned(&self, id: i64) -> Result<()> {
        self.ack_post(&Self::path(&format!("/{}/learned", id)), None).await
    }

    pub async fn unmark_learned(&self, id: i64) -> Result<()> {
        self.ack_delete(&Self::path(&format!("/{}/learned", id))).await
    }

    pub async fn learning_stats(&self) -> Result<Value> {
        self.client.get(&Self::path("/learning-stats")).await
    }
}
