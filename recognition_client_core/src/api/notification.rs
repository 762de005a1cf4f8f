//! 通知接口

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::PageResponse;

const NOTIFICATION_PREFIX: &str = "/api/notifications";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInfo {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    /// 服务端有数字与字符串两种类型编码
    #[serde(rename = "type", default)]
    pub kind: serde_json::Value,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub is_read: i32,
    #[serde(default)]
    pub create_time: Option<String>,
}

impl NotificationInfo {
    pub fn is_read(&self) -> bool {
        self.is_read != 0
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread_only: Option<bool>,
}

pub struct NotificationApi<'a> {
    client: &'a ApiClient,
}

impl<'a> NotificationApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &NotificationQuery) -> Result<PageResponse<NotificationInfo>> {
        self.client.get_query(NOTIFICATION_PREFIX, query).await
    }

    pub async fn unread_count(&self) -> Result<u64> {
        self.client
            .get(&format!("{}/unread-count", NOTIFICATION_PREFIX))
            .await
    }

    pub async fn mark_read(&self, id: i64) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .post_empty(&format!("{}/{}/read", NOTIFICATION_PREFIX, id))
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .post_empty(&format!("{}/read-all", NOTIFICATION_PREFIX))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .delete(&format!("{}/{}", NOTIFICATION_PREFIX, id))
            .await?;
        Ok(())
    }
}
