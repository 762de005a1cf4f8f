//! VIP 订单接口

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{PageQuery, PageResponse};

const VIP_PREFIX: &str = "/api/vip";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VipOrderInfo {
    pub id: i64,
    pub order_no: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub plan_type: serde_json::Value,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub payment_status: Option<i32>,
    #[serde(default)]
    pub payment_time: Option<String>,
    #[serde(default)]
    pub expire_time: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub plan_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

pub struct VipApi<'a> {
    client: &'a ApiClient,
}

impl<'a> VipApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<VipOrderInfo> {
        self.client.post(&format!("{}/orders", VIP_PREFIX), request).await
    }

    pub async fn pay_order(&self, order_no: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .post_empty(&format!("{}/orders/{}/pay", VIP_PREFIX, order_no))
            .await?;
        Ok(())
    }

    pub async fn orders(&self, page: &PageQuery) -> Result<PageResponse<VipOrderInfo>> {
        self.client.get_query(&format!("{}/orders", VIP_PREFIX), page).await
    }

    pub async fn order(&self, order_no: &str) -> Result<VipOrderInfo> {
        self.client
            .get(&format!("{}/orders/{}", VIP_PREFIX, order_no))
            .await
    }

    pub async fn cancel_order(&self, order_no: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .post_empty(&format!("{}/orders/{}/cancel", VIP_PREFIX, order_no))
            .await?;
        Ok(())
    }
}
