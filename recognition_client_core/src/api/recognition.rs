//! 图像识别接口

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, RequestOptions};
use crate::error::{Error, Result};
use crate::form::{FilePart, FileUploadConfig, FormData, FILES_FIELD, FILE_FIELD};
use crate::types::{PageQuery, PageResponse};

const RECOGNITION_PREFIX: &str = "/api/recognition";

/// 识别类型（表单字段 `recognitionType`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognitionType {
    #[default]
    General,
    Advanced,
}

impl RecognitionType {
    pub fn code(self) -> i32 {
        match self {
            RecognitionType::General => 0,
            RecognitionType::Advanced => 1,
        }
    }
}

/// 识别结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionInfo {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub image_size: Option<u64>,
    #[serde(default)]
    pub recognition_type: i32,
    #[serde(default)]
    pub result_json: Option<String>,
    #[serde(default)]
    pub main_category: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub processing_time: Option<i64>,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
}

impl RecognitionInfo {
    /// 展示用分类名
    pub fn label(&self) -> &str {
        self.object_name
            .as_deref()
            .or(self.main_category.as_deref())
            .or(self.category.as_deref())
            .unwrap_or("unknown")
    }

    pub fn created(&self) -> Option<&str> {
        self.created_at.as_deref().or(self.create_time.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecognitionStats {
    pub total: i64,
    pub this_month: i64,
    pub average_confidence: f64,
    pub favorites: i64,
}

/// 识别接口
pub struct RecognitionApi<'a> {
    client: &'a ApiClient,
    upload_config: Option<FileUploadConfig>,
}

impl<'a> RecognitionApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            upload_config: None,
        }
    }

    /// 上传前按配置校验文件
    pub fn with_upload_config(mut self, config: FileUploadConfig) -> Self {
        self.upload_config = Some(config);
        self
    }

    fn path(tail: &str) -> String {
        format!("{}{}", RECOGNITION_PREFIX, tail)
    }

    fn validate(&self, part: &FilePart) -> Result<()> {
        match &self.upload_config {
            Some(config) => config.validate(part),
            None => Ok(()),
        }
    }

    /// 单张识别
    pub async fn recognize(&self, image: FilePart, kind: RecognitionType) -> Result<RecognitionInfo> {
        self.validate(&image)?;
        let form = FormData::new()
            .file(FILE_FIELD, image)
            .text("recognitionType", kind.code());
        self.client
            .upload(&Self::path("/recognize"), form, RequestOptions::default())
            .await
    }

    /// 批量识别
    pub async fn batch_recognize(&self, images: Vec<FilePart>, kind: RecognitionType) -> Result<Vec<RecognitionInfo>> {
        if images.is_empty() {
            return Err(Error::InvalidParam("no images to recognize".to_string()));
        }
        for image in &images {
            self.validate(image)?;
        }
        let form = FormData::new()
            .files(FILES_FIELD, images)
            .text("recognitionType", kind.code());
        self.client
            .upload(&Self::path("/batch-recognize"), form, RequestOptions::default())
            .await
    }

    pub async fn history(&self, query: &PageQuery) -> Result<PageResponse<RecognitionInfo>> {
        self.client.get_query(&Self::path("/history"), query).await
    }

    pub async fn detail(&self, id: i64) -> Result<RecognitionInfo> {
        self.client.get(&Self::path(&format!("/{}", id))).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let _: IgnoredAny = self.client.delete(&Self::path(&format!("/{}", id))).await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<RecognitionStats> {
        self.client.get(&Self::path("/stats")).await
    }

    /// 同分类的其他识别记录
    pub async fn related(&self, id: i64) -> Result<Vec<RecognitionInfo>> {
        self.client.get(&Self::path(&format!("/{}/related", id))).await
    }
}
