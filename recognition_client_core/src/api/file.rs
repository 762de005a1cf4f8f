//! 文件接口

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::form::{FilePart, FileUploadConfig, FormData, FILES_FIELD};
use crate::types::OperationResult;
use crate::urls;

/// 文件服务路径前缀
pub const FILES_PREFIX: &str = "/api/v1/files";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadResult {
    #[serde(default)]
    pub file_id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub upload_time: Option<String>,
}

pub struct FileApi<'a> {
    client: &'a ApiClient,
}

impl<'a> FileApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// 单文件上传；`config` 不为空时先在本地校验
    pub async fn upload(&self, file: FilePart, config: Option<&FileUploadConfig>) -> Result<FileUploadResult> {
        if let Some(config) = config {
            config.validate(&file)?;
        }
        self.client
            .upload(&format!("{}/upload", FILES_PREFIX), file, RequestOptions::default())
            .await
    }

    /// 批量上传（VIP 功能）
    pub async fn upload_batch(
        &self,
        files: Vec<FilePart>,
        config: Option<&FileUploadConfig>,
    ) -> Result<Vec<FileUploadResult>> {
        if let Some(config) = config {
            for file in &files {
                config.validate(file)?;
            }
        }
        let form = FormData::new().files(FILES_FIELD, files);
        self.client
            .upload(&format!("{}/upload/batch", FILES_PREFIX), form, RequestOptions::default())
            .await
    }

    /// 下载文件到下载目录
    pub async fn download(&self, file_id: &str, filename: Option<&str>) -> Result<PathBuf> {
        let url = urls::download_url(self.client.config().base(), file_id);
        self.client
            .download(&url, filename.or(Some(file_id)), RequestOptions::default())
            .await
    }

    pub async fn delete(&self, file_id: &str) -> Result<Option<OperationResult>> {
        self.client
            .delete(&format!("{}/{}", FILES_PREFIX, file_id))
            .await
    }

    pub async fn info(&self, file_id: &str) -> Result<FileInfo> {
        self.client
            .get(&format!("{}/{}/info", FILES_PREFIX, file_id))
            .await
    }

    pub fn preview_url(&self, file_id: &str) -> String {
        urls::preview_url(self.client.config().base(), file_id)
    }

    pub fn download_url(&self, file_id: &str) -> String {
        urls::download_url(self.client.config().base(), file_id)
    }
}
