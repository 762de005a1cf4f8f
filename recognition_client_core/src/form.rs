//! 上传表单
//!
//! [`FormData`] 描述 multipart 请求体；单个 [`FilePart`] 等价于仅含字段 `file` 的表单。

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::error::{Error, Result};

/// 单文件字段名
pub const FILE_FIELD: &str = "file";

/// 批量文件字段名（重复出现）
pub const FILES_FIELD: &str = "files";

const OCTET_STREAM: &str = "application/octet-stream";

/// 待上传文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// 按内容识别 MIME，识别失败时为 `application/octet-stream`
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or(OCTET_STREAM)
            .to_string();
        Self {
            file_name: file_name.into(),
            mime,
            bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    /// 读取本地文件
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidParam(format!("{:?} is not a file", path)))?;
        Ok(Self::new(file_name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    fn into_part(self) -> Result<Part> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)
            .map_err(|e| Error::InvalidParam(format!("invalid mime type: {}", e)))
    }
}

/// 表单字段值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(FilePart),
}

/// multipart 表单
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl ToString) -> Self {
        self.fields.push((name.to_string(), FormValue::Text(value.to_string())));
        self
    }

    pub fn file(mut self, name: &str, part: FilePart) -> Self {
        self.fields.push((name.to_string(), FormValue::File(part)));
        self
    }

    /// 多个文件使用同一字段名
    pub fn files(self, name: &str, parts: impl IntoIterator<Item = FilePart>) -> Self {
        parts.into_iter().fold(self, |form, part| form.file(name, part))
    }

    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    pub fn file_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|(_, v)| matches!(v, FormValue::File(_)))
            .count()
    }

    pub(crate) fn into_multipart(self) -> Result<Form> {
        self.fields
            .into_iter()
            .try_fold(Form::new(), |form, (name, value)| match value {
                FormValue::Text(text) => Ok(form.text(name, text)),
                FormValue::File(part) => Ok(form.part(name, part.into_part()?)),
            })
    }
}

impl From<FilePart> for FormData {
    fn from(part: FilePart) -> Self {
        FormData::new().file(FILE_FIELD, part)
    }
}

/// 上传前校验
#[derive(Debug, Clone, Default)]
pub struct FileUploadConfig {
    /// 最大字节数
    pub max_size: Option<u64>,
    /// 允许的类型：`.png` 形式按扩展名匹配，其余按 MIME 包含匹配
    pub allowed_types: Vec<String>,
}

impl FileUploadConfig {
    pub fn images(max_size: u64) -> Self {
        Self {
            max_size: Some(max_size),
            allowed_types: vec!["image/".to_string()],
        }
    }

    pub fn validate(&self, part: &FilePart) -> Result<()> {
        if let Some(max) = self.max_size {
            if part.size() > max {
                return Err(Error::InvalidParam(format!(
                    "file {} exceeds {:.2}MB",
                    part.file_name,
                    max as f64 / 1024.0 / 1024.0
                )));
            }
        }

        if self.allowed_types.is_empty() {
            return Ok(());
        }

        let name = part.file_name.to_lowercase();
        let allowed = self.allowed_types.iter().any(|ty| {
            if ty.starts_with('.') {
                name.ends_with(&ty.to_lowercase())
            } else {
                part.mime.contains(ty.as_str())
            }
        });

        if allowed {
            Ok(())
        } else {
            Err(Error::InvalidParam(format!(
                "unsupported file type for {}, allowed: {}",
                part.file_name,
                self.allowed_types.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 最小 PNG 文件头
    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_mime_detected_from_content() {
        let png = FilePart::new("a.png", PNG_HEADER.to_vec());
        assert_eq!(png.mime, "image/png");
        assert!(png.is_image());

        let unknown = FilePart::new("notes.bin", vec![1, 2, 3]);
        assert_eq!(unknown.mime, "application/octet-stream");
    }

    #[test]
    fn test_bare_file_equals_form_with_file_field() {
        let part = FilePart::new("cat.png", PNG_HEADER.to_vec());
        let from_file: FormData = part.clone().into();
        let explicit = FormData::new().file("file", part);
        assert_eq!(from_file, explicit);
        assert_eq!(from_file.file_count(), 1);
    }

    #[test]
    fn test_batch_uses_repeated_field() {
        let parts = vec![
            FilePart::new("a.png", PNG_HEADER.to_vec()),
            FilePart::new("b.png", PNG_HEADER.to_vec()),
        ];
        let form = FormData::new().files(FILES_FIELD, parts).text("recognitionType", 0);
        let names: Vec<&str> = form.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["files", "files", "recognitionType"]);
    }

    #[test]
    fn test_upload_validation() {
        let config = FileUploadConfig {
            max_size: Some(4),
            allowed_types: vec![".png".to_string(), "image/jpeg".to_string()],
        };
        assert!(config.validate(&FilePart::new("a.PNG", vec![1, 2])).is_ok());
        assert!(config.validate(&FilePart::new("a.gif", vec![1, 2])).is_err());
        assert!(config.validate(&FilePart::new("a.png", vec![0; 10])).is_err());
        assert!(FileUploadConfig::default()
            .validate(&FilePart::new("x", vec![0; 10]))
            .is_ok());
    }
}
