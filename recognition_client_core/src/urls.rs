//! 资源 URL 工具

use crate::api::file::FILES_PREFIX;

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// 获取完整的图片 URL
///
/// - 空值返回空串
/// - `http(s)://` 开头原样返回
/// - `/` 开头拼接服务器地址
/// - 其他（如 data URL）原样返回
///
/// 对结果再次调用结果不变。
pub fn image_url(base_url: &str, url: &str) -> String {
    if url.is_empty() || is_absolute(url) || !url.starts_with('/') {
        return url.to_string();
    }
    format!("{}{}", base_url.trim_end_matches('/'), url)
}

/// 文件预览 URL：完整 URL 与路径同 [`image_url`]，其余视为文件 ID
pub fn preview_url(base_url: &str, file_id: &str) -> String {
    if file_id.is_empty() || is_absolute(file_id) || file_id.starts_with('/') {
        return image_url(base_url, file_id);
    }
    format!("{}{}/{}/preview", base_url.trim_end_matches('/'), FILES_PREFIX, file_id)
}

/// 文件下载 URL
pub fn download_url(base_url: &str, file_id: &str) -> String {
    if file_id.is_empty() || is_absolute(file_id) {
        return file_id.to_string();
    }
    format!("{}{}/{}/download", base_url.trim_end_matches('/'), FILES_PREFIX, file_id)
}

/// 是否为可用的图片地址
pub fn is_valid_image_url(base_url: &str, url: &str) -> bool {
    url.starts_with("data:image/") || !image_url(base_url, url).is_empty()
}

/// 格式化文件大小
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    let rounded = (size * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8080";

    #[test]
    fn test_image_url_variants() {
        assert_eq!(image_url(BASE, "https://cdn.example.com/a.png"), "https://cdn.example.com/a.png");
        assert_eq!(image_url(BASE, "/uploads/a.png"), "http://localhost:8080/uploads/a.png");
        assert_eq!(image_url(BASE, "data:image/png;base64,AAAA"), "data:image/png;base64,AAAA");
        assert_eq!(image_url(BASE, ""), "");
    }

    #[test]
    fn test_image_url_is_idempotent() {
        let once = image_url(BASE, "/uploads/b.jpg");
        assert_eq!(image_url(BASE, &once), once);
    }

    #[test]
    fn test_file_urls() {
        assert_eq!(preview_url(BASE, "abc"), "http://localhost:8080/api/v1/files/abc/preview");
        assert_eq!(preview_url(BASE, "/x/y.png"), "http://localhost:8080/x/y.png");
        assert_eq!(download_url(BASE, "abc"), "http://localhost:8080/api/v1/files/abc/download");
        assert!(is_valid_image_url(BASE, "data:image/gif;base64,R0lG"));
        assert!(!is_valid_image_url(BASE, ""));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
    }
}
