use bytes::Bytes;
use reqwest::multipart::{Form, Part};

use assetctl_core::{ServiceError, ServiceResult};

use crate::types::{Entity, ReportFormat, UploadFile, UploadedFile};

use super::{ApiRequest, Gateway};

/// Multipart field the service reads the upload from.
const UPLOAD_FIELD: &str = "file";

impl Gateway {
    /// `POST /api/upload` as multipart form data.
    pub async fn upload_file(&self, file: UploadFile) -> ServiceResult<UploadedFile> {
        if file.file_name.trim().is_empty() {
            return Err(ServiceError::local("no file selected for upload"));
        }

        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name);
        if let Some(mime) = file.mime.as_deref() {
            part = part
                .mime_str(mime)
                .map_err(|e| ServiceError::local(format!("invalid mime type '{mime}': {e}")))?;
        }
        let form = Form::new().part(UPLOAD_FIELD, part);

        let body = self.send_json(ApiRequest::post("/api/upload").multipart(form)).await?;
        Ok(body
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default())
    }

    /// `GET /api/reports/<entity>?format=...`; the payload is returned untouched.
    ///
    /// Only empresas, equipos and usuarios have reports; other entities fail
    /// locally without a request.
    pub async fn download_report(&self, entity: Entity, format: ReportFormat) -> ServiceResult<Bytes> {
        if !entity.has_report() {
            return Err(ServiceError::local(format!("no report available for '{entity}'")));
        }
        let request = ApiRequest::get(format!("/api/reports/{}", entity.slug()))
            .query([("format", format.as_str())]);
        self.send_binary(request).await
    }

    /// Absolute URL for a server-relative file path.
    pub fn build_file_url(&self, path: &str) -> String {
        join_file_url(self.base_url(), path)
    }
}

/// Join `path` onto `base` with exactly one `/` between them.
///
/// `http://` and `https://` URLs pass through unchanged; empty input stays empty.
pub fn join_file_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_with_one_slash() {
        assert_eq!(
            join_file_url("http://svc:5000/", "/uploads/a.pdf"),
            "http://svc:5000/uploads/a.pdf"
        );
        assert_eq!(
            join_file_url("http://svc:5000", "uploads/a.pdf"),
            "http://svc:5000/uploads/a.pdf"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(
            join_file_url("http://svc", "HTTPS://cdn.example/x.png"),
            "HTTPS://cdn.example/x.png"
        );
        assert_eq!(join_file_url("http://svc", "http://a/b"), "http://a/b");
    }

    #[test]
    fn empty_path_is_empty() {
        assert_eq!(join_file_url("http://svc", ""), "");
    }
}
