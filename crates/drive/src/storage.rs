use std::{path::Path, sync::Arc};

use {
    async_trait::async_trait,
    pdfsqueeze_pipeline::{Storage, StorageError},
    secrecy::ExposeSecret,
    serde::Deserialize,
    serde_json::json,
    tracing::debug,
};

use crate::{Error, Result, credentials::TokenSource};

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FolderEntry>,
}

#[derive(Deserialize)]
struct FolderEntry {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct FileRef {
    id: String,
}

/// Drive v3 over plain REST.
pub struct DriveStorage {
    http: reqwest::Client,
    api_base: String,
    tokens: Arc<dyn TokenSource>,
}

impl DriveStorage {
    /// `api_base` is the Google APIs origin, e.g. `https://www.googleapis.com`.
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    async fn bearer(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(request.bearer_auth(token.expose_secret()))
    }

    async fn find(&self, name: &str) -> Result<Option<String>> {
        let q = format!(
            "name='{}' and mimeType='{FOLDER_MIME}' and trashed=false",
            escape_query_literal(name)
        );
        let request = self
            .http
            .get(format!("{}/drive/v3/files", self.api_base))
            .query(&[
                ("q", q.as_str()),
                ("spaces", "drive"),
                ("fields", "files(id,name)"),
            ]);
        let list: FileList = send_json(self.bearer(request).await?, "files.list").await?;
        // Drive's `name=` match ignores case; only an exact name counts.
        Ok(list
            .files
            .into_iter()
            .find(|f| f.name == name)
            .map(|f| f.id))
    }

    async fn create(&self, name: &str) -> Result<String> {
        let request = self
            .http
            .post(format!("{}/drive/v3/files", self.api_base))
            .query(&[("fields", "id")])
            .json(&json!({ "name": name, "mimeType": FOLDER_MIME }));
        let file: FileRef = send_json(self.bearer(request).await?, "files.create").await?;
        Ok(file.id)
    }

    async fn upload(&self, path: &Path, filename: &str, folder_id: &str) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let metadata = json!({ "name": filename, "parents": [folder_id] });
        let boundary = format!("pdfsqueeze-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata, &bytes)?;
        debug!(filename, bytes = bytes.len(), "uploading to Drive");

        let request = self
            .http
            .post(format!("{}/upload/drive/v3/files", self.api_base))
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body);
        let file: FileRef = send_json(self.bearer(request).await?, "files.upload").await?;
        Ok(file.id)
    }

    async fn share(&self, file_id: &str) -> Result<()> {
        let request = self
            .http
            .post(format!("{}/drive/v3/files/{file_id}/permissions", self.api_base))
            .json(&json!({ "role": "reader", "type": "anyone" }));
        let response = self.bearer(request).await?.send().await?;
        check_status(response, "permissions.create").await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for DriveStorage {
    async fn find_folder(&self, name: &str) -> std::result::Result<Option<String>, StorageError> {
        self.find(name)
            .await
            .map_err(|e| StorageError::external(format!("looking up folder '{name}'"), e))
    }

    async fn create_folder(&self, name: &str) -> std::result::Result<String, StorageError> {
        self.create(name)
            .await
            .map_err(|e| StorageError::external(format!("creating folder '{name}'"), e))
    }

    async fn upload_pdf(
        &self,
        path: &Path,
        filename: &str,
        folder_id: &str,
    ) -> std::result::Result<String, StorageError> {
        self.upload(path, filename, folder_id)
            .await
            .map_err(|e| StorageError::external(format!("uploading '{filename}'"), e))
    }

    async fn share_publicly(&self, file_id: &str) -> std::result::Result<(), StorageError> {
        self.share(file_id)
            .await
            .map_err(|e| StorageError::external(format!("sharing file {file_id}"), e))
    }
}

/// Escape a value for use inside a single-quoted Drive query literal.
pub fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    pdf: &[u8],
) -> Result<Vec<u8>> {
    let metadata = serde_json::to_vec(metadata)?;
    let mut body = Vec::with_capacity(pdf.len() + metadata.len() + 256);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(&metadata);
    body.extend_from_slice(
        format!("\r\n--{boundary}\r\nContent-Type: application/pdf\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(pdf);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Ok(body)
}

async fn check_status(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

async fn send_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    operation: &'static str,
) -> Result<T> {
    let response = check_status(request.send().await?, operation).await?;
    Ok(response.json::<T>().await?)
}
