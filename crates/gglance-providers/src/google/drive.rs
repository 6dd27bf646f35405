//! Google Drive API client.

use std::time::Duration;

use gglance_core::DriveFile;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderResult;
use crate::provider::{BoxFuture, FileSource};

use super::http;
use super::tokens::TokenInfo;

/// Base URL for Google Drive API v3.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Partial-response selector: only ids and names are needed.
const FILE_FIELDS: &str = "nextPageToken, files(id, name)";

/// Google Drive API client.
#[derive(Debug, Clone)]
pub struct GoogleDriveClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GoogleDriveClient {
    /// Creates a new Drive client.
    pub fn new(timeout: Duration, user_agent: &str) -> ProviderResult<Self> {
        Ok(Self {
            http_client: http::build_client(timeout, user_agent)?,
            base_url: DRIVE_API_BASE.to_string(),
        })
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Lists the first page of the user's files.
    pub async fn list(&self, token: &TokenInfo, page_size: usize) -> ProviderResult<Vec<DriveFile>> {
        let request = self
            .http_client
            .get(format!("{}/files", self.base_url))
            .bearer_auth(token.secret())
            .query(&[
                ("pageSize", page_size.to_string()),
                ("fields", FILE_FIELDS.to_string()),
            ]);

        let list: FileListResponse = http::send_json(request, "drive").await?;
        if list.next_page_token.is_some() {
            debug!("drive listing has more pages, showing the first only");
        }

        Ok(list
            .files
            .into_iter()
            .map(|f| DriveFile::new(f.name.unwrap_or_default(), f.id.unwrap_or_default()))
            .take(page_size)
            .collect())
    }
}

impl FileSource for GoogleDriveClient {
    fn list_files<'a>(
        &'a self,
        token: &'a TokenInfo,
        page_size: usize,
    ) -> BoxFuture<'a, ProviderResult<Vec<DriveFile>>> {
        Box::pin(self.list(token, page_size))
    }
}

/// Response from the files.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<ApiFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiFile {
    id: Option<String>,
    name: Option<String>,
}
