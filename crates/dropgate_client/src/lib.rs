use dropgate_core::catalog::{AssetSummary, DownloadLocator};
use dropgate_core::traits::ObjectEntry;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use tokio::fs::File;
use tokio::io::AsyncReadExt;

#[derive(Error, Debug)]
pub enum DropgateClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned error {0}: {1}")]
    ServerError(StatusCode, String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, DropgateClientError>;

/// What the admin surface returns for a successful upload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub asset: AssetSummary,
    pub locator: DownloadLocator,
    pub download_url: String,
}

/// Client for both services: admin calls go to `admin_url` with the bearer
/// token, downloads go to the public gate at `gate_url` with only the
/// locator's token.
#[derive(Clone)]
pub struct DropgateClient {
    admin_url: String,
    gate_url: String,
    client: Client,
    token: Option<String>,
}

impl DropgateClient {
    pub fn new(
        admin_url: impl Into<String>,
        gate_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            admin_url: admin_url.into(),
            gate_url: gate_url.into(),
            client: Client::new(),
            token,
        }
    }

    fn auth_request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            builder.header("Authorization", format!("Bearer {token}"))
        } else {
            builder
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(DropgateClientError::ServerError(status, text))
        }
    }

    /// Uploads a file and registers it, returning the shareable locator.
    pub async fn upload_file(
        &self,
        path: &Path,
        folder: Option<&str>,
        password: &str,
    ) -> Result<UploadResponse> {
        let mut file = File::open(path).await?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer).await?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DropgateClientError::Validation("Path has no file name".into()))?;

        let mut query: Vec<(&str, &str)> = vec![("fileName", file_name), ("password", password)];
        if let Some(folder) = folder {
            query.push(("folder", folder));
        }

        let url = format!("{}/assets", self.admin_url);
        let response = self
            .auth_request(self.client.post(&url))
            .query(&query)
            .body(buffer)
            .send()
            .await?;
        let response = Self::check(response).await?;

        response
            .json()
            .await
            .map_err(|e| DropgateClientError::Validation(format!("Failed to parse response: {e}")))
    }

    pub async fn list_assets(&self) -> Result<Vec<AssetSummary>> {
        let url = format!("{}/assets", self.admin_url);
        let response = self.auth_request(self.client.get(&url)).send().await?;
        let response = Self::check(response).await?;

        response
            .json()
            .await
            .map_err(|e| DropgateClientError::Validation(format!("Failed to parse listing: {e}")))
    }

    pub async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectEntry>> {
        let url = format!("{}/objects", self.admin_url);
        let response = self
            .auth_request(self.client.get(&url))
            .query(&[("prefix", prefix)])
            .send()
            .await?;
        let response = Self::check(response).await?;

        response
            .json()
            .await
            .map_err(|e| DropgateClientError::Validation(format!("Failed to parse listing: {e}")))
    }

    pub async fn revoke(&self, asset_id: &str) -> Result<()> {
        let url = format!("{}/assets/{asset_id}", self.admin_url);
        let response = self.auth_request(self.client.delete(&url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Fetches an asset through the public gate. Needs no admin token, only
    /// the locator.
    pub async fn download(&self, locator: &DownloadLocator) -> Result<Vec<u8>> {
        let url = format!("{}/d/{}", self.gate_url, locator.asset_id);
        let response = self
            .client
            .get(&url)
            .query(&[("token", &locator.token)])
            .send()
            .await?;
        let response = Self::check(response).await?;

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
