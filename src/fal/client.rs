use anyhow::{Context, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use super::content_type::extension_for;
use crate::config::Config;

/// Slowest upload rate still treated as progress (512 kbit/s)
pub const MIN_UPLOAD_BYTES_PER_SEC: u64 = 64 * 1024;

/// Something that can store bytes remotely and hand back a URL
pub trait FileStore {
    fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Short-lived token for the fal CDN
#[derive(Debug, Deserialize)]
pub struct CdnToken {
    pub token: String,
    pub token_type: String,
    pub base_url: String,
    pub expires_at: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct CdnUploadResponse {
    pub access_url: Option<String>,
}

#[derive(Clone)]
pub struct FalClient {
    client: reqwest::Client,
    api_key: String,
    rest_url: String,
    timeout: Duration,
}

impl FalClient {
    pub fn new(config: &Config) -> Result<Self> {
        let user_agent = format!("fal-uploader/{}", env!("CARGO_PKG_VERSION"));

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: config.fal_key.clone(),
            rest_url: config.rest_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Deadline for sending `len` bytes: the base timeout plus the time the
    /// body needs at [`MIN_UPLOAD_BYTES_PER_SEC`]
    pub fn upload_timeout(&self, len: usize) -> Duration {
        let transfer = (len as u64).div_ceil(MIN_UPLOAD_BYTES_PER_SEC);
        self.timeout + Duration::from_secs(transfer)
    }

    fn token_url(&self) -> String {
        format!(
            "{}/storage/auth/token?storage_type=fal-cdn-v3",
            self.rest_url
        )
    }

    /// Exchange the API key for a CDN upload token
    pub async fn fetch_token(&self) -> Result<CdnToken> {
        let response = self
            .client
            .post(self.token_url())
            .header("Authorization", format!("Key {}", self.api_key))
            .timeout(self.timeout)
            .json(&serde_json::json!({}))
            .send()
            .await
            .context("Failed to reach fal token endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Token request failed with status {}: {}", status, text);
        }

        let token: CdnToken = response
            .json()
            .await
            .context("Failed to parse fal token response")?;
        Ok(token)
    }

    async fn upload_bytes(&self, data: Vec<u8>, content_type: &str) -> Result<String> {
        let token = self.fetch_token().await?;
        let url = format!("{}/files/upload", token.base_url.trim_end_matches('/'));
        let file_name = format!("upload.{}", extension_for(content_type));
        let timeout = self.upload_timeout(data.len());

        debug!(
            "Uploading {} bytes to {} (timeout {:?})",
            data.len(),
            url,
            timeout
        );

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("{} {}", token.token_type, token.token),
            )
            .header("Content-Type", content_type)
            .header("X-Fal-File-Name", file_name)
            .timeout(timeout)
            .body(data)
            .send()
            .await
            .context("Failed to reach fal CDN")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Upload failed with status {}: {}", status, text);
        }

        let result: CdnUploadResponse = response
            .json()
            .await
            .context("Failed to parse fal upload response")?;

        result
            .access_url
            .context("fal upload response did not contain an access_url")
    }
}

impl FileStore for FalClient {
    async fn upload(&self, data: Vec<u8>, content_type: &str) -> Result<String> {
        self.upload_bytes(data, content_type).await
    }
}
