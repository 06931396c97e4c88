use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::CloudinaryConfig;
use crate::utils::AppError;

/// Hosts uploaded images and hands back their public URL.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// `data` is a base64 data URI (`data:image/png;base64,...`) or a remote URL.
    async fn upload(&self, data: &str) -> Result<String, AppError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Signed uploads to the Cloudinary REST API.
pub struct CloudinaryUploader {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryUploader {
    pub fn new(config: CloudinaryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, config }
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        )
    }
}

/// SHA-256 signature over the signed parameters followed by the API secret.
pub(crate) fn sign_upload(timestamp: i64, api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("timestamp={}{}", timestamp, api_secret));
    hex::encode(hasher.finalize())
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, data: &str) -> Result<String, AppError> {
        let timestamp = Utc::now().timestamp();
        let signature = sign_upload(timestamp, &self.config.api_secret);
        let timestamp = timestamp.to_string();

        log::info!("☁️  Uploading image to Cloudinary ({} bytes)", data.len());

        let response = self
            .client
            .post(self.upload_url())
            .form(&[
                ("file", data),
                ("api_key", self.config.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::MediaError(format!(
                "Cloudinary returned {}: {}",
                status, body
            )));
        }

        let uploaded: UploadResponse = response.json().await?;
        log::info!("✅ Image uploaded: {}", uploaded.secure_url);

        Ok(uploaded.secure_url)
    }
}
