//! Cloudinary image hosting client.
//!
//! Product images are uploaded server-side: the handler receives the raw
//! bytes, this client base64-encodes them into a data URI, signs the
//! request with the API secret, and returns the hosted URL.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::multipart;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use thiserror::Error;

use crate::config::CloudinaryConfig;

/// Errors that can occur when uploading images.
#[derive(Debug, Error)]
pub enum CloudinaryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Cloudinary returned an error response.
    #[error("upload error: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Cloudinary upload client.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    /// Create a new Cloudinary client.
    #[must_use]
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    /// Upload image bytes and return the hosted HTTPS URL.
    ///
    /// # Errors
    ///
    /// Returns `CloudinaryError` on network failure or a rejected upload.
    pub async fn upload(&self, bytes: &[u8], content_type: &str) -> Result<String, CloudinaryError> {
        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        );

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_upload(
            &self.config.folder,
            &timestamp,
            self.config.api_secret.expose_secret(),
        );

        let data_uri = format!("data:{content_type};base64,{}", BASE64.encode(bytes));

        let form = multipart::Form::new()
            .text("file", data_uri)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature", signature);

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CloudinaryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        Ok(body.secure_url)
    }
}

/// Compute the Cloudinary request signature: SHA-1 over the
/// alphabetically-sorted signed parameters concatenated with the API
/// secret, hex-encoded.
fn sign_upload(folder: &str, timestamp: &str, api_secret: &str) -> String {
    let to_sign = format!("folder={folder}&timestamp={timestamp}{api_secret}");
    let digest = Sha1::digest(to_sign.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_hex_sha1() {
        let sig = sign_upload("farmlink", "1700000000", "shhh");
        assert_eq!(sig.len(), 40);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let a = sign_upload("farmlink", "1700000000", "shhh");
        let b = sign_upload("farmlink", "1700000000", "shhh");
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_depends_on_every_input() {
        let base = sign_upload("farmlink", "1700000000", "shhh");
        assert_ne!(base, sign_upload("other", "1700000000", "shhh"));
        assert_ne!(base, sign_upload("farmlink", "1700000001", "shhh"));
        assert_ne!(base, sign_upload("farmlink", "1700000000", "hush"));
    }

    #[test]
    fn test_upload_response_parses_secure_url() {
        let json = r#"{
            "public_id": "farmlink/abc",
            "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/farmlink/abc.jpg",
            "url": "http://res.cloudinary.com/demo/image/upload/v1/farmlink/abc.jpg"
        }"#;
        let body: UploadResponse = serde_json::from_str(json).unwrap();
        assert!(body.secure_url.starts_with("https://"));
    }
}
