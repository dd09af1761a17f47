//! Presence probing and URL derivation for blobs kept in the external
//! object store behind its CDN

use crate::config::ObjectStoreConfig;
use reqwest::StatusCode;

#[derive(Clone)]
pub struct ObjectStore {
    http: reqwest::Client,
    bucket: String,
    cdn_domain: String,
}

/// Result of a HEAD probe against a blob
pub struct ObjectPresence {
    pub present: bool,
    pub content_length: u32,
    pub url: String,
}

impl ObjectStore {
    pub fn new(config: &ObjectStoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            bucket: config.bucket.clone(),
            cdn_domain: config.cdn_domain.clone(),
        }
    }

    /// Public URL of the blob stored under the provided key
    pub fn object_url(&self, key: &str) -> String {
        format!("https://{}.{}/{}", self.bucket, self.cdn_domain, key)
    }

    /// Issues a HEAD for the blob. Any non-OK status reads as absent
    /// with a zero length.
    pub async fn probe(&self, key: &str) -> Result<ObjectPresence, reqwest::Error> {
        let url = self.object_url(key);
        let response = self.http.head(&url).send().await?;

        if response.status() != StatusCode::OK {
            return Ok(ObjectPresence {
                present: false,
                content_length: 0,
                url,
            });
        }

        let content_length = response.content_length().unwrap_or_default() as u32;
        Ok(ObjectPresence {
            present: true,
            content_length,
            url,
        })
    }
}
