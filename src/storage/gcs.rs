//! Google Cloud Storage adapter over the JSON API.
//!
//! Saving an image takes four calls: bucket lookup, media upload, an
//! `allUsers:READER` ACL entry, and a metadata read for the `mediaLink`.
//! Any failing step aborts the save.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{Image, ImageStore, StoredImage};
use crate::core::error::Error;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh this long before the token actually expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct GcsObject {
    name: String,
    #[serde(rename = "mediaLink")]
    media_link: Option<String>,
}

#[derive(Debug, Serialize)]
struct AclEntry<'a> {
    entity: &'a str,
    role: &'a str,
}

const PUBLIC_READ: AclEntry<'static> = AclEntry {
    entity: "allUsers",
    role: "READER",
};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    access_token: String,
    expiry: Instant,
}

pub(crate) struct GcsClient {
    client: reqwest::Client,
    url: String,
    bucket: String,
    static_token: Option<String>,
    token_cache: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for GcsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsClient")
            .field("url", &self.url)
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl GcsClient {
    pub(crate) fn new(
        client: reqwest::Client,
        url: &str,
        bucket: String,
        static_token: Option<String>,
    ) -> Self {
        Self {
            client,
            url: url.trim_end_matches('/').to_owned(),
            bucket,
            static_token,
            token_cache: Mutex::new(None),
        }
    }

    fn bucket_url(&self) -> String {
        format!("{}/storage/v1/b/{}", self.url, encode(&self.bucket))
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}/o/{}", self.bucket_url(), encode(name))
    }

    fn upload_url(&self, name: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.url,
            encode(&self.bucket),
            encode(name)
        )
    }

    async fn access_token(&self) -> Result<String, Error> {
        if let Some(token) = &self.static_token {
            return Ok(token.clone());
        }

        let mut cache = self.token_cache.lock().await;

        if let Some(cached) = cache.as_ref()
            && cached.expiry > Instant::now()
        {
            return Ok(cached.access_token.clone());
        }

        let token = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .timeout(Duration::from_secs(5))
            .send()
            .await?
            .error_for_status()?
            .json::<TokenResponse>()
            .await?;

        let expiry = Instant::now()
            + Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);

        *cache = Some(CachedToken {
            access_token: token.access_token.clone(),
            expiry,
        });

        Ok(token.access_token)
    }

    async fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, Error> {
        Ok(builder.bearer_auth(self.access_token().await?))
    }

    async fn check_bucket(&self) -> Result<(), Error> {
        let resp = self
            .authorized(self.client.get(self.bucket_url()))
            .await?
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(Error::BucketNotFound(self.bucket.clone())),
            status => Err(gcs_error("bucket lookup", status, resp).await),
        }
    }

    async fn upload(&self, name: &str, image: Image) -> Result<GcsObject, Error> {
        let content_type = image
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_owned());

        let resp = self
            .authorized(self.client.post(self.upload_url(name)))
            .await?
            .header(CONTENT_TYPE, content_type)
            .body(image.data)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(gcs_error("upload", resp.status(), resp).await);
        }

        Ok(resp.json::<GcsObject>().await?)
    }

    async fn make_public(&self, name: &str) -> Result<(), Error> {
        let resp = self
            .authorized(self.client.post(format!("{}/acl", self.object_url(name))))
            .await?
            .json(&PUBLIC_READ)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(gcs_error("acl", resp.status(), resp).await);
        }

        Ok(())
    }

    async fn attrs(&self, name: &str) -> Result<GcsObject, Error> {
        let resp = self
            .authorized(self.client.get(self.object_url(name)))
            .await?
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(gcs_error("attrs", resp.status(), resp).await);
        }

        Ok(resp.json::<GcsObject>().await?)
    }
}

impl ImageStore for GcsClient {
    fn save_image<'a>(
        &'a self,
        name: &'a str,
        image: Image,
    ) -> Pin<Box<dyn Future<Output = Result<StoredImage, Error>> + Send + 'a>> {
        Box::pin(async move {
            self.check_bucket().await?;

            let uploaded = self.upload(name, image).await?;
            self.make_public(&uploaded.name).await?;

            let attrs = self.attrs(&uploaded.name).await?;
            let url = attrs
                .media_link
                .ok_or_else(|| Error::Storage(format!("object {} has no media link", attrs.name)))?;

            tracing::info!("Image saved to GCS: {}", url);

            Ok(StoredImage {
                name: attrs.name,
                url,
            })
        })
    }
}

async fn gcs_error(context: &str, status: StatusCode, resp: reqwest::Response) -> Error {
    let body = resp.text().await.unwrap_or_default();
    Error::Storage(format!("GCS {context}: HTTP {status} - {body}"))
}

fn encode(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment, percent_encoding::NON_ALPHANUMERIC).to_string()
}
