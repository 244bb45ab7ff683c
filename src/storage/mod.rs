//! Blob store seam for post images.

pub(crate) mod gcs;
pub(crate) mod memory;

use axum::body::Bytes;
use std::future::Future;
use std::pin::Pin;

use crate::core::error::Error;

/// An uploaded image as received from the client.
#[derive(Clone, Debug)]
pub(crate) struct Image {
    pub(crate) content_type: Option<String>,
    pub(crate) data: Bytes,
}

/// Handle to a stored, publicly readable object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StoredImage {
    pub(crate) name: String,
    pub(crate) url: String,
}

pub(crate) trait ImageStore: Send + Sync + 'static {
    /// Write `image` as object `name` into the configured bucket, make it
    /// public-read and return where it can be fetched. Fails if the bucket
    /// does not exist.
    fn save_image<'a>(
        &'a self,
        name: &'a str,
        image: Image,
    ) -> Pin<Box<dyn Future<Output = Result<StoredImage, Error>> + Send + 'a>>;
}
