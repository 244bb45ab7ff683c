use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::RwLock;

use super::{Image, ImageStore, StoredImage};
use crate::core::error::Error;

/// In-process image store. Objects are addressed as `memory://{bucket}/{name}`.
#[derive(Debug)]
pub(crate) struct MemoryImageStore {
    bucket: String,
    objects: RwLock<HashMap<String, Image>>,
}

impl MemoryImageStore {
    pub(crate) fn new(bucket: String) -> Self {
        Self {
            bucket,
            objects: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

impl ImageStore for MemoryImageStore {
    fn save_image<'a>(
        &'a self,
        name: &'a str,
        image: Image,
    ) -> Pin<Box<dyn Future<Output = Result<StoredImage, Error>> + Send + 'a>> {
        Box::pin(async move {
            if self.bucket.is_empty() {
                return Err(Error::BucketNotFound(self.bucket.clone()));
            }

            self.objects.write().await.insert(name.to_owned(), image);

            Ok(StoredImage {
                name: name.to_owned(),
                url: format!("memory://{}/{}", self.bucket, name),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    fn image() -> Image {
        Image {
            content_type: Some("image/png".into()),
            data: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[tokio::test]
    async fn test_save_image_returns_url() {
        let store = MemoryImageStore::new("post-images".into());

        let stored = store.save_image("abc", image()).await.unwrap();
        assert_eq!(stored.name, "abc");
        assert_eq!(stored.url, "memory://post-images/abc");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_missing_bucket() {
        let store = MemoryImageStore::new(String::new());

        assert!(matches!(
            store.save_image("abc", image()).await,
            Err(Error::BucketNotFound(_))
        ));
    }
}
