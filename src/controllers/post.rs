use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::core::error::Error;
use crate::storage::{Image, ImageStore};
use crate::store::PostStore;
use crate::types::{Location, Post};

/// Radius used when a search does not name one; large enough to cover the globe.
pub(crate) const DEFAULT_RANGE_KM: f64 = 2_000_000.0;

#[derive(Clone)]
pub(crate) struct PostController {
    posts: Arc<dyn PostStore>,
    images: Arc<dyn ImageStore>,
}

impl std::fmt::Debug for PostController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostController").finish_non_exhaustive()
    }
}

impl PostController {
    pub(crate) fn new(posts: Arc<dyn PostStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { posts, images }
    }

    /// Store the image, then index the post pointing at it. Returns the post id.
    /// Nothing is indexed unless the image was saved.
    #[instrument(skip(self, message, image))]
    pub(crate) async fn create(
        &self,
        username: &str,
        message: String,
        location: Location,
        image: Option<Image>,
    ) -> Result<String, Error> {
        let image = image.ok_or(Error::MissingImage)?;

        let id = Uuid::new_v4().to_string();

        let stored = self.images.save_image(&id, image).await?;

        tracing::debug!("Image {} stored at {}", stored.name, stored.url);

        let post = Post {
            user: username.to_owned(),
            message,
            location,
            url: stored.url,
        };

        self.posts.save_post(&id, &post).await?;

        tracing::info!("Post {} saved", id);

        Ok(id)
    }

    /// Posts within `range_km` of `center` that have an image.
    #[instrument(skip(self))]
    pub(crate) async fn search(
        &self,
        center: Location,
        range_km: Option<f64>,
    ) -> Result<Vec<Post>, Error> {
        let range_km = range_km.unwrap_or(DEFAULT_RANGE_KM);

        let posts: Vec<Post> = self
            .posts
            .search_posts(center, range_km)
            .await?
            .into_iter()
            .filter(|post| !post.url.is_empty())
            .collect();

        tracing::info!("Found {} posts within {} km", posts.len(), range_km);

        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryImageStore;
    use crate::store::memory::MemoryStore;
    use axum::body::Bytes;

    fn image() -> Image {
        Image {
            content_type: Some("image/jpeg".into()),
            data: Bytes::from_static(b"jpeg"),
        }
    }

    fn here() -> Location {
        Location {
            lat: 10.0,
            lon: 20.0,
        }
    }

    #[tokio::test]
    async fn test_create_then_search() {
        let posts = PostController::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryImageStore::new("post-images".into())),
        );

        let id = posts
            .create("alice", "hello".into(), here(), Some(image()))
            .await
            .unwrap();

        let found = posts.search(here(), Some(1.0)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user, "alice");
        assert_eq!(found[0].message, "hello");
        assert_eq!(found[0].url, format!("memory://post-images/{id}"));
    }

    #[tokio::test]
    async fn test_create_without_image_indexes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let posts = PostController::new(
            store.clone(),
            Arc::new(MemoryImageStore::new("post-images".into())),
        );

        assert!(matches!(
            posts.create("alice", "hello".into(), here(), None).await,
            Err(Error::MissingImage)
        ));
        assert!(
            store
                .search_posts(here(), DEFAULT_RANGE_KM)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_failed_upload_indexes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let posts = PostController::new(
            store.clone(),
            Arc::new(MemoryImageStore::new(String::new())),
        );

        assert!(matches!(
            posts.create("alice", "hello".into(), here(), Some(image())).await,
            Err(Error::BucketNotFound(_))
        ));
        assert!(
            store
                .search_posts(here(), DEFAULT_RANGE_KM)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_search_skips_posts_without_url() {
        let store = Arc::new(MemoryStore::new());
        let posts = PostController::new(
            store.clone(),
            Arc::new(MemoryImageStore::new("post-images".into())),
        );

        let bare = Post {
            user: "bob".into(),
            message: "no image".into(),
            location: here(),
            url: String::new(),
        };
        store.save_post("bare", &bare).await.unwrap();

        assert!(posts.search(here(), None).await.unwrap().is_empty());
    }
}
