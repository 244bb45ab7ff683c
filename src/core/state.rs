use std::sync::Arc;

use chrono::Duration;

use crate::controllers::post::PostController;
use crate::controllers::user::UserController;
use crate::storage::ImageStore;
use crate::store::{CredentialStore, PostStore};

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pub(crate) user_controller: UserController,
    pub(crate) post_controller: PostController,
}

impl AppState {
    pub(crate) fn new(
        credentials: Arc<dyn CredentialStore>,
        posts: Arc<dyn PostStore>,
        images: Arc<dyn ImageStore>,
        secret: &str,
        token_ttl: Duration,
        hash_cost: u32,
    ) -> Self {
        AppState {
            user_controller: UserController::new(credentials, secret, token_ttl, hash_cost),
            post_controller: PostController::new(posts, images),
        }
    }
}
