use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tokio::sync::RwLock;

use super::{CredentialStore, PostStore, StoreFuture};
use crate::core::error::Error;
use crate::types::{Location, Post, User};
use crate::utils::geo;

/// In-process document store for local runs and tests.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    posts: RwLock<HashMap<String, Post>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn find_user<'a>(&'a self, username: &'a str) -> StoreFuture<'a, Option<User>> {
        Box::pin(async move { Ok(self.users.read().await.get(username).cloned()) })
    }

    fn add_user<'a>(&'a self, user: &'a User) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            match self.users.write().await.entry(user.username.clone()) {
                Entry::Occupied(_) => Err(Error::UserAlreadyExists),
                Entry::Vacant(entry) => {
                    entry.insert(user.clone());
                    Ok(())
                }
            }
        })
    }
}

impl PostStore for MemoryStore {
    fn save_post<'a>(&'a self, id: &'a str, post: &'a Post) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.posts.write().await.insert(id.to_owned(), post.clone());
            Ok(())
        })
    }

    fn search_posts(&self, center: Location, range_km: f64) -> StoreFuture<'_, Vec<Post>> {
        Box::pin(async move {
            Ok(self
                .posts
                .read()
                .await
                .values()
                .filter(|post| geo::distance_km(&center, &post.location) <= range_km)
                .cloned()
                .collect())
        })
    }
}
