//! Document store seam.
//!
//! Users and posts both live in an external search engine. The traits here
//! describe the two views the service needs of it; [`elastic`] talks to a real
//! Elasticsearch cluster and [`memory`] keeps everything in process.

pub(crate) mod elastic;
pub(crate) mod memory;

use std::future::Future;
use std::pin::Pin;

use crate::core::error::Error;
use crate::types::{Location, Post, User};

pub(crate) type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 'a>>;

/// Credential records keyed by username.
pub(crate) trait CredentialStore: Send + Sync + 'static {
    /// Exact-match lookup on the username term.
    fn find_user<'a>(&'a self, username: &'a str) -> StoreFuture<'a, Option<User>>;

    /// Create-only write keyed by username. Fails with
    /// [`Error::UserAlreadyExists`] when a record with that key is present,
    /// so two concurrent signups can never both succeed.
    fn add_user<'a>(&'a self, user: &'a User) -> StoreFuture<'a, ()>;
}

/// Geo-tagged posts keyed by a generated identifier.
pub(crate) trait PostStore: Send + Sync + 'static {
    /// Index `post` under `id`. The write is visible to searches as soon as
    /// the returned future resolves.
    fn save_post<'a>(&'a self, id: &'a str, post: &'a Post) -> StoreFuture<'a, ()>;

    /// Every stored post whose location lies within `range_km` of `center`.
    fn search_posts(&self, center: Location, range_km: f64) -> StoreFuture<'_, Vec<Post>>;
}
