//! Elasticsearch adapter over the REST API.
//!
//! Posts and users go to separate indices. Every write uses `refresh=true`
//! so it is visible to the next search issued after the call returns.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::instrument;

use super::{CredentialStore, PostStore, StoreFuture};
use crate::core::error::Error;
use crate::types::{Location, Post, User};
use crate::utils::geo;

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    took: u64,
    hits: Hits<T>,
}

#[derive(Debug, Deserialize)]
struct Hits<T> {
    hits: Vec<Hit<T>>,
}

#[derive(Debug, Deserialize)]
struct Hit<T> {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: T,
}

#[derive(Clone)]
pub(crate) struct ElasticClient {
    client: reqwest::Client,
    url: String,
    credentials: Option<(String, Option<String>)>,
    posts_index: String,
    users_index: String,
    max_results: u32,
}

impl std::fmt::Debug for ElasticClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticClient")
            .field("url", &self.url)
            .field("posts_index", &self.posts_index)
            .field("users_index", &self.users_index)
            .finish()
    }
}

impl ElasticClient {
    pub(crate) fn new(
        client: reqwest::Client,
        url: &str,
        username: Option<String>,
        password: Option<String>,
        posts_index: String,
        users_index: String,
        max_results: u32,
    ) -> Self {
        Self {
            client,
            url: url.trim_end_matches('/').to_owned(),
            credentials: username.map(|username| (username, password)),
            posts_index,
            users_index,
            max_results,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}/{}", self.url, path));

        match &self.credentials {
            Some((username, password)) => builder.basic_auth(username, password.as_ref()),
            None => builder,
        }
    }

    /// Create both indices with their mappings when they do not exist yet.
    pub(crate) async fn ensure_indices(&self) -> Result<(), Error> {
        self.ensure_index(&self.posts_index, posts_mapping()).await?;
        self.ensure_index(&self.users_index, users_mapping()).await
    }

    #[instrument(skip(self, mapping))]
    async fn ensure_index(&self, index: &str, mapping: Value) -> Result<(), Error> {
        let resp = self.request(Method::HEAD, index).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => (),
            status if status.is_success() => return Ok(()),
            status => {
                return Err(Error::DocumentStore(format!(
                    "checking index {index} returned {status}"
                )));
            }
        }

        tracing::info!("Creating index {}", index);

        self.request(Method::PUT, index)
            .json(&mapping)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn search<T: DeserializeOwned>(
        &self,
        index: &str,
        body: &Value,
    ) -> Result<SearchResponse<T>, Error> {
        let resp = self
            .request(Method::POST, &format!("{index}/_search"))
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::DocumentStore(format!(
                "search on {index} returned {status}: {text}"
            )));
        }

        Ok(resp.json::<SearchResponse<T>>().await?)
    }
}

fn posts_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "user": { "type": "keyword" },
                "message": { "type": "text" },
                "location": { "type": "geo_point" },
                "url": { "type": "keyword" }
            }
        }
    })
}

fn users_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "username": { "type": "keyword" },
                "password_hash": { "type": "keyword", "index": false }
            }
        }
    })
}

fn user_query(username: &str) -> Value {
    json!({
        "size": 1,
        "query": {
            "term": { "username": username }
        }
    })
}

fn geo_distance_query(center: Location, range_km: f64, size: u32) -> Value {
    json!({
        "size": size,
        "query": {
            "bool": {
                "filter": {
                    "geo_distance": {
                        "distance": geo::format_km(range_km),
                        "location": { "lat": center.lat, "lon": center.lon }
                    }
                }
            }
        }
    })
}

impl CredentialStore for ElasticClient {
    fn find_user<'a>(&'a self, username: &'a str) -> StoreFuture<'a, Option<User>> {
        Box::pin(async move {
            let resp = self
                .search::<User>(&self.users_index, &user_query(username))
                .await?;

            Ok(resp
                .hits
                .hits
                .into_iter()
                .map(|hit| hit.source)
                .find(|user| user.username == username))
        })
    }

    fn add_user<'a>(&'a self, user: &'a User) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let resp = self
                .request(
                    Method::PUT,
                    &format!("{}/_create/{}", self.users_index, encode(&user.username)),
                )
                .query(&[("refresh", "true")])
                .json(user)
                .send()
                .await?;

            match resp.status() {
                StatusCode::CONFLICT => Err(Error::UserAlreadyExists),
                status if status.is_success() => Ok(()),
                status => Err(Error::DocumentStore(format!(
                    "creating user returned {status}"
                ))),
            }
        })
    }
}

impl PostStore for ElasticClient {
    fn save_post<'a>(&'a self, id: &'a str, post: &'a Post) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.request(
                Method::PUT,
                &format!("{}/_doc/{}", self.posts_index, encode(id)),
            )
            .query(&[("refresh", "true")])
            .json(post)
            .send()
            .await?
            .error_for_status()?;

            tracing::debug!("Post {} saved to index {}", id, self.posts_index);

            Ok(())
        })
    }

    fn search_posts(&self, center: Location, range_km: f64) -> StoreFuture<'_, Vec<Post>> {
        Box::pin(async move {
            let query = geo_distance_query(center, range_km, self.max_results);
            let resp = self.search::<Post>(&self.posts_index, &query).await?;

            tracing::debug!(
                "Query took {} ms, {} hits within {}",
                resp.took,
                resp.hits.hits.len(),
                geo::format_km(range_km)
            );

            Ok(resp
                .hits
                .hits
                .into_iter()
                .map(|hit| {
                    tracing::trace!("hit {}", hit.id);
                    hit.source
                })
                .collect())
        })
    }
}

fn encode(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment, percent_encoding::NON_ALPHANUMERIC).to_string()
}
