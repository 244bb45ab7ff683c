use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{Response, header};
use axum::middleware::Next;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::store::CredentialStore;
use crate::types::{AuthorizedUser, Claims, User};

#[derive(Clone)]
pub(crate) struct UserController {
    store: Arc<dyn CredentialStore>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    hash_cost: u32,
}

impl std::fmt::Debug for UserController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserController")
            .field("token_ttl", &self.token_ttl)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

impl UserController {
    pub(crate) fn new(
        store: Arc<dyn CredentialStore>,
        secret: &str,
        token_ttl: Duration,
        hash_cost: u32,
    ) -> Self {
        Self {
            store,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
            hash_cost,
        }
    }

    /// True only if a record for `username` exists and `password` matches it.
    /// Store failures count as a mismatch.
    #[instrument(skip(self, password))]
    pub(crate) async fn check_user(&self, username: &str, password: &str) -> bool {
        let user = match self.store.find_user(username).await {
            Ok(Some(user)) => user,
            Ok(None) => return false,
            Err(e) => {
                tracing::error!("Credential lookup failed: {:?}", e);
                return false;
            }
        };

        match bcrypt::verify(password, &user.password_hash) {
            Ok(matches) => matches && user.username == username,
            Err(e) => {
                tracing::error!("Stored hash for {} is unusable: {:?}", username, e);
                false
            }
        }
    }

    #[instrument(skip(self, password))]
    pub(crate) async fn add_user(&self, username: &str, password: &str) -> Result<(), Error> {
        if self.store.find_user(username).await?.is_some() {
            tracing::info!("User {} exists, cannot create duplicate user", username);
            return Err(Error::UserAlreadyExists);
        }

        let user = User {
            username: username.to_owned(),
            password_hash: self.hash(password)?,
        };

        self.store.add_user(&user).await?;

        tracing::info!("User {} added", username);

        Ok(())
    }

    pub(crate) async fn register(&self, username: &str, password: &str) -> Result<(), Error> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::EmptyCredentials);
        }

        self.add_user(username, password).await
    }

    pub(crate) async fn login(&self, username: &str, password: &str) -> Result<String, Error> {
        if !self.check_user(username, password).await {
            tracing::info!("Invalid password or username for {}", username);
            return Err(Error::InvalidCredentials);
        }

        self.encode_jwt(username)
    }

    fn hash(&self, value: &str) -> Result<String, Error> {
        bcrypt::hash(value, self.hash_cost).map_err(Error::Bcrypt)
    }

    pub(crate) fn encode_jwt(&self, username: &str) -> Result<String, Error> {
        let current_time = Utc::now();
        let expiration_time = current_time + self.token_ttl;

        let claims = Claims {
            username: username.to_owned(),
            exp: expiration_time.timestamp() as usize,
            iat: current_time.timestamp() as usize,
        };

        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding_key,
        )?)
    }

    pub(crate) fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, Error> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => Ok(token_data),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(Error::ExpiredJWT),
                _ => Err(Error::Jwt(e)),
            },
        }
    }
}

/// Rejects the request unless it carries a valid `Bearer` token; on success
/// the token's user is available to the handler as `Extension<AuthorizedUser>`.
pub(crate) async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(Error::NoCredentials)?;

    let mut header = auth_header.to_str()?.split_whitespace();

    let token = match (header.next(), header.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => return Err(Error::NoCredentials),
    };

    let token_data = state.user_controller.decode_jwt(token)?;

    request.extensions_mut().insert(AuthorizedUser {
        username: token_data.claims.username,
    });

    Ok(next.run(request).await)
}
