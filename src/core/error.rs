use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::http::header::ToStrError;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Signing secret must not be empty")]
    EmptySecret,
    #[error("Unknown store backend: {0}")]
    UnknownBackend(String),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Reqwest error: {0}")]
    HTTPClient(#[from] reqwest::Error),
    #[error("Index bootstrap failed: {0}")]
    Bootstrap(#[from] Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Reqwest error: {0}")]
    HTTPClient(#[from] reqwest::Error),
    #[error("Header decode error: {0}")]
    HeaderDecode(#[from] ToStrError),
    #[error("Invalid JSON body: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("Invalid query: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Invalid multipart body: {0}")]
    MultipartRejection(#[from] MultipartRejection),
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
    #[error("Empty password or username")]
    EmptyCredentials,
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("Invalid password or username")]
    InvalidCredentials,
    #[error("No credentials provided")]
    NoCredentials,
    #[error("Expired JWT")]
    ExpiredJWT,
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Image is not available")]
    MissingImage,
    #[error("Bucket {0} does not exist")]
    BucketNotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Document store error: {0}")]
    DocumentStore(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("{:?}", self);

        let (status, message) = match self {
            Error::HTTPClient(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Reqwest error"),
            Error::HeaderDecode(_) => (StatusCode::UNAUTHORIZED, "Header decode error"),
            Error::JsonRejection(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Invalid JSON body"),
            Error::QueryRejection(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Invalid query parameters")
            }
            Error::MultipartRejection(_) | Error::Multipart(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Invalid multipart body")
            }
            Error::MalformedRequest(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Malformed request"),
            Error::EmptyCredentials => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Empty password or username")
            }
            Error::UserAlreadyExists => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to add a new user: username already exists",
            ),
            Error::InvalidCredentials => (StatusCode::FORBIDDEN, "Invalid password or username"),
            Error::NoCredentials => (StatusCode::UNAUTHORIZED, "No credentials provided"),
            Error::ExpiredJWT => (StatusCode::UNAUTHORIZED, "Expired token"),
            Error::Jwt(_) => (StatusCode::UNAUTHORIZED, "Invalid token"),
            Error::Bcrypt(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Bcrypt error"),
            Error::MissingImage => (StatusCode::INTERNAL_SERVER_ERROR, "Image is not available"),
            Error::BucketNotFound(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Image bucket is not available")
            }
            Error::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save image"),
            Error::DocumentStore(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Document store error"),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (Error::InvalidCredentials, StatusCode::FORBIDDEN),
            (Error::NoCredentials, StatusCode::UNAUTHORIZED),
            (Error::ExpiredJWT, StatusCode::UNAUTHORIZED),
            (Error::EmptyCredentials, StatusCode::INTERNAL_SERVER_ERROR),
            (Error::UserAlreadyExists, StatusCode::INTERNAL_SERVER_ERROR),
            (Error::MissingImage, StatusCode::INTERNAL_SERVER_ERROR),
            (
                Error::BucketNotFound("images".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::MalformedRequest("lat".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
