use config::Config;
use serde::Deserialize;

use crate::core::error::ConfigError;

pub(crate) const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 << 20;

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct Args {
    pub(crate) port: u16,
    pub(crate) log_level: String,
    pub(crate) secret: String,
    pub(crate) token_ttl_hours: i64,
    pub(crate) document_store: String,
    pub(crate) elasticsearch_url: String,
    pub(crate) elasticsearch_username: Option<String>,
    pub(crate) elasticsearch_password: Option<String>,
    pub(crate) posts_index: String,
    pub(crate) users_index: String,
    pub(crate) max_search_results: u32,
    pub(crate) image_store: String,
    pub(crate) bucket: String,
    pub(crate) gcs_url: String,
    pub(crate) gcs_access_token: Option<String>,
    pub(crate) max_upload_bytes: usize,
}

/// Which adapter backs a store. `Remote` is Elasticsearch for documents and
/// Cloud Storage for images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Backend {
    Remote,
    Memory,
}

impl Backend {
    fn parse(value: &str, remote: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            v if v == remote => Ok(Backend::Remote),
            _ => Err(ConfigError::UnknownBackend(value.to_owned())),
        }
    }
}

impl Args {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("port", 8080)?
            .set_default("log_level", "info")?
            .set_default("token_ttl_hours", 24)?
            .set_default("document_store", "elasticsearch")?
            .set_default("elasticsearch_url", "http://localhost:9200")?
            .set_default("posts_index", "around")?
            .set_default("users_index", "around-users")?
            .set_default("max_search_results", 1000)?
            .set_default("image_store", "gcs")?
            .set_default("bucket", "post-images")?
            .set_default("gcs_url", "https://storage.googleapis.com")?
            .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as u64)?
            .add_source(config::File::with_name("around").required(false))
            .add_source(config::Environment::with_prefix("AROUND"))
            .build()?;

        let args = config.try_deserialize::<Args>()?;

        if args.secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        args.document_backend()?;
        args.image_backend()?;

        Ok(args)
    }

    pub(crate) fn document_backend(&self) -> Result<Backend, ConfigError> {
        Backend::parse(&self.document_store, "elasticsearch")
    }

    pub(crate) fn image_backend(&self) -> Result<Backend, ConfigError> {
        Backend::parse(&self.image_store, "gcs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        assert_eq!(
            Backend::parse("elasticsearch", "elasticsearch").unwrap(),
            Backend::Remote
        );
        assert_eq!(Backend::parse("GCS", "gcs").unwrap(), Backend::Remote);
        assert_eq!(Backend::parse("memory", "gcs").unwrap(), Backend::Memory);

        assert!(matches!(
            Backend::parse("bigtable", "elasticsearch"),
            Err(ConfigError::UnknownBackend(_))
        ));
        assert!(Backend::parse("gcs", "elasticsearch").is_err());
    }
}
