use serde::{Deserialize, Serialize};

pub(crate) type Username = String;

/// Credential record as it is kept in the document store.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub(crate) struct User {
    pub(crate) username: Username,
    pub(crate) password_hash: String,
}

/// Identity extracted from a verified bearer token.
#[derive(Clone, Debug)]
pub(crate) struct AuthorizedUser {
    pub(crate) username: Username,
}

#[derive(Deserialize, Serialize, Debug)]
pub(crate) struct Claims {
    pub(crate) username: Username,
    pub(crate) exp: usize,
    pub(crate) iat: usize,
}
