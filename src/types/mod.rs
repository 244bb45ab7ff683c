pub(crate) mod post;
pub(crate) mod request;
pub(crate) mod response;
pub(crate) mod user;

pub(crate) use post::{Location, Post};
pub(crate) use user::{AuthorizedUser, Claims, User};
