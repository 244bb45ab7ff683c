use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
pub(crate) struct Location {
    pub(crate) lat: f64,
    pub(crate) lon: f64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub(crate) struct Post {
    pub(crate) user: String,
    pub(crate) message: String,
    pub(crate) location: Location,
    #[serde(default)]
    pub(crate) url: String,
}
