use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct Signup {
    pub(crate) result: &'static str,
}

impl Signup {
    pub(crate) fn success() -> Self {
        Self { result: "success" }
    }
}

#[derive(Serialize)]
pub(crate) struct Login {
    pub(crate) token: String,
}

impl Login {
    pub(crate) fn new(token: String) -> Self {
        Self { token }
    }
}
