pub(crate) mod geo;
