// Adapters layer: concrete implementations of the domain ports (model artifacts,
// storage, token issuing).

pub mod auth;
pub mod models;
pub mod store;
