pub mod config;
pub mod discovery;
pub mod errors;
pub mod models;
pub mod query;
pub mod routes;
pub mod source;
pub mod state;
