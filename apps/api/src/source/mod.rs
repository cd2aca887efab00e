//! Catalog sources: the data-fetch collaborator behind the filtering core.
//!
//! The core only depends on [`CatalogSource`]. Production uses
//! [`rest::RestCatalogClient`]; tests and fixtures use [`StaticCatalogSource`].

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Business, Skill};

pub mod rest;
pub mod store;

pub use rest::RestCatalogClient;
pub use store::{CatalogStore, RefreshOutcome};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Upstream unavailable after {retries} retries")]
    Exhausted { retries: u32 },
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// The full Business → Project → Task tree.
    async fn fetch_businesses(&self) -> Result<Vec<Business>, SourceError>;

    /// The global skill list offered in the skill selector.
    async fn fetch_skills(&self) -> Result<Vec<Skill>, SourceError>;
}

/// In-memory source serving a fixed catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    businesses: Vec<Business>,
    skills: Vec<Skill>,
}

impl StaticCatalogSource {
    pub fn new(businesses: Vec<Business>, skills: Vec<Skill>) -> Self {
        Self { businesses, skills }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch_businesses(&self) -> Result<Vec<Business>, SourceError> {
        Ok(self.businesses.clone())
    }

    async fn fetch_skills(&self) -> Result<Vec<Skill>, SourceError> {
        Ok(self.skills.clone())
    }
}
