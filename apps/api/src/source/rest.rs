//! REST client for the matching backend: fetches the business catalog and the
//! global skill list.
//!
//! Retries on 429 and 5xx with exponential backoff. Other failures are
//! returned to the caller immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::discovery::skills::{normalize_skills, RawSkill};
use crate::models::{Business, Skill};
use crate::source::{CatalogSource, SourceError};

const BUSINESSES_PATH: &str = "/businesses";
const SKILLS_PATH: &str = "/skills";
const MAX_RETRIES: u32 = 3;

#[derive(Clone)]
pub struct RestCatalogClient {
    client: Client,
    base_url: String,
}

impl RestCatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let url = self.url(path);
        let mut last_error: Option<SourceError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "GET {} attempt {} failed, retrying after {}ms...",
                    url,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.get(&url).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(SourceError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Catalog backend returned {}: {}", status, body);
                last_error = Some(SourceError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(SourceError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let payload: T = response.json().await?;
            debug!("GET {} succeeded", url);
            return Ok(payload);
        }

        Err(last_error.unwrap_or(SourceError::Exhausted {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl CatalogSource for RestCatalogClient {
    async fn fetch_businesses(&self) -> Result<Vec<Business>, SourceError> {
        self.get_json(BUSINESSES_PATH).await
    }

    async fn fetch_skills(&self) -> Result<Vec<Skill>, SourceError> {
        let raw: Vec<RawSkill> = self.get_json(SKILLS_PATH).await?;
        Ok(normalize_skills(raw))
    }
}
