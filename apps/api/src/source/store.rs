use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{info, warn};

use crate::discovery::snapshot::CatalogSnapshot;
use crate::query::refresh::RefreshGuard;
use crate::source::{CatalogSource, SourceError};

/// The service's current catalog generation plus guarded refresh.
pub struct CatalogStore {
    current: RwLock<Arc<CatalogSnapshot>>,
    refresh: RefreshGuard,
    source: Arc<dyn CatalogSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    /// False when a newer refresh started before this one resolved.
    pub applied: bool,
    /// Generation being served after this refresh.
    pub generation: u64,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            current: RwLock::new(Arc::new(CatalogSnapshot::empty())),
            refresh: RefreshGuard::new(),
            source,
        }
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Fetches businesses and skills, then swaps in a new snapshot unless a
    /// newer refresh has started in the meantime.
    pub async fn refresh(&self) -> Result<RefreshOutcome, SourceError> {
        let ticket = self.refresh.begin();
        let (businesses, skills) =
            tokio::try_join!(self.source.fetch_businesses(), self.source.fetch_skills())?;

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if !self.refresh.is_current(ticket) {
            warn!(
                generation = ticket.generation(),
                serving = current.generation,
                "discarding superseded catalog refresh"
            );
            return Ok(RefreshOutcome {
                applied: false,
                generation: current.generation,
            });
        }

        let snapshot = CatalogSnapshot::new(ticket.generation(), businesses, skills);
        info!(
            generation = snapshot.generation,
            businesses = snapshot.businesses.len(),
            skills = snapshot.skills.len(),
            "catalog snapshot committed"
        );
        *current = Arc::new(snapshot);

        Ok(RefreshOutcome {
            applied: true,
            generation: ticket.generation(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::{oneshot, Mutex};

    use crate::models::{Business, EntityId, Skill};
    use crate::source::StaticCatalogSource;

    fn make_business(id: i64, name: &str) -> Business {
        Business {
            id: EntityId::Num(id),
            name: name.to_string(),
            location: None,
            sector: None,
            company_size: None,
            projects: vec![],
        }
    }

    /// Hands out catalogs in the order the test releases them.
    struct GatedSource {
        gates: Mutex<Vec<oneshot::Receiver<Vec<Business>>>>,
    }

    #[async_trait]
    impl CatalogSource for GatedSource {
        async fn fetch_businesses(&self) -> Result<Vec<Business>, SourceError> {
            let gate = self.gates.lock().await.remove(0);
            Ok(gate.await.unwrap_or_default())
        }

        async fn fetch_skills(&self) -> Result<Vec<Skill>, SourceError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_refresh_commits_new_generation() {
        let source = StaticCatalogSource::new(
            vec![make_business(1, "Acme")],
            vec![Skill::new(1, "Rust")],
        );
        let store = CatalogStore::new(Arc::new(source));
        assert_eq!(store.snapshot().generation, 0);

        let outcome = store.refresh().await.unwrap();
        assert_eq!(
            outcome,
            RefreshOutcome {
                applied: true,
                generation: 1
            }
        );
        let snapshot = store.snapshot();
        assert_eq!(snapshot.businesses.len(), 1);
        assert_eq!(snapshot.skills.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_completion_keeps_newer_state() {
        let (release_first, first_gate) = oneshot::channel();
        let (release_second, second_gate) = oneshot::channel();
        let store = CatalogStore::new(Arc::new(GatedSource {
            gates: Mutex::new(vec![first_gate, second_gate]),
        }));

        // Start the first refresh and leave it parked on its fetch.
        let first = store.refresh();
        tokio::pin!(first);
        assert!(tokio::time::timeout(Duration::from_millis(10), &mut first)
            .await
            .is_err());

        release_second
            .send(vec![make_business(2, "Newer")])
            .unwrap();
        let second = store.refresh().await.unwrap();
        assert_eq!(
            second,
            RefreshOutcome {
                applied: true,
                generation: 2
            }
        );

        release_first
            .send(vec![make_business(1, "Older")])
            .unwrap();
        let first = first.await.unwrap();
        assert_eq!(
            first,
            RefreshOutcome {
                applied: false,
                generation: 2
            }
        );

        let snapshot = store.snapshot();
        assert_eq!(snapshot.generation, 2);
        assert_eq!(snapshot.businesses[0].name, "Newer");
    }
}
