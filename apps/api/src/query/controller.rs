//! Debounced Query Controller: sits between raw UI events and the filter
//! engine.
//!
//! - Keystrokes are debounced: only the last text typed within the quiet
//!   period is committed, producing one filter pass.
//! - Clearing the search commits immediately and cancels any pending timer.
//! - Criteria changes (pills, dropdowns, tabs) replace the criteria wholesale
//!   and recompute right away.
//! - A new catalog snapshot always triggers a recompute, so a catalog that
//!   arrives after typing started is still reflected.
//! - Skill-list refreshes are generation-guarded: a refresh that resolves after
//!   a newer one started is discarded.
//!
//! Results are published on a `watch` channel; subscribers always see the
//! latest outcome.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::discovery::snapshot::{CatalogSnapshot, FilterOutcome};
use crate::models::{FilterCriteria, Skill, SkillId, WorkingSet};
use crate::query::debounce::Debouncer;
use crate::query::refresh::{RefreshGuard, RefreshTicket};
use crate::source::{CatalogSource, SourceError};

/// Default quiet period before typed search text is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub debounce: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

struct QueryState {
    snapshot: Arc<CatalogSnapshot>,
    criteria: FilterCriteria,
    working_set: WorkingSet,
    student_skill_ids: HashSet<SkillId>,
    available_skills: Vec<Skill>,
}

struct Shared {
    state: Mutex<QueryState>,
    outcome: watch::Sender<FilterOutcome>,
    passes: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `change` and publishes the resulting filter pass. The state
    /// lock is held until the outcome is sent, so passes publish in the same
    /// order as the changes they reflect.
    fn update(&self, change: impl FnOnce(&mut QueryState)) {
        let mut state = self.lock();
        change(&mut state);
        let outcome = state.snapshot.evaluate(
            &state.criteria,
            &state.working_set,
            &state.student_skill_ids,
            Utc::now().date_naive(),
        );
        let pass = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            pass,
            businesses = outcome.businesses.len(),
            generation = outcome.generation,
            "filter pass committed"
        );
        self.outcome.send_replace(outcome);
    }

    fn commit_search(&self, text: String) {
        self.update(|state| state.criteria.search_text = text);
    }
}

pub struct QueryController {
    shared: Arc<Shared>,
    debouncer: Debouncer,
    skill_refresh: RefreshGuard,
}

impl QueryController {
    pub fn new(config: QueryConfig) -> Self {
        let (outcome, _) = watch::channel(FilterOutcome::default());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueryState {
                    snapshot: Arc::new(CatalogSnapshot::empty()),
                    criteria: FilterCriteria::default(),
                    working_set: WorkingSet::default(),
                    student_skill_ids: HashSet::new(),
                    available_skills: Vec::new(),
                }),
                outcome,
                passes: AtomicU64::new(0),
            }),
            debouncer: Debouncer::new(config.debounce),
            skill_refresh: RefreshGuard::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterOutcome> {
        self.shared.outcome.subscribe()
    }

    pub fn outcome(&self) -> FilterOutcome {
        self.shared.outcome.borrow().clone()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.shared.lock().criteria.clone()
    }

    pub fn available_skills(&self) -> Vec<Skill> {
        self.shared.lock().available_skills.clone()
    }

    /// Number of filter passes committed so far.
    pub fn passes(&self) -> u64 {
        self.shared.passes.load(Ordering::SeqCst)
    }

    pub fn has_pending_search(&self) -> bool {
        self.debouncer.is_pending()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Input events
    // ────────────────────────────────────────────────────────────────────────

    /// A keystroke in the search box. Commits after the quiet period unless
    /// another keystroke arrives first.
    pub fn type_search(&mut self, text: impl Into<String>) {
        let text = text.into();
        let shared = Arc::clone(&self.shared);
        self.debouncer.schedule(async move {
            shared.commit_search(text);
        });
    }

    /// Explicit clear: bypasses the debounce.
    pub fn clear_search(&mut self) {
        if self.debouncer.cancel() {
            debug!("pending search commit cancelled by clear");
        }
        self.shared.commit_search(String::new());
    }

    /// Replaces the criteria wholesale and recomputes. A search commit that is
    /// still pending will land on top of these criteria.
    pub fn apply_criteria(&self, criteria: FilterCriteria) {
        self.shared.update(|state| state.criteria = criteria);
    }

    pub fn set_working_set(&self, working_set: WorkingSet) {
        self.shared.update(|state| state.working_set = working_set);
    }

    pub fn set_student_skills(&self, skill_ids: HashSet<SkillId>) {
        self.shared.update(|state| state.student_skill_ids = skill_ids);
    }

    /// A new catalog generation arrived.
    pub fn set_snapshot(&self, snapshot: Arc<CatalogSnapshot>) {
        self.shared.update(|state| state.snapshot = snapshot);
    }

    // ────────────────────────────────────────────────────────────────────────
    // Skill-list refresh
    // ────────────────────────────────────────────────────────────────────────

    pub fn begin_skill_refresh(&self) -> RefreshTicket {
        self.skill_refresh.begin()
    }

    /// Applies a fetched skill list if `ticket` is still the newest refresh.
    /// Returns whether it was applied.
    pub fn complete_skill_refresh(&self, ticket: RefreshTicket, skills: Vec<Skill>) -> bool {
        let mut state = self.shared.lock();
        if !self.skill_refresh.is_current(ticket) {
            warn!(
                generation = ticket.generation(),
                "discarding superseded skill list refresh"
            );
            return false;
        }
        state.available_skills = skills;
        true
    }

    pub async fn refresh_skills(&self, source: &dyn CatalogSource) -> Result<bool, SourceError> {
        let ticket = self.begin_skill_refresh();
        let skills = source.fetch_skills().await?;
        Ok(self.complete_skill_refresh(ticket, skills))
    }
}

impl Drop for QueryController {
    fn drop(&mut self) {
        // Nothing fetched for this controller may land after teardown.
        self.skill_refresh.invalidate();
    }
}
