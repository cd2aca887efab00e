use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::discovery::diagnostics::compose_empty_message;
use crate::discovery::facets::{build_facets, theme_names, FacetIndex, ThemeNames};
use crate::discovery::filter::{filter_catalog, FilterInput};
use crate::discovery::stats::{compute_stats, CatalogStats};
use crate::models::{Business, FilterCriteria, Skill, SkillId, WorkingSet};

/// One generation of the catalog together with everything derived from it.
/// The facet index and theme lookup are built here and nowhere else, so they
/// change exactly when the catalog does.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub generation: u64,
    pub businesses: Vec<Business>,
    pub skills: Vec<Skill>,
    pub facets: FacetIndex,
    pub theme_names: ThemeNames,
    pub loaded_at: DateTime<Utc>,
}

/// Everything the presentation layer needs after one filter pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOutcome {
    pub businesses: Vec<Business>,
    pub stats: CatalogStats,
    pub empty_message: Option<String>,
    pub generation: u64,
}

impl CatalogSnapshot {
    pub fn new(generation: u64, businesses: Vec<Business>, skills: Vec<Skill>) -> Self {
        let facets = build_facets(&businesses);
        let theme_names = theme_names(&businesses);
        Self {
            generation,
            businesses,
            skills,
            facets,
            theme_names,
            loaded_at: Utc::now(),
        }
    }

    /// Generation zero: nothing fetched yet.
    pub fn empty() -> Self {
        Self::new(0, Vec::new(), Vec::new())
    }

    pub fn evaluate(
        &self,
        criteria: &FilterCriteria,
        working_set: &WorkingSet,
        student_skill_ids: &HashSet<SkillId>,
        today: NaiveDate,
    ) -> FilterOutcome {
        let businesses = filter_catalog(
            &self.businesses,
            &FilterInput {
                criteria,
                working_set,
                today,
            },
        );
        let stats = compute_stats(&businesses, student_skill_ids, today);
        // An empty source catalog is "nothing loaded yet", not a filter miss.
        let empty_message = if self.businesses.is_empty() {
            None
        } else {
            compose_empty_message(&businesses, criteria, &self.theme_names)
        };

        FilterOutcome {
            businesses,
            stats,
            empty_message,
            generation: self.generation,
        }
    }
}
