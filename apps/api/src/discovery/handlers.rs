//! Axum route handlers for the Discovery API.

use std::collections::HashSet;

use anyhow::anyhow;
use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::discovery::facets::{count_statuses, FacetOption, StatusCounts, ThemeOption};
use crate::discovery::snapshot::FilterOutcome;
use crate::errors::AppError;
use crate::models::{FilterCriteria, Skill, SkillId, WorkingSet};
use crate::source::RefreshOutcome;
use crate::state::AppState;

pub const MAX_SEARCH_TEXT_LEN: usize = 200;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterRequest {
    pub criteria: FilterCriteria,
    pub working_set: WorkingSet,
    pub student_skill_ids: HashSet<SkillId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetsResponse {
    pub generation: u64,
    pub sectors: Vec<FacetOption>,
    pub locations: Vec<FacetOption>,
    pub company_sizes: Vec<FacetOption>,
    pub themes: Vec<ThemeOption>,
    pub statuses: StatusCounts,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub generation: u64,
    pub skills: Vec<Skill>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/discovery/facets
///
/// Facet options over the unfiltered catalog, independent of any criteria.
pub async fn handle_facets(State(state): State<AppState>) -> Json<FacetsResponse> {
    let snapshot = state.catalog.snapshot();
    let today = Utc::now().date_naive();

    Json(FacetsResponse {
        generation: snapshot.generation,
        sectors: snapshot.facets.sector_options(),
        locations: snapshot.facets.location_options(),
        company_sizes: snapshot.facets.company_size_options(),
        themes: snapshot.facets.theme_options(&snapshot.theme_names),
        statuses: count_statuses(&snapshot.businesses, today),
    })
}

/// GET /api/v1/discovery/skills
pub async fn handle_skills(State(state): State<AppState>) -> Json<SkillsResponse> {
    let snapshot = state.catalog.snapshot();
    Json(SkillsResponse {
        generation: snapshot.generation,
        skills: snapshot.skills.clone(),
    })
}

/// POST /api/v1/discovery/filter
///
/// Runs one filter pass against the current snapshot. The pass is CPU-bound
/// over the whole catalog, so it runs on the blocking pool.
pub async fn handle_filter(
    State(state): State<AppState>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<FilterOutcome>, AppError> {
    if request.criteria.search_text.chars().count() > MAX_SEARCH_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "searchText cannot exceed {MAX_SEARCH_TEXT_LEN} characters"
        )));
    }

    let snapshot = state.catalog.snapshot();
    let today = Utc::now().date_naive();

    let outcome = tokio::task::spawn_blocking(move || {
        snapshot.evaluate(
            &request.criteria,
            &request.working_set,
            &request.student_skill_ids,
            today,
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("filter task failed: {e}")))?;

    Ok(Json(outcome))
}

/// POST /api/v1/discovery/refresh
///
/// Re-fetches the catalog. `applied` is false when a newer refresh overtook
/// this one.
pub async fn handle_refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshOutcome>, AppError> {
    let outcome = state.catalog.refresh().await?;
    Ok(Json(outcome))
}
