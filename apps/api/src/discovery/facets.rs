//! Facet Index Builder: option counts per filterable dimension.
//!
//! Counts always come from the unfiltered catalog so options don't vanish as
//! the user narrows the view. The index is rebuilt only when the catalog
//! changes (see `CatalogSnapshot`), never when the criteria change.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Business, EntityId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetIndex {
    /// One increment per business.
    pub sectors: BTreeMap<String, usize>,
    /// One increment per business, keyed by the part before the first comma.
    pub locations: BTreeMap<String, usize>,
    /// One increment per business.
    pub company_sizes: BTreeMap<String, usize>,
    /// One increment per project referencing the theme.
    pub theme_counts: BTreeMap<EntityId, usize>,
}

/// A selectable option and how many catalog entries carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeOption {
    pub id: EntityId,
    pub name: String,
    pub count: usize,
}

/// Project counts per lifecycle status, using the same rule as the status stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub active: usize,
    pub completed: usize,
}

/// Theme id → display name, collected from the projects that reference them.
pub type ThemeNames = BTreeMap<EntityId, String>;

pub fn build_facets(catalog: &[Business]) -> FacetIndex {
    let mut index = FacetIndex::default();

    for business in catalog {
        if let Some(sector) = non_empty(business.sector.as_deref()) {
            *index.sectors.entry(sector.to_string()).or_default() += 1;
        }
        if let Some(city) = business.location.as_deref().and_then(city_of) {
            *index.locations.entry(city.to_string()).or_default() += 1;
        }
        if let Some(size) = non_empty(business.company_size.as_deref()) {
            *index.company_sizes.entry(size.to_string()).or_default() += 1;
        }
        for project in &business.projects {
            let themes: BTreeSet<&EntityId> = project.themes.iter().map(|t| &t.id).collect();
            for theme in themes {
                *index.theme_counts.entry(theme.clone()).or_default() += 1;
            }
        }
    }

    index
}

impl FacetIndex {
    pub fn sector_options(&self) -> Vec<FacetOption> {
        options(&self.sectors)
    }

    pub fn location_options(&self) -> Vec<FacetOption> {
        options(&self.locations)
    }

    pub fn company_size_options(&self) -> Vec<FacetOption> {
        options(&self.company_sizes)
    }

    /// Themes that at least one project references, ordered by id. Names fall
    /// back to the id when the lookup has none.
    pub fn theme_options(&self, names: &ThemeNames) -> Vec<ThemeOption> {
        self.theme_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(id, count)| ThemeOption {
                id: id.clone(),
                name: names.get(id).cloned().unwrap_or_else(|| id.to_string()),
                count: *count,
            })
            .collect()
    }
}

pub fn count_statuses(catalog: &[Business], today: NaiveDate) -> StatusCounts {
    catalog
        .iter()
        .flat_map(|b| &b.projects)
        .fold(StatusCounts::default(), |mut counts, project| {
            if project.is_archived(today) {
                counts.completed += 1;
            } else {
                counts.active += 1;
            }
            counts
        })
}

/// First non-empty name seen for every theme in the catalog.
pub fn theme_names(catalog: &[Business]) -> ThemeNames {
    let mut names = ThemeNames::new();
    for theme in catalog.iter().flat_map(|b| &b.projects).flat_map(|p| &p.themes) {
        if theme.name.trim().is_empty() {
            continue;
        }
        names.entry(theme.id.clone()).or_insert_with(|| theme.name.clone());
    }
    names
}

/// "Arnhem, NL" → "Arnhem".
fn city_of(location: &str) -> Option<&str> {
    non_empty(location.split(',').next())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Keys come out of the `BTreeMap` in ascending byte order (case-sensitive).
fn options(counts: &BTreeMap<String, usize>) -> Vec<FacetOption> {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(value, count)| FacetOption {
            value: value.clone(),
            count: *count,
        })
        .collect()
}
