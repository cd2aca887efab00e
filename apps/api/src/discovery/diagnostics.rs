//! Empty-state reporting: which filters are active and a human-readable
//! explanation when they leave nothing behind.

use serde::Serialize;

use crate::discovery::facets::ThemeNames;
use crate::models::{Business, EntityId, FilterCriteria, StatusFilter};

const CONNECTOR: &str = " + ";

/// A criteria field away from its "no constraint" value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ActiveFilter {
    MyWork,
    SearchText(String),
    Skills(Vec<String>),
    Sector(String),
    Location(String),
    CompanySize(String),
    Theme(EntityId),
    Status(StatusFilter),
}

impl ActiveFilter {
    pub fn describe(&self, theme_names: &ThemeNames) -> String {
        match self {
            ActiveFilter::MyWork => "only my projects".to_string(),
            ActiveFilter::SearchText(text) => format!("search \"{text}\""),
            ActiveFilter::Skills(names) => format!("skills {}", names.join(", ")),
            ActiveFilter::Sector(sector) => format!("sector \"{sector}\""),
            ActiveFilter::Location(city) => format!("city \"{city}\""),
            ActiveFilter::CompanySize(size) => format!("company size \"{size}\""),
            ActiveFilter::Theme(id) => match theme_names.get(id) {
                Some(name) => format!("theme \"{name}\""),
                None => format!("theme {id}"),
            },
            ActiveFilter::Status(status) => format!("status {}", status.as_str()),
        }
    }
}

/// Active filters in reporting priority: my-work, free text, skills, sector,
/// city, company size, theme, status.
pub fn active_filters(criteria: &FilterCriteria) -> Vec<ActiveFilter> {
    let mut active = Vec::new();

    if criteria.show_only_my_work {
        active.push(ActiveFilter::MyWork);
    }
    if let Some(text) = criteria.search_display() {
        active.push(ActiveFilter::SearchText(text));
    }
    if !criteria.selected_skills.is_empty() {
        let names = criteria
            .selected_skills
            .iter()
            .map(|s| match &s.id {
                Some(id) if s.name.is_empty() => id.to_string(),
                _ => s.name.clone(),
            })
            .collect();
        active.push(ActiveFilter::Skills(names));
    }
    if let Some(sector) = criteria.sector_constraint() {
        active.push(ActiveFilter::Sector(sector.to_string()));
    }
    if let Some(city) = criteria.location_constraint() {
        active.push(ActiveFilter::Location(city.to_string()));
    }
    if let Some(size) = criteria.company_size_constraint() {
        active.push(ActiveFilter::CompanySize(size.to_string()));
    }
    if let Some(theme) = &criteria.theme {
        active.push(ActiveFilter::Theme(theme.clone()));
    }
    if criteria.status_filter != StatusFilter::All {
        active.push(ActiveFilter::Status(criteria.status_filter));
    }

    active
}

/// `None` when the filtered view has results, or when no filter is active.
pub fn compose_empty_message(
    filtered: &[Business],
    criteria: &FilterCriteria,
    theme_names: &ThemeNames,
) -> Option<String> {
    if !filtered.is_empty() {
        return None;
    }

    let fragments: Vec<String> = active_filters(criteria)
        .iter()
        .map(|f| f.describe(theme_names))
        .collect();
    if fragments.is_empty() {
        return None;
    }

    Some(format!("No projects found for {}", fragments.join(CONNECTOR)))
}
