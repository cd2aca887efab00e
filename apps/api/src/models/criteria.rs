use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::catalog::{null_as_default, EntityId, Project, Skill};

/// Project lifecycle tab. Unknown values, including non-strings, decode as
/// `All` so a malformed request never narrows the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Value", rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl From<Value> for StatusFilter {
    fn from(raw: Value) -> Self {
        let Value::String(raw) = raw else {
            return StatusFilter::All;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => StatusFilter::Active,
            "completed" => StatusFilter::Completed,
            _ => StatusFilter::All,
        }
    }
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }

    pub fn admits(&self, project: &Project, today: NaiveDate) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => project.is_active(today),
            StatusFilter::Completed => project.is_archived(today),
        }
    }
}

/// One filter request from the UI. Replaced wholesale on every interaction;
/// every field at its default means "no constraint" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(deserialize_with = "null_as_default")]
    pub search_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub selected_skills: Vec<Skill>,
    pub sector: Option<String>,
    pub location: Option<String>,
    pub company_size: Option<String>,
    pub theme: Option<EntityId>,
    #[serde(deserialize_with = "null_as_default")]
    pub status_filter: StatusFilter,
    #[serde(deserialize_with = "null_as_default")]
    pub show_only_my_work: bool,
}

impl FilterCriteria {
    pub fn sector_constraint(&self) -> Option<&str> {
        constraint(&self.sector)
    }

    pub fn location_constraint(&self) -> Option<&str> {
        constraint(&self.location)
    }

    pub fn company_size_constraint(&self) -> Option<&str> {
        constraint(&self.company_size)
    }

    /// Search text trimmed with inner whitespace collapsed, original casing.
    /// `None` when nothing is left.
    pub fn search_display(&self) -> Option<String> {
        let collapsed = self.search_text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!collapsed.is_empty()).then_some(collapsed)
    }

    /// Lowercased form of [`Self::search_display`], used for matching.
    pub fn search_needle(&self) -> Option<String> {
        self.search_display().map(|s| s.to_lowercase())
    }

    pub fn is_unconstrained(&self) -> bool {
        !self.show_only_my_work
            && self.search_display().is_none()
            && self.selected_skills.is_empty()
            && self.sector_constraint().is_none()
            && self.location_constraint().is_none()
            && self.company_size_constraint().is_none()
            && self.theme.is_none()
            && self.status_filter == StatusFilter::All
    }
}

/// Blank dropdown values count as "no constraint".
fn constraint(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Entities the current student is actively engaged with (accepted,
/// non-completed registrations). Only `business_ids` takes part in filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkingSet {
    pub business_ids: HashSet<EntityId>,
    pub project_ids: HashSet<EntityId>,
    pub task_ids: HashSet<EntityId>,
}

impl WorkingSet {
    pub fn with_businesses(ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            business_ids: ids.into_iter().collect(),
            ..Self::default()
        }
    }
}
