use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Business, Project, SkillId};

/// Aggregates over the filtered view. Archived projects are never counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_projects: usize,
    /// Active projects with at least one task needing a skill the student has.
    pub matching_projects: usize,
}

pub fn compute_stats(
    filtered: &[Business],
    student_skill_ids: &HashSet<SkillId>,
    today: NaiveDate,
) -> CatalogStats {
    filtered
        .iter()
        .flat_map(|b| &b.projects)
        .filter(|p| p.is_active(today))
        .fold(CatalogStats::default(), |mut stats, project| {
            stats.total_projects += 1;
            if matches_student(project, student_skill_ids) {
                stats.matching_projects += 1;
            }
            stats
        })
}

/// Any-overlap: one shared skill on one task is enough. Looser than the skills
/// stage, which requires every selected skill.
fn matches_student(project: &Project, student_skill_ids: &HashSet<SkillId>) -> bool {
    project
        .tasks
        .iter()
        .flat_map(|t| t.skill_ids())
        .any(|id| student_skill_ids.contains(id))
}
