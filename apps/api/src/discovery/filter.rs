//! Catalog Filter Engine: cascades the filter criteria over the
//! Business → Project → Task tree.
//!
//! Stages run in a fixed order, each consuming the previous stage's output.
//! A stage whose criteria field is at its "no constraint" value is skipped
//! entirely. The engine only ever drops nodes; it never rewrites the fields of
//! a surviving Business, Project, Task or Skill.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{
    Business, EntityId, FilterCriteria, Skill, SkillId, StatusFilter, Task, WorkingSet,
};

/// One step of the cascading pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    MyWork,
    Sector,
    Location,
    CompanySize,
    Theme,
    Status,
    Search,
    Skills,
}

impl Stage {
    pub const PIPELINE: [Stage; 8] = [
        Stage::MyWork,
        Stage::Sector,
        Stage::Location,
        Stage::CompanySize,
        Stage::Theme,
        Stage::Status,
        Stage::Search,
        Stage::Skills,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::MyWork => "my_work",
            Stage::Sector => "sector",
            Stage::Location => "location",
            Stage::CompanySize => "company_size",
            Stage::Theme => "theme",
            Stage::Status => "status",
            Stage::Search => "search",
            Stage::Skills => "skills",
        }
    }

    pub fn is_active(&self, criteria: &FilterCriteria) -> bool {
        match self {
            Stage::MyWork => criteria.show_only_my_work,
            Stage::Sector => criteria.sector_constraint().is_some(),
            Stage::Location => criteria.location_constraint().is_some(),
            Stage::CompanySize => criteria.company_size_constraint().is_some(),
            Stage::Theme => criteria.theme.is_some(),
            Stage::Status => criteria.status_filter != StatusFilter::All,
            Stage::Search => criteria.search_needle().is_some(),
            Stage::Skills => !criteria.selected_skills.is_empty(),
        }
    }

    fn apply(&self, businesses: Vec<Business>, input: &FilterInput<'_>) -> Vec<Business> {
        let criteria = input.criteria;
        match self {
            Stage::MyWork => retain_my_work(businesses, input.working_set),
            Stage::Sector => match criteria.sector_constraint() {
                Some(sector) => retain_by_field(businesses, sector, |b| b.sector.as_deref()),
                None => businesses,
            },
            Stage::Location => match criteria.location_constraint() {
                Some(location) => retain_by_location(businesses, location),
                None => businesses,
            },
            Stage::CompanySize => match criteria.company_size_constraint() {
                Some(size) => retain_by_field(businesses, size, |b| b.company_size.as_deref()),
                None => businesses,
            },
            Stage::Theme => match &criteria.theme {
                Some(theme) => retain_by_theme(businesses, theme),
                None => businesses,
            },
            Stage::Status => retain_by_status(businesses, criteria.status_filter, input.today),
            Stage::Search => match criteria.search_needle() {
                Some(needle) => search(businesses, &needle),
                None => businesses,
            },
            Stage::Skills => retain_by_skills(businesses, &criteria.selected_skills),
        }
    }
}

/// Everything a filter pass reads besides the catalog itself.
#[derive(Debug, Clone, Copy)]
pub struct FilterInput<'a> {
    pub criteria: &'a FilterCriteria,
    pub working_set: &'a WorkingSet,
    /// Reference date for the status stage.
    pub today: NaiveDate,
}

/// Runs the full pipeline and returns the filtered subtree. Ordering is the
/// catalog's, except that an active search stage sorts businesses by name.
pub fn filter_catalog(catalog: &[Business], input: &FilterInput<'_>) -> Vec<Business> {
    let mut businesses = catalog.to_vec();

    for stage in Stage::PIPELINE {
        if !stage.is_active(input.criteria) {
            continue;
        }
        businesses = stage.apply(businesses, input);
        debug!(
            stage = stage.name(),
            remaining = businesses.len(),
            "applied filter stage"
        );
    }

    businesses
}

// ────────────────────────────────────────────────────────────────────────────
// Business-level stages
// ────────────────────────────────────────────────────────────────────────────

fn retain_my_work(businesses: Vec<Business>, working_set: &WorkingSet) -> Vec<Business> {
    businesses
        .into_iter()
        .filter(|b| working_set.business_ids.contains(&b.id))
        .collect()
}

/// Case-insensitive equality on a business field. Absent fields never match.
fn retain_by_field<F>(businesses: Vec<Business>, wanted: &str, field: F) -> Vec<Business>
where
    F: Fn(&Business) -> Option<&str>,
{
    let wanted = wanted.to_lowercase();
    businesses
        .into_iter()
        .filter(|b| field(b).is_some_and(|value| value.trim().to_lowercase() == wanted))
        .collect()
}

/// Location is a substring match, looser than sector and company size.
fn retain_by_location(businesses: Vec<Business>, location: &str) -> Vec<Business> {
    let needle = location.to_lowercase();
    businesses
        .into_iter()
        .filter(|b| contains_needle(b.location.as_deref(), &needle))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Project-level stages
// ────────────────────────────────────────────────────────────────────────────

fn retain_by_theme(businesses: Vec<Business>, theme: &EntityId) -> Vec<Business> {
    businesses
        .into_iter()
        .filter_map(|mut b| {
            b.projects.retain(|p| p.has_theme(theme));
            (!b.projects.is_empty()).then_some(b)
        })
        .collect()
}

fn retain_by_status(
    businesses: Vec<Business>,
    status: StatusFilter,
    today: NaiveDate,
) -> Vec<Business> {
    businesses
        .into_iter()
        .filter_map(|mut b| {
            b.projects.retain(|p| status.admits(p, today));
            (!b.projects.is_empty()).then_some(b)
        })
        .collect()
}

/// A business whose name or location matches keeps every remaining project.
/// Otherwise only projects whose title or location match survive. Survivors
/// are sorted by name, case-insensitively.
fn search(businesses: Vec<Business>, needle: &str) -> Vec<Business> {
    let mut matched: Vec<Business> = businesses
        .into_iter()
        .filter_map(|mut b| {
            let business_match = contains_needle(Some(&b.name), needle)
                || contains_needle(b.location.as_deref(), needle);
            if business_match {
                return Some(b);
            }
            b.projects.retain(|p| {
                contains_needle(Some(&p.title), needle)
                    || contains_needle(p.location.as_deref(), needle)
            });
            (!b.projects.is_empty()).then_some(b)
        })
        .collect();

    matched.sort_by_cached_key(|b| b.name.to_lowercase());
    matched
}

// ────────────────────────────────────────────────────────────────────────────
// Task-level stage
// ────────────────────────────────────────────────────────────────────────────

/// Keeps tasks that carry every selected skill. A selected skill without an
/// id can never be carried, so selecting one empties the result.
fn retain_by_skills(businesses: Vec<Business>, selected: &[Skill]) -> Vec<Business> {
    let required: Option<HashSet<&SkillId>> = selected.iter().map(|s| s.id.as_ref()).collect();

    businesses
        .into_iter()
        .filter_map(|mut b| {
            b.projects = b
                .projects
                .into_iter()
                .filter_map(|mut p| {
                    p.tasks.retain(|t| task_covers(t, required.as_ref()));
                    (!p.tasks.is_empty()).then_some(p)
                })
                .collect();
            (!b.projects.is_empty()).then_some(b)
        })
        .collect()
}

fn task_covers(task: &Task, required: Option<&HashSet<&SkillId>>) -> bool {
    let Some(required) = required else {
        return false;
    };
    let carried: HashSet<&SkillId> = task.skill_ids().collect();
    required.is_subset(&carried)
}

/// `needle` must already be lowercased.
fn contains_needle(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, Theme};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn make_task(id: i64, skill_ids: &[i64]) -> Task {
        Task {
            id: id.into(),
            name: format!("task {id}"),
            skills: skill_ids
                .iter()
                .map(|s| Skill::new(*s, format!("skill {s}")))
                .collect(),
        }
    }

    fn make_project(
        id: i64,
        title: &str,
        end_date: Option<NaiveDate>,
        tasks: Vec<Task>,
    ) -> Project {
        Project {
            id: id.into(),
            title: title.to_string(),
            location: None,
            start_date: None,
            end_date,
            themes: vec![],
            tasks,
        }
    }

    fn make_business(id: i64, name: &str, projects: Vec<Project>) -> Business {
        Business {
            id: id.into(),
            name: name.to_string(),
            location: None,
            sector: None,
            company_size: None,
            projects,
        }
    }

    fn themed(mut project: Project, theme_id: i64) -> Project {
        project.themes.push(Theme {
            id: theme_id.into(),
            name: format!("theme {theme_id}"),
            icon: None,
            color: None,
        });
        project
    }

    fn catalog() -> Vec<Business> {
        let yesterday = today().pred_opt();
        let mut acme = make_business(
            1,
            "Acme",
            vec![
                themed(make_project(10, "Acme webshop", None, vec![make_task(100, &[1, 2, 3])]), 7),
                make_project(11, "Inventory app", yesterday, vec![make_task(110, &[1])]),
            ],
        );
        acme.sector = Some("Tech".to_string());
        acme.location = Some("Arnhem, NL".to_string());
        acme.company_size = Some("11-50".to_string());

        let mut bolt = make_business(
            2,
            "bolt energy",
            vec![themed(
                make_project(20, "Solar dashboard", None, vec![make_task(200, &[2, 4])]),
                8,
            )],
        );
        bolt.sector = Some("Energy".to_string());
        bolt.location = Some("Nijmegen".to_string());

        let core = make_business(3, "Core Health", vec![]);

        vec![acme, bolt, core]
    }

    fn run(catalog: &[Business], criteria: &FilterCriteria) -> Vec<Business> {
        let working_set = WorkingSet::with_businesses([EntityId::Num(2)]);
        filter_catalog(
            catalog,
            &FilterInput {
                criteria,
                working_set: &working_set,
                today: today(),
            },
        )
    }

    fn ids(businesses: &[Business]) -> Vec<EntityId> {
        businesses.iter().map(|b| b.id.clone()).collect()
    }

    #[test]
    fn test_no_constraint_is_identity() {
        let source = catalog();
        assert_eq!(run(&source, &FilterCriteria::default()), source);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let source = catalog();
        let cases = [
            FilterCriteria {
                search_text: "a".to_string(),
                status_filter: StatusFilter::Active,
                ..FilterCriteria::default()
            },
            FilterCriteria {
                selected_skills: vec![Skill::new(1, "skill 1"), Skill::new(2, "skill 2")],
                ..FilterCriteria::default()
            },
            FilterCriteria {
                theme: Some(EntityId::Num(7)),
                ..FilterCriteria::default()
            },
            FilterCriteria {
                show_only_my_work: true,
                ..FilterCriteria::default()
            },
            FilterCriteria {
                search_text: "solar".to_string(),
                selected_skills: vec![Skill::new(2, "skill 2")],
                status_filter: StatusFilter::Completed,
                ..FilterCriteria::default()
            },
        ];
        for criteria in &cases {
            let once = run(&source, criteria);
            assert_eq!(run(&once, criteria), once, "{criteria:?}");
        }
    }

    #[test]
    fn test_theme_selected_as_string_matches_numeric_theme_id() {
        let criteria: FilterCriteria = serde_json::from_value(json!({"theme": "7"})).unwrap();
        assert_eq!(ids(&run(&catalog(), &criteria)), vec![EntityId::Num(1)]);
    }

    #[test]
    fn test_working_set_string_ids_match_numeric_business_ids() {
        let criteria: FilterCriteria =
            serde_json::from_value(json!({"showOnlyMyWork": true})).unwrap();
        let working_set: WorkingSet =
            serde_json::from_value(json!({"businessIds": ["1"]})).unwrap();
        let filtered = filter_catalog(
            &catalog(),
            &FilterInput {
                criteria: &criteria,
                working_set: &working_set,
                today: today(),
            },
        );
        assert_eq!(ids(&filtered), vec![EntityId::Num(1)]);
    }

    #[test]
    fn test_result_is_subtree_of_catalog() {
        let source = catalog();
        let criteria = FilterCriteria {
            selected_skills: vec![Skill::new(2, "skill 2")],
            ..FilterCriteria::default()
        };
        for business in run(&source, &criteria) {
            let original = source.iter().find(|b| b.id == business.id).unwrap();
            assert_eq!(original.name, business.name);
            for project in &business.projects {
                let original_project = original
                    .projects
                    .iter()
                    .find(|p| p.id == project.id)
                    .unwrap();
                for task in &project.tasks {
                    assert!(original_project.tasks.contains(task));
                }
            }
        }
    }

    #[test]
    fn test_my_work_keeps_only_working_set_businesses() {
        let criteria = FilterCriteria {
            show_only_my_work: true,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&run(&catalog(), &criteria)), vec![EntityId::Num(2)]);
    }

    #[test]
    fn test_sector_is_case_insensitive_equality() {
        let criteria = FilterCriteria {
            sector: Some("tech".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&run(&catalog(), &criteria)), vec![EntityId::Num(1)]);

        let partial = FilterCriteria {
            sector: Some("te".to_string()),
            ..FilterCriteria::default()
        };
        assert!(run(&catalog(), &partial).is_empty());
    }

    #[test]
    fn test_location_is_substring_match() {
        let criteria = FilterCriteria {
            location: Some("arnhem".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&run(&catalog(), &criteria)), vec![EntityId::Num(1)]);
    }

    #[test]
    fn test_absent_field_never_matches() {
        let criteria = FilterCriteria {
            company_size: Some("11-50".to_string()),
            ..FilterCriteria::default()
        };
        // Only Acme has a company size.
        assert_eq!(ids(&run(&catalog(), &criteria)), vec![EntityId::Num(1)]);
    }

    #[test]
    fn test_theme_narrows_projects_and_drops_empty_businesses() {
        let criteria = FilterCriteria {
            theme: Some(EntityId::Num(7)),
            ..FilterCriteria::default()
        };
        let result = run(&catalog(), &criteria);
        assert_eq!(ids(&result), vec![EntityId::Num(1)]);
        assert_eq!(result[0].projects.len(), 1);
        assert_eq!(result[0].projects[0].id, EntityId::Num(10));
    }

    #[test]
    fn test_status_partition() {
        let yesterday = today().pred_opt();
        let source = vec![make_business(
            1,
            "Acme",
            vec![
                make_project(1, "ended", yesterday, vec![]),
                make_project(2, "open", None, vec![]),
            ],
        )];

        let active = FilterCriteria {
            status_filter: StatusFilter::Active,
            ..FilterCriteria::default()
        };
        let completed = FilterCriteria {
            status_filter: StatusFilter::Completed,
            ..FilterCriteria::default()
        };

        let active_ids: Vec<_> = run(&source, &active)[0]
            .projects
            .iter()
            .map(|p| p.id.clone())
            .collect();
        let completed_ids: Vec<_> =
            run(&source, &completed)[0].projects.iter().map(|p| p.id.clone()).collect();
        assert_eq!(active_ids, vec![EntityId::Num(2)]);
        assert_eq!(completed_ids, vec![EntityId::Num(1)]);
    }

    #[test]
    fn test_status_drops_business_without_projects() {
        let criteria = FilterCriteria {
            status_filter: StatusFilter::Active,
            ..FilterCriteria::default()
        };
        let result = run(&catalog(), &criteria);
        assert!(!ids(&result).contains(&EntityId::Num(3)));
    }

    #[test]
    fn test_business_match_promotes_all_projects() {
        let source = vec![make_business(
            1,
            "Acme",
            vec![
                make_project(1, "Acme portal", None, vec![]),
                make_project(2, "Warehouse robot", None, vec![]),
            ],
        )];
        let criteria = FilterCriteria {
            search_text: "acme".to_string(),
            ..FilterCriteria::default()
        };
        let result = run(&source, &criteria);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].projects.len(), 2);
    }

    #[test]
    fn test_search_narrows_projects_when_business_does_not_match() {
        let criteria = FilterCriteria {
            search_text: "  solar ".to_string(),
            ..FilterCriteria::default()
        };
        let result = run(&catalog(), &criteria);
        assert_eq!(ids(&result), vec![EntityId::Num(2)]);
        assert_eq!(result[0].projects[0].title, "Solar dashboard");
    }

    #[test]
    fn test_search_matches_project_location() {
        let mut source = catalog();
        source[1].projects[0].location = Some("Zwolle".to_string());
        let criteria = FilterCriteria {
            search_text: "zwolle".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&run(&source, &criteria)), vec![EntityId::Num(2)]);
    }

    #[test]
    fn test_search_sorts_by_name_case_insensitively() {
        let source = vec![
            make_business(1, "zeta lab", vec![]),
            make_business(2, "Alpha Lab", vec![]),
            make_business(3, "beta lab", vec![]),
        ];
        let criteria = FilterCriteria {
            search_text: "lab".to_string(),
            ..FilterCriteria::default()
        };
        let names: Vec<_> = run(&source, &criteria).into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Alpha Lab", "beta lab", "zeta lab"]);
    }

    #[test]
    fn test_other_stages_keep_catalog_order() {
        let source = vec![
            make_business(1, "zeta", vec![make_project(1, "p", None, vec![])]),
            make_business(2, "alpha", vec![make_project(2, "p", None, vec![])]),
        ];
        let criteria = FilterCriteria {
            status_filter: StatusFilter::Active,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&run(&source, &criteria)), vec![EntityId::Num(1), EntityId::Num(2)]);
    }

    #[test]
    fn test_skills_require_every_selected_skill() {
        let source = vec![make_business(
            1,
            "Acme",
            vec![make_project(1, "p", None, vec![make_task(1, &[1, 2, 3])])],
        )];

        let subset = FilterCriteria {
            selected_skills: vec![Skill::new(1, "A"), Skill::new(2, "B")],
            ..FilterCriteria::default()
        };
        assert_eq!(run(&source, &subset).len(), 1);

        let not_carried = FilterCriteria {
            selected_skills: vec![Skill::new(1, "A"), Skill::new(4, "D")],
            ..FilterCriteria::default()
        };
        assert!(run(&source, &not_carried).is_empty());
    }

    #[test]
    fn test_skills_drop_tasks_then_projects_then_businesses() {
        let criteria = FilterCriteria {
            selected_skills: vec![Skill::new(1, "skill 1")],
            ..FilterCriteria::default()
        };
        let result = run(&catalog(), &criteria);
        assert_eq!(ids(&result), vec![EntityId::Num(1)]);
        assert_eq!(result[0].projects.len(), 2);
    }

    #[test]
    fn test_selected_skill_without_id_matches_nothing() {
        let criteria = FilterCriteria {
            selected_skills: vec![Skill {
                id: None,
                name: String::new(),
                is_pending: false,
            }],
            ..FilterCriteria::default()
        };
        assert!(run(&catalog(), &criteria).is_empty());
    }

    #[test]
    fn test_stages_cascade() {
        let criteria = FilterCriteria {
            sector: Some("Tech".to_string()),
            status_filter: StatusFilter::Completed,
            ..FilterCriteria::default()
        };
        let result = run(&catalog(), &criteria);
        assert_eq!(ids(&result), vec![EntityId::Num(1)]);
        assert_eq!(result[0].projects.len(), 1);
        assert_eq!(result[0].projects[0].id, EntityId::Num(11));
    }

    #[test]
    fn test_empty_catalog_stays_empty() {
        let criteria = FilterCriteria {
            search_text: "anything".to_string(),
            show_only_my_work: true,
            ..FilterCriteria::default()
        };
        assert!(run(&[], &criteria).is_empty());
    }

    #[test]
    fn test_pipeline_order_is_fixed() {
        assert_eq!(Stage::PIPELINE[0], Stage::MyWork);
        assert_eq!(Stage::PIPELINE[6], Stage::Search);
        assert_eq!(Stage::PIPELINE[7], Stage::Skills);
    }
}
