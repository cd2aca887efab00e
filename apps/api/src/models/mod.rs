// Catalog snapshot types shared by the discovery engine, the query
// controller and the HTTP layer. All of them are plain serializable data.

pub mod catalog;
pub mod criteria;

pub use catalog::{Business, EntityId, Project, Skill, SkillId, Task, Theme};
pub use criteria::{FilterCriteria, StatusFilter, WorkingSet};
