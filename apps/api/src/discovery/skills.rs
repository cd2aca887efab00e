//! Skill Normalizer: maps every skill shape the backend produces onto the
//! canonical [`Skill`] record.
//!
//! Known producers:
//! - catalog tasks: `{ "skillId": 3, "name": "Rust", "isPending": false }`
//! - the global skill list: `{ "id": 3, "name": "Rust" }`
//! - registrations: `{ "skill": { "skillId": 3, "name": "Rust" }, "isPending": true }`
//! - free-form tags: `"Rust"`
//!
//! Identity resolution order: `skillId`, then `id`, then the name. A record
//! with neither id nor name normalizes to an empty-name skill without an id;
//! id-based filtering can never match it.

use serde::Deserialize;

use crate::models::catalog::{EntityId, Skill, SkillId};

/// Any skill record as it arrives on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSkill {
    Wrapped {
        skill: SkillFields,
        #[serde(default, alias = "isPending")]
        is_pending: Option<bool>,
    },
    Record(SkillFields),
    Name(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillFields {
    #[serde(default, alias = "skillId")]
    pub skill_id: Option<EntityId>,
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default, alias = "skillName")]
    pub name: Option<String>,
    #[serde(default, alias = "isPending")]
    pub is_pending: Option<bool>,
}

impl From<SkillFields> for Skill {
    fn from(fields: SkillFields) -> Self {
        let name = fields.name.unwrap_or_default();
        let id = fields
            .skill_id
            .or(fields.id)
            .map(SkillId::from)
            .or_else(|| (!name.is_empty()).then(|| SkillId::new(name.clone())));

        Skill {
            id,
            name,
            is_pending: fields.is_pending.unwrap_or(false),
        }
    }
}

impl From<RawSkill> for Skill {
    fn from(raw: RawSkill) -> Self {
        match raw {
            RawSkill::Wrapped { skill, is_pending } => {
                let mut normalized = Skill::from(skill);
                if let Some(pending) = is_pending {
                    normalized.is_pending = pending;
                }
                normalized
            }
            RawSkill::Record(fields) => Skill::from(fields),
            RawSkill::Name(name) => Skill::from(SkillFields {
                name: Some(name),
                ..SkillFields::default()
            }),
        }
    }
}

/// Normalizes a batch of raw records, dropping exact duplicates by id while
/// keeping first-seen order.
pub fn normalize_skills(raw: impl IntoIterator<Item = RawSkill>) -> Vec<Skill> {
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(Skill::from)
        .filter(|skill| match &skill.id {
            Some(id) => seen.insert(id.clone()),
            None => true,
        })
        .collect()
}
