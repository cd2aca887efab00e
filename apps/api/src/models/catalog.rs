use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::discovery::skills::RawSkill;

/// Identity of a catalog entity. The backend hands out numeric ids for most
/// records but some producers send them as strings.
///
/// Equality, hashing and ordering go through the textual form, so `7` and
/// `"7"` are the same entity. Ids that are canonical integers order
/// numerically ahead of every other text id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Num(i64),
    Text(String),
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
enum IdKey<'a> {
    Num(i64),
    Text(&'a str),
}

impl EntityId {
    fn key(&self) -> IdKey<'_> {
        match self {
            EntityId::Num(n) => IdKey::Num(*n),
            EntityId::Text(s) => match s.parse::<i64>() {
                Ok(n) if n.to_string() == *s => IdKey::Num(n),
                _ => IdKey::Text(s),
            },
        }
    }
}

impl PartialEq for EntityId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for EntityId {}

impl Hash for EntityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Num(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Num(n)
    }
}

impl From<i32> for EntityId {
    fn from(n: i32) -> Self {
        EntityId::Num(i64::from(n))
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}

/// Canonical skill identity: the textual form of whatever id the producer
/// supplied, or the skill name when no id exists.
///
/// Name fallback means "React" and "react" are two different skills. This is
/// kept as-is; see DESIGN.md.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "EntityId", into = "String")]
pub struct SkillId(String);

impl SkillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<EntityId> for SkillId {
    fn from(id: EntityId) -> Self {
        SkillId(id.to_string())
    }
}

impl From<SkillId> for String {
    fn from(id: SkillId) -> Self {
        id.0
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical skill record. Every producer shape is decoded through
/// [`RawSkill`] so nothing downstream branches on the input shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSkill", rename_all = "camelCase")]
pub struct Skill {
    #[serde(rename = "skillId")]
    pub id: Option<SkillId>,
    pub name: String,
    pub is_pending: bool,
}

impl Skill {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(SkillId::from(id.into())),
            name: name.into(),
            is_pending: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<Skill>,
}

impl Task {
    /// Ids of the skills this task carries. Skills without an id are skipped.
    pub fn skill_ids(&self) -> impl Iterator<Item = &SkillId> {
        self.skills.iter().filter_map(|s| s.id.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    #[serde(default, alias = "name", deserialize_with = "null_as_default")]
    pub title: String,
    pub location: Option<String>,
    #[serde(default, alias = "start_date", deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, alias = "end_date", deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub themes: Vec<Theme>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
}

impl Project {
    /// A project is archived once its end date lies before `today`.
    /// No end date means it never archives.
    pub fn is_archived(&self, today: NaiveDate) -> bool {
        matches!(self.end_date, Some(end) if end < today)
    }

    pub fn is_active(&self, today: NaiveDate) -> bool {
        !self.is_archived(today)
    }

    pub fn has_theme(&self, theme: &EntityId) -> bool {
        self.themes.iter().any(|t| &t.id == theme)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub location: Option<String>,
    pub sector: Option<String>,
    #[serde(alias = "company_size")]
    pub company_size: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
}

/// Decodes an explicit JSON `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive timestamps. Anything
/// else (including non-strings) decodes as no date.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}
