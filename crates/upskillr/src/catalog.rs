//! Record shapes loaded from the static `students.json`, `employers.json`,
//! and `investors.json` documents, and the immutable store that holds them.

use crate::config::{CatalogConfig, DEFAULT_PREVIEW_LIMIT};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound of the Education Credit Score scale.
pub const MAX_CREDIT_SCORE: u16 = 900;

/// Upper bound of the skill proficiency scale.
pub const MAX_SKILL_LEVEL: u8 = 100;

/// A student profile as shown on employer and investor dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default, deserialize_with = "lenient_skills")]
    pub skills: Vec<Skill>,
    #[serde(default, deserialize_with = "credit_score_on_scale")]
    pub credit_score: Option<u16>,
}

impl Candidate {
    /// Case-insensitive lookup of a skill by name.
    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|skill| same_tag(&skill.name, name))
    }
}

/// Tag equality shared by skill lookup, category filtering, and scoring:
/// surrounding whitespace is ignored and case folds over all of Unicode.
pub fn same_tag(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default, deserialize_with = "level_on_scale")]
    pub level: u8,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
}

impl Skill {
    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }
}

/// A hiring partner and the skills its open roles ask for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub required_skills: Vec<String>,
    #[serde(default, deserialize_with = "credit_score_on_scale")]
    pub minimum_credit_score: Option<u16>,
    #[serde(default)]
    pub open_roles: u32,
}

/// A funding partner and the fields of study it backs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub preferred_fields: Vec<String>,
    #[serde(default, deserialize_with = "credit_score_on_scale")]
    pub minimum_credit_score: Option<u16>,
    #[serde(default)]
    pub available_funding: u64,
}

/// Records that carry a stable identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Candidate {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Employer {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Investor {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read record document: {0}")]
    Io(#[from] std::io::Error),
    #[error("record document is not a JSON array: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable, ordered collection of records loaded once per owner.
///
/// The store never changes after construction; filtering produces new
/// vectors and leaves the store untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordStore<T> {
    records: Arc<[T]>,
}

impl<T> RecordStore<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> Default for RecordStore<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Deref for RecordStore<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.records
    }
}

impl<T: Identified> RecordStore<T> {
    pub fn find(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|record| record.id() == id)
    }
}

impl<T: DeserializeOwned> RecordStore<T> {
    /// Decodes a JSON array element by element. Elements that do not decode
    /// into `T` are skipped so one malformed record cannot hide the rest.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let raw: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
        Ok(Self::from_values(raw))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let raw: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;
        Ok(Self::from_values(raw))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Loads a document without surfacing failures: a missing or unparsable
    /// document yields an empty store and a warning.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(store) => {
                debug!(path = %path.display(), records = store.len(), "record document loaded");
                store
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "record document unavailable; using empty store");
                Self::empty()
            }
        }
    }

    /// Async counterpart of [`RecordStore::load_or_empty`] for the server,
    /// which reads each document once before reporting ready.
    pub async fn fetch_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let loaded = match tokio::fs::read(path).await {
            Ok(bytes) => Self::from_slice(&bytes),
            Err(err) => Err(CatalogError::Io(err)),
        };

        match loaded {
            Ok(store) => {
                debug!(path = %path.display(), records = store.len(), "record document loaded");
                store
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "record document unavailable; using empty store");
                Self::empty()
            }
        }
    }

    fn from_values(raw: Vec<serde_json::Value>) -> Self {
        let mut records = Vec::with_capacity(raw.len());
        for (index, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<T>(value) {
                Ok(record) => records.push(record),
                Err(err) => warn!(index, error = %err, "skipping malformed record"),
            }
        }
        Self::new(records)
    }
}

/// The three record stores a deployment serves, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub students: RecordStore<Candidate>,
    pub employers: RecordStore<Employer>,
    pub investors: RecordStore<Investor>,
    pub preview_limit: usize,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            students: RecordStore::empty(),
            employers: RecordStore::empty(),
            investors: RecordStore::empty(),
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

impl Catalog {
    pub async fn fetch(config: &CatalogConfig) -> Self {
        let (students, employers, investors) = tokio::join!(
            RecordStore::fetch_or_empty(config.students_path()),
            RecordStore::fetch_or_empty(config.employers_path()),
            RecordStore::fetch_or_empty(config.investors_path()),
        );

        let catalog = Self {
            students,
            employers,
            investors,
            preview_limit: config.preview_limit,
        };
        catalog.log_loaded(config);
        catalog
    }

    pub fn load(config: &CatalogConfig) -> Self {
        let catalog = Self {
            students: RecordStore::load_or_empty(config.students_path()),
            employers: RecordStore::load_or_empty(config.employers_path()),
            investors: RecordStore::load_or_empty(config.investors_path()),
            preview_limit: config.preview_limit,
        };
        catalog.log_loaded(config);
        catalog
    }

    fn log_loaded(&self, config: &CatalogConfig) {
        info!(
            data_dir = %config.data_dir.display(),
            students = self.students.len(),
            employers = self.employers.len(),
            investors = self.investors.len(),
            "catalog loaded"
        );
    }
}

fn level_on_scale<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .filter(|value| value.is_finite())
        .map(|value| value.clamp(0.0, f64::from(MAX_SKILL_LEVEL)).round() as u8)
        .unwrap_or(0))
}

fn credit_score_on_scale<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_f64)
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| value.min(f64::from(MAX_CREDIT_SCORE)).round() as u16))
}

fn lenient_skills<'de, D>(deserializer: D) -> Result<Vec<Skill>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(items)) = raw else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Skill>(item).ok())
        .collect())
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(items)) = raw else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(tag) if !tag.trim().is_empty() => Some(tag),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn skips_undecodable_elements_and_keeps_order() {
        let json = r#"[
            {"id": "s1", "name": "Ada"},
            42,
            {"name": "missing id"},
            {"id": "s2", "name": "Grace"}
        ]"#;

        let store = RecordStore::<Candidate>::from_reader(Cursor::new(json)).expect("array");

        let ids: Vec<_> = store.iter().map(|candidate| candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
    }

    #[test]
    fn missing_or_malformed_collections_decode_as_empty() {
        let json = r#"[
            {"id": "s1", "name": "Ada", "skills": "python"},
            {"id": "s2", "name": "Grace", "skills": [{"name": "Rust", "level": 140}, {"level": 3}]}
        ]"#;

        let store = RecordStore::<Candidate>::from_slice(json.as_bytes()).expect("array");

        assert!(store[0].skills.is_empty());
        assert_eq!(store[1].skills.len(), 1);
        assert_eq!(store[1].skills[0].level, MAX_SKILL_LEVEL);
    }

    #[test]
    fn credit_scores_clamp_to_scale_and_ignore_garbage() {
        let json = r#"[
            {"id": "s1", "name": "Ada", "credit_score": 1200},
            {"id": "s2", "name": "Grace", "credit_score": "high"},
            {"id": "s3", "name": "Alan", "credit_score": 712.4}
        ]"#;

        let store = RecordStore::<Candidate>::from_slice(json.as_bytes()).expect("array");

        assert_eq!(store[0].credit_score, Some(MAX_CREDIT_SCORE));
        assert_eq!(store[1].credit_score, None);
        assert_eq!(store[2].credit_score, Some(712));
    }

    #[test]
    fn non_array_document_is_an_error() {
        let err = RecordStore::<Employer>::from_slice(br#"{"employers": []}"#)
            .expect_err("object rejected");
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn load_or_empty_degrades_on_missing_file() {
        let store = RecordStore::<Investor>::load_or_empty("/nonexistent/investors.json");
        assert!(store.is_empty());
    }

    #[test]
    fn skill_lookup_ignores_case() {
        let candidate = Candidate {
            id: "s1".to_string(),
            name: "Ada".to_string(),
            location: None,
            bio: None,
            field_of_study: None,
            skills: vec![Skill {
                name: "Machine Learning".to_string(),
                level: 88,
                verified_at: None,
            }],
            credit_score: None,
        };

        assert_eq!(
            candidate.skill("machine learning").map(|skill| skill.level),
            Some(88)
        );
        assert!(candidate.skill("Python").is_none());
    }

    #[test]
    fn tags_compare_without_ascii_only_folding() {
        assert!(same_tag("Économie", "  économie "));
        assert!(same_tag("ÄRZTLICHE PFLEGE", "ärztliche pflege"));
        assert!(!same_tag("Économie", "economie"));
    }

    #[tokio::test]
    async fn fetch_or_empty_degrades_on_missing_file() {
        let store = RecordStore::<Candidate>::fetch_or_empty("/nonexistent/students.json").await;
        assert!(store.is_empty());
    }
}
