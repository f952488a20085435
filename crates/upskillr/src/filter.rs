//! Faceted filtering shared by the student, employer, and investor listings.
//!
//! [`apply`] is a pure function of a record slice and a [`PredicateSet`]. Every
//! active predicate must hold (logical AND); an inactive predicate imposes no
//! constraint. Fields a record lacks never match, they never fail the pass.

use crate::catalog::{same_tag, Candidate, Employer, Investor};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// The current combination of filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateSet {
    /// Free-text query; empty or whitespace means inactive.
    #[serde(default)]
    pub text: String,
    /// Skill/field tag; `None` or blank means inactive.
    #[serde(default)]
    pub category: Option<String>,
    /// Minimum score; zero means inactive.
    #[serde(default)]
    pub min_score: u16,
}

impl PredicateSet {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_min_score(mut self, min_score: u16) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn active_text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    pub fn active_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
    }

    pub fn active_min_score(&self) -> Option<u16> {
        (self.min_score > 0).then_some(self.min_score)
    }

    pub fn is_inactive(&self) -> bool {
        self.active_text().is_none()
            && self.active_category().is_none()
            && self.active_min_score().is_none()
    }

    /// Number of predicates currently constraining the result.
    pub fn active_count(&self) -> usize {
        usize::from(self.active_text().is_some())
            + usize::from(self.active_category().is_some())
            + usize::from(self.active_min_score().is_some())
    }

    pub fn matches<T: Searchable + ?Sized>(&self, record: &T) -> bool {
        if let Some(text) = self.active_text() {
            let needle = text.to_lowercase();
            if !record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        if let Some(category) = self.active_category() {
            if !record.in_category(category) {
                return false;
            }
        }

        if let Some(min_score) = self.active_min_score() {
            match record.score() {
                Some(score) if score >= min_score => {}
                _ => return false,
            }
        }

        true
    }
}

/// What a record exposes to the filter pipeline.
pub trait Searchable {
    /// Fields consulted by the free-text predicate.
    fn search_fields(&self) -> Vec<&str>;

    /// Whether the record carries a tag equal (ignoring case) to `category`.
    fn in_category(&self, category: &str) -> bool;

    /// Value compared against the minimum-score predicate.
    fn score(&self) -> Option<u16>;
}

impl Searchable for Candidate {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.bio.as_deref());
        fields.extend(self.skills.iter().map(|skill| skill.name.as_str()));
        fields
    }

    fn in_category(&self, category: &str) -> bool {
        self.skills
            .iter()
            .any(|skill| same_tag(&skill.name, category))
    }

    fn score(&self) -> Option<u16> {
        self.credit_score
    }
}

impl Searchable for Employer {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields.extend(self.industry.as_deref());
        fields.extend(self.required_skills.iter().map(String::as_str));
        fields
    }

    fn in_category(&self, category: &str) -> bool {
        self.required_skills
            .iter()
            .any(|skill| same_tag(skill, category))
    }

    fn score(&self) -> Option<u16> {
        self.minimum_credit_score
    }
}

impl Searchable for Investor {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.focus.as_deref());
        fields.extend(self.preferred_fields.iter().map(String::as_str));
        fields
    }

    fn in_category(&self, category: &str) -> bool {
        self.preferred_fields
            .iter()
            .any(|field| same_tag(field, category))
    }

    fn score(&self) -> Option<u16> {
        self.minimum_credit_score
    }
}

/// Returns the records satisfying every active predicate, in input order.
pub fn apply<T>(records: &[T], predicates: &PredicateSet) -> Vec<T>
where
    T: Searchable + Clone,
{
    if predicates.is_inactive() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| predicates.matches(*record))
        .cloned()
        .collect()
}

/// Stable ordering by proficiency in `skill`, highest first. Candidates
/// without the skill keep their relative order after everyone who has it.
pub fn sort_by_skill_level(candidates: &mut [Candidate], skill: &str) {
    candidates.sort_by_key(|candidate| {
        Reverse(
            candidate
                .skill(skill)
                .map(|found| i16::from(found.level))
                .unwrap_or(-1),
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Skill;

    fn candidate(id: &str, bio: Option<&str>, skills: &[(&str, u8)], score: Option<u16>) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: format!("Student {id}"),
            location: None,
            bio: bio.map(str::to_string),
            field_of_study: None,
            skills: skills
                .iter()
                .map(|(name, level)| Skill {
                    name: name.to_string(),
                    level: *level,
                    verified_at: None,
                })
                .collect(),
            credit_score: score,
        }
    }

    fn ids(records: &[Candidate]) -> Vec<&str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn blank_predicates_are_inactive() {
        let predicates = PredicateSet::default()
            .with_text("   ")
            .with_category("");

        assert!(predicates.is_inactive());
        assert_eq!(predicates.active_count(), 0);
    }

    #[test]
    fn text_matches_bio_or_any_skill_name() {
        let records = vec![
            candidate("a", Some("Loves data pipelines"), &[], None),
            candidate("b", None, &[("Python", 70)], None),
            candidate("c", None, &[("Welding", 90)], None),
        ];

        let by_bio = apply(&records, &PredicateSet::default().with_text("PIPELINE"));
        let by_skill = apply(&records, &PredicateSet::default().with_text("pyth"));

        assert_eq!(ids(&by_bio), vec!["a"]);
        assert_eq!(ids(&by_skill), vec!["b"]);
    }

    #[test]
    fn category_requires_whole_skill_name() {
        let records = vec![
            candidate("a", None, &[("Machine Learning", 85)], None),
            candidate("b", None, &[("Machine", 85)], None),
        ];

        let filtered = apply(
            &records,
            &PredicateSet::default().with_category("machine learning"),
        );

        assert_eq!(ids(&filtered), vec!["a"]);
    }

    #[test]
    fn category_folds_case_beyond_ascii() {
        let records = vec![
            candidate("a", None, &[("Économie", 70)], None),
            candidate("b", None, &[("Economics", 70)], None),
        ];

        for category in ["économie", "ÉCONOMIE", "Économie"] {
            let by_category = apply(&records, &PredicateSet::default().with_category(category));
            let by_text = apply(&records, &PredicateSet::default().with_text(category));

            assert_eq!(ids(&by_category), vec!["a"], "category {category}");
            assert_eq!(by_category, by_text, "text and category disagree on {category}");
        }
    }

    #[test]
    fn skill_sort_finds_non_ascii_names_in_any_case() {
        let mut records = vec![
            candidate("a", None, &[("Économie", 40)], None),
            candidate("b", None, &[("économie", 90)], None),
        ];

        sort_by_skill_level(&mut records, "ÉCONOMIE");

        assert_eq!(ids(&records), vec!["b", "a"]);
    }

    #[test]
    fn missing_score_never_meets_threshold() {
        let records = vec![
            candidate("a", None, &[], None),
            candidate("b", None, &[], Some(640)),
        ];

        let filtered = apply(&records, &PredicateSet::default().with_min_score(1));

        assert_eq!(ids(&filtered), vec!["b"]);
    }

    #[test]
    fn predicates_combine_with_and() {
        let records = vec![
            candidate("a", None, &[("Rust", 90)], Some(800)),
            candidate("b", None, &[("Rust", 60)], Some(600)),
            candidate("c", None, &[("Go", 60)], Some(850)),
        ];

        let filtered = apply(
            &records,
            &PredicateSet::default()
                .with_category("rust")
                .with_min_score(700),
        );

        assert_eq!(ids(&filtered), vec!["a"]);
    }

    #[test]
    fn skill_level_sort_is_stable_and_puts_missing_last() {
        let mut records = vec![
            candidate("a", None, &[("SQL", 50)], None),
            candidate("b", None, &[], None),
            candidate("c", None, &[("sql", 90)], None),
            candidate("d", None, &[("SQL", 50)], None),
            candidate("e", None, &[("SQL", 0)], None),
        ];

        sort_by_skill_level(&mut records, "SQL");

        assert_eq!(ids(&records), vec!["c", "a", "d", "e", "b"]);
    }

    #[test]
    fn employer_and_investor_tags_drive_category() {
        let employer = Employer {
            id: "e1".to_string(),
            name: "Northwind".to_string(),
            industry: Some("Logistics".to_string()),
            location: None,
            description: None,
            required_skills: vec!["Data Analysis".to_string()],
            minimum_credit_score: Some(650),
            open_roles: 2,
        };
        let investor = Investor {
            id: "i1".to_string(),
            name: "Bright Futures Fund".to_string(),
            focus: None,
            preferred_fields: vec!["Nursing".to_string()],
            minimum_credit_score: None,
            available_funding: 250_000,
        };

        assert!(PredicateSet::default()
            .with_category("data analysis")
            .matches(&employer));
        assert!(PredicateSet::default().with_text("logistics").matches(&employer));
        assert!(PredicateSet::default().with_category("NURSING").matches(&investor));
        assert!(!PredicateSet::default().with_min_score(600).matches(&investor));
    }
}
