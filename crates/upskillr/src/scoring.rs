//! Canonical candidate-to-partner match score.
//!
//! Employer and investor pages both rank students with [`match_score`]: the
//! share of the partner's tags a candidate covers, each covered tag weighted
//! by the candidate's proficiency in it.
//!
//! ```text
//! score = round(100 * sum(coverage(tag)) / tags)
//! coverage(tag) = level / 100 of the equal-named skill (ignoring case)
//!               = 1.0 when an investor tag equals the field of study
//!               = 0.0 otherwise
//! ```
//!
//! A partner with no tags accepts everyone at 100.

use crate::catalog::{same_tag, Candidate, Employer, Investor, MAX_SKILL_LEVEL};
use crate::filter::{self, PredicateSet};
use serde::Serialize;

/// Employer or investor whose tags candidates are matched against.
pub trait Partner {
    fn tags(&self) -> &[String];
    fn minimum_credit_score(&self) -> Option<u16>;

    /// Investors back fields of study, so a matching field counts in full.
    fn counts_field_of_study(&self) -> bool {
        false
    }
}

impl Partner for Employer {
    fn tags(&self) -> &[String] {
        &self.required_skills
    }

    fn minimum_credit_score(&self) -> Option<u16> {
        self.minimum_credit_score
    }
}

impl Partner for Investor {
    fn tags(&self) -> &[String] {
        &self.preferred_fields
    }

    fn minimum_credit_score(&self) -> Option<u16> {
        self.minimum_credit_score
    }

    fn counts_field_of_study(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateMatch {
    pub candidate_id: String,
    pub name: String,
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u16>,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

fn coverage<P: Partner + ?Sized>(candidate: &Candidate, partner: &P, tag: &str) -> f64 {
    let from_skill = candidate
        .skill(tag)
        .map(|skill| f64::from(skill.level) / f64::from(MAX_SKILL_LEVEL))
        .unwrap_or(0.0);

    let from_field = partner.counts_field_of_study()
        && candidate
            .field_of_study
            .as_deref()
            .is_some_and(|field| same_tag(field, tag));

    if from_field {
        1.0
    } else {
        from_skill
    }
}

pub fn match_score<P: Partner + ?Sized>(candidate: &Candidate, partner: &P) -> u8 {
    let tags = partner.tags();
    if tags.is_empty() {
        return 100;
    }

    let covered: f64 = tags
        .iter()
        .map(|tag| coverage(candidate, partner, tag))
        .sum();

    (covered / tags.len() as f64 * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn explain_match<P: Partner + ?Sized>(candidate: &Candidate, partner: &P) -> CandidateMatch {
    let (matched, missing): (Vec<String>, Vec<String>) = partner
        .tags()
        .iter()
        .cloned()
        .partition(|tag| coverage(candidate, partner, tag) > 0.0);

    CandidateMatch {
        candidate_id: candidate.id.clone(),
        name: candidate.name.clone(),
        score: match_score(candidate, partner),
        credit_score: candidate.credit_score,
        matched,
        missing,
    }
}

/// Candidates meeting the partner's minimum credit score, best match first.
/// Equal scores keep store order.
pub fn rank_candidates<P: Partner + ?Sized>(
    candidates: &[Candidate],
    partner: &P,
) -> Vec<CandidateMatch> {
    let threshold =
        PredicateSet::default().with_min_score(partner.minimum_credit_score().unwrap_or(0));

    let mut ranked: Vec<CandidateMatch> = filter::apply(candidates, &threshold)
        .iter()
        .map(|candidate| explain_match(candidate, partner))
        .collect();
    ranked.sort_by(|left, right| right.score.cmp(&left.score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Skill;

    fn candidate(id: &str, skills: &[(&str, u8)], field: Option<&str>, score: Option<u16>) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: format!("Student {id}"),
            location: None,
            bio: None,
            field_of_study: field.map(str::to_string),
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

    fn employer(skills: &[&str], minimum: Option<u16>) -> Employer {
        Employer {
            id: "e1".to_string(),
            name: "Northwind".to_string(),
            industry: None,
            location: None,
            description: None,
            required_skills: skills.iter().map(|skill| skill.to_string()).collect(),
            minimum_credit_score: minimum,
            open_roles: 1,
        }
    }

    #[test]
    fn weights_covered_tags_by_level() {
        let partner = employer(&["Rust", "SQL"], None);
        let student = candidate("a", &[("rust", 80), ("Excel", 100)], None, None);

        assert_eq!(match_score(&student, &partner), 40);

        let explained = explain_match(&student, &partner);
        assert_eq!(explained.matched, vec!["Rust".to_string()]);
        assert_eq!(explained.missing, vec!["SQL".to_string()]);
    }

    #[test]
    fn partner_without_tags_accepts_everyone() {
        let partner = employer(&[], None);
        assert_eq!(match_score(&candidate("a", &[], None, None), &partner), 100);
    }

    #[test]
    fn investors_count_field_of_study_in_full() {
        let investor = Investor {
            id: "i1".to_string(),
            name: "Bright Futures Fund".to_string(),
            focus: None,
            preferred_fields: vec!["Nursing".to_string(), "Data Science".to_string()],
            minimum_credit_score: None,
            available_funding: 100_000,
        };
        let student = candidate("a", &[("Data Science", 50)], Some("nursing"), None);

        assert_eq!(match_score(&student, &investor), 75);
    }

    #[test]
    fn non_ascii_tags_cover_regardless_of_case() {
        let partner = employer(&["ÉCONOMIE"], None);
        let student = candidate("a", &[("économie", 70)], None, None);

        assert_eq!(match_score(&student, &partner), 70);
    }

    #[test]
    fn ranking_applies_threshold_and_keeps_ties_stable() {
        let partner = employer(&["Rust"], Some(700));
        let students = vec![
            candidate("a", &[("Rust", 60)], None, Some(720)),
            candidate("b", &[("Rust", 90)], None, Some(650)),
            candidate("c", &[("Rust", 90)], None, Some(800)),
            candidate("d", &[("Rust", 60)], None, Some(710)),
            candidate("e", &[("Rust", 99)], None, None),
        ];

        let ranked = rank_candidates(&students, &partner);

        let ids: Vec<_> = ranked.iter().map(|entry| entry.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "d"]);
        assert_eq!(ranked[0].score, 90);
    }
}
