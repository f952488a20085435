//! Flat CSV rosters of a filtered listing, for sharing outside the dashboard.

use crate::catalog::{Candidate, Employer, Investor};
use std::io::Write;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode roster: {0}")]
    Csv(#[from] csv::Error),
}

/// Records that flatten into one CSV row. Multi-valued fields are joined
/// with `"; "`.
pub trait RosterRow {
    fn header() -> &'static [&'static str];
    fn fields(&self) -> Vec<String>;
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

impl RosterRow for Candidate {
    fn header() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "location",
            "field_of_study",
            "credit_score",
            "skills",
            "verified_skills",
        ]
    }

    fn fields(&self) -> Vec<String> {
        let skills = self
            .skills
            .iter()
            .map(|skill| format!("{} ({})", skill.name, skill.level))
            .collect::<Vec<_>>()
            .join("; ");
        let verified = self.skills.iter().filter(|skill| skill.is_verified()).count();

        vec![
            self.id.clone(),
            self.name.clone(),
            optional(self.location.as_deref()),
            optional(self.field_of_study.as_deref()),
            optional(self.credit_score),
            skills,
            verified.to_string(),
        ]
    }
}

impl RosterRow for Employer {
    fn header() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "industry",
            "location",
            "required_skills",
            "minimum_credit_score",
            "open_roles",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            optional(self.industry.as_deref()),
            optional(self.location.as_deref()),
            self.required_skills.join("; "),
            optional(self.minimum_credit_score),
            self.open_roles.to_string(),
        ]
    }
}

impl RosterRow for Investor {
    fn header() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "preferred_fields",
            "minimum_credit_score",
            "available_funding",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.preferred_fields.join("; "),
            optional(self.minimum_credit_score),
            self.available_funding.to_string(),
        ]
    }
}

pub fn write_roster<T: RosterRow, W: Write>(records: &[T], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(T::header())?;
    for record in records {
        csv_writer.write_record(record.fields())?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_roster_to_path<T: RosterRow, P: AsRef<Path>>(
    records: &[T],
    path: P,
) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_roster(records, std::io::BufWriter::new(file))
}
