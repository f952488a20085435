use crate::infra::{command_config, Dataset, PartnerKind};
use clap::Args;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use upskillr::catalog::{Candidate, Catalog, Employer, Investor, RecordStore};
use upskillr::dashboard::{DashboardKind, DashboardPage, JsonDocument};
use upskillr::error::AppError;
use upskillr::export::{write_roster_to_path, RosterRow};
use upskillr::filter::{PredicateSet, Searchable};
use upskillr::preview::Preview;
use upskillr::scoring::{rank_candidates, CandidateMatch, Partner};

#[derive(Args, Debug)]
pub(crate) struct BrowseArgs {
    /// Dataset to filter
    #[arg(value_enum)]
    pub(crate) dataset: Dataset,
    /// Free-text search over names, bios, and skill/field tags
    #[arg(long, short)]
    pub(crate) query: Option<String>,
    /// Exact skill or field tag (case-insensitive)
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Minimum Education Credit Score (0 disables the threshold)
    #[arg(long, default_value_t = 0)]
    pub(crate) min_score: u16,
    /// Number of cards to preview (defaults to APP_PREVIEW_LIMIT)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Directory holding the JSON documents
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Write every matching record to this CSV file
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Fail instead of showing an empty listing when the document cannot be read
    #[arg(long)]
    pub(crate) strict: bool,
    /// Browse students as this investor; their minimum score becomes the
    /// default threshold
    #[arg(long, value_name = "INVESTOR_ID")]
    pub(crate) investor: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct MatchesArgs {
    /// Kind of partner to rank students for
    #[arg(value_enum)]
    pub(crate) partner: PartnerKind,
    /// Partner identifier, e.g. emp-001
    pub(crate) id: String,
    /// Number of matches to print (defaults to APP_PREVIEW_LIMIT)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Directory holding the JSON documents
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory holding the JSON documents
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

/// One-line card rendering for terminal listings.
pub(crate) trait Card {
    fn card(&self) -> String;
}

impl Card for Candidate {
    fn card(&self) -> String {
        let skills = self
            .skills
            .iter()
            .map(|skill| {
                let mark = if skill.is_verified() { "*" } else { "" };
                format!("{}{} {}", skill.name, mark, skill.level)
            })
            .collect::<Vec<_>>()
            .join(", ");
        let score = self
            .credit_score
            .map(|score| score.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "{} | {} | {} | score {} | {}",
            self.id,
            self.name,
            self.location.as_deref().unwrap_or("-"),
            score,
            skills
        )
    }
}

impl Card for Employer {
    fn card(&self) -> String {
        let minimum = self
            .minimum_credit_score
            .map(|score| format!("min score {score}"))
            .unwrap_or_else(|| "no minimum".to_string());
        format!(
            "{} | {} | {} | {} open roles | {} | needs {}",
            self.id,
            self.name,
            self.industry.as_deref().unwrap_or("-"),
            self.open_roles,
            minimum,
            self.required_skills.join(", ")
        )
    }
}

impl Card for Investor {
    fn card(&self) -> String {
        let minimum = self
            .minimum_credit_score
            .map(|score| format!("min score {score}"))
            .unwrap_or_else(|| "no minimum".to_string());
        let fields = if self.preferred_fields.is_empty() {
            "any field".to_string()
        } else {
            self.preferred_fields.join(", ")
        };
        format!(
            "{} | {} | ${} available | {} | backs {}",
            self.id, self.name, self.available_funding, minimum, fields
        )
    }
}

pub(crate) fn run_browse(args: BrowseArgs) -> Result<(), AppError> {
    let config = command_config(args.data_dir.clone())?;
    let limit = args.limit.unwrap_or(config.catalog.preview_limit);
    let path = args.dataset.path(&config.catalog);
    let mut kind = args.dataset.dashboard();
    let mut predicates = PredicateSet {
        text: args.query.clone().unwrap_or_default(),
        category: args.category.clone(),
        min_score: args.min_score,
    };

    if let Some(investor_id) = &args.investor {
        if args.dataset != Dataset::Students {
            return Err(AppError::BadRequest(
                "--investor only applies to the students dataset".to_string(),
            ));
        }
        let investors = RecordStore::<Investor>::load_or_empty(config.catalog.investors_path());
        let investor = investors.find(investor_id).ok_or_else(|| AppError::NotFound {
            kind: "investor",
            id: investor_id.clone(),
        })?;
        kind = DashboardKind::InvestorPortfolio;
        predicates = portfolio_predicates(investor, predicates);
    }

    match args.dataset {
        Dataset::Students => browse::<Candidate>(kind, path, limit, predicates, &args),
        Dataset::Employers => browse::<Employer>(kind, path, limit, predicates, &args),
        Dataset::Investors => browse::<Investor>(kind, path, limit, predicates, &args),
    }
}

/// An investor's portfolio view keeps an explicit threshold and otherwise
/// falls back to the investor's own minimum score.
fn portfolio_predicates(investor: &Investor, predicates: PredicateSet) -> PredicateSet {
    if predicates.active_min_score().is_some() {
        return predicates;
    }
    let min_score = investor.minimum_credit_score.unwrap_or(0);
    predicates.with_min_score(min_score)
}

fn browse<T>(
    kind: DashboardKind,
    path: PathBuf,
    limit: usize,
    predicates: PredicateSet,
    args: &BrowseArgs,
) -> Result<(), AppError>
where
    T: Searchable + Clone + DeserializeOwned + RosterRow + Card,
{
    let mut page = DashboardPage::<T>::new(kind, limit);
    if args.strict {
        let store = RecordStore::<T>::from_path(&path)?;
        page.load(&store)?;
    } else {
        page.load(&JsonDocument::new(path))?;
    }

    page.apply_filters(predicates)?;

    let controller = page.controller()?;
    println!("{}", kind.label());
    render_filters(controller.predicates());
    render_preview(&page.preview()?);

    if let Some(csv_path) = &args.csv {
        write_roster_to_path(controller.filtered(), csv_path)?;
        println!(
            "\nExported {} records to {}",
            controller.filtered().len(),
            csv_path.display()
        );
    }

    Ok(())
}

pub(crate) fn run_matches(args: MatchesArgs) -> Result<(), AppError> {
    let config = command_config(args.data_dir)?;
    let limit = args.limit.unwrap_or(config.catalog.preview_limit).max(1);
    let catalog = Catalog::load(&config.catalog);

    match args.partner {
        PartnerKind::Employer => {
            let employer = catalog.employers.find(&args.id).ok_or_else(|| AppError::NotFound {
                kind: "employer",
                id: args.id.clone(),
            })?;
            render_matches(&employer.name, employer, &catalog, limit);
        }
        PartnerKind::Investor => {
            let investor = catalog.investors.find(&args.id).ok_or_else(|| AppError::NotFound {
                kind: "investor",
                id: args.id.clone(),
            })?;
            render_matches(&investor.name, investor, &catalog, limit);
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = command_config(args.data_dir)?;
    let catalog = Catalog::load(&config.catalog);

    println!("UpSkillr dashboard walkthrough");
    let mut page =
        DashboardPage::<Candidate>::new(DashboardKind::EmployerTalent, catalog.preview_limit);
    println!(
        "\n[{}] state: loading ({} ready)",
        page.kind().label(),
        if page.is_ready() { "is" } else { "not" }
    );

    let loaded = page.load(&catalog.students)?;
    println!("Loaded {loaded} student records");
    render_preview(&page.preview()?);

    println!("\nFilter: category = Machine Learning");
    page.set_category(Some("Machine Learning".to_string()))?;
    render_preview(&page.preview()?);

    println!("\nFilter: + minimum score 800");
    page.set_min_score(800)?;
    render_preview(&page.preview()?);

    println!("\nFilter: + search \"nonexistent-skill-xyz\"");
    page.set_text("nonexistent-skill-xyz")?;
    render_preview(&page.preview()?);

    println!("\nAction: clear filters");
    page.clear_filters()?;
    render_preview(&page.preview()?);

    if let Some(employer) = catalog.employers.first() {
        println!();
        render_matches(&employer.name, employer, &catalog, 3);
    }
    if let Some(investor) = catalog.investors.first() {
        println!();
        render_matches(&investor.name, investor, &catalog, 3);
    }

    Ok(())
}

fn render_filters(predicates: &PredicateSet) {
    if predicates.is_inactive() {
        println!("Filters: none");
        return;
    }

    let mut parts = Vec::new();
    if let Some(text) = predicates.active_text() {
        parts.push(format!("search \"{text}\""));
    }
    if let Some(category) = predicates.active_category() {
        parts.push(format!("category {category}"));
    }
    if let Some(min_score) = predicates.active_min_score() {
        parts.push(format!("score >= {min_score}"));
    }
    println!("Filters: {}", parts.join(", "));
}

fn render_preview<T: Card>(preview: &Preview<T>) {
    if let Some(empty) = &preview.empty_state {
        println!("  {} [{}]", empty.message, empty.clear_filters.label);
        return;
    }

    for item in &preview.items {
        println!("  - {}", item.card());
    }
    if let Some(view_all) = &preview.view_all {
        println!("  {}", view_all.label);
    }
}

fn render_matches<P: Partner>(name: &str, partner: &P, catalog: &Catalog, limit: usize) {
    let ranked = rank_candidates(&catalog.students, partner);
    let threshold = partner
        .minimum_credit_score()
        .map(|score| format!("score >= {score}"))
        .unwrap_or_else(|| "no score minimum".to_string());

    println!("Top matches for {name} ({threshold}, {} eligible)", ranked.len());
    if ranked.is_empty() {
        println!("  No eligible students");
        return;
    }
    for entry in ranked.iter().take(limit) {
        println!("  - {}", match_line(entry));
    }
}

fn match_line(entry: &CandidateMatch) -> String {
    let missing = if entry.missing.is_empty() {
        String::new()
    } else {
        format!(" | missing {}", entry.missing.join(", "))
    };
    format!(
        "{} {} | match {} | has {}{}",
        entry.candidate_id,
        entry.name,
        entry.score,
        if entry.matched.is_empty() {
            "-".to_string()
        } else {
            entry.matched.join(", ")
        },
        missing
    )
}
