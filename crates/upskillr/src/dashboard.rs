//! Per-page listing state: `Loading -> Ready(all) -> Ready(subset)*`.
//!
//! A page loads its records exactly once; afterwards only the predicates
//! change. There is no way back to `Loading` for the lifetime of the page.

use crate::catalog::{CatalogError, RecordStore};
use crate::controller::FilterController;
use crate::filter::{PredicateSet, Searchable};
use crate::preview::Preview;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardKind {
    /// Employers browsing students.
    EmployerTalent,
    /// Investors browsing students to fund.
    InvestorPortfolio,
    /// Students browsing investors.
    FundingOpportunities,
    /// Students browsing hiring partners.
    HiringPartners,
}

impl DashboardKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::EmployerTalent => "Employer Dashboard",
            Self::InvestorPortfolio => "Investor Dashboard",
            Self::FundingOpportunities => "Funding Opportunities",
            Self::HiringPartners => "Hiring Partners",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("{0} is still loading")]
    NotReady(&'static str),
    #[error("{0} has already loaded its records")]
    AlreadyLoaded(&'static str),
}

/// Where a page gets its records from.
pub trait RecordSource<T> {
    fn fetch(&self) -> Result<RecordStore<T>, CatalogError>;
}

/// Static JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    pub path: PathBuf,
}

impl JsonDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl<T: DeserializeOwned> RecordSource<T> for JsonDocument {
    fn fetch(&self) -> Result<RecordStore<T>, CatalogError> {
        RecordStore::from_path(&self.path)
    }
}

/// Records already in memory.
impl<T: Clone> RecordSource<T> for RecordStore<T> {
    fn fetch(&self) -> Result<RecordStore<T>, CatalogError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone)]
pub enum DashboardState<T> {
    Loading,
    Ready(FilterController<T>),
}

#[derive(Debug, Clone)]
pub struct DashboardPage<T> {
    kind: DashboardKind,
    preview_limit: usize,
    state: DashboardState<T>,
}

impl<T> DashboardPage<T>
where
    T: Searchable + Clone,
{
    pub fn new(kind: DashboardKind, preview_limit: usize) -> Self {
        Self {
            kind,
            preview_limit,
            state: DashboardState::Loading,
        }
    }

    pub fn kind(&self) -> DashboardKind {
        self.kind
    }

    pub fn state(&self) -> &DashboardState<T> {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, DashboardState::Ready(_))
    }

    /// Fetches once and enters `Ready`. A failed fetch is logged and the page
    /// becomes ready with an empty store; it never stays in `Loading`.
    pub fn load<S: RecordSource<T> + ?Sized>(&mut self, source: &S) -> Result<usize, DashboardError> {
        if self.is_ready() {
            return Err(DashboardError::AlreadyLoaded(self.kind.label()));
        }

        let store = match source.fetch() {
            Ok(store) => store,
            Err(err) => {
                warn!(page = self.kind.label(), error = %err, "record fetch failed; showing empty listing");
                RecordStore::empty()
            }
        };

        let loaded = store.len();
        info!(page = self.kind.label(), records = loaded, "dashboard ready");
        self.state = DashboardState::Ready(FilterController::new(store));
        Ok(loaded)
    }

    pub fn controller(&self) -> Result<&FilterController<T>, DashboardError> {
        match &self.state {
            DashboardState::Ready(controller) => Ok(controller),
            DashboardState::Loading => Err(DashboardError::NotReady(self.kind.label())),
        }
    }

    fn controller_mut(&mut self) -> Result<&mut FilterController<T>, DashboardError> {
        let label = self.kind.label();
        match &mut self.state {
            DashboardState::Ready(controller) => Ok(controller),
            DashboardState::Loading => Err(DashboardError::NotReady(label)),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), DashboardError> {
        self.controller_mut()?.set_text(text);
        Ok(())
    }

    pub fn set_category(&mut self, category: Option<String>) -> Result<(), DashboardError> {
        self.controller_mut()?.set_category(category);
        Ok(())
    }

    pub fn set_min_score(&mut self, min_score: u16) -> Result<(), DashboardError> {
        self.controller_mut()?.set_min_score(min_score);
        Ok(())
    }

    pub fn apply_filters(&mut self, predicates: PredicateSet) -> Result<(), DashboardError> {
        self.controller_mut()?.replace(predicates);
        Ok(())
    }

    /// Wired to the empty state's "Clear filters" action.
    pub fn clear_filters(&mut self) -> Result<(), DashboardError> {
        self.controller_mut()?.clear_all();
        Ok(())
    }

    pub fn preview(&self) -> Result<Preview<T>, DashboardError> {
        let controller = self.controller()?;
        Ok(Preview::build(controller.filtered(), self.preview_limit))
    }
}
