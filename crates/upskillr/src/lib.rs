//! Catalog, faceted filtering, and dashboard state for the UpSkillr platform.
//!
//! Records are loaded once from static JSON documents into immutable
//! [`catalog::RecordStore`]s. Dashboards narrow them with a
//! [`filter::PredicateSet`] through the pure [`filter::apply`] pipeline and
//! render a bounded [`preview::Preview`] of the result.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod filter;
pub mod preview;
pub mod router;
pub mod scoring;
pub mod telemetry;

pub use catalog::{Candidate, Catalog, CatalogError, Employer, Investor, RecordStore, Skill};
pub use controller::FilterController;
pub use dashboard::{DashboardError, DashboardPage, DashboardState};
pub use filter::{PredicateSet, Searchable};
pub use preview::{EmptyState, Preview, ViewAll};
