use clap::ValueEnum;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use upskillr::config::{AppConfig, CatalogConfig};
use upskillr::dashboard::DashboardKind;
use upskillr::error::AppError;
use upskillr::telemetry;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Which static document a command works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Dataset {
    Students,
    Employers,
    Investors,
}

impl Dataset {
    pub(crate) fn path(self, catalog: &CatalogConfig) -> PathBuf {
        match self {
            Self::Students => catalog.students_path(),
            Self::Employers => catalog.employers_path(),
            Self::Investors => catalog.investors_path(),
        }
    }

    pub(crate) fn dashboard(self) -> DashboardKind {
        match self {
            Self::Students => DashboardKind::EmployerTalent,
            Self::Employers => DashboardKind::HiringPartners,
            Self::Investors => DashboardKind::FundingOpportunities,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum PartnerKind {
    Employer,
    Investor,
}

/// Loads configuration, applies a data-dir override, and starts logging.
/// Command output goes to stdout; logs go to stderr.
pub(crate) fn command_config(data_dir: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = data_dir {
        config.catalog.data_dir = dir;
    }
    telemetry::init(&config.telemetry)?;
    Ok(config)
}
