//! Report service: one full report run against the upstream.

use serde::Deserialize;
use thiserror::Error;

use roster_core::DomainError;

use crate::assembler::{ActiveSituations, assemble_report, select_active};
use crate::composer::{EmployeeRecord, RecordComposer};
use crate::loader::load_reference_caches;
use crate::overrides::{OverrideMaps, extract_overrides};
use crate::upstream::{DEFAULT_PAGE_SIZE, UpstreamApi, UpstreamError, UpstreamSession};
use crate::window::ReportWindow;

/// What the report consumer sends: two optional `ddmmyyyy` dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub finish: Option<String>,
}

impl ReportRequest {
    pub fn current_state() -> Self {
        Self::default()
    }

    pub fn between(start: impl Into<String>, finish: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            finish: Some(finish.into()),
        }
    }

    /// The window to scan, or `None` for current-state mode.
    ///
    /// Windowed mode needs both dates; a single date is ignored.
    pub fn window(&self) -> Result<Option<ReportWindow>, DomainError> {
        match (non_blank(&self.start), non_blank(&self.finish)) {
            (Some(start), Some(finish)) => ReportWindow::from_request_dates(start, finish).map(Some),
            _ => Ok(None),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Tunables of a report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub page_size: u32,
    pub active_situations: ActiveSituations,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            active_situations: ActiveSituations::default(),
        }
    }
}

/// Failures that abort a report run. Everything else degrades into
/// missing fields.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid report window: {0}")]
    InvalidWindow(#[from] DomainError),

    #[error("failed to authenticate with Nexti: {0}")]
    Authentication(#[source] UpstreamError),

    #[error("failed to list persons: {0}")]
    PersonListing(#[source] UpstreamError),
}

/// Builds employee reports from an [`UpstreamApi`].
///
/// Holds only read-only configuration; every run gets its own token and caches.
#[derive(Debug, Clone)]
pub struct ReportService<U> {
    upstream: U,
    settings: ReportSettings,
}

impl<U> ReportService<U>
where
    U: UpstreamApi,
{
    pub fn new(upstream: U, settings: ReportSettings) -> Self {
        Self { upstream, settings }
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    /// Run one report.
    pub async fn generate(&self, request: &ReportRequest) -> Result<Vec<EmployeeRecord>, ReportError> {
        let window = request.window()?;

        let session = UpstreamSession::open(&self.upstream, self.settings.page_size)
            .await
            .map_err(ReportError::Authentication)?;
        let caches = load_reference_caches(&session)
            .await
            .map_err(ReportError::PersonListing)?;

        let overrides = match &window {
            Some(window) => {
                tracing::info!(
                    start = %window.start_stamp(),
                    finish = %window.finish_stamp(),
                    "dates provided; merging historical data"
                );
                extract_overrides(&session, window).await
            }
            None => {
                tracing::info!("no dates provided; building current-state report");
                OverrideMaps::default()
            }
        };

        let active = select_active(&caches.persons, &self.settings.active_situations);
        tracing::info!(active = active.len(), "composing report");

        let mut composer = RecordComposer::new(&session, &caches);
        let records = assemble_report(&mut composer, &active, &overrides).await;
        tracing::info!(
            rows = records.len(),
            situations_fetched = composer.details().situations.len(),
            business_units_fetched = composer.details().business_units.len(),
            "report ready"
        );
        Ok(records)
    }
}
