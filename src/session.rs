//! Per-user session
//! Holds the signed-in identity and the cached dataset, and runs the
//! filter -> aggregate pass for each interaction.

use crate::auth::Identity;
use crate::charts::StaticChartRenderer;
use crate::config::{AppConfig, ColumnConfig};
use crate::data::{export, DataProvider, Dataset, FilterSelection};
use crate::error::{DashboardError, PipelineWarning};
use crate::stats::{StatsCalculator, Summary};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

struct CachedDataset {
    dataset: Dataset,
    fetched_at: Instant,
}

impl CachedDataset {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Result of one render pass.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub summary: Summary,
    pub warnings: Vec<PipelineWarning>,
}

impl RenderOutcome {
    pub fn is_empty(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, PipelineWarning::EmptyResult(_)))
    }

    /// Rows of the current selection left off the map.
    pub fn data_quality_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, PipelineWarning::DataQuality(_)))
            .count()
    }
}

/// One user's dashboard state. Sessions share nothing with each other.
pub struct Session {
    identity: Option<Identity>,
    columns: ColumnConfig,
    active_statuses: Vec<String>,
    ttl: Duration,
    cache: Option<CachedDataset>,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            identity: None,
            columns: config.columns.clone(),
            active_statuses: config.kpi.active_statuses.clone(),
            ttl: config.cache.ttl(),
            cache: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn sign_in(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Forget the user and everything loaded on their behalf.
    pub fn sign_out(&mut self) {
        self.identity = None;
        self.cache = None;
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Drop the cached dataset so the next pass fetches again.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn is_fresh(&self) -> bool {
        self.cache.as_ref().is_some_and(|c| c.is_fresh(self.ttl))
    }

    /// The cached dataset, if one has been loaded.
    pub fn cached(&self) -> Option<&Dataset> {
        self.cache.as_ref().map(|c| &c.dataset)
    }

    /// The dataset for this pass, fetched again when missing or older than the TTL.
    pub fn dataset(&mut self, provider: &dyn DataProvider) -> Result<&Dataset, DashboardError> {
        if self.identity.is_none() {
            return Err(DashboardError::Unauthenticated);
        }

        let cached = match self.cache.take() {
            Some(cached) if cached.is_fresh(self.ttl) => {
                debug!("using cached dataset");
                cached
            }
            _ => {
                info!(source = %provider.describe(), "fetching dataset");
                CachedDataset {
                    dataset: Dataset::load(provider, &self.columns)?,
                    fetched_at: Instant::now(),
                }
            }
        };
        Ok(&self.cache.insert(cached).dataset)
    }

    /// Filter the cached dataset and aggregate the result.
    pub fn render(
        &mut self,
        provider: &dyn DataProvider,
        selection: &FilterSelection,
    ) -> Result<RenderOutcome, DashboardError> {
        let active_statuses = self.active_statuses.clone();
        let dataset = self.dataset(provider)?;

        let view = dataset.filter(selection);
        let geo = dataset.filter_geo(selection);
        let summary = StatsCalculator::summarize(&view, &geo, selection, &active_statuses);

        let mut warnings: Vec<PipelineWarning> = dataset
            .data_quality_for(selection)
            .cloned()
            .map(PipelineWarning::from)
            .collect();
        if let Some(empty) = view.empty_warning() {
            warnings.push(empty.into());
        }

        debug!(rows = view.len(), geo = geo.len(), "render pass");
        Ok(RenderOutcome { summary, warnings })
    }

    /// The current filtered view as semicolon-separated CSV.
    pub fn export_csv(
        &mut self,
        provider: &dyn DataProvider,
        selection: &FilterSelection,
    ) -> Result<Vec<u8>, DashboardError> {
        let columns = self.columns.clone();
        let dataset = self.dataset(provider)?;
        let view = dataset.filter(selection);
        Ok(export::to_csv_bytes(
            &view,
            &columns,
            dataset.source_columns(),
            dataset.extra_columns(),
        )?)
    }

    /// Render the top-N city and state charts for the selection into `dir`.
    pub fn export_charts(
        &mut self,
        provider: &dyn DataProvider,
        selection: &FilterSelection,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, DashboardError> {
        let outcome = self.render(provider, selection)?;
        Ok(StaticChartRenderer::export_top_n(dir, &outcome.summary)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::RenderError;
    use crate::data::InMemoryProvider;
    use polars::prelude::*;
    use std::time::Duration;

    fn provider() -> InMemoryProvider {
        InMemoryProvider::new(
            df!(
                "Cidade" => &["Natal", "Recife"],
                "Estado" => &["RN", "PE"],
                "Tipo" => &["EAD", "EAD"],
                "Situacao do contrato" => &["VIGENTE", "CANCELADO"],
                "Curso" => &["Direito", "Direito"]
            )
            .unwrap(),
            df!(
                "Chave" => &["NATAL - RN"],
                "Latitude" => &["-5.79"],
                "Longitude" => &["-35.21"]
            )
            .unwrap(),
        )
    }

    fn signed_in(ttl: Duration) -> Session {
        let mut session = Session::new(&AppConfig::default()).with_ttl(ttl);
        session.sign_in(Identity {
            username: "edu".to_string(),
            display_name: "Eduardo".to_string(),
        });
        session
    }

    #[test]
    fn unauthenticated_session_never_fetches() {
        let provider = provider();
        let mut session = Session::new(&AppConfig::default());
        let err = session.render(&provider, &FilterSelection::new()).unwrap_err();
        assert!(matches!(err, DashboardError::Unauthenticated));
        assert_eq!(provider.fetch_count(), 0);
    }

    #[test]
    fn dataset_is_cached_within_ttl() {
        let provider = provider();
        let mut session = signed_in(Duration::from_secs(3600));
        session.render(&provider, &FilterSelection::new()).unwrap();
        session.render(&provider, &FilterSelection::new()).unwrap();
        assert_eq!(provider.fetch_count(), 1);
        assert!(session.is_fresh());

        session.invalidate();
        session.render(&provider, &FilterSelection::new()).unwrap();
        assert_eq!(provider.fetch_count(), 2);
    }

    #[test]
    fn expired_cache_is_reloaded() {
        let provider = provider();
        let mut session = signed_in(Duration::ZERO);
        session.render(&provider, &FilterSelection::new()).unwrap();
        session.render(&provider, &FilterSelection::new()).unwrap();
        assert_eq!(provider.fetch_count(), 2);
    }

    #[test]
    fn sign_out_drops_cache() {
        let provider = provider();
        let mut session = signed_in(Duration::from_secs(3600));
        session.dataset(&provider).unwrap();
        session.sign_out();
        assert!(session.cached().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn render_reports_rows_missing_from_map() {
        let provider = provider();
        let mut session = signed_in(Duration::from_secs(3600));
        let outcome = session.render(&provider, &FilterSelection::new()).unwrap();
        assert_eq!(outcome.summary.kpis.total, 2);
        assert_eq!(outcome.summary.bubbles.len(), 1);
        assert_eq!(outcome.data_quality_count(), 1);
        assert!(!outcome.is_empty());
    }

    #[test]
    fn data_quality_warnings_follow_the_filter() {
        let provider = provider();
        let mut session = signed_in(Duration::from_secs(3600));

        let recife = FilterSelection::new().with(crate::data::Dimension::City, ["Recife"]);
        let outcome = session.render(&provider, &recife).unwrap();
        assert_eq!(outcome.data_quality_count(), 1);

        let natal = FilterSelection::new().with(crate::data::Dimension::City, ["Natal"]);
        let outcome = session.render(&provider, &natal).unwrap();
        assert_eq!(outcome.data_quality_count(), 0);
        assert_eq!(provider.fetch_count(), 1);
    }

    #[test]
    fn chart_export_of_empty_selection_is_a_render_error() {
        let provider = provider();
        let dir = tempfile::tempdir().unwrap();
        let mut session = signed_in(Duration::from_secs(3600));
        let selection = FilterSelection::new().with(crate::data::Dimension::City, ["Manaus"]);

        let err = session
            .export_charts(&provider, &selection, dir.path())
            .unwrap_err();
        assert!(matches!(err, DashboardError::Render(RenderError::NoData(_))));
        assert_eq!(err.hint(), "Widen the filters so there is something to draw.");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn chart_export_requires_sign_in() {
        let provider = provider();
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(&AppConfig::default());
        let err = session
            .export_charts(&provider, &FilterSelection::new(), dir.path())
            .unwrap_err();
        assert!(matches!(err, DashboardError::Unauthenticated));
    }

    #[test]
    fn failed_fetch_is_source_unavailable() {
        let provider = InMemoryProvider::unavailable();
        let mut session = signed_in(Duration::from_secs(3600));
        let err = session.render(&provider, &FilterSelection::new()).unwrap_err();
        assert!(matches!(err, DashboardError::Source(_)));
        assert!(session.cached().is_none());
    }
}
