//! The widget collection: the only place widgets are added, reconfigured and
//! removed, and where fetch completions are applied.

use crate::error::DashboardError;
use crate::export::csv::export_csv;
use crate::export::error::PDF_FAILED_MESSAGE;
use crate::export::pdf::export_pdf;
use crate::export::region::RenderedRegion;
use crate::service::error::DataFetchError;
use crate::service::generator::ContentGenerator;
use crate::service::weather_service::WeatherService;
use crate::types::period::local_today;
use crate::types::time_series::WeatherSeries;
use crate::types::widget_config::{ExportKind, WidgetConfig, WidgetDraft, WidgetId};
use crate::utils::ensure_dir_exists;
use crate::widget::controller::{FetchTicket, WidgetController};
use chrono::NaiveDate;
use futures_util::FutureExt;
use log::{debug, error, info};
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// The outcome of one spawned fetch, tagged with the ticket it was started for.
#[derive(Debug)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub result: Result<WeatherSeries, DataFetchError>,
}

/// A collection of widgets sharing one [`WeatherService`].
///
/// Adding or reconfiguring a widget spawns its fetch on the tokio runtime the
/// dashboard was created in. Results come back as [`FetchCompletion`]s that
/// the owner applies with [`Dashboard::apply_completion`] (or all at once with
/// [`Dashboard::settle`]); results for superseded configurations or removed
/// widgets are discarded there.
///
/// # Examples
///
/// ```no_run
/// use weather_dash::{
///     Dashboard, GeminiClient, Metric, NamedPeriod, PeriodSelection, Region, WeatherService,
///     WidgetDraft,
/// };
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut dashboard = Dashboard::new(WeatherService::new(GeminiClient::from_env()?))?;
/// let id = dashboard.add_widget(WidgetDraft::new(
///     Region::JejuCity,
///     vec![Metric::AverageTemperature, Metric::Humidity],
///     PeriodSelection::Named(NamedPeriod::Last7Days),
/// )?)?;
/// dashboard.settle().await;
/// println!("{:?}", dashboard.widget(id).map(|w| w.state()));
/// # Ok(())
/// # }
/// ```
pub struct Dashboard<G> {
    service: Arc<WeatherService<G>>,
    runtime: Handle,
    widgets: Vec<WidgetController>,
    next_id: u64,
    completions_tx: UnboundedSender<FetchCompletion>,
    completions_rx: UnboundedReceiver<FetchCompletion>,
    in_flight: usize,
}

impl<G> Dashboard<G>
where
    G: ContentGenerator + 'static,
{
    /// Creates an empty dashboard bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NoRuntime`] when called outside a tokio runtime.
    pub fn new(service: WeatherService<G>) -> Result<Self, DashboardError> {
        let runtime = Handle::try_current()?;
        let (completions_tx, completions_rx) = unbounded_channel();
        Ok(Self {
            service: Arc::new(service),
            runtime,
            widgets: Vec::new(),
            next_id: 1,
            completions_tx,
            completions_rx,
            in_flight: 0,
        })
    }

    /// Adds a widget for `draft`, resolving named periods against today's date,
    /// and starts its first fetch.
    pub fn add_widget(&mut self, draft: WidgetDraft) -> Result<WidgetId, DashboardError> {
        self.add_widget_on(draft, local_today())
    }

    /// Like [`Dashboard::add_widget`], with named periods ending on `today`.
    pub fn add_widget_on(
        &mut self,
        draft: WidgetDraft,
        today: NaiveDate,
    ) -> Result<WidgetId, DashboardError> {
        let id = WidgetId(self.next_id);
        let config = draft.into_config(id, today)?;
        self.next_id += 1;

        info!(
            "Adding {} for {} ({}, {})",
            id,
            config.region,
            config.period_label,
            config.metrics_summary()
        );
        let (controller, ticket) = WidgetController::new(config);
        let config = Arc::clone(controller.config());
        self.widgets.push(controller);
        self.spawn_fetch(ticket, config);
        Ok(id)
    }

    /// Binds a new configuration to an existing widget and re-fetches.
    pub fn reconfigure(&mut self, id: WidgetId, draft: WidgetDraft) -> Result<(), DashboardError> {
        self.reconfigure_on(id, draft, local_today())
    }

    /// Like [`Dashboard::reconfigure`], with named periods ending on `today`.
    pub fn reconfigure_on(
        &mut self,
        id: WidgetId,
        draft: WidgetDraft,
        today: NaiveDate,
    ) -> Result<(), DashboardError> {
        let config = draft.into_config(id, today)?;
        let widget = self.widget_mut(id)?;
        let ticket = widget.bind(config);
        let config = Arc::clone(widget.config());
        debug!("Reconfigured {} (generation {})", id, ticket.generation);
        self.spawn_fetch(ticket, config);
        Ok(())
    }

    /// Re-fetches a widget with its current configuration.
    pub fn refresh(&mut self, id: WidgetId) -> Result<(), DashboardError> {
        let widget = self.widget_mut(id)?;
        let ticket = widget.restart();
        let config = Arc::clone(widget.config());
        self.spawn_fetch(ticket, config);
        Ok(())
    }

    /// Removes a widget; any fetch still in flight for it is discarded on arrival.
    pub fn remove_widget(&mut self, id: WidgetId) -> Result<Arc<WidgetConfig>, DashboardError> {
        let index = self
            .widgets
            .iter()
            .position(|w| w.id() == id)
            .ok_or(DashboardError::WidgetNotFound(id))?;
        let removed = self.widgets.remove(index);
        info!("Removed {}", id);
        Ok(Arc::clone(removed.config()))
    }

    pub fn widget(&self, id: WidgetId) -> Option<&WidgetController> {
        self.widgets.iter().find(|w| w.id() == id)
    }

    /// All widgets in the order they were added.
    pub fn widgets(&self) -> &[WidgetController] {
        &self.widgets
    }

    /// Number of spawned fetches whose completion has not been received yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Waits for the next fetch to finish. Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<FetchCompletion> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        self.in_flight -= 1;
        Some(completion)
    }

    /// Applies a completion to its widget. Returns `false` when it was discarded
    /// because the widget is gone or has moved on to a newer generation.
    pub fn apply_completion(&mut self, completion: FetchCompletion) -> bool {
        let FetchCompletion { ticket, result } = completion;
        let Some(widget) = self.widgets.iter_mut().find(|w| w.id() == ticket.id) else {
            debug!("Discarding result for removed {}", ticket.id);
            return false;
        };
        let outcome = result.map_err(|e| {
            error!("Fetch for {} failed: {}", ticket.id, e);
            e.user_message().to_string()
        });
        widget.complete(ticket.generation, outcome)
    }

    /// Receives and applies completions until no fetch is in flight.
    /// Returns how many were applied rather than discarded.
    pub async fn settle(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.next_completion().await {
            if self.apply_completion(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Writes the widget's current data as CSV into `dir`.
    ///
    /// The data is snapshotted before any I/O. Returns `Ok(None)` when the
    /// widget has no data (still loading, failed, or an empty series).
    pub async fn export_csv(
        &self,
        id: WidgetId,
        dir: &Path,
    ) -> Result<Option<PathBuf>, DashboardError> {
        let widget = self.widget(id).ok_or(DashboardError::WidgetNotFound(id))?;
        let Some(series) = widget.series() else {
            return Ok(None);
        };
        let path = dir.join(widget.config().export_file_name(ExportKind::Csv));
        ensure_dir_exists(dir).await?;
        Ok(export_csv(series, &path).await?)
    }

    /// Renders `region` (the widget's on-screen card) into a PDF report in `dir`.
    ///
    /// Only available once the widget has data; returns `Ok(None)` otherwise.
    /// A failure is recorded as the widget's export error without touching its
    /// data or fetch state.
    pub async fn export_pdf<R>(
        &mut self,
        id: WidgetId,
        region: R,
        dir: &Path,
    ) -> Result<Option<PathBuf>, DashboardError>
    where
        R: RenderedRegion + Send + 'static,
    {
        let widget = self.widget(id).ok_or(DashboardError::WidgetNotFound(id))?;
        if widget.series().is_none() {
            return Ok(None);
        }
        let path = dir.join(widget.config().export_file_name(ExportKind::Pdf));

        let outcome = match ensure_dir_exists(dir).await {
            Ok(()) => export_pdf(region, &path).await,
            Err(e) => Err(e),
        };
        let widget = self.widget_mut(id)?;
        match outcome {
            Ok(path) => {
                widget.set_export_error(None);
                Ok(Some(path))
            }
            Err(e) => {
                error!("Failed to generate PDF for {}: {}", id, e);
                widget.set_export_error(Some(PDF_FAILED_MESSAGE.to_string()));
                Err(e.into())
            }
        }
    }

    fn widget_mut(&mut self, id: WidgetId) -> Result<&mut WidgetController, DashboardError> {
        self.widgets
            .iter_mut()
            .find(|w| w.id() == id)
            .ok_or(DashboardError::WidgetNotFound(id))
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket, config: Arc<WidgetConfig>) {
        let service = Arc::clone(&self.service);
        let tx = self.completions_tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            let fetch = service.fetch(config.region, &config.metrics, config.range);
            let result = AssertUnwindSafe(fetch)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(DataFetchError::Service("fetch task panicked".to_string())));
            // The receiver only disappears with the dashboard itself.
            let _ = tx.send(FetchCompletion { ticket, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::error::ExportError;
    use crate::export::region::{BitmapRegion, Rgb};
    use crate::query::builder::StructuredQuery;
    use crate::service::error::FETCH_FAILED_MESSAGE;
    use crate::types::metric::Metric;
    use crate::types::period::{NamedPeriod, PeriodSelection};
    use crate::types::region::Region;
    use crate::widget::fetch_state::FetchState;
    use image::{Rgba, RgbaImage};
    use serde_json::json;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    /// Answers each region with whatever is later pushed through its gate.
    struct GatedGenerator {
        gates: Mutex<HashMap<Region, oneshot::Receiver<Result<String, String>>>>,
    }

    impl GatedGenerator {
        fn new(gates: Vec<(Region, oneshot::Receiver<Result<String, String>>)>) -> Self {
            Self {
                gates: Mutex::new(gates.into_iter().collect()),
            }
        }
    }

    impl ContentGenerator for GatedGenerator {
        fn generate(
            &self,
            query: &StructuredQuery,
        ) -> impl Future<Output = Result<String, DataFetchError>> + Send {
            let gate = self.gates.lock().unwrap().remove(&query.region);
            async move {
                match gate {
                    Some(gate) => gate
                        .await
                        .unwrap_or_else(|_| Err("gate dropped".to_string()))
                        .map_err(DataFetchError::Service),
                    None => Err(DataFetchError::Service("no gate".to_string())),
                }
            }
        }
    }

    /// Answers every query immediately with one record per requested day.
    struct EchoGenerator;

    impl ContentGenerator for EchoGenerator {
        async fn generate(&self, query: &StructuredQuery) -> Result<String, DataFetchError> {
            let mut records: Vec<_> = query
                .range
                .iter_days()
                .enumerate()
                .map(|(i, date)| {
                    let mut record = serde_json::Map::new();
                    record.insert("date".into(), json!(date.format("%Y-%m-%d").to_string()));
                    for metric in &query.metrics {
                        record.insert(metric.name().into(), json!(10.0 + i as f64));
                        record.insert(metric.avg_key(), json!(9.5 + i as f64 / 4.0));
                    }
                    serde_json::Value::Object(record)
                })
                .collect();
            records.reverse();
            Ok(serde_json::Value::Array(records).to_string())
        }
    }

    struct PanickingGenerator;

    impl ContentGenerator for PanickingGenerator {
        async fn generate(&self, query: &StructuredQuery) -> Result<String, DataFetchError> {
            panic!("generator blew up for {}", query.region);
        }
    }

    struct FailingRegion;

    impl RenderedRegion for FailingRegion {
        fn rasterize(&self, _scale: f32, _background: Rgb) -> Result<RgbaImage, ExportError> {
            Err(ExportError::Rasterize("region detached".to_string()))
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(region: Region) -> WidgetDraft {
        WidgetDraft::new(
            region,
            vec![Metric::AverageTemperature],
            PeriodSelection::Named(NamedPeriod::Today),
        )
        .unwrap()
    }

    fn single_day_payload(date: NaiveDate, temp: f64) -> Result<String, String> {
        Ok(json!([{
            "date": date.format("%Y-%m-%d").to_string(),
            "평균 기온": temp,
            "평균 기온_5yr_avg": 20.0,
        }])
        .to_string())
    }

    fn latest_temp(dashboard: &Dashboard<impl ContentGenerator + 'static>, id: WidgetId) -> Option<f64> {
        dashboard
            .widget(id)?
            .series()?
            .latest()?
            .value(Metric::AverageTemperature)
    }

    #[tokio::test]
    async fn test_late_superseded_response_is_discarded() -> Result<(), DashboardError> {
        let today = day(2024, 8, 15);
        let (tx_a, rx_a) = oneshot::channel();
        let (tx_b, rx_b) = oneshot::channel();
        let generator =
            GatedGenerator::new(vec![(Region::JejuCity, rx_a), (Region::Seogwipo, rx_b)]);
        let mut dashboard = Dashboard::new(WeatherService::new(generator))?;

        let id = dashboard.add_widget_on(draft(Region::JejuCity), today)?;
        dashboard.reconfigure_on(id, draft(Region::Seogwipo), today)?;
        assert_eq!(dashboard.in_flight(), 2);
        assert!(dashboard.widget(id).unwrap().is_loading());

        tx_b.send(single_day_payload(today, 31.5)).unwrap();
        let completion = dashboard.next_completion().await.unwrap();
        assert_eq!(completion.ticket.generation, 2);
        assert!(dashboard.apply_completion(completion));

        tx_a.send(single_day_payload(today, -4.0)).unwrap();
        let late = dashboard.next_completion().await.unwrap();
        assert_eq!(late.ticket.generation, 1);
        assert!(!dashboard.apply_completion(late));

        assert_eq!(latest_temp(&dashboard, id), Some(31.5));
        assert_eq!(dashboard.widget(id).unwrap().config().region, Region::Seogwipo);
        assert!(dashboard.next_completion().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_late_superseded_error_is_discarded() -> Result<(), DashboardError> {
        let today = day(2024, 8, 15);
        let (tx_a, rx_a) = oneshot::channel();
        let (tx_b, rx_b) = oneshot::channel();
        let generator = GatedGenerator::new(vec![(Region::Udo, rx_a), (Region::Seongsan, rx_b)]);
        let mut dashboard = Dashboard::new(WeatherService::new(generator))?;

        let id = dashboard.add_widget_on(draft(Region::Udo), today)?;
        dashboard.reconfigure_on(id, draft(Region::Seongsan), today)?;

        tx_b.send(single_day_payload(today, 18.0)).unwrap();
        tx_a.send(Err("upstream exploded".to_string())).unwrap();
        assert_eq!(dashboard.settle().await, 1);

        let widget = dashboard.widget(id).unwrap();
        assert_eq!(widget.error_message(), None);
        assert_eq!(latest_temp(&dashboard, id), Some(18.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_error_state() -> Result<(), DashboardError> {
        let today = day(2024, 8, 15);
        let (tx, rx) = oneshot::channel();
        let generator = GatedGenerator::new(vec![(Region::Hallasan, rx)]);
        let mut dashboard = Dashboard::new(WeatherService::new(generator))?;

        let id = dashboard.add_widget_on(draft(Region::Hallasan), today)?;
        // A record dated yesterday does not belong to "today".
        tx.send(single_day_payload(day(2024, 8, 14), 10.0)).unwrap();
        dashboard.settle().await;

        let widget = dashboard.widget(id).unwrap();
        assert_eq!(widget.state(), &FetchState::Error(FETCH_FAILED_MESSAGE.to_string()));
        assert!(widget.series().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_panicking_fetch_still_completes() -> Result<(), DashboardError> {
        let mut dashboard = Dashboard::new(WeatherService::new(PanickingGenerator))?;
        let id = dashboard.add_widget_on(draft(Region::Seogwipo), day(2024, 8, 15))?;
        assert_eq!(dashboard.in_flight(), 1);

        assert_eq!(dashboard.settle().await, 1);
        assert_eq!(dashboard.in_flight(), 0);
        let widget = dashboard.widget(id).unwrap();
        assert_eq!(widget.state(), &FetchState::Error(FETCH_FAILED_MESSAGE.to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_widgets_are_independent_and_ordered() -> Result<(), DashboardError> {
        let mut dashboard = Dashboard::new(WeatherService::new(EchoGenerator))?;
        let week = WidgetDraft::new(
            Region::Seogwipo,
            vec![Metric::Humidity, Metric::WindSpeed],
            PeriodSelection::Explicit {
                start: day(2024, 1, 1),
                end: day(2024, 1, 7),
            },
        )
        .unwrap();
        let first = dashboard.add_widget(week)?;
        let second = dashboard.add_widget_on(draft(Region::Udo), day(2024, 2, 1))?;
        assert_ne!(first, second);

        assert_eq!(dashboard.settle().await, 2);
        let ids: Vec<WidgetId> = dashboard.widgets().iter().map(|w| w.id()).collect();
        assert_eq!(ids, vec![first, second]);

        let series = dashboard.widget(first).unwrap().series().unwrap();
        assert_eq!(series.len(), 7);
        assert!(series.records().windows(2).all(|p| p[0].date < p[1].date));
        assert_eq!(dashboard.widget(second).unwrap().series().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_removed_widget_result_is_discarded() -> Result<(), DashboardError> {
        let mut dashboard = Dashboard::new(WeatherService::new(EchoGenerator))?;
        let id = dashboard.add_widget_on(draft(Region::JejuCity), day(2024, 3, 3))?;
        let removed = dashboard.remove_widget(id)?;
        assert_eq!(removed.id, id);
        assert_eq!(dashboard.settle().await, 0);
        assert!(dashboard.widgets().is_empty());
        assert!(matches!(
            dashboard.refresh(id),
            Err(DashboardError::WidgetNotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_refetches_same_configuration() -> Result<(), DashboardError> {
        let mut dashboard = Dashboard::new(WeatherService::new(EchoGenerator))?;
        let id = dashboard.add_widget_on(draft(Region::JejuCity), day(2024, 3, 3))?;
        dashboard.settle().await;
        let before = dashboard.widget(id).unwrap().series().unwrap();

        dashboard.refresh(id)?;
        assert!(dashboard.widget(id).unwrap().is_loading());
        dashboard.settle().await;

        let widget = dashboard.widget(id).unwrap();
        assert_eq!(widget.generation(), 2);
        assert!(!Arc::ptr_eq(&before, &widget.series().unwrap()));
        Ok(())
    }

    #[tokio::test]
    async fn test_exports_use_widget_file_names() -> Result<(), DashboardError> {
        let dir = tempfile::tempdir().unwrap();
        let mut dashboard = Dashboard::new(WeatherService::new(EchoGenerator))?;
        let id = dashboard.add_widget_on(draft(Region::Udo), day(2024, 3, 3))?;

        assert!(dashboard.export_csv(id, dir.path()).await?.is_none());
        dashboard.settle().await;

        let csv = dashboard.export_csv(id, dir.path()).await?.unwrap();
        assert_eq!(csv.file_name().unwrap(), "제주날씨_우도_오늘.csv");
        assert!(csv.exists());

        let region = BitmapRegion::new(RgbaImage::from_pixel(40, 20, Rgba([255, 255, 255, 255])));
        let pdf = dashboard.export_pdf(id, region, dir.path()).await?.unwrap();
        assert_eq!(pdf.file_name().unwrap(), "제주날씨_리포트_우도_오늘.pdf");
        assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));
        Ok(())
    }

    #[tokio::test]
    async fn test_pdf_failure_keeps_data() -> Result<(), DashboardError> {
        let dir = tempfile::tempdir().unwrap();
        let mut dashboard = Dashboard::new(WeatherService::new(EchoGenerator))?;
        let id = dashboard.add_widget_on(draft(Region::Seongsan), day(2024, 3, 3))?;
        dashboard.settle().await;

        let result = dashboard.export_pdf(id, FailingRegion, dir.path()).await;
        assert!(matches!(result, Err(DashboardError::Export(_))));

        let widget = dashboard.widget(id).unwrap();
        assert_eq!(widget.error_message(), Some(PDF_FAILED_MESSAGE));
        assert!(widget.series().is_some());
        assert!(matches!(widget.state(), FetchState::Success(_)));

        let ok = BitmapRegion::new(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255])));
        dashboard.export_pdf(id, ok, dir.path()).await?;
        assert_eq!(dashboard.widget(id).unwrap().export_error(), None);
        Ok(())
    }
}
