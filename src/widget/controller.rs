//! One widget: its bound configuration, fetch state and generation counter.

use crate::types::time_series::WeatherSeries;
use crate::types::widget_config::{WidgetConfig, WidgetId};
use crate::widget::fetch_state::{FetchEvent, FetchState};
use log::debug;
use std::sync::Arc;

/// Identifies one fetch of one widget. Only the ticket carrying the widget's
/// current generation may change its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: WidgetId,
    pub generation: u64,
}

/// Owns the fetch lifecycle of a single widget.
///
/// Every (re)binding bumps the generation; a completion is applied only if it
/// carries the current generation, so a late response for a superseded
/// configuration can never overwrite newer state.
#[derive(Debug)]
pub struct WidgetController {
    config: Arc<WidgetConfig>,
    state: FetchState,
    generation: u64,
    export_error: Option<String>,
}

impl WidgetController {
    /// Binds `config` and enters `Loading`. The returned ticket belongs to the
    /// fetch the caller must now start.
    pub fn new(config: WidgetConfig) -> (Self, FetchTicket) {
        let mut controller = Self {
            config: Arc::new(config),
            state: FetchState::Idle,
            generation: 0,
            export_error: None,
        };
        let ticket = controller.start();
        (controller, ticket)
    }

    /// Replaces the bound configuration and restarts the lifecycle.
    pub fn bind(&mut self, config: WidgetConfig) -> FetchTicket {
        self.config = Arc::new(config);
        self.start()
    }

    /// Restarts the lifecycle for the current configuration.
    pub fn restart(&mut self) -> FetchTicket {
        self.start()
    }

    fn start(&mut self) -> FetchTicket {
        self.generation += 1;
        self.export_error = None;
        self.state = std::mem::take(&mut self.state).transition(FetchEvent::Started);
        FetchTicket {
            id: self.config.id,
            generation: self.generation,
        }
    }

    /// Applies the outcome of the fetch identified by `generation`.
    ///
    /// Returns `false`, leaving the state untouched, when the fetch was superseded.
    pub fn complete(&mut self, generation: u64, outcome: Result<WeatherSeries, String>) -> bool {
        if generation != self.generation {
            debug!(
                "Discarding stale result for {} (generation {}, current {})",
                self.config.id, generation, self.generation
            );
            return false;
        }
        let event = match outcome {
            Ok(series) => FetchEvent::Succeeded(Arc::new(series)),
            Err(message) => FetchEvent::Failed(message),
        };
        self.state = std::mem::take(&mut self.state).transition(event);
        true
    }

    pub fn id(&self) -> WidgetId {
        self.config.id
    }

    pub fn config(&self) -> &Arc<WidgetConfig> {
        &self.config
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// A shared snapshot of the current data, if the last fetch succeeded.
    pub fn series(&self) -> Option<Arc<WeatherSeries>> {
        self.state.series().cloned()
    }

    /// The message to show on the widget: the fetch error, else the last export error.
    pub fn error_message(&self) -> Option<&str> {
        self.state.error().or(self.export_error.as_deref())
    }

    pub fn export_error(&self) -> Option<&str> {
        self.export_error.as_deref()
    }

    pub(crate) fn set_export_error(&mut self, message: Option<String>) {
        self.export_error = message;
    }
}
