//! The per-widget fetch lifecycle as a pure state machine.

use crate::types::time_series::WeatherSeries;
use std::sync::Arc;

/// What a widget currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    /// No configuration bound yet.
    #[default]
    Idle,
    Loading,
    Success(Arc<WeatherSeries>),
    /// Holds the message displayed in place of the chart.
    Error(String),
}

/// Inputs to [`FetchState::transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    /// A fetch for a new or re-triggered configuration began.
    Started,
    Succeeded(Arc<WeatherSeries>),
    Failed(String),
}

impl FetchState {
    /// Computes the next state.
    ///
    /// `Started` always leads to `Loading`, dropping previous data and error.
    /// Completions only apply while `Loading`; in any other state they are ignored.
    pub fn transition(self, event: FetchEvent) -> FetchState {
        match (self, event) {
            (_, FetchEvent::Started) => FetchState::Loading,
            (FetchState::Loading, FetchEvent::Succeeded(series)) => FetchState::Success(series),
            (FetchState::Loading, FetchEvent::Failed(message)) => FetchState::Error(message),
            (state, _) => state,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn series(&self) -> Option<&Arc<WeatherSeries>> {
        match self {
            FetchState::Success(series) => Some(series),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::normalizer::normalize;
    use crate::types::metric::Metric;

    fn empty_series() -> Arc<WeatherSeries> {
        Arc::new(normalize(vec![Metric::Humidity], vec![]))
    }

    #[test]
    fn test_lifecycle() {
        let state = FetchState::default().transition(FetchEvent::Started);
        assert!(state.is_loading());

        let success = state.transition(FetchEvent::Succeeded(empty_series()));
        assert!(success.series().is_some());

        let reloading = success.transition(FetchEvent::Started);
        assert_eq!(reloading, FetchState::Loading);

        let failed = reloading.transition(FetchEvent::Failed("boom".to_string()));
        assert_eq!(failed.error(), Some("boom"));
        assert!(failed.series().is_none());
    }

    #[test]
    fn test_completions_outside_loading_are_ignored() {
        let failed = FetchState::Error("first".to_string());
        let still_failed = failed.transition(FetchEvent::Succeeded(empty_series()));
        assert_eq!(still_failed.error(), Some("first"));

        let idle = FetchState::Idle.transition(FetchEvent::Failed("late".to_string()));
        assert_eq!(idle, FetchState::Idle);
    }
}
