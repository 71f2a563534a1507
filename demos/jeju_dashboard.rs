use std::env;
use weather_dash::{
    default_export_dir, Dashboard, DashboardError, FetchState, GeminiClient, Metric, NamedPeriod,
    PeriodSelection, Region, WeatherService, WidgetDraft,
};

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    configure_polars_display();
    let service = WeatherService::new(GeminiClient::from_env()?);
    let mut dashboard = Dashboard::new(service)?;

    let city = dashboard.add_widget(WidgetDraft::new(
        Region::JejuCity,
        vec![Metric::AverageTemperature, Metric::Humidity],
        PeriodSelection::Named(NamedPeriod::Last7Days),
    )?)?;
    let peak = dashboard.add_widget(WidgetDraft::new(
        Region::Hallasan,
        vec![Metric::WindSpeed, Metric::Precipitation],
        PeriodSelection::Named(NamedPeriod::Today),
    )?)?;

    dashboard.settle().await;

    for widget in dashboard.widgets() {
        let config = widget.config();
        println!("{} / {} ({})", config.region, config.period_label, config.metrics_summary());
        match widget.state() {
            FetchState::Success(series) => {
                for headline in series.headline() {
                    println!("  {}: {}", headline.metric, headline.display());
                }
                if let Ok(frame) = series.to_frame() {
                    println!("{}", frame);
                }
            }
            FetchState::Error(message) => println!("  {}", message),
            other => println!("  {:?}", other),
        }
    }

    let dir = default_export_dir();
    for id in [city, peak] {
        if let Some(path) = dashboard.export_csv(id, &dir).await? {
            println!("Saved {}", path.display());
        }
    }

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
}
