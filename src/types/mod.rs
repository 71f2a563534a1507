pub mod metric;
pub mod period;
pub mod region;
pub mod time_series;
pub mod widget_config;
