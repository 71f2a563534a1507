pub mod controller;
pub mod dashboard;
pub mod fetch_state;
