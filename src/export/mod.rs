pub mod csv;
pub mod error;
pub mod pdf;
pub mod region;
