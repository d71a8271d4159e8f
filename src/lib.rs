//! Installment planning: spread a total over due dates with exact-cent
//! accuracy, and serve the surrounding lookups and reports over HTTP.

pub mod api;
pub mod calendar;
pub mod config;
pub mod distributor;
pub mod domain;
pub mod registry;
pub mod report;
pub mod telemetry;

pub use distributor::{distribute, distribute_raw};
pub use domain::{Distribution, DueDate, Error, Money, MonthKey};
