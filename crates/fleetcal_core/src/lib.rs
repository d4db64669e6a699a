//! Maintenance calendar aggregation for fleet equipment.
//!
//! Records exported by the fleet API are validated once into a
//! [`snapshot::Snapshot`], then bucketed into a six-week month grid,
//! summarized per status and ranked into an upcoming list by [`calendar`].

pub mod calendar;
pub mod calendar_api;
pub mod config;
pub mod error;
pub mod model;
pub mod snapshot;
pub mod storage;
pub mod style;
