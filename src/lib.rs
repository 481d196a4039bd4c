//! Routes storage "file created" events and timer ticks to a manifest notify API,
//! using a data source configuration document kept in object storage.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod triggers;
