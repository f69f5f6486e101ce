//! Import-side building blocks for lookback: loading the viewing-history
//! export, trimming it to the last calendar year and splitting it into the
//! movie and show streams that the catalog resolver consumes.

pub mod classify;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod storage;
pub mod window;
