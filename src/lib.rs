// Crate root library declaration and module exports.
pub mod activity;
pub mod aggregate;
pub mod cli;
pub mod config;
pub mod context;
pub mod digest;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod storage;
pub mod summarize;
