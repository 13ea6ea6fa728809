// File: ./src/logging.rs
// Diagnostic logging: warnings to stderr, everything to a file in the data dir.
use crate::context::AppContext;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::OpenOptions;

/// Installs the global logger. Calling it twice keeps the first logger.
pub fn init(ctx: &dyn AppContext, verbose: bool) {
    let config = ConfigBuilder::new()
        .add_filter_allow_str("statusly")
        .build();

    let term_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = ctx.get_log_file_path() {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, config, file)),
            Err(e) => eprintln!("Could not open log file {}: {}", path.display(), e),
        }
    }

    if CombinedLogger::init(loggers).is_err() {
        log::warn!("Logger already initialised");
    }
}
