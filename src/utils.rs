// =============== Imports ================
use kai_resolver::config::{APP_DIR, Config};

use anyhow::{Context, Result};
use reqwest::{Client, ClientBuilder};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::{self, File};
use std::time::Duration;

/// File logging always, terminal logging on top of it when `verbose`.
pub fn init_log(verbose: bool) -> Result<()> {
    let log_file = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Failed to get local data directory"))?
        .join(APP_DIR)
        .join("debug.log");

    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }
    let log_file_handle = File::create(&log_file).context("Failed to create log file")?;

    let log_config = ConfigBuilder::new()
        .set_time_offset_to_local()
        .unwrap_or_else(|builder| builder)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![WriteLogger::new(
        LevelFilter::Trace,
        log_config.clone(),
        log_file_handle,
    )];
    if verbose {
        loggers.push(TermLogger::new(
            LevelFilter::Info,
            log_config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    CombinedLogger::init(loggers).context("Failed to initialize logger")?;
    Ok(())
}

pub fn build_client(config: &Config) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()
        .with_context(|| "Failed to create HTTP client")
}

// Clearing screen
pub fn clear() {
    let _ = console::Term::stdout().clear_screen();
}
