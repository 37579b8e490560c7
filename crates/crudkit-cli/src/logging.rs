// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::APP_NAME;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// The terminal is in raw mode, so output goes to a file.
    File,
    Stderr,
}

pub fn log_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os("CRUDKIT_LOG_PATH") {
        return Ok(PathBuf::from(path));
    }
    let data_root = dirs::data_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set CRUDKIT_LOG_PATH to a log file")
    })?;
    Ok(data_root.join(APP_NAME).join(format!("{APP_NAME}.log")))
}

fn env_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter)
        .with_context(|| format!("invalid log filter {filter:?} -- check CRUDKIT_LOG or [log].filter"))
}

pub fn init_logging(filter: &str, target: LogTarget) -> Result<()> {
    let filter = env_filter(filter)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File => {
            let path = log_path()?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    installed.map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[cfg(test)]
mod tests {
    use super::env_filter;

    #[test]
    fn filters_parse_or_explain() {
        assert!(env_filter("crudkit=debug,warn").is_ok());
        let error = env_filter("crudkit=loudest").expect_err("bad directive should fail");
        assert!(error.to_string().contains("CRUDKIT_LOG"));
    }
}
