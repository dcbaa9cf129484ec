//! File logging. The terminal belongs to the UI, so `tracing` output goes to
//! `<config dir>/agent007/agent007.log`, filtered by `RUST_LOG` (default `info`).

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use agent007_core::Config;
use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub fn init() -> Result<PathBuf> {
    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir)?;

    let path = dir.join("agent007.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

    Ok(path)
}
