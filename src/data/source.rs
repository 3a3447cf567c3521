//! One-shot loading of the SBS CSV export.
//!
//! The export is a static asset: either a file on disk (the default, staged
//! under `data/`) or an `http(s)://` URL. The whole text is read once at
//! startup; there is no streaming or reload.

use std::path::PathBuf;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::AppError;

/// Default location of the staged export.
pub const DEFAULT_SOURCE: &str = "data/hipotecarios_300_habiles.csv";

/// Environment variable (also read from `.env`) overriding [`DEFAULT_SOURCE`].
pub const SOURCE_ENV: &str = "SBS_RATES_CSV";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// Interpret a location string: `http://` / `https://` are URLs, anything else a path.
    pub fn from_location(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }

    /// Read the whole export as text.
    pub fn fetch_text(&self) -> Result<String, AppError> {
        let text = match self {
            DataSource::File(path) => std::fs::read_to_string(path)
                .map_err(|e| AppError::input(format!("Failed to read CSV '{}': {e}", path.display())))?,
            DataSource::Url(url) => fetch_url(url)?,
        };
        info!(source = %self, bytes = text.len(), "loaded rate export");
        Ok(text)
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// Resolve the source location: explicit flag, then `SBS_RATES_CSV`, then the default.
pub fn resolve_location(explicit: Option<&str>) -> String {
    if let Some(location) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return location.to_string();
    }
    dotenvy::dotenv().ok();
    match std::env::var(SOURCE_ENV) {
        Ok(location) if !location.trim().is_empty() => {
            debug!(env = SOURCE_ENV, %location, "using source from environment");
            location.trim().to_string()
        }
        _ => DEFAULT_SOURCE.to_string(),
    }
}

fn fetch_url(url: &str) -> Result<String, AppError> {
    let resp = Client::new()
        .get(url)
        .send()
        .map_err(|e| AppError::runtime(format!("CSV request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::runtime(format!(
            "CSV request failed with status {}.",
            resp.status()
        )));
    }

    resp.text()
        .map_err(|e| AppError::runtime(format!("Failed to read CSV response: {e}")))
}
