#![deny(missing_docs)]

//! # Spec Sources
//!
//! Resolves the `--input` argument into document text, either from the local
//! file system or over HTTP(S).

use crate::error::{AppError, AppResult};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Where the OpenAPI document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    /// A local file.
    File(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
}

impl SpecSource {
    /// Classifies a raw input argument. Anything with an `http(s)://` scheme is a URL.
    pub fn parse(input: &str) -> Self {
        let lowered = input.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            SpecSource::Url(input.to_string())
        } else {
            SpecSource::File(PathBuf::from(input))
        }
    }

    /// Reads the document text.
    pub fn load(&self) -> AppResult<String> {
        match self {
            SpecSource::File(path) => {
                if !path.exists() {
                    return Err(AppError::Input(format!(
                        "OpenAPI file not found: {:?}",
                        path
                    )));
                }
                info!("Reading OpenAPI spec from {:?}", path);
                fs::read_to_string(path)
                    .map_err(|e| AppError::Input(format!("Failed to read OpenAPI: {}", e)))
            }
            SpecSource::Url(url) => {
                info!("Fetching OpenAPI spec from {}", url);
                fetch(url)
            }
        }
    }
}

#[cfg(feature = "client")]
fn fetch(url: &str) -> AppResult<String> {
    let mut response = ureq::get(url)
        .call()
        .map_err(|e| AppError::Input(format!("Failed to fetch OpenAPI from {}: {}", url, e)))?;
    response
        .body_mut()
        .read_to_string()
        .map_err(|e| AppError::Input(format!("Failed to read OpenAPI from {}: {}", url, e)))
}

#[cfg(not(feature = "client"))]
fn fetch(url: &str) -> AppResult<String> {
    Err(AppError::Input(format!(
        "Cannot fetch {}: built without the `client` feature",
        url
    )))
}
