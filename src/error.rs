// src/error.rs
//! Error types shared across the crate.

use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

/// Fetching a page failed.
#[derive(Error, Debug)]
pub enum NetError {
    #[error("HTTP request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} {url}")]
    Status { url: String, status: u16 },

    #[error("no fixture page for {0}")]
    Missing(String),
}

/// A page did not have the shape the specs expect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no <h1> heading found")]
    MissingHeading,

    #[error("no results table found")]
    MissingTable,

    #[error("results table has no header row")]
    MissingHeaders,

    #[error("invalid URL {0}")]
    BadUrl(String),

    #[error("no 'cid' parameter in {0}")]
    MissingCid(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("{0}")]
    Invalid(String),
}

/// Crate-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Network error: {0}")]
    Net(#[from] NetError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
