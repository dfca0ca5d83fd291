// src/core/net.rs
// Page fetching. Everything upstream of here only sees `PageSource`.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::consts::{HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::error::NetError;

/// Anything that can turn a URL into an HTML document.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String, NetError>;
}

/// Blocking HTTP(S) GET.
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new() -> Result<Self, NetError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|source| NetError::Request { url: s!("<client>"), source })?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> Result<String, NetError> {
        let t = std::time::Instant::now();
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|source| NetError::Request { url: s!(url), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NetError::Status { url: s!(url), status: status.as_u16() });
        }
        let body = resp
            .text()
            .map_err(|source| NetError::Request { url: s!(url), source })?;
        logd!("GET {url} -> {} bytes in {:?}", body.len(), t.elapsed());
        Ok(body)
    }
}

/// Canned pages keyed by URL. Used for offline runs and tests.
#[derive(Default, Clone)]
pub struct StaticPages {
    pages: HashMap<String, String>,
}

impl StaticPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(s!(url), s!(html));
        self
    }
}

impl PageSource for StaticPages {
    fn fetch(&self, url: &str) -> Result<String, NetError> {
        self.pages.get(url).cloned().ok_or_else(|| NetError::Missing(s!(url)))
    }
}
