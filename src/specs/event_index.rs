// src/specs/event_index.rs
use reqwest::Url;

use crate::core::html::hrefs;
use crate::core::PageSource;
use crate::error::{ExtractError, Result};

/// Competition listing: its `cid` and the absolute URL of every event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventIndex {
    pub cid: String,
    pub event_urls: Vec<String>,
}

pub fn fetch(pages: &dyn PageSource, listing_url: &str) -> Result<EventIndex> {
    let cid = extract_cid(listing_url)?;
    let doc = pages.fetch(listing_url)?;
    let event_urls = event_links(&doc, listing_url, &cid)?;
    logf!("Competition cid={cid}: {} event links", event_urls.len());
    Ok(EventIndex { cid, event_urls })
}

/// `https://host/results.php?cid=179` -> `"179"`.
pub fn extract_cid(url: &str) -> std::result::Result<String, ExtractError> {
    let parsed = Url::parse(url).map_err(|_| ExtractError::BadUrl(s!(url)))?;
    parsed
        .query_pairs()
        .find(|(k, v)| k == "cid" && !v.is_empty())
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| ExtractError::MissingCid(s!(url)))
}

/// Links to `results.php?cid={cid}&eid=...`, resolved against `base_url`,
/// in document order with repeats dropped.
pub fn event_links(doc: &str, base_url: &str, cid: &str) -> std::result::Result<Vec<String>, ExtractError> {
    let base = Url::parse(base_url).map_err(|_| ExtractError::BadUrl(s!(base_url)))?;
    let needle = format!("results.php?cid={cid}&eid=");

    let mut out: Vec<String> = Vec::new();
    for href in hrefs(doc) {
        if !href.contains(&needle) {
            continue;
        }
        let Ok(abs) = base.join(&href) else {
            logw!("Skipping unresolvable event link {href}");
            continue;
        };
        let abs = abs.to_string();
        if !out.contains(&abs) {
            out.push(abs);
        }
    }
    Ok(out)
}
