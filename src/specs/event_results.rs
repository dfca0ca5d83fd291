// src/specs/event_results.rs
use crate::core::html::{block_text, find_id, next_tag_block_ci, tag_blocks};
use crate::core::PageSource;
use crate::error::{ExtractError, Result};

/// Raw contents of one event page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventPage {
    /// `<h1>` text, e.g. "Results for Beginner Two-Step".
    pub heading: String,
    /// `<th>` labels of the results table, in order.
    pub headers: Vec<String>,
    /// One entry per `<tr>` with at least one `<td>`.
    pub rows: Vec<Vec<String>>,
}

pub fn fetch(pages: &dyn PageSource, url: &str) -> Result<EventPage> {
    let doc = pages.fetch(url)?;
    let t = std::time::Instant::now();
    let page = parse_doc(&doc)?;
    logd!("Event page parsed in {:?}: {} rows", t.elapsed(), page.rows.len());
    Ok(page)
}

/// Heading = first `<h1>`. Table = first `<table>` inside the element with
/// `id="results"`.
pub fn parse_doc(doc: &str) -> std::result::Result<EventPage, ExtractError> {
    let heading = next_tag_block_ci(doc, "<h1", "</h1>", 0)
        .map(|(s, e)| block_text(&doc[s..e]))
        .filter(|h| !h.is_empty())
        .ok_or(ExtractError::MissingHeading)?;

    let container = find_id(doc, "results").ok_or(ExtractError::MissingTable)?;
    let (tb_s, tb_e) =
        next_tag_block_ci(doc, "<table", "</table>", container).ok_or(ExtractError::MissingTable)?;
    let table = &doc[tb_s..tb_e];

    let headers: Vec<String> = tag_blocks(table, "<th", "</th>").into_iter().map(block_text).collect();

    let rows = tag_blocks(table, "<tr", "</tr>")
        .into_iter()
        .map(|tr| tag_blocks(tr, "<td", "</td>").into_iter().map(block_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();

    Ok(EventPage { heading, headers, rows })
}
