// src/specs/mod.rs
//! # Page specs
//!
//! One module per results-portal page. Each spec knows *where the data
//! lives in the HTML* of its page and how to pull it out tolerantly.
//!
//! ## What lives here
//! - Pure HTML parsing (`parse_doc`-style functions) that work on a string,
//!   so they can be tested offline against inline fixtures.
//! - A thin `fetch` wrapper per page that goes through [`PageSource`].
//!
//! ## What does not
//! - Name normalization (`style_name`), column semantics (`table`), and
//!   anything that touches the store. Specs only extract.
//!
//! ## Typical call chain
//! ```text
//! runner -> specs::event_index::fetch()    -> event URLs
//!        -> specs::event_results::fetch()  -> EventPage (heading + cells)
//!        -> table::ResultTable::from_page  -> reconcile
//! ```
//!
//! ## Conventions
//! - Case-insensitive tag detection via `core::html`; no document-wide regexes.
//! - Cell text is tag-stripped, entity-decoded and whitespace-collapsed.
//! - A page without the expected anchor elements is an [`ExtractError`],
//!   never a panic.
//!
//! [`PageSource`]: crate::core::PageSource
//! [`ExtractError`]: crate::error::ExtractError
pub mod event_index;
pub mod event_results;
