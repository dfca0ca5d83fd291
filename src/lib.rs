// src/lib.rs
//! Scrape ballroom competition results pages and reconcile them into a
//! document store of judges, people, styles, competitions and scores.

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod specs;
pub mod store;

pub mod competition;
pub mod directory;
pub mod find_replace;
pub mod progress;
pub mod reconcile;
pub mod runner;
pub mod scores;
pub mod style_name;
pub mod table;

pub use error::{Error, Result};
