// src/runner.rs
use std::fmt;
use std::time::Duration;

use crate::{
    competition,
    config::RunOptions,
    core::PageSource,
    directory::ReferenceDirectory,
    error::{Error, Result},
    progress::Progress,
    reconcile::{reconcile, Reconciliation},
    scores::{apply_overall_updates, upsert_scores, UpsertCounts},
    specs,
    store::{DocumentStore, StoreError},
    style_name,
    table::ResultTable,
};

/// Totals for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub competition_id: String,
    pub events_found: usize,
    pub events_processed: usize,
    /// Fetch or extraction failed; nothing written.
    pub events_skipped: usize,
    /// At least one store write failed; other phases still ran and earlier
    /// writes stay.
    pub events_failed: usize,
    /// Failed write phases (entity creation, overall updates, score upserts).
    pub store_failures: usize,
    pub scores_inserted: usize,
    pub scores_updated: usize,
    pub overall_updates: usize,
    pub judges_created: usize,
    pub competitors_created: usize,
    pub styles_created: usize,
}

impl RunSummary {
    fn absorb(&mut self, ev: &EventOutcome) {
        if ev.failed_phases.is_empty() {
            self.events_processed += 1;
        } else {
            self.events_failed += 1;
            self.store_failures += ev.failed_phases.len();
        }
        self.scores_inserted += ev.upserts.inserted;
        self.scores_updated += ev.upserts.updated;
        self.overall_updates += ev.overall_touched;
        self.judges_created += ev.reconciliation.created.judges.len();
        self.competitors_created += ev.reconciliation.created.competitors.len();
        self.styles_created += usize::from(ev.reconciliation.created.style_id.is_some());
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Competition id:      {}", self.competition_id)?;
        writeln!(
            f,
            "Events:              {} found, {} processed, {} skipped, {} failed ({} store failures)",
            self.events_found, self.events_processed, self.events_skipped, self.events_failed, self.store_failures
        )?;
        writeln!(
            f,
            "Scores:              {} inserted, {} updated",
            self.scores_inserted, self.scores_updated
        )?;
        writeln!(f, "Overall updates:     {}", self.overall_updates)?;
        write!(
            f,
            "Created:             {} judges, {} competitors, {} styles",
            self.judges_created, self.competitors_created, self.styles_created
        )
    }
}

/// What one event page produced.
#[derive(Clone, Debug)]
pub struct EventOutcome {
    pub style_name: String,
    pub reconciliation: Reconciliation,
    pub upserts: UpsertCounts,
    pub overall_touched: usize,
    /// Write phases that hit a store error.
    pub failed_phases: Vec<&'static str>,
}

/// Scrape every event of the configured competition into `store`.
///
/// Fails only when the competition itself cannot be set up (listing page,
/// competition record, directory load). Per-event failures are logged,
/// counted and skipped.
pub fn run(
    opts: &RunOptions,
    store: &dyn DocumentStore,
    pages: &dyn PageSource,
    mut progress: Option<&mut dyn Progress>,
) -> Result<RunSummary> {
    let mut summary = RunSummary {
        competition_id: competition::get_or_create(store, &opts.competition_name)?,
        ..Default::default()
    };

    let index = specs::event_index::fetch(pages, &opts.listing_url)?;
    summary.events_found = index.event_urls.len();
    if index.event_urls.is_empty() {
        logw!("No event links found on {}", opts.listing_url);
    }

    let mut dir = ReferenceDirectory::load(store)?;

    if let Some(p) = progress.as_deref_mut() {
        p.begin(index.event_urls.len());
    }

    for url in &index.event_urls {
        if opts.request_pause_ms > 0 {
            std::thread::sleep(Duration::from_millis(opts.request_pause_ms));
        }

        match process_event(url, pages, &mut dir, &summary.competition_id) {
            Ok(ev) => {
                logf!(
                    "{url}: '{}' -> {} scores, {} overall updates",
                    ev.style_name,
                    ev.upserts.total(),
                    ev.overall_touched
                );
                summary.absorb(&ev);
                if let Some(p) = progress.as_deref_mut() {
                    if ev.failed_phases.is_empty() {
                        p.item_done(url);
                    } else {
                        p.item_failed(url, &format!("store write failed in: {}", ev.failed_phases.join(", ")));
                    }
                }
            }
            Err(Error::Store(e)) => {
                loge!("{url}: store write failed: {e}");
                summary.events_failed += 1;
                summary.store_failures += 1;
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(url, &e.to_string());
                }
            }
            Err(e) => {
                logw!("{url}: skipped: {e}");
                summary.events_skipped += 1;
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(url, &e.to_string());
                }
            }
        }
    }

    if let Err(e) = store.flush() {
        loge!("Final store flush failed: {e}");
        summary.store_failures += 1;
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    logf!(
        "Run finished: {}/{} events processed",
        summary.events_processed,
        summary.events_found
    );
    Ok(summary)
}

/// Fetch, shape, reconcile and persist one event page.
///
/// The directory is re-read first so entities created by earlier events
/// resolve. A store error while resolving or creating entities fails the
/// event. The two write phases (overall updates, then score upserts) each
/// catch their own store error, so one failing does not stop the other.
pub fn process_event(
    url: &str,
    pages: &dyn PageSource,
    dir: &mut ReferenceDirectory<'_>,
    competition_id: &str,
) -> Result<EventOutcome> {
    let page = specs::event_results::fetch(pages, url)?;
    let style_name = style_name::normalize(&page.heading);
    logd!("{url}: heading {:?} -> style {:?}", page.heading, style_name);

    let table = ResultTable::from_page(&style_name, &page)?;
    dir.refresh()?;
    let reconciliation = reconcile(&table, dir, competition_id)?;
    if reconciliation.dropped_cells > 0 || reconciliation.dropped_rows > 0 {
        logd!(
            "{url}: dropped {} cells and {} rows",
            reconciliation.dropped_cells,
            reconciliation.dropped_rows
        );
    }

    let store = dir.store();
    store.flush()?;

    let mut failed_phases = Vec::new();
    let overall_touched = write_phase(url, "overall updates", &mut failed_phases, || {
        let n = apply_overall_updates(store, &reconciliation.overall_updates)?;
        store.flush()?;
        Ok(n)
    })
    .unwrap_or(0);
    let upserts = write_phase(url, "score upserts", &mut failed_phases, || {
        let counts = upsert_scores(store, &reconciliation.scores)?;
        store.flush()?;
        Ok(counts)
    })
    .unwrap_or_default();

    Ok(EventOutcome { style_name, reconciliation, upserts, overall_touched, failed_phases })
}

/// Run one write phase; a store error is logged and recorded, not returned.
fn write_phase<T>(
    url: &str,
    phase: &'static str,
    failed: &mut Vec<&'static str>,
    f: impl FnOnce() -> std::result::Result<T, StoreError>,
) -> Option<T> {
    match f() {
        Ok(v) => Some(v),
        Err(e) => {
            loge!("{url}: {phase} failed: {e}");
            failed.push(phase);
            None
        }
    }
}
