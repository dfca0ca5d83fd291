// src/reconcile.rs
//! Turn one scraped results table into score write-sets.
//!
//! Two phases:
//! 1. Resolve the style, every judge column and every competitor against
//!    the directory. Rows whose competitor resolves emit writes right away;
//!    the rest are held back.
//! 2. If anything was missing, create the missing judges and competitors,
//!    refresh the directory, re-resolve the judge columns, and emit writes
//!    for the held-back rows only.
//!
//! Rows emitted in phase 1 are never revisited. A judge created in phase 2
//! therefore only receives cells from held-back rows in this event.

use crate::directory::{EntityKind, ReferenceDirectory};
use crate::scores::{OverallScoreUpdate, ScoreRecord};
use crate::store::StoreError;
use crate::table::{parse_score, ResultRow, ResultTable};

/// Entities inserted while reconciling one table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Created {
    pub judges: Vec<String>,
    pub competitors: Vec<String>,
    /// Set when the style itself was new.
    pub style_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub style_id: String,
    pub scores: Vec<ScoreRecord>,
    pub overall_updates: Vec<OverallScoreUpdate>,
    pub created: Created,
    /// Cells under a known judge that were blank or not an integer.
    pub dropped_cells: usize,
    /// Rows left out entirely (unparseable overall, or still unresolved).
    pub dropped_rows: usize,
}

struct Target<'a> {
    style_id: &'a str,
    competition_id: &'a str,
}

pub fn reconcile(
    table: &ResultTable,
    dir: &mut ReferenceDirectory<'_>,
    competition_id: &str,
) -> Result<Reconciliation, StoreError> {
    let mut out = Reconciliation::default();

    out.style_id = match dir.lookup(EntityKind::Style, &table.style_name) {
        Some(id) => s!(id),
        None => {
            let id = dir.create(EntityKind::Style, &table.style_name)?;
            logf!("Added missing style '{}' with id {id}", table.style_name);
            out.created.style_id = Some(id.clone());
            id
        }
    };
    let style_id = out.style_id.clone();
    let target = Target { style_id: &style_id, competition_id };

    // Phase 1
    let (judge_ids, missing_judges) = resolve_judges(table, dir);
    let mut held_back: Vec<&ResultRow> = Vec::new();
    for row in &table.rows {
        match dir.lookup(EntityKind::Competitor, &row.competitor) {
            Some(pid) => {
                let pid = s!(pid);
                emit_row(row, &pid, &judge_ids, &target, &mut out);
            }
            None => held_back.push(row),
        }
    }

    if missing_judges.is_empty() && held_back.is_empty() {
        return Ok(out);
    }

    // Phase 2
    for name in distinct(missing_judges.iter().map(String::as_str)) {
        dir.create(EntityKind::Judge, name)?;
        out.created.judges.push(s!(name));
    }
    for name in distinct(held_back.iter().map(|r| r.competitor.as_str())) {
        dir.create(EntityKind::Competitor, name)?;
        out.created.competitors.push(s!(name));
    }
    if !out.created.judges.is_empty() {
        logf!("Inserted missing judges: {}", out.created.judges.join(", "));
    }
    if !out.created.competitors.is_empty() {
        logf!("Inserted missing competitors: {}", out.created.competitors.join(", "));
    }

    dir.refresh()?;
    let (judge_ids, _) = resolve_judges(table, dir);

    for row in held_back {
        match dir.lookup(EntityKind::Competitor, &row.competitor) {
            Some(pid) => {
                let pid = s!(pid);
                logd!("Re-processing competitor '{}'", row.competitor);
                emit_row(row, &pid, &judge_ids, &target, &mut out);
            }
            None => {
                logw!("Competitor '{}' still unresolved after insert", row.competitor);
                out.dropped_rows += 1;
            }
        }
    }

    Ok(out)
}

/// Judge id per column, aligned with `table.judges`, plus the names that
/// did not resolve.
fn resolve_judges(table: &ResultTable, dir: &ReferenceDirectory<'_>) -> (Vec<Option<String>>, Vec<String>) {
    let mut ids = Vec::with_capacity(table.judges.len());
    let mut missing = Vec::new();
    for name in &table.judges {
        let id = dir.lookup(EntityKind::Judge, name).map(String::from);
        if id.is_none() {
            missing.push(name.clone());
        }
        ids.push(id);
    }
    (ids, missing)
}

fn emit_row(
    row: &ResultRow,
    competitor_id: &str,
    judge_ids: &[Option<String>],
    target: &Target<'_>,
    out: &mut Reconciliation,
) {
    let Some(overall) = parse_score(&row.overall) else {
        logw!("Competitor '{}': overall score {:?} is not a number; row skipped", row.competitor, row.overall);
        out.dropped_rows += 1;
        return;
    };
    logd!("Processing competitor '{}', overall {overall}", row.competitor);

    out.overall_updates.push(OverallScoreUpdate {
        competitor_id: s!(competitor_id),
        style_id: s!(target.style_id),
        competition_id: s!(target.competition_id),
        overall_score: overall,
    });

    for (cell, judge_id) in row.cells.iter().zip(judge_ids) {
        let Some(judge_id) = judge_id else { continue };
        match parse_score(cell) {
            Some(score) => out.scores.push(ScoreRecord {
                competitor_id: s!(competitor_id),
                judge_id: judge_id.clone(),
                style_id: s!(target.style_id),
                competition_id: s!(target.competition_id),
                score,
                overall_score: overall,
            }),
            None => out.dropped_cells += 1,
        }
    }
}

/// First occurrence of each name, order kept.
fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for n in names {
        if !out.contains(&n) {
            out.push(n);
        }
    }
    out
}
