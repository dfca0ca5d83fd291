// src/scores.rs
//! Score write-sets and the two ways they reach the store.
//!
//! - [`upsert_scores`]: one document per (competitor, judge, style,
//!   competition), keyed deterministically, so repeating a run rewrites
//!   instead of duplicating.
//! - [`apply_overall_updates`]: sets `overall_score` on every existing
//!   score document of a (competitor, style, competition) trio. It never
//!   creates documents, so an update for a trio with nothing stored yet is
//!   dropped.
//!
//! Neither is transactional. The first failing write stops the batch and
//! earlier writes stay.

use crate::store::{Collection, DocumentStore, Fields, Filter, StoreError};

pub const F_SCORE: &str = "score";
pub const F_OVERALL: &str = "overall_score";
pub const F_PEOPLE: &str = "people_id";
pub const F_JUDGE: &str = "judge_id";
pub const F_STYLE: &str = "style_id";
pub const F_COMP: &str = "comp_id";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreRecord {
    pub competitor_id: String,
    pub judge_id: String,
    pub style_id: String,
    pub competition_id: String,
    pub score: i64,
    pub overall_score: i64,
}

impl ScoreRecord {
    fn to_fields(&self) -> Fields {
        fields! {
            F_SCORE => self.score,
            F_PEOPLE => self.competitor_id.as_str(),
            F_JUDGE => self.judge_id.as_str(),
            F_STYLE => self.style_id.as_str(),
            F_COMP => self.competition_id.as_str(),
            F_OVERALL => self.overall_score,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverallScoreUpdate {
    pub competitor_id: String,
    pub style_id: String,
    pub competition_id: String,
    pub overall_score: i64,
}

/// Document id of a score record.
pub fn score_key(r: &ScoreRecord) -> String {
    format!("{}_{}_{}_{}", r.competitor_id, r.judge_id, r.style_id, r.competition_id)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub inserted: usize,
    pub updated: usize,
}

impl UpsertCounts {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

pub fn upsert_scores(store: &dyn DocumentStore, records: &[ScoreRecord]) -> Result<UpsertCounts, StoreError> {
    let mut counts = UpsertCounts::default();
    for r in records {
        let key = score_key(r);
        if store.exists(Collection::Scores, &key)? {
            store.update(
                Collection::Scores,
                &key,
                fields! { F_OVERALL => r.overall_score, F_SCORE => r.score },
            )?;
            counts.updated += 1;
        } else {
            store.set(Collection::Scores, &key, r.to_fields())?;
            counts.inserted += 1;
        }
    }
    logd!("Upserted {} scores ({} new)", counts.total(), counts.inserted);
    Ok(counts)
}

/// Returns how many score documents were touched in total.
pub fn apply_overall_updates(
    store: &dyn DocumentStore,
    updates: &[OverallScoreUpdate],
) -> Result<usize, StoreError> {
    let mut touched = 0usize;
    for u in updates {
        let filter = Filter::new()
            .where_eq(F_PEOPLE, u.competitor_id.as_str())
            .where_eq(F_STYLE, u.style_id.as_str())
            .where_eq(F_COMP, u.competition_id.as_str());
        let n = store.query_and_update(Collection::Scores, &filter, &fields! { F_OVERALL => u.overall_score })?;
        if n == 0 {
            logd!("No stored scores for {} / {} yet; overall update dropped", u.competitor_id, u.style_id);
        }
        touched += n;
    }
    Ok(touched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn rec(judge: &str, score: i64, overall: i64) -> ScoreRecord {
        ScoreRecord {
            competitor_id: s!("p1"),
            judge_id: s!(judge),
            style_id: s!("s1"),
            competition_id: s!("c1"),
            score,
            overall_score: overall,
        }
    }

    #[test]
    fn key_joins_ids_in_order() {
        assert_eq!(score_key(&rec("j1", 1, 1)), "p1_j1_s1_c1");
    }

    #[test]
    fn repeated_upsert_keeps_one_record_with_last_values() {
        let store = MemoryStore::new();
        let first = upsert_scores(&store, &[rec("j1", 2, 3)]).unwrap();
        assert_eq!(first, UpsertCounts { inserted: 1, updated: 0 });

        let second = upsert_scores(&store, &[rec("j1", 1, 4)]).unwrap();
        assert_eq!(second, UpsertCounts { inserted: 0, updated: 1 });

        let docs = store.list(Collection::Scores).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "p1_j1_s1_c1");
        assert_eq!(docs[0].i64_field(F_SCORE), Some(1));
        assert_eq!(docs[0].i64_field(F_OVERALL), Some(4));
        assert_eq!(docs[0].str_field(F_JUDGE), Some("j1"));
    }

    #[test]
    fn overall_update_hits_every_judge_record_of_the_trio() {
        let store = MemoryStore::new();
        upsert_scores(&store, &[rec("j1", 1, 0), rec("j2", 2, 0)]).unwrap();
        let mut other = rec("j1", 1, 0);
        other.style_id = s!("s2");
        upsert_scores(&store, &[other]).unwrap();

        let n = apply_overall_updates(
            &store,
            &[OverallScoreUpdate {
                competitor_id: s!("p1"),
                style_id: s!("s1"),
                competition_id: s!("c1"),
                overall_score: 7,
            }],
        )
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(store.get(Collection::Scores, "p1_j2_s1_c1").unwrap().unwrap().i64_field(F_OVERALL), Some(7));
        assert_eq!(store.get(Collection::Scores, "p1_j1_s2_c1").unwrap().unwrap().i64_field(F_OVERALL), Some(0));
    }

    #[test]
    fn overall_update_without_records_changes_nothing() {
        let store = MemoryStore::new();
        let before = store.snapshot().unwrap();
        let n = apply_overall_updates(
            &store,
            &[OverallScoreUpdate {
                competitor_id: s!("p9"),
                style_id: s!("s1"),
                competition_id: s!("c1"),
                overall_score: 1,
            }],
        )
        .unwrap();
        assert_eq!(n, 0);
        assert_eq!(store.snapshot().unwrap(), before);
    }
}
