// src/find_replace.rs
//! Rename entity names after the fact: find a string in one field of one
//! collection and replace it, optionally with a JSON backup first.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::config::consts::FIND_REPLACE_BATCH;
use crate::error::{Error, Result};
use crate::progress::Progress;
use crate::store::{Collection, DocumentStore, Fields, StoreError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FindReplaceOptions {
    pub collection: Collection,
    pub field: String,
    pub find: String,
    /// May be empty, which deletes the found text.
    pub replace: String,
    pub dry_run: bool,
    pub backup: bool,
    pub case_sensitive: bool,
    pub exact_match: bool,
}

/// Compiled form of `find` under the case/exact settings.
pub struct Matcher {
    find: String,
    case_sensitive: bool,
    exact_match: bool,
    pattern: Regex,
}

impl Matcher {
    pub fn new(opts: &FindReplaceOptions) -> Result<Self> {
        if opts.find.is_empty() {
            return Err(Error::InvalidInput(s!("search text must not be empty")));
        }
        let pattern = RegexBuilder::new(&regex::escape(&opts.find))
            .case_insensitive(!opts.case_sensitive)
            .build()
            .map_err(|e| Error::InvalidInput(format!("bad search text: {e}")))?;
        Ok(Self {
            find: opts.find.clone(),
            case_sensitive: opts.case_sensitive,
            exact_match: opts.exact_match,
            pattern,
        })
    }

    pub fn matches(&self, value: &str) -> bool {
        if self.exact_match {
            self.equals(value)
        } else {
            self.pattern.is_match(value)
        }
    }

    /// Exact mode swaps the whole value; substring mode replaces every
    /// occurrence literally.
    pub fn replacement_for(&self, value: &str, replace: &str) -> String {
        if self.exact_match {
            if self.equals(value) { s!(replace) } else { s!(value) }
        } else {
            self.pattern.replace_all(value, NoExpand(replace)).into_owned()
        }
    }

    fn equals(&self, value: &str) -> bool {
        if self.case_sensitive {
            value == self.find
        } else {
            value.to_lowercase() == self.find.to_lowercase()
        }
    }
}

/// A document whose field matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoundDoc {
    pub id: String,
    pub value: String,
}

/// Documents whose `opts.field` is a string matching `opts.find`.
/// Documents without the field, or with a non-string value, never match.
pub fn find_matching(
    store: &dyn DocumentStore,
    opts: &FindReplaceOptions,
    matcher: &Matcher,
) -> std::result::Result<Vec<FoundDoc>, StoreError> {
    let found: Vec<FoundDoc> = store
        .list(opts.collection)?
        .into_iter()
        .filter_map(|d| {
            let value = d.str_field(&opts.field)?;
            matcher.matches(value).then(|| FoundDoc { id: d.id.clone(), value: s!(value) })
        })
        .collect();
    logf!(
        "Found {} documents in '{}' where '{}' matches {:?}",
        found.len(),
        opts.collection,
        opts.field,
        opts.find
    );
    Ok(found)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub id: String,
    pub old: String,
    pub new: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Every value that changes (or would, in a dry run).
    pub changes: Vec<Change>,
    pub batches: usize,
    /// Documents actually written. Zero in a dry run.
    pub written: usize,
}

/// Write the new values in batches of [`FIND_REPLACE_BATCH`], flushing the
/// store after each. Matches whose value would not change are left alone.
pub fn apply(
    store: &dyn DocumentStore,
    opts: &FindReplaceOptions,
    matcher: &Matcher,
    found: &[FoundDoc],
) -> std::result::Result<ApplyReport, StoreError> {
    let changes: Vec<Change> = found
        .iter()
        .filter_map(|d| {
            let new = matcher.replacement_for(&d.value, &opts.replace);
            (new != d.value).then(|| Change { id: d.id.clone(), old: d.value.clone(), new })
        })
        .collect();

    let mut report = ApplyReport::default();
    for batch in changes.chunks(FIND_REPLACE_BATCH) {
        for c in batch {
            logd!("{}: {:?} -> {:?}", c.id, c.old, c.new);
            if !opts.dry_run {
                let mut fields = Fields::new();
                fields.insert(opts.field.clone(), c.new.as_str().into());
                store.update(opts.collection, &c.id, fields)?;
                report.written += 1;
            }
        }
        if !opts.dry_run {
            store.flush()?;
        }
        report.batches += 1;
        logd!("Committed batch of {} updates (dry run: {})", batch.len(), opts.dry_run);
    }

    report.changes = changes;
    Ok(report)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub collection: String,
    pub timestamp: String,
    pub document_count: usize,
    pub documents: Vec<BackupDoc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackupDoc {
    pub id: String,
    pub data: Fields,
}

/// Dump `collection` to `{dir}/{collection}_backup_{timestamp}.json`.
pub fn create_backup(store: &dyn DocumentStore, collection: Collection, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let stamp = now.replace([':', '.'], "-");
    let path = dir.join(format!("{}_backup_{stamp}.json", collection.as_str()));

    let documents: Vec<BackupDoc> = store
        .list(collection)?
        .into_iter()
        .map(|d| BackupDoc { id: d.id, data: d.fields })
        .collect();
    let backup = Backup {
        collection: s!(collection.as_str()),
        timestamp: now,
        document_count: documents.len(),
        documents,
    };

    fs::write(&path, serde_json::to_string_pretty(&backup)?)?;
    logf!("Backup of {} documents written to {}", backup.document_count, path.display());
    Ok(path)
}

/// Outcome of [`run`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FindReplaceReport {
    pub backup: Option<PathBuf>,
    pub matched: usize,
    pub apply: ApplyReport,
}

/// Backup (unless dry run), find, then apply.
pub fn run(
    store: &dyn DocumentStore,
    opts: &FindReplaceOptions,
    backup_dir: &Path,
    mut progress: Option<&mut dyn Progress>,
) -> Result<FindReplaceReport> {
    let matcher = Matcher::new(opts)?;
    let mut report = FindReplaceReport::default();

    if opts.backup && !opts.dry_run {
        let path = create_backup(store, opts.collection, backup_dir)?;
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("Backup created: {}", path.display()));
        }
        report.backup = Some(path);
    }

    let found = find_matching(store, opts, &matcher)?;
    report.matched = found.len();
    if found.is_empty() {
        if let Some(p) = progress.as_deref_mut() {
            p.log("No matching documents found");
        }
        return Ok(report);
    }

    report.apply = apply(store, opts, &matcher, &found)?;
    if let Some(p) = progress.as_deref_mut() {
        for c in &report.apply.changes {
            p.log(&format!("  {}: {:?} -> {:?}", c.id, c.old, c.new));
        }
        if opts.dry_run {
            p.log(&format!("DRY RUN: no changes made; would update {} documents", report.apply.changes.len()));
        } else {
            p.log(&format!("Total documents updated: {}", report.apply.written));
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn opts(find: &str, replace: &str) -> FindReplaceOptions {
        FindReplaceOptions {
            collection: Collection::People,
            field: s!("name"),
            find: s!(find),
            replace: s!(replace),
            dry_run: false,
            backup: false,
            case_sensitive: false,
            exact_match: false,
        }
    }

    #[test]
    fn substring_replace_is_literal_and_case_insensitive_by_default() {
        let m = Matcher::new(&opts("a.b", "$1")).unwrap();
        assert_eq!(m.replacement_for("xA.Bx a.b", "$1"), "x$1x $1");
        assert_eq!(m.replacement_for("axb", "$1"), "axb");
    }

    #[test]
    fn case_sensitive_substring() {
        let mut o = opts("ann", "Ann");
        o.case_sensitive = true;
        let m = Matcher::new(&o).unwrap();
        assert!(m.matches("joann"));
        assert!(!m.matches("JoAnn"));
    }

    #[test]
    fn exact_match_replaces_whole_value_only() {
        let mut o = opts("john", "John");
        o.exact_match = true;
        let m = Matcher::new(&o).unwrap();
        assert!(m.matches("JOHN"));
        assert!(!m.matches("johnny"));
        assert_eq!(m.replacement_for("JOHN", "John"), "John");
        assert_eq!(m.replacement_for("johnny", "John"), "johnny");
    }

    #[test]
    fn empty_search_text_is_rejected() {
        assert!(matches!(Matcher::new(&opts("", "x")), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn non_string_and_missing_fields_never_match() {
        let store = MemoryStore::new();
        store.add(Collection::People, fields! { "name" => 5 }).unwrap();
        store.add(Collection::People, fields! { "other" => "Ann" }).unwrap();
        let o = opts("5", "x");
        let m = Matcher::new(&o).unwrap();
        assert!(find_matching(&store, &o, &m).unwrap().is_empty());
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let store = MemoryStore::new();
        let id = store.add(Collection::People, fields! { "name" => "Ann & Bo" }).unwrap();
        let mut o = opts(" & ", " and ");
        o.dry_run = true;

        let report = run(&store, &o, Path::new("unused"), None).unwrap();
        assert_eq!(report.matched, 1);
        assert_eq!(report.apply.written, 0);
        assert_eq!(report.apply.changes[0].new, "Ann and Bo");
        assert!(report.backup.is_none());
        let doc = store.get(Collection::People, &id).unwrap().unwrap();
        assert_eq!(doc.str_field("name"), Some("Ann & Bo"));
    }

    #[test]
    fn unchanged_values_are_not_written() {
        let store = MemoryStore::new();
        store.add(Collection::People, fields! { "name" => "Ann" }).unwrap();
        let o = opts("ann", "Ann");
        let report = run(&store, &o, Path::new("unused"), None).unwrap();
        assert_eq!(report.matched, 1);
        assert!(report.apply.changes.is_empty());
        assert_eq!(report.apply.batches, 0);
    }
}
