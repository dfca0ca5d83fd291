// src/table.rs
//! Column semantics of an event results table.
//!
//! Page layout after the leading placement column is dropped:
//!
//! | col 0      | col 1   | col 2..          |
//! |------------|---------|------------------|
//! | competitor | overall | one per judge    |
//!
//! Judge names come from the header row at the same positions.

use crate::error::ExtractError;
use crate::specs::event_results::EventPage;

const SKIP_COLS: usize = 1;
const COMPETITOR_COL: usize = 0;
const OVERALL_COL: usize = 1;
const FIRST_JUDGE_COL: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRow {
    pub competitor: String,
    /// Raw overall score cell.
    pub overall: String,
    /// Raw judge cells aligned with [`ResultTable::judges`]; short rows are
    /// padded with blanks.
    pub cells: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultTable {
    pub style_name: String,
    pub judges: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Shape a scraped page. Rows with a blank competitor are dropped.
    pub fn from_page(style_name: &str, page: &EventPage) -> Result<Self, ExtractError> {
        if page.headers.len() <= SKIP_COLS + OVERALL_COL {
            return Err(ExtractError::MissingHeaders);
        }
        let judges: Vec<String> = page
            .headers
            .iter()
            .skip(SKIP_COLS + FIRST_JUDGE_COL)
            .cloned()
            .collect();

        let mut rows = Vec::with_capacity(page.rows.len());
        for raw in &page.rows {
            let cols: Vec<&str> = raw.iter().skip(SKIP_COLS).map(String::as_str).collect();
            let competitor = cols.get(COMPETITOR_COL).map(|s| s.trim()).unwrap_or("");
            if competitor.is_empty() {
                logd!("Skipping row without competitor: {raw:?}");
                continue;
            }
            let overall = cols.get(OVERALL_COL).copied().unwrap_or("");
            let cells = (0..judges.len())
                .map(|j| s!(cols.get(FIRST_JUDGE_COL + j).copied().unwrap_or("")))
                .collect();
            rows.push(ResultRow { competitor: s!(competitor), overall: s!(overall), cells });
        }

        Ok(Self { style_name: s!(style_name), judges, rows })
    }
}

/// A score cell as an integer. Blank, fractional or otherwise non-integer
/// text is `None`.
pub fn parse_score(cell: &str) -> Option<i64> {
    let t = cell.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(headers: &[&str], rows: &[&[&str]]) -> EventPage {
        EventPage {
            heading: s!("Results for X"),
            headers: headers.iter().map(|s| s!(*s)).collect(),
            rows: rows.iter().map(|r| r.iter().map(|s| s!(*s)).collect()).collect(),
        }
    }

    #[test]
    fn columns_map_to_competitor_overall_judges() {
        let p = page(
            &["Place", "Couple", "Overall", "J1", "J2"],
            &[&["1", "Ann", "1", "1", "2"], &["2", "Bo", "2"]],
        );
        let t = ResultTable::from_page("Waltz", &p).unwrap();
        assert_eq!(t.judges, vec!["J1", "J2"]);
        assert_eq!(t.rows[0].competitor, "Ann");
        assert_eq!(t.rows[0].overall, "1");
        assert_eq!(t.rows[0].cells, vec!["1", "2"]);
        // short row padded
        assert_eq!(t.rows[1].cells, vec!["", ""]);
    }

    #[test]
    fn blank_competitor_rows_are_skipped() {
        let p = page(&["Place", "Couple", "Overall"], &[&["", " ", ""], &["1"]]);
        let t = ResultTable::from_page("Waltz", &p).unwrap();
        assert!(t.rows.is_empty());
        assert!(t.judges.is_empty());
    }

    #[test]
    fn too_few_headers_is_an_error() {
        let p = page(&["Place", "Couple"], &[]);
        assert_eq!(ResultTable::from_page("Waltz", &p), Err(ExtractError::MissingHeaders));
    }

    #[test]
    fn parse_score_accepts_integers_only() {
        assert_eq!(parse_score(" 3 "), Some(3));
        assert_eq!(parse_score("-1"), Some(-1));
        assert_eq!(parse_score("3.5"), None);
        assert_eq!(parse_score("1st"), None);
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("   "), None);
    }
}
