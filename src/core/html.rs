// src/core/html.rs
// Tolerant, case-insensitive scanning over raw HTML. Tag and attribute
// names are matched ASCII-case-insensitively; content keeps its case.

use super::sanitize::{normalize_entities, normalize_ws};

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Next `open ... close` block at or after `from`, as byte offsets
/// `(start_of_open_tag, end_of_close_tag)`.
///
/// `open` is a tag prefix such as `"<td"`; it only matches when followed by
/// `>`, `/` or whitespace, so `"<t"` never swallows `<table>`.
pub fn next_tag_block_ci(s: &str, open: &str, close: &str, from: usize) -> Option<(usize, usize)> {
    let lc = to_lower(s);
    let open_lc = to_lower(open);
    let close_lc = to_lower(close);

    let mut search = from;
    let start = loop {
        let at = lc.get(search..)?.find(&open_lc)? + search;
        let next = lc.as_bytes().get(at + open_lc.len()).copied();
        match next {
            Some(b'>') | Some(b'/') | Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') | None => break at,
            _ => search = at + open_lc.len(),
        }
    };
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lc[open_end..].find(&close_lc)?;
    Some((start, open_end + end_rel + close.len()))
}

/// Every `open ... close` block in `s`, in document order.
pub fn tag_blocks<'a>(s: &'a str, open: &str, close: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((b, e)) = next_tag_block_ci(s, open, close, pos) {
        out.push(&s[b..e]);
        pos = e;
    }
    out
}

/// `<td class=x>INNER</td>` -> `INNER` (nested markup kept).
pub fn inner_after_open_tag(block: &str) -> &str {
    match (block.find('>'), block.rfind('<')) {
        (Some(oe), Some(cs)) if cs > oe => &block[oe + 1..cs],
        _ => "",
    }
}

/// The opening tag of a block, up to and including `>`.
pub fn opener(block: &str) -> &str {
    match block.find('>') {
        Some(i) => &block[..=i],
        None => block,
    }
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}

/// Visible text of a block: inner markup stripped, entities decoded,
/// whitespace collapsed.
pub fn block_text(block: &str) -> String {
    normalize_ws(&normalize_entities(&strip_tags(inner_after_open_tag(block))))
}

/// Value of attribute `name` in an opening tag. Handles double, single and
/// unquoted values.
pub fn attr_value(opener: &str, name: &str) -> Option<String> {
    let lc = to_lower(opener);
    let needle = join!(&to_lower(name), "=");

    let mut search = 0usize;
    let at = loop {
        let i = lc.get(search..)?.find(&needle)? + search;
        // must be a whole attribute name, not the tail of another one
        let prev = lc.as_bytes().get(i.wrapping_sub(1)).copied();
        if i == 0 || matches!(prev, Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'<')) {
            break i;
        }
        search = i + needle.len();
    };

    let val = &opener[at + needle.len()..];
    let (quote, off) = match val.as_bytes().first() {
        Some(b'"') => (Some('"'), 1),
        Some(b'\'') => (Some('\''), 1),
        _ => (None, 0),
    };
    let end = match quote {
        Some(q) => val[off..].find(q).map(|e| off + e).unwrap_or(val.len()),
        None => val
            .find(|c: char| c.is_ascii_whitespace() || c == '>')
            .unwrap_or(val.len()),
    };
    Some(normalize_entities(&val[off..end]))
}

/// Byte offset of the first opening tag whose `id` attribute equals `id`.
pub fn find_id(doc: &str, id: &str) -> Option<usize> {
    let mut pos = 0usize;
    while let Some(rel) = doc.get(pos..)?.find('<') {
        let at = pos + rel;
        let end = doc[at..].find('>').map(|e| at + e + 1)?;
        if attr_value(&doc[at..end], "id").as_deref() == Some(id) {
            return Some(at);
        }
        pos = end;
    }
    None
}

/// `href` values of every `<a>` in document order.
pub fn hrefs(doc: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((s, e)) = next_tag_block_ci(doc, "<a", "</a>", pos) {
        let op = opener(&doc[s..e]);
        if let Some(h) = attr_value(op, "href") {
            out.push(h);
        }
        pos = s + op.len();
    }
    out
}
