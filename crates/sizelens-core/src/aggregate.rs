//! Grouping and ranking of map symbol records.

use indexmap::IndexMap;

use crate::types::{ByteSize, MapSymbolRecord};

/// Default length of every ranked list in the report.
pub const DEFAULT_TOP_N: usize = 20;

/// One row of a ranked list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry
{
    pub label: String,
    pub size: ByteSize,
}

/// Sum sizes per key, keeping first-seen key order. Empty keys are skipped.
#[must_use]
pub fn group_sum<'a, I, F>(records: I, key_fn: F) -> Vec<RankedEntry>
where
    I: IntoIterator<Item = &'a MapSymbolRecord>,
    F: Fn(&MapSymbolRecord) -> String,
{
    let mut groups: IndexMap<String, ByteSize> = IndexMap::new();
    for record in records {
        let key = key_fn(record);
        if key.is_empty() {
            continue;
        }
        *groups.entry(key).or_default() += record.size;
    }
    groups
        .into_iter()
        .map(|(label, size)| RankedEntry { label, size })
        .collect()
}

/// Largest `n` entries; equal sizes keep their incoming order.
#[must_use]
pub fn top_n(mut entries: Vec<RankedEntry>, n: usize) -> Vec<RankedEntry>
{
    entries.sort_by(|a, b| b.size.cmp(&a.size));
    entries.truncate(n);
    entries
}

/// Object file label for a map `file` column.
///
/// Linker pseudo-files such as `<internal>` are kept verbatim; real paths are
/// reduced to their last component, splitting on either separator.
///
/// ```rust
/// use sizelens_core::aggregate::object_file_name;
///
/// assert_eq!(object_file_name("build/obj/render.o"), "render.o");
/// assert_eq!(object_file_name(r"C:\build\main.o"), "main.o");
/// assert_eq!(object_file_name("<internal>"), "<internal>");
/// ```
#[must_use]
pub fn object_file_name(path: &str) -> String
{
    if path.is_empty() || path.starts_with('<') {
        return path.to_string();
    }
    let trimmed = path.trim_end_matches(['/', '\\']);
    let name = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    if name.is_empty() {
        path.to_string()
    } else {
        name.to_string()
    }
}

/// Top symbol names by summed size. Callers pass the records of one section.
#[must_use]
pub fn rank_symbols<'a, I>(records: I, n: usize) -> Vec<RankedEntry>
where
    I: IntoIterator<Item = &'a MapSymbolRecord>,
{
    top_n(group_sum(records, |record| record.name.clone()), n)
}

/// Top object files by summed size.
#[must_use]
pub fn rank_object_files<'a, I>(records: I, n: usize) -> Vec<RankedEntry>
where
    I: IntoIterator<Item = &'a MapSymbolRecord>,
{
    top_n(group_sum(records, |record| object_file_name(&record.file)), n)
}
