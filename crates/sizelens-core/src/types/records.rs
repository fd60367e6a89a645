//! Records produced by the three input parsers.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;

use super::ByteSize;

/// Debug-info tag of a function-like entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind
{
    /// `DW_TAG_subprogram`: an out-of-line function body.
    Subprogram,
    /// `DW_TAG_inlined_subroutine`: a body inlined into a caller.
    InlinedSubroutine,
}

impl FunctionKind
{
    /// Classify a `DW_TAG_*` name; `None` for anything that is not function-like.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self>
    {
        match tag {
            "DW_TAG_subprogram" => Some(FunctionKind::Subprogram),
            "DW_TAG_inlined_subroutine" => Some(FunctionKind::InlinedSubroutine),
            _ => None,
        }
    }

    /// The `DW_TAG_*` spelling.
    #[must_use]
    pub fn tag(self) -> &'static str
    {
        match self {
            FunctionKind::Subprogram => "DW_TAG_subprogram",
            FunctionKind::InlinedSubroutine => "DW_TAG_inlined_subroutine",
        }
    }
}

impl fmt::Display for FunctionKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.tag())
    }
}

/// Code size attributed to one source function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSizeRecord
{
    /// Bytes covered by the function's pc range.
    pub size: ByteSize,
    /// Declaring file, call-site file or compile unit name; empty if none.
    pub file: String,
    /// Declaring or call-site line; 0 if unknown.
    pub line: u64,
    /// Declared or abstract-origin name, never empty.
    pub name: String,
    pub kind: FunctionKind,
}

impl FunctionSizeRecord
{
    /// `file:line` column text with `<unknown>` standing in for a missing file
    /// and the `:line` suffix dropped when the line is 0.
    #[must_use]
    pub fn location(&self) -> String
    {
        let file = if self.file.is_empty() {
            "<unknown>"
        } else {
            self.file.as_str()
        };
        if self.line == 0 {
            file.to_string()
        } else {
            format!("{file}:{}", self.line)
        }
    }

    /// Report order: larger first, then by name.
    #[must_use]
    pub fn report_order(a: &Self, b: &Self) -> Ordering
    {
        b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name))
    }
}

/// Sort records into report order in place.
pub fn sort_function_records(records: &mut [FunctionSizeRecord])
{
    records.sort_by(FunctionSizeRecord::report_order);
}

/// One symbol row from a linker map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSymbolRecord
{
    /// Section label the row was listed under (`CODE`, `.rodata`, ...).
    pub section: String,
    /// File offset exactly as the map printed it.
    pub offset: String,
    pub size: ByteSize,
    /// Object file (or `<internal>`); empty when the row had no `file:(name)` form.
    pub file: String,
    pub name: String,
}

/// Running byte totals per section label, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTotals
{
    totals: IndexMap<String, ByteSize>,
}

impl SectionTotals
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Add `size` to `section`, creating the entry on first use.
    pub fn add(&mut self, section: &str, size: ByteSize)
    {
        *self.totals.entry(section.to_string()).or_default() += size;
    }

    #[must_use]
    pub fn get(&self, section: &str) -> Option<ByteSize>
    {
        self.totals.get(section).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.totals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ByteSize)>
    {
        self.totals.iter().map(|(name, size)| (name.as_str(), *size))
    }
}

/// A `(func $name ...)` definition found in module text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFunctionEntry
{
    /// Identifier as written, including the `$` sigil and any `\XX` escapes.
    pub raw_name: String,
    /// Escapes decoded, sigil stripped.
    pub normalized_name: String,
    /// The defining line followed by as many body lines as the cap allows.
    pub snippet_lines: Vec<String>,
}
