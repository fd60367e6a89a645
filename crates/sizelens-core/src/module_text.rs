//! # Module text summary
//!
//! Counts top-level constructs in a `wasm2wat` listing and collects a short
//! snippet for every named function. The listing is only used to enrich the
//! report; nothing here contributes to size numbers.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::names::normalize_name;
use crate::types::ModuleFunctionEntry;

static CONSTRUCT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*(type|import|export|func|data|elem|table|memory|global)\b").expect("valid construct regex")
});
static FUNC_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\(func\s+(\$[^\s\)]+)").expect("valid func regex"));

/// Default number of lines kept per function snippet.
pub const DEFAULT_SNIPPET_LINES: usize = 12;

/// Occurrences of each construct opener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstructCounts
{
    pub types: usize,
    pub imports: usize,
    pub exports: usize,
    pub funcs: usize,
    pub data: usize,
    pub elem: usize,
    pub tables: usize,
    pub memories: usize,
    pub globals: usize,
}

impl ConstructCounts
{
    /// `(label, count)` pairs in report order.
    #[must_use]
    pub fn rows(&self) -> [(&'static str, usize); 9]
    {
        [
            ("types", self.types),
            ("imports", self.imports),
            ("exports", self.exports),
            ("funcs", self.funcs),
            ("data", self.data),
            ("elem", self.elem),
            ("tables", self.tables),
            ("memories", self.memories),
            ("globals", self.globals),
        ]
    }
}

/// Count `(keyword` openers anywhere in the text, nested forms included.
#[must_use]
pub fn count_constructs(text: &str) -> ConstructCounts
{
    let mut counts = ConstructCounts::default();
    for caps in CONSTRUCT_RE.captures_iter(text) {
        let slot = match caps.get(1).map(|m| m.as_str()) {
            Some("type") => &mut counts.types,
            Some("import") => &mut counts.imports,
            Some("export") => &mut counts.exports,
            Some("func") => &mut counts.funcs,
            Some("data") => &mut counts.data,
            Some("elem") => &mut counts.elem,
            Some("table") => &mut counts.tables,
            Some("memory") => &mut counts.memories,
            Some("global") => &mut counts.globals,
            _ => continue,
        };
        *slot += 1;
    }
    counts
}

/// Collect `(func $name` definitions with up to `max_lines` lines each.
///
/// A snippet starts at the defining line and keeps following lines until the
/// next definition or the cap, whichever comes first.
#[must_use]
pub fn extract_functions(text: &str, max_lines: usize) -> Vec<ModuleFunctionEntry>
{
    let mut functions = Vec::new();
    let mut current: Option<ModuleFunctionEntry> = None;

    for line in text.lines() {
        if let Some(raw) = FUNC_START_RE.captures(line).and_then(|caps| caps.get(1)) {
            functions.extend(current.take());
            current = Some(ModuleFunctionEntry {
                raw_name: raw.as_str().to_string(),
                normalized_name: normalize_name(raw.as_str()),
                snippet_lines: vec![line.to_string()],
            });
            continue;
        }
        if let Some(function) = current.as_mut() {
            if function.snippet_lines.len() < max_lines {
                function.snippet_lines.push(line.to_string());
            }
        }
    }
    functions.extend(current);
    functions
}

/// Counts and function snippets for one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSummary
{
    pub counts: ConstructCounts,
    pub functions: Vec<ModuleFunctionEntry>,
}

impl ModuleSummary
{
    #[must_use]
    pub fn from_text(text: &str, snippet_lines: usize) -> Self
    {
        let summary = Self {
            counts: count_constructs(text),
            functions: extract_functions(text, snippet_lines),
        };
        debug!(functions = summary.functions.len(), "summarized module text");
        summary
    }
}

/// How the module text for a run was obtained, or why it was not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleTextStatus
{
    /// The listing was already on disk.
    Existing,
    /// The converter produced the listing during this run.
    Generated,
    /// No listing and no module to convert.
    MissingWasm,
    /// No listing and conversion was not attempted.
    Missing,
    /// The converter failed; holds its message.
    Failed(String),
}

impl fmt::Display for ModuleTextStatus
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            ModuleTextStatus::Existing => write!(f, "existing"),
            ModuleTextStatus::Generated => write!(f, "generated"),
            ModuleTextStatus::MissingWasm => write!(f, "missing wasm"),
            ModuleTextStatus::Missing => write!(f, "missing"),
            ModuleTextStatus::Failed(message) => write!(f, "{message}"),
        }
    }
}

/// Module text as the report sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleText
{
    Available(ModuleSummary),
    Unavailable(ModuleTextStatus),
}
