//! # Size report
//!
//! Assembles the parsed inputs into one fixed-shape text document. The shape
//! never depends on how much was parsed: every block is always present, and
//! ranked lists with nothing in them say `(no entries)`.

use std::fmt;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::aggregate::{rank_object_files, rank_symbols, RankedEntry};
use crate::map::MapListing;
use crate::module_text::{ModuleSummary, ModuleText};
use crate::names::find_module_function;
use crate::types::{ByteSize, FunctionSizeRecord};

pub const REPORT_TITLE: &str = "sizelens size report";
pub const NO_ENTRIES: &str = "(no entries)";

pub const TOP_FUNCTIONS_TITLE: &str = "DWARF Top Functions";
pub const SECTION_SUMMARY_TITLE: &str = "Map Section Summary";
pub const CODE_BY_OBJECT_TITLE: &str = "Map CODE By Object File";
pub const MODULE_SUMMARY_TITLE: &str = "WAT Summary";
pub const MODULE_SNIPPETS_TITLE: &str = "WAT Snippets (Top Functions)";

/// Sections ranked by symbol name, in report order.
pub const RANKED_SECTIONS: [&str; 4] = ["CODE", ".rodata", ".data", ".bss"];

/// Section labels shown in the summary, in this order. Anything else the map
/// lists is left out of the summary.
pub const SECTION_SUMMARY_ORDER: [&str; 16] = [
    "CODE",
    ".rodata",
    ".data",
    ".bss",
    "CUSTOM(name)",
    "CUSTOM(producers)",
    "CUSTOM(target_features)",
    "TYPE",
    "IMPORT",
    "EXPORT",
    "ELEM",
    "FUNCTION",
    "TABLE",
    "MEMORY",
    "GLOBAL",
    "DATA",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A titled block of report lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection
{
    pub title: String,
    pub lines: Vec<String>,
}

impl ReportSection
{
    fn new(title: impl Into<String>) -> Self
    {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }
}

/// The finished report. Built once by [`build_report`] and only read after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report
{
    preamble: Vec<String>,
    sections: Vec<ReportSection>,
}

impl Report
{
    /// Title, timestamp and input paths.
    #[must_use]
    pub fn preamble(&self) -> &[String]
    {
        &self.preamble
    }

    #[must_use]
    pub fn sections(&self) -> &[ReportSection]
    {
        &self.sections
    }

    /// Look a section up by its exact title.
    #[must_use]
    pub fn section(&self, title: &str) -> Option<&ReportSection>
    {
        self.sections.iter().find(|section| section.title == title)
    }
}

impl fmt::Display for Report
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        for line in &self.preamble {
            writeln!(f, "{line}")?;
        }
        writeln!(f)?;
        for section in &self.sections {
            writeln!(f, "{}", section.title)?;
            writeln!(f, "{}", "=".repeat(section.title.len()))?;
            for line in &section.lines {
                writeln!(f, "{line}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Everything the report is built from.
#[derive(Debug, Clone)]
pub struct ReportInput<'a>
{
    pub dwarf_path: &'a Path,
    pub map_path: &'a Path,
    /// Shown in the preamble when a module text path was configured.
    pub wat_path: Option<&'a Path>,
    pub generated_at: NaiveDateTime,
    pub top_n: usize,
    /// Function records in report order.
    pub functions: &'a [FunctionSizeRecord],
    pub map: &'a MapListing,
    pub module: &'a ModuleText,
}

fn size_columns(size: ByteSize) -> String
{
    format!("{:>7}  {:>9}", size.bytes_label(), size.kib_label())
}

fn ranked_section(title: String, entries: &[RankedEntry]) -> ReportSection
{
    let mut section = ReportSection::new(title);
    for (index, entry) in entries.iter().enumerate() {
        section
            .lines
            .push(format!("{:>2}. {}  {}", index + 1, size_columns(entry.size), entry.label));
    }
    if entries.is_empty() {
        section.lines.push(NO_ENTRIES.to_string());
    }
    section
}

fn top_functions_section(functions: &[FunctionSizeRecord]) -> ReportSection
{
    let mut section = ReportSection::new(TOP_FUNCTIONS_TITLE);
    for (index, record) in functions.iter().enumerate() {
        section.lines.push(format!(
            "{:>3}. {}  {}  {}",
            index + 1,
            size_columns(record.size),
            record.location(),
            record.name
        ));
    }
    if functions.is_empty() {
        section.lines.push(NO_ENTRIES.to_string());
    }
    section
}

fn section_summary(map: &MapListing) -> ReportSection
{
    let mut section = ReportSection::new(SECTION_SUMMARY_TITLE);
    for label in SECTION_SUMMARY_ORDER {
        if let Some(size) = map.section_totals.get(label) {
            section.lines.push(format!(
                "{label:<22} {:>8}  {:>9}",
                size.bytes_label(),
                size.kib_label()
            ));
        }
    }
    section
}

fn module_summary(summary: &ModuleSummary) -> ReportSection
{
    let mut section = ReportSection::new(MODULE_SUMMARY_TITLE);
    for (label, count) in summary.counts.rows() {
        section.lines.push(format!("{label:<9}: {count}"));
    }
    section
}

fn module_snippets(summary: &ModuleSummary, functions: &[FunctionSizeRecord]) -> ReportSection
{
    let mut section = ReportSection::new(MODULE_SNIPPETS_TITLE);
    for record in functions {
        let Some(function) = find_module_function(&record.name, &summary.functions) else {
            continue;
        };
        if !section.lines.is_empty() {
            section.lines.push(String::new());
        }
        section.lines.push(record.name.clone());
        section
            .lines
            .extend(function.snippet_lines.iter().map(|line| format!("  {line}")));
    }
    section
}

/// Build the report from parsed inputs.
#[must_use]
pub fn build_report(input: &ReportInput<'_>) -> Report
{
    let mut preamble = vec![
        REPORT_TITLE.to_string(),
        format!("Time: {}", input.generated_at.format(TIMESTAMP_FORMAT)),
        format!("DWARF: {}", input.dwarf_path.display()),
        format!("Map: {}", input.map_path.display()),
    ];
    if let Some(wat) = input.wat_path {
        preamble.push(format!("WAT: {}", wat.display()));
    }

    let top_functions = &input.functions[..input.functions.len().min(input.top_n)];

    let mut sections = vec![top_functions_section(top_functions), section_summary(input.map)];
    for label in RANKED_SECTIONS {
        let ranked = rank_symbols(input.map.symbols_in(label), input.top_n);
        sections.push(ranked_section(format!("Map Top {label} Symbols"), &ranked));
    }
    let by_object = rank_object_files(input.map.symbols_in("CODE"), input.top_n);
    sections.push(ranked_section(CODE_BY_OBJECT_TITLE.to_string(), &by_object));

    match input.module {
        ModuleText::Available(summary) => {
            sections.push(module_summary(summary));
            sections.push(module_snippets(summary, top_functions));
        }
        ModuleText::Unavailable(status) => {
            let mut section = ReportSection::new(MODULE_SUMMARY_TITLE);
            section.lines.push(format!("{:<9}: {status}", "status"));
            sections.push(section);
        }
    }

    Report { preamble, sections }
}
