//! # DWARF dump extraction
//!
//! Rebuilds function size records from the text that `llvm-dwarfdump` prints
//! for a module's `.debug_info`.
//!
//! The dump is not a grammar, so the scan is a single forward pass over lines
//! with two pieces of state: what kind of DIE we are inside, and the name of
//! the compile unit that encloses it. A line like
//!
//! ```text
//! 0x0000004e:   DW_TAG_subprogram
//! ```
//!
//! starts a DIE and flushes the previous one. Attribute lines below it, such
//! as
//!
//! ```text
//!                 DW_AT_low_pc    (0x00000100)
//!                 DW_AT_high_pc   (0x00000140)
//!                 DW_AT_name      ("foo")
//! ```
//!
//! are matched independently; anything that does not match is ignored.

pub mod table;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::types::{sort_function_records, ByteSize, FunctionKind, FunctionSizeRecord};

static DIE_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*0x[0-9a-fA-F]+:\s+(DW_TAG_\w+)").expect("valid DIE start regex"));
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"DW_AT_name\s+\("([^"]*)"\)"#).expect("valid name regex"));
static ABSTRACT_ORIGIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"DW_AT_abstract_origin\s+\(0x[0-9a-fA-F]+\s+"([^"]+)"\)"#).expect("valid abstract origin regex")
});
static LOW_PC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"DW_AT_low_pc\s+\((0[xX][0-9a-fA-F]+|\d+)\)").expect("valid low_pc regex"));
static HIGH_PC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"DW_AT_high_pc\s+\((0[xX][0-9a-fA-F]+|\d+)\)").expect("valid high_pc regex"));
static DECL_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"DW_AT_decl_file\s+\("([^"]+)"\)"#).expect("valid decl_file regex"));
static DECL_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"DW_AT_decl_line\s+\((\d+)\)").expect("valid decl_line regex"));
static CALL_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"DW_AT_call_file\s+\("([^"]+)"\)"#).expect("valid call_file regex"));
static CALL_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"DW_AT_call_line\s+\((\d+)\)").expect("valid call_line regex"));

const COMPILE_UNIT_TAG: &str = "DW_TAG_compile_unit";

/// Parse an attribute number: `0x`/`0X` prefixed hex, decimal otherwise.
///
/// Returns `None` for anything that does not fit in a `u64`.
#[must_use]
pub fn parse_attribute_number(value: &str) -> Option<u64>
{
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn capture<'a>(re: &Regex, line: &'a str) -> Option<&'a str>
{
    re.captures(line).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

fn set_once<T>(slot: &mut Option<T>, value: Option<T>)
{
    if slot.is_none() {
        *slot = value;
    }
}

/// Attributes collected for one function-like DIE.
#[derive(Debug, Clone)]
struct DieAccumulator
{
    kind: FunctionKind,
    name: Option<String>,
    low_pc: Option<u64>,
    high_pc: Option<u64>,
    decl_file: Option<String>,
    decl_line: Option<u64>,
    call_file: Option<String>,
    call_line: Option<u64>,
}

impl DieAccumulator
{
    fn new(kind: FunctionKind) -> Self
    {
        Self {
            kind,
            name: None,
            low_pc: None,
            high_pc: None,
            decl_file: None,
            decl_line: None,
            call_file: None,
            call_line: None,
        }
    }

    fn absorb(&mut self, line: &str)
    {
        let declared = capture(&NAME_RE, line).filter(|name| !name.is_empty());
        set_once(&mut self.name, declared.map(str::to_string));
        set_once(&mut self.name, capture(&ABSTRACT_ORIGIN_RE, line).map(str::to_string));

        set_once(&mut self.low_pc, capture(&LOW_PC_RE, line).and_then(parse_attribute_number));
        set_once(&mut self.high_pc, capture(&HIGH_PC_RE, line).and_then(parse_attribute_number));

        set_once(&mut self.decl_file, capture(&DECL_FILE_RE, line).map(str::to_string));
        set_once(&mut self.decl_line, capture(&DECL_LINE_RE, line).and_then(|v| v.parse().ok()));
        set_once(&mut self.call_file, capture(&CALL_FILE_RE, line).map(str::to_string));
        set_once(&mut self.call_line, capture(&CALL_LINE_RE, line).and_then(|v| v.parse().ok()));
    }

    /// Convert into a record, or `None` if a required attribute is missing.
    ///
    /// When `high_pc` is below `low_pc` the dumper printed a length rather than
    /// an end address, so `high_pc` is taken as the size directly.
    fn finish(self, compile_unit_file: Option<&str>) -> Option<FunctionSizeRecord>
    {
        let low = self.low_pc?;
        let high = self.high_pc?;
        let name = self.name.filter(|name| !name.is_empty())?;

        let size = if high >= low { high - low } else { high };
        if size == 0 {
            return None;
        }

        let file = self
            .decl_file
            .or(self.call_file)
            .or_else(|| compile_unit_file.map(str::to_string))
            .unwrap_or_default();
        let line = self
            .decl_line
            .filter(|&line| line != 0)
            .or(self.call_line)
            .unwrap_or(0);

        Some(FunctionSizeRecord {
            size: ByteSize::new(size),
            file,
            line,
            name,
            kind: self.kind,
        })
    }
}

/// What the most recent DIE-start line opened.
#[derive(Debug, Clone)]
enum ScanState
{
    /// Before the first DIE, or inside a DIE we do not track.
    Ignored,
    /// Inside a compile unit; its name feeds the file fallback.
    CompileUnit,
    /// Inside a subprogram or inlined subroutine.
    Function(DieAccumulator),
}

/// Streaming extractor over DWARF dump lines.
///
/// Feed lines in order with [`DieExtractor::feed_line`], then call
/// [`DieExtractor::finish`] to flush the last DIE and get the sorted records.
///
/// ## Example
///
/// ```rust
/// use sizelens_core::dwarf::DieExtractor;
///
/// let mut extractor = DieExtractor::new();
/// for line in [
///     "0x0000000b: DW_TAG_compile_unit",
///     "  DW_AT_name (\"main.c\")",
///     "0x00000026:   DW_TAG_subprogram",
///     "    DW_AT_low_pc (0x00000010)",
///     "    DW_AT_high_pc (0x00000030)",
///     "    DW_AT_name (\"main\")",
/// ] {
///     extractor.feed_line(line);
/// }
/// let records = extractor.finish();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].file, "main.c");
/// assert_eq!(records[0].size.value(), 0x20);
/// ```
#[derive(Debug)]
pub struct DieExtractor
{
    state: ScanState,
    compile_unit_file: Option<String>,
    records: Vec<FunctionSizeRecord>,
}

impl Default for DieExtractor
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl DieExtractor
{
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            state: ScanState::Ignored,
            compile_unit_file: None,
            records: Vec::new(),
        }
    }

    /// Consume one line of dump text.
    pub fn feed_line(&mut self, line: &str)
    {
        if let Some(tag) = capture(&DIE_START_RE, line) {
            self.flush();
            self.state = if tag == COMPILE_UNIT_TAG {
                self.compile_unit_file = None;
                ScanState::CompileUnit
            } else if let Some(kind) = FunctionKind::from_tag(tag) {
                ScanState::Function(DieAccumulator::new(kind))
            } else {
                ScanState::Ignored
            };
            return;
        }

        match &mut self.state {
            ScanState::Ignored => {}
            ScanState::CompileUnit => {
                let name = capture(&NAME_RE, line).filter(|name| !name.is_empty());
                set_once(&mut self.compile_unit_file, name.map(str::to_string));
            }
            ScanState::Function(die) => die.absorb(line),
        }
    }

    fn flush(&mut self)
    {
        let state = std::mem::replace(&mut self.state, ScanState::Ignored);
        if let ScanState::Function(die) = state {
            if let Some(record) = die.finish(self.compile_unit_file.as_deref()) {
                self.records.push(record);
            }
        }
    }

    /// Flush the pending DIE and return records in report order.
    #[must_use]
    pub fn finish(mut self) -> Vec<FunctionSizeRecord>
    {
        self.flush();
        sort_function_records(&mut self.records);
        debug!(count = self.records.len(), "extracted function size records");
        self.records
    }
}

/// Extract function size records from a complete DWARF dump.
#[must_use]
pub fn extract_functions(text: &str) -> Vec<FunctionSizeRecord>
{
    let mut extractor = DieExtractor::new();
    for line in text.lines() {
        extractor.feed_line(line);
    }
    extractor.finish()
}
