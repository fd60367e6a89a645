//! # Linker map parsing
//!
//! Reads the map that `wasm-ld --Map` writes. Every row has three leading
//! columns followed by a free-text description:
//!
//! ```text
//!     Addr      Off     Size Out     In      Symbol
//!        -        8       10 CODE
//!        -       20        5         obj/a.o:(foo)
//!        -       20        5                 foo
//! ```
//!
//! A description that is a section label switches the current section. Any
//! other description is a symbol under that section, written either as
//! `file:(symbol)` or as a bare name. The linker sometimes splits one symbol
//! over two rows with identical offset and size; the second row only refines
//! the name and is folded into the first.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::types::{ByteSize, MapSymbolRecord, SectionTotals};

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*Addr\s+Off\s+Size\s+").expect("valid header regex"));
static ROW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\S+)\s+(\S+)\s+(\S+)\s+(.*)$").expect("valid row regex"));
static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(TYPE|IMPORT|FUNCTION|TABLE|MEMORY|GLOBAL|EXPORT|ELEM|CODE|DATA|\.rodata|\.data|\.bss|CUSTOM\([^\)]+\))$")
        .expect("valid section regex")
});
static FILE_SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*):\((.*)\)$").expect("valid file symbol regex"));

/// Marks a `file:(symbol)` description; rows without it may be continuations.
const FILE_SYMBOL_DELIMITER: &str = ":(";

/// Decode a map hex column. Empty and `-` mean zero.
#[must_use]
pub fn parse_map_hex(token: &str) -> Option<u64>
{
    let token = token.trim();
    if token.is_empty() || token == "-" {
        return Some(0);
    }
    u64::from_str_radix(token, 16).ok()
}

/// Whether `description` is one of the linker's section labels.
#[must_use]
pub fn is_section_label(description: &str) -> bool
{
    SECTION_RE.is_match(description)
}

/// Split a description into `(file, symbol)`; file is empty for bare names.
#[must_use]
pub fn split_file_symbol(description: &str) -> (&str, &str)
{
    match FILE_SYMBOL_RE.captures(description) {
        Some(caps) => {
            let file = caps.get(1).map_or("", |m| m.as_str());
            let symbol = caps.get(2).map_or("", |m| m.as_str());
            (file, symbol)
        }
        None => ("", description),
    }
}

/// Everything extracted from one map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapListing
{
    pub section_totals: SectionTotals,
    pub symbols: Vec<MapSymbolRecord>,
}

impl MapListing
{
    /// Records listed under `section`, in map order.
    pub fn symbols_in<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a MapSymbolRecord> + 'a
    {
        self.symbols.iter().filter(move |symbol| symbol.section == section)
    }
}

/// Section, offset and size tokens of the last emitted record.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RowKey
{
    section: String,
    offset: String,
    size: String,
}

/// Line-at-a-time map parser.
#[derive(Debug, Default)]
pub struct MapParser
{
    current_section: Option<String>,
    last_key: Option<RowKey>,
    listing: MapListing,
}

impl MapParser
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Consume one map line. Rows that cannot be parsed are skipped.
    pub fn feed_line(&mut self, line: &str)
    {
        if line.trim().is_empty() || HEADER_RE.is_match(line) {
            return;
        }
        let Some(caps) = ROW_RE.captures(line) else {
            return;
        };
        let offset_token = caps.get(2).map_or("", |m| m.as_str());
        let size_token = caps.get(3).map_or("", |m| m.as_str());
        let description = caps.get(4).map_or("", |m| m.as_str()).trim();

        if parse_map_hex(offset_token).is_none() {
            return;
        }
        let Some(size) = parse_map_hex(size_token).map(ByteSize::new) else {
            return;
        };

        if is_section_label(description) {
            self.listing.section_totals.add(description, size);
            self.current_section = Some(description.to_string());
            return;
        }

        let Some(section) = self.current_section.as_deref() else {
            return;
        };

        let key = RowKey {
            section: section.to_string(),
            offset: offset_token.to_string(),
            size: size_token.to_string(),
        };

        if !description.contains(FILE_SYMBOL_DELIMITER) && self.last_key.as_ref() == Some(&key) {
            if let Some(previous) = self.listing.symbols.last_mut() {
                if !description.is_empty() {
                    previous.name = description.to_string();
                }
            }
            return;
        }

        let (file, name) = split_file_symbol(description);
        self.listing.section_totals.add(section, size);
        self.listing.symbols.push(MapSymbolRecord {
            section: key.section.clone(),
            offset: key.offset.clone(),
            size,
            file: file.to_string(),
            name: name.to_string(),
        });
        self.last_key = Some(key);
    }

    #[must_use]
    pub fn finish(self) -> MapListing
    {
        debug!(
            sections = self.listing.section_totals.len(),
            symbols = self.listing.symbols.len(),
            "parsed linker map"
        );
        self.listing
    }
}

/// Parse a complete linker map.
#[must_use]
pub fn parse_map(text: &str) -> MapListing
{
    let mut parser = MapParser::new();
    for line in text.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}
