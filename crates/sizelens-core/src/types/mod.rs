//! # Types
//!
//! Data model shared by the parsers, the aggregator and the report builder.
//!
//! Everything here is plain data: records are produced once by a parser and
//! never mutated afterwards, except [`SectionTotals`] which is additive while
//! a map is being scanned.

pub mod records;
pub mod size;

// Re-export all public types
pub use records::{
    sort_function_records, FunctionKind, FunctionSizeRecord, MapSymbolRecord, ModuleFunctionEntry, SectionTotals,
};
pub use size::ByteSize;
