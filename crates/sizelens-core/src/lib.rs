//! # sizelens-core
//!
//! Attributes the size of a linked WebAssembly module to source functions,
//! sections and object files by correlating three text inputs:
//! - a DWARF dump from `llvm-dwarfdump` ([`dwarf`])
//! - the linker map from `wasm-ld --Map` ([`map`])
//! - the module text from `wasm2wat` ([`module_text`], [`names`])
//!
//! [`aggregate`] groups and ranks map symbols, [`report`] assembles the final
//! document, and [`pipeline`] runs the whole thing with external programs
//! reached only through the [`tools::ToolRunner`] trait.
//!
//! ## Tolerance
//!
//! None of the three formats is a contract, so the parsers never fail: lines
//! they do not recognize are skipped. Errors come only from file I/O, the
//! external tools and option validation.

pub mod aggregate;
pub mod dwarf;
pub mod error;
pub mod map;
pub mod module_text;
pub mod names;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SizelensError};
pub use report::Report;
pub use tools::ToolRunner;
pub use types::{ByteSize, FunctionSizeRecord, MapSymbolRecord};
