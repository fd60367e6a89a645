//! Common module for library exports

pub use crate::error::{Result, SizelensError};
pub use crate::map::MapListing;
pub use crate::module_text::{ModuleSummary, ModuleText, ModuleTextStatus};
pub use crate::pipeline::{
    generate_size_report, run_dwarf_report, run_size_report, DwarfReportOptions, ProjectPaths, SizeReportOptions,
};
pub use crate::report::Report;
pub use crate::tools::{create_tool_runner, ToolRunner};
pub use crate::types::{ByteSize, FunctionKind, FunctionSizeRecord, MapSymbolRecord, ModuleFunctionEntry, SectionTotals};
