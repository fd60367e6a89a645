//! # Pipeline
//!
//! The two end-to-end runs behind the command line:
//!
//! 1. [`run_dwarf_report`]: DWARF dump to a standalone function table.
//! 2. [`run_size_report`]: DWARF dump, linker map and module text merged into
//!    the full size report.
//!
//! Stages run strictly one after another. Any missing required input or
//! failing dump aborts the run before a report file is written.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::aggregate::DEFAULT_TOP_N;
use crate::dwarf::extract_functions;
use crate::dwarf::table::render_function_table;
use crate::error::{Result, SizelensError};
use crate::map::parse_map;
use crate::module_text::{ModuleSummary, ModuleText, ModuleTextStatus, DEFAULT_SNIPPET_LINES};
use crate::report::{build_report, Report, ReportInput};
use crate::tools::ToolRunner;
use crate::types::FunctionSizeRecord;

/// Conventional file locations under a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths
{
    pub wasm: PathBuf,
    pub dwarf: PathBuf,
    pub dwarf_report: PathBuf,
    pub map: PathBuf,
    pub wat: PathBuf,
    pub size_report: PathBuf,
}

impl ProjectPaths
{
    #[must_use]
    pub fn new(root: &Path) -> Self
    {
        Self {
            wasm: root.join("web").join("dist").join("output.gl.wasm"),
            dwarf: root.join("output.gl.dwarf.txt"),
            dwarf_report: root.join("output.gl.dwarf.report.txt"),
            map: root.join("output.gl.map"),
            wat: root.join("output.gl.wat"),
            size_report: root.join("output.gl.size.report.txt"),
        }
    }
}

/// Options for [`run_dwarf_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DwarfReportOptions
{
    pub wasm: PathBuf,
    /// DWARF dump text; regenerated from `wasm` unless `skip_dump`.
    pub dwarf: PathBuf,
    pub report: PathBuf,
    pub skip_dump: bool,
}

impl DwarfReportOptions
{
    #[must_use]
    pub fn from_paths(paths: &ProjectPaths) -> Self
    {
        Self {
            wasm: paths.wasm.clone(),
            dwarf: paths.dwarf.clone(),
            report: paths.dwarf_report.clone(),
            skip_dump: false,
        }
    }
}

/// Options for [`run_size_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeReportOptions
{
    /// DWARF dump text; regenerated from `wasm` unless `skip_dump`.
    pub dwarf: PathBuf,
    pub map: PathBuf,
    pub wasm: Option<PathBuf>,
    /// Module text; converted from `wasm` when absent unless `skip_wat`.
    pub wat: Option<PathBuf>,
    pub out: PathBuf,
    pub top_n: usize,
    pub snippet_lines: usize,
    pub skip_dump: bool,
    pub skip_wat: bool,
}

impl SizeReportOptions
{
    #[must_use]
    pub fn from_paths(paths: &ProjectPaths) -> Self
    {
        Self {
            dwarf: paths.dwarf.clone(),
            map: paths.map.clone(),
            wasm: Some(paths.wasm.clone()),
            wat: Some(paths.wat.clone()),
            out: paths.size_report.clone(),
            top_n: DEFAULT_TOP_N,
            snippet_lines: DEFAULT_SNIPPET_LINES,
            skip_dump: false,
            skip_wat: false,
        }
    }

    /// Reject option values that cannot produce a meaningful report.
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` when `top_n` or `snippet_lines` is zero.
    pub fn validate(&self) -> Result<()>
    {
        if self.top_n == 0 {
            return Err(SizelensError::InvalidArgument("top-n must be at least 1".to_string()));
        }
        if self.snippet_lines == 0 {
            return Err(SizelensError::InvalidArgument(
                "snippet-lines must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn require_file(kind: &'static str, path: &Path) -> Result<()>
{
    if path.is_file() {
        Ok(())
    } else {
        Err(SizelensError::MissingInput {
            kind,
            path: path.to_path_buf(),
        })
    }
}

/// Read a text input, replacing invalid UTF-8 rather than failing on it.
fn read_text(path: &Path) -> Result<String>
{
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_text(path: &Path, text: &str) -> Result<()>
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

/// Regenerate the DWARF dump from `wasm` unless told to reuse the existing one.
fn refresh_dwarf_dump(tools: &dyn ToolRunner, wasm: Option<&Path>, dwarf: &Path, skip_dump: bool) -> Result<()>
{
    if skip_dump {
        debug!(dwarf = %dwarf.display(), "reusing existing DWARF dump");
        return Ok(());
    }
    let Some(wasm) = wasm else {
        return Err(SizelensError::InvalidArgument(
            "a wasm module is required unless the dump step is skipped".to_string(),
        ));
    };
    require_file("wasm", wasm)?;
    tools.dump_debug_info(wasm, dwarf)
}

/// Load and extract function records from a DWARF dump file.
///
/// ## Errors
///
/// `MissingInput` if the file does not exist, `Io` if it cannot be read.
pub fn load_functions(dwarf: &Path) -> Result<Vec<FunctionSizeRecord>>
{
    require_file("dwarf text", dwarf)?;
    Ok(extract_functions(&read_text(dwarf)?))
}

/// Dump (optionally), extract and write the standalone function table.
///
/// Returns the extracted records in report order.
///
/// ## Errors
///
/// Fails if the module or dump is missing, the dumper fails, or the table
/// cannot be written.
pub fn run_dwarf_report(options: &DwarfReportOptions, tools: &dyn ToolRunner) -> Result<Vec<FunctionSizeRecord>>
{
    refresh_dwarf_dump(tools, Some(&options.wasm), &options.dwarf, options.skip_dump)?;
    let records = load_functions(&options.dwarf)?;
    write_text(&options.report, &render_function_table(&records, &options.dwarf))?;
    info!(count = records.len(), report = %options.report.display(), "wrote DWARF report");
    Ok(records)
}

/// Decide where module text comes from, converting it if needed and allowed.
///
/// Conversion failures are not fatal; they become the status line.
pub fn prepare_module_text(options: &SizeReportOptions, tools: &dyn ToolRunner) -> Option<ModuleTextStatus>
{
    if options.skip_wat {
        return None;
    }
    let wat = options.wat.as_deref()?;
    if wat.exists() {
        return Some(ModuleTextStatus::Existing);
    }
    let Some(wasm) = options.wasm.as_deref().filter(|wasm| wasm.exists()) else {
        return Some(ModuleTextStatus::MissingWasm);
    };
    match tools.convert_to_text(wasm, wat) {
        Ok(()) => Some(ModuleTextStatus::Generated),
        Err(err) => {
            warn!(error = %err, "module text conversion failed");
            Some(ModuleTextStatus::Failed(err.to_string()))
        }
    }
}

fn load_module_text(options: &SizeReportOptions, status: Option<ModuleTextStatus>) -> Result<ModuleText>
{
    match options.wat.as_deref().filter(|wat| wat.is_file()) {
        Some(wat) => Ok(ModuleText::Available(ModuleSummary::from_text(
            &read_text(wat)?,
            options.snippet_lines,
        ))),
        None => Ok(ModuleText::Unavailable(status.unwrap_or(ModuleTextStatus::Missing))),
    }
}

/// Build the merged size report with an explicit timestamp.
///
/// Performs every step of [`run_size_report`] except writing the output file.
///
/// ## Errors
///
/// See [`run_size_report`].
pub fn generate_size_report(
    options: &SizeReportOptions,
    tools: &dyn ToolRunner,
    generated_at: NaiveDateTime,
) -> Result<Report>
{
    options.validate()?;
    refresh_dwarf_dump(tools, options.wasm.as_deref(), &options.dwarf, options.skip_dump)?;
    require_file("dwarf text", &options.dwarf)?;
    require_file("map", &options.map)?;

    let status = prepare_module_text(options, tools);

    let functions = load_functions(&options.dwarf)?;
    let map = parse_map(&read_text(&options.map)?);
    let module = load_module_text(options, status)?;

    Ok(build_report(&ReportInput {
        dwarf_path: &options.dwarf,
        map_path: &options.map,
        wat_path: options.wat.as_deref(),
        generated_at,
        top_n: options.top_n,
        functions: &functions,
        map: &map,
        module: &module,
    }))
}

/// Build the merged size report and write it to `options.out`.
///
/// ## Errors
///
/// - `InvalidArgument` for bad options
/// - `MissingInput` when the module (if dumping), DWARF dump or map is absent
/// - `ToolNotFound` / `ToolFailed` when the DWARF dump cannot be regenerated
/// - `Io` when reading inputs or writing the report fails
pub fn run_size_report(options: &SizeReportOptions, tools: &dyn ToolRunner) -> Result<Report>
{
    let report = generate_size_report(options, tools, Local::now().naive_local())?;
    write_text(&options.out, &report.to_string())?;
    info!(report = %options.out.display(), "wrote size report");
    Ok(report)
}
