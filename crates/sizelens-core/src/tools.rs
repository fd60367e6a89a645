//! # External Tools
//!
//! The two text inputs that are derived from the module itself come from
//! external programs:
//!
//! - **DWARF dump**: `llvm-dwarfdump <module>` written to a file
//! - **Module text**: `wasm2wat <module> -o <file>`
//!
//! The pipeline only talks to them through [`ToolRunner`], so parsers and
//! report code never spawn processes and tests can substitute a fake.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{Result, SizelensError};

pub const DWARF_DUMPER: &str = "llvm-dwarfdump";
pub const MODULE_TEXT_CONVERTER: &str = "wasm2wat";

/// Producers of derived text inputs.
///
/// Both methods block until the tool exits. A tool that cannot be found or
/// exits unsuccessfully is an error; callers decide whether it is fatal.
pub trait ToolRunner
{
    /// Write the DWARF debug-info dump of `wasm` to `output`.
    fn dump_debug_info(&self, wasm: &Path, output: &Path) -> Result<()>;

    /// Write the module text listing of `wasm` to `output`.
    fn convert_to_text(&self, wasm: &Path, output: &Path) -> Result<()>;
}

/// Runs the real tools found on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTools;

impl SystemTools
{
    #[must_use]
    pub fn new() -> Self
    {
        SystemTools
    }

    fn locate(tool: &'static str) -> Result<PathBuf>
    {
        which::which(tool).map_err(|_| SizelensError::ToolNotFound { tool })
    }
}

/// Run `produce` against a fresh file beside `output` and move it over
/// `output` only if `produce` succeeds. On failure `output` is untouched and
/// the staged file is removed.
fn replace_on_success<F>(output: &Path, produce: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let directory = output
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(directory)?;
    let staged = NamedTempFile::new_in(directory)?;
    produce(staged.path())?;
    staged.persist(output).map_err(|err| err.error)?;
    Ok(())
}

fn failure(tool: &'static str, status: std::process::ExitStatus, stderr: &[u8]) -> SizelensError
{
    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    SizelensError::ToolFailed {
        tool,
        status: status.to_string(),
        stderr: if stderr.is_empty() {
            format!("{tool} failed")
        } else {
            stderr
        },
    }
}

impl ToolRunner for SystemTools
{
    fn dump_debug_info(&self, wasm: &Path, output: &Path) -> Result<()>
    {
        let exe = Self::locate(DWARF_DUMPER)?;
        info!(tool = DWARF_DUMPER, input = %wasm.display(), output = %output.display(), "dumping debug info");
        replace_on_success(output, |staged| {
            let result = Command::new(exe)
                .arg(wasm)
                .stdout(Stdio::from(File::create(staged)?))
                .stderr(Stdio::piped())
                .output()?;
            if !result.status.success() {
                return Err(failure(DWARF_DUMPER, result.status, &result.stderr));
            }
            Ok(())
        })
    }

    fn convert_to_text(&self, wasm: &Path, output: &Path) -> Result<()>
    {
        let exe = Self::locate(MODULE_TEXT_CONVERTER)?;
        info!(tool = MODULE_TEXT_CONVERTER, input = %wasm.display(), output = %output.display(), "converting module to text");
        replace_on_success(output, |staged| {
            let result = Command::new(exe)
                .arg(wasm)
                .arg("-o")
                .arg(staged)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()?;
            if !result.status.success() {
                return Err(failure(MODULE_TEXT_CONVERTER, result.status, &result.stderr));
            }
            Ok(())
        })
    }
}

/// Factory for the tool runner used by the command line.
///
/// Returns `Box<dyn ToolRunner>` so callers can store it next to test fakes.
///
/// ```rust,no_run
/// use std::path::Path;
/// use sizelens_core::tools::create_tool_runner;
///
/// let tools = create_tool_runner();
/// tools.dump_debug_info(Path::new("out.wasm"), Path::new("out.dwarf.txt"))?;
/// # Ok::<(), sizelens_core::SizelensError>(())
/// ```
#[must_use]
pub fn create_tool_runner() -> Box<dyn ToolRunner>
{
    Box::new(SystemTools::new())
}
