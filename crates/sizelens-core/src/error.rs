//! # Error Types
//!
//! Error handling for the size-report pipeline.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Only the outer layers fail: reading and writing files, running external
//! tools and validating options. The text parsers themselves are infallible
//! and skip anything they do not recognize.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for size-report operations
///
/// Every variant is fatal for a run: the caller reports it and exits with a
/// non-zero status without writing a partial report.
///
/// ## Error Categories
///
/// 1. **Input errors**: MissingInput
/// 2. **Tool errors**: ToolNotFound, ToolFailed
/// 3. **Configuration errors**: InvalidArgument
/// 4. **I/O errors**: Io
#[derive(Error, Debug)]
pub enum SizelensError
{
    /// A required input file does not exist
    ///
    /// `kind` names the role of the file (e.g. `"map"`, `"dwarf text"`) so
    /// the operator knows which flag to fix.
    #[error("missing {kind}: {}", path.display())]
    MissingInput
    {
        /// Role of the missing file
        kind: &'static str,
        /// Path that was looked up
        path: PathBuf,
    },

    /// An external tool could not be located on `PATH`
    #[error("{tool} not found in PATH")]
    ToolNotFound
    {
        /// Executable name
        tool: &'static str,
    },

    /// An external tool ran but exited unsuccessfully
    ///
    /// `stderr` holds whatever the tool wrote to its error stream.
    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed
    {
        /// Executable name
        tool: &'static str,
        /// Exit status as reported by the OS
        status: String,
        /// Captured standard error output
        stderr: String,
    },

    /// Invalid option passed to the pipeline
    ///
    /// Examples:
    /// - `top_n` of zero
    /// - `snippet_lines` of zero
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error (for file operations, etc.)
    ///
    /// Used for errors when reading inputs, writing reports or spawning tools.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, SizelensError>`
///
/// ```rust
/// use sizelens_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, SizelensError>;
