use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use sizelens_core::prelude::{
    create_tool_runner, run_dwarf_report, run_size_report, DwarfReportOptions, ProjectPaths, Result as SizelensResult,
    SizeReportOptions,
};
use sizelens_utils::{error, info, init_logging, init_logging_with_level, LogFormat, LogLevel};

/// Attribute WebAssembly binary size to functions, sections and object files.
#[derive(Parser, Debug)]
#[command(name = "sizelens")]
#[command(version)]
#[command(about = "Attribute WebAssembly binary size to functions, sections and object files", long_about = None)]
struct Cli
{
    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long, global = true, value_parser = parse_log_level)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Dump DWARF info and write a table of function sizes
    Dwarf(DwarfArgs),
    /// Merge DWARF, linker map and module text into one size report
    Merge(MergeArgs),
}

#[derive(Args, Debug)]
struct DwarfArgs
{
    /// Project root used to resolve default paths
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// WebAssembly module to dump
    #[arg(long)]
    wasm: Option<PathBuf>,
    /// DWARF dump text (written unless --skip-dump)
    #[arg(long)]
    dwarf: Option<PathBuf>,
    /// Output path for the function table
    #[arg(long)]
    report: Option<PathBuf>,
    /// Reuse the existing DWARF dump instead of running llvm-dwarfdump
    #[arg(long, default_value_t = false)]
    skip_dump: bool,
}

#[derive(Args, Debug)]
struct MergeArgs
{
    /// Project root used to resolve default paths
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// DWARF dump text (regenerated from --wasm unless --skip-dump)
    #[arg(long)]
    dwarf: Option<PathBuf>,
    /// Linker map
    #[arg(long)]
    map: Option<PathBuf>,
    /// WebAssembly module
    #[arg(long)]
    wasm: Option<PathBuf>,
    /// Module text listing (converted from --wasm when missing)
    #[arg(long)]
    wat: Option<PathBuf>,
    /// Output path for the size report
    #[arg(long)]
    out: Option<PathBuf>,
    /// Entries per ranked list
    #[arg(long, default_value_t = sizelens_core::aggregate::DEFAULT_TOP_N)]
    top_n: usize,
    /// Lines kept per module text snippet
    #[arg(long, default_value_t = sizelens_core::module_text::DEFAULT_SNIPPET_LINES)]
    snippet_lines: usize,
    /// Reuse the existing DWARF dump instead of running llvm-dwarfdump
    #[arg(long, default_value_t = false)]
    skip_dump: bool,
    /// Do not run wasm2wat
    #[arg(long, default_value_t = false)]
    skip_wat: bool,
}

fn parse_log_level(value: &str) -> Result<LogLevel, String>
{
    value.parse::<LogLevel>().map_err(|err| err.to_string())
}

fn main()
{
    let cli = Cli::parse();

    // Explicit --log-level wins; otherwise RUST_LOG, defaulting to INFO
    let logging = match cli.log_level {
        Some(level) => init_logging_with_level(level, LogFormat::from_env()),
        None => init_logging(),
    };
    if let Err(e) = logging {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_command(cli) {
        error!(error = %e, "run failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> SizelensResult<()>
{
    let tools = create_tool_runner();
    match cli.command {
        Commands::Dwarf(args) => {
            let paths = ProjectPaths::new(&args.root);
            let mut options = DwarfReportOptions::from_paths(&paths);
            if let Some(wasm) = args.wasm {
                options.wasm = wasm;
            }
            if let Some(dwarf) = args.dwarf {
                options.dwarf = dwarf;
            }
            if let Some(report) = args.report {
                options.report = report;
            }
            options.skip_dump = args.skip_dump;

            info!("Writing DWARF report to {}", options.report.display());
            let records = run_dwarf_report(&options, tools.as_ref())?;
            println!("{} functions -> {}", records.len(), options.report.display());
            Ok(())
        }
        Commands::Merge(args) => {
            let paths = ProjectPaths::new(&args.root);
            let mut options = SizeReportOptions::from_paths(&paths);
            if let Some(dwarf) = args.dwarf {
                options.dwarf = dwarf;
            }
            if let Some(map) = args.map {
                options.map = map;
            }
            if let Some(wasm) = args.wasm {
                options.wasm = Some(wasm);
            }
            if let Some(wat) = args.wat {
                options.wat = Some(wat);
            }
            if let Some(out) = args.out {
                options.out = out;
            }
            options.top_n = args.top_n;
            options.snippet_lines = args.snippet_lines;
            options.skip_dump = args.skip_dump;
            options.skip_wat = args.skip_wat;

            info!("Writing size report to {}", options.out.display());
            run_size_report(&options, tools.as_ref())?;
            println!("{}", options.out.display());
            Ok(())
        }
    }
}
