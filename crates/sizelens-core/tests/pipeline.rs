//! Tests for the end-to-end pipeline with a fake tool runner

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sizelens_core::pipeline::prepare_module_text;
use sizelens_core::prelude::*;
use sizelens_core::report::{MODULE_SNIPPETS_TITLE, MODULE_SUMMARY_TITLE};
use tempfile::TempDir;

const DWARF: &str = r#"
0x0000000b: DW_TAG_compile_unit
              DW_AT_name        ("main.c")
0x00000026:   DW_TAG_subprogram
                DW_AT_low_pc    (0x100)
                DW_AT_high_pc   (0x140)
                DW_AT_name      ("render_frame")
"#;

const MAP: &str = "\
       -        8       40 CODE
       -        8       40         obj/render.o:(render_frame)
";

const WAT: &str = "(module
  (func $render_frame (result i32)
    i32.const 0)
)";

/// Stands in for the external tools: writes canned text or fails.
struct FakeTools
{
    dump: Option<&'static str>,
    text: Option<&'static str>,
    calls: RefCell<Vec<&'static str>>,
}

impl FakeTools
{
    fn new(dump: Option<&'static str>, text: Option<&'static str>) -> Self
    {
        Self {
            dump,
            text,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<&'static str>
    {
        self.calls.borrow().clone()
    }
}

fn fake_failure(tool: &'static str) -> SizelensError
{
    SizelensError::ToolFailed {
        tool,
        status: "exit status: 1".to_string(),
        stderr: "boom".to_string(),
    }
}

impl ToolRunner for FakeTools
{
    fn dump_debug_info(&self, _wasm: &Path, output: &Path) -> Result<()>
    {
        self.calls.borrow_mut().push("dump");
        let text = self.dump.ok_or_else(|| fake_failure("llvm-dwarfdump"))?;
        fs::write(output, text)?;
        Ok(())
    }

    fn convert_to_text(&self, _wasm: &Path, output: &Path) -> Result<()>
    {
        self.calls.borrow_mut().push("convert");
        let text = self.text.ok_or_else(|| fake_failure("wasm2wat"))?;
        fs::write(output, text)?;
        Ok(())
    }
}

struct Workspace
{
    _dir: TempDir,
    paths: ProjectPaths,
}

impl Workspace
{
    fn new() -> Self
    {
        let dir = TempDir::new().unwrap();
        let paths = ProjectPaths::new(dir.path());
        Self { _dir: dir, paths }
    }

    fn write(&self, path: &Path, text: &str)
    {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn with_wasm(self) -> Self
    {
        self.write(&self.paths.wasm, "\0asm");
        self
    }

    fn with_dwarf(self) -> Self
    {
        self.write(&self.paths.dwarf, DWARF);
        self
    }

    fn with_map(self) -> Self
    {
        self.write(&self.paths.map, MAP);
        self
    }

    fn with_wat(self) -> Self
    {
        self.write(&self.paths.wat, WAT);
        self
    }

    fn size_options(&self) -> SizeReportOptions
    {
        let mut options = SizeReportOptions::from_paths(&self.paths);
        options.skip_dump = true;
        options
    }
}

fn generate(options: &SizeReportOptions, tools: &FakeTools) -> Result<Report>
{
    let at = NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|date| date.and_hms_opt(3, 4, 5))
        .unwrap();
    generate_size_report(options, tools, at)
}

fn module_status_line(report: &Report) -> String
{
    report.section(MODULE_SUMMARY_TITLE).unwrap().lines[0].clone()
}

#[test]
fn test_project_paths_layout()
{
    let paths = ProjectPaths::new(Path::new("/proj"));
    assert_eq!(paths.wasm, PathBuf::from("/proj/web/dist/output.gl.wasm"));
    assert_eq!(paths.dwarf, PathBuf::from("/proj/output.gl.dwarf.txt"));
    assert_eq!(paths.dwarf_report, PathBuf::from("/proj/output.gl.dwarf.report.txt"));
    assert_eq!(paths.map, PathBuf::from("/proj/output.gl.map"));
    assert_eq!(paths.wat, PathBuf::from("/proj/output.gl.wat"));
    assert_eq!(paths.size_report, PathBuf::from("/proj/output.gl.size.report.txt"));
}

#[test]
fn test_dwarf_report_dumps_then_writes_table()
{
    let ws = Workspace::new().with_wasm();
    let tools = FakeTools::new(Some(DWARF), None);

    let records = run_dwarf_report(&DwarfReportOptions::from_paths(&ws.paths), &tools).unwrap();

    assert_eq!(tools.calls(), vec!["dump"]);
    assert_eq!(records.len(), 1);
    let table = fs::read_to_string(&ws.paths.dwarf_report).unwrap();
    assert!(table.contains("Count: 1"));
    assert!(table.contains("render_frame"));
}

#[test]
fn test_dwarf_report_skip_dump_reuses_existing_text()
{
    let ws = Workspace::new().with_dwarf();
    let tools = FakeTools::new(None, None);
    let mut options = DwarfReportOptions::from_paths(&ws.paths);
    options.skip_dump = true;

    let records = run_dwarf_report(&options, &tools).unwrap();
    assert!(tools.calls().is_empty());
    assert_eq!(records[0].name, "render_frame");
}

#[test]
fn test_dwarf_report_requires_module_when_dumping()
{
    let ws = Workspace::new().with_dwarf();
    let tools = FakeTools::new(Some(DWARF), None);

    let err = run_dwarf_report(&DwarfReportOptions::from_paths(&ws.paths), &tools).unwrap_err();
    assert!(matches!(err, SizelensError::MissingInput { kind: "wasm", .. }));
    assert!(tools.calls().is_empty());
    assert!(!ws.paths.dwarf_report.exists());
}

#[test]
fn test_dumper_failure_is_fatal()
{
    let ws = Workspace::new().with_wasm().with_map();
    let tools = FakeTools::new(None, Some(WAT));
    let mut options = ws.size_options();
    options.skip_dump = false;

    let err = run_size_report(&options, &tools).unwrap_err();
    assert!(matches!(err, SizelensError::ToolFailed { tool: "llvm-dwarfdump", .. }));
    assert!(!options.out.exists());
}

#[test]
fn test_missing_map_is_fatal()
{
    let ws = Workspace::new().with_dwarf();
    let tools = FakeTools::new(None, None);

    let err = generate(&ws.size_options(), &tools).unwrap_err();
    match err {
        SizelensError::MissingInput { kind, path } => {
            assert_eq!(kind, "map");
            assert_eq!(path, ws.paths.map);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_dwarf_is_fatal()
{
    let ws = Workspace::new().with_map();
    let tools = FakeTools::new(None, None);

    let err = generate(&ws.size_options(), &tools).unwrap_err();
    assert!(matches!(err, SizelensError::MissingInput { kind: "dwarf text", .. }));
}

#[test]
fn test_dumping_without_module_path_is_rejected()
{
    let ws = Workspace::new().with_dwarf().with_map();
    let tools = FakeTools::new(Some(DWARF), None);
    let mut options = ws.size_options();
    options.skip_dump = false;
    options.wasm = None;

    let err = generate(&options, &tools).unwrap_err();
    assert!(matches!(err, SizelensError::InvalidArgument(_)));
}

#[test]
fn test_zero_limits_are_rejected()
{
    let ws = Workspace::new();
    let mut options = ws.size_options();
    options.top_n = 0;
    assert!(matches!(options.validate(), Err(SizelensError::InvalidArgument(_))));

    options.top_n = 5;
    options.snippet_lines = 0;
    assert!(matches!(options.validate(), Err(SizelensError::InvalidArgument(_))));

    options.snippet_lines = 1;
    assert!(options.validate().is_ok());
}

#[test]
fn test_existing_module_text_is_used()
{
    let ws = Workspace::new().with_dwarf().with_map().with_wat();
    let tools = FakeTools::new(None, None);

    assert_eq!(prepare_module_text(&ws.size_options(), &tools), Some(ModuleTextStatus::Existing));

    let report = generate(&ws.size_options(), &tools).unwrap();
    assert!(tools.calls().is_empty());
    assert_eq!(module_status_line(&report), "types    : 0");
    let snippets = report.section(MODULE_SNIPPETS_TITLE).unwrap();
    assert_eq!(snippets.lines[0], "render_frame");
}

#[test]
fn test_module_text_is_generated_when_missing()
{
    let ws = Workspace::new().with_wasm().with_dwarf().with_map();
    let tools = FakeTools::new(None, Some(WAT));

    let report = generate(&ws.size_options(), &tools).unwrap();
    assert_eq!(tools.calls(), vec!["convert"]);
    assert!(ws.paths.wat.exists());
    assert!(report.section(MODULE_SNIPPETS_TITLE).is_some());
}

#[test]
fn test_converter_failure_becomes_status_line()
{
    let ws = Workspace::new().with_wasm().with_dwarf().with_map();
    let tools = FakeTools::new(None, None);

    let report = generate(&ws.size_options(), &tools).unwrap();
    let status = module_status_line(&report);
    assert!(status.starts_with("status   : wasm2wat failed"));
    assert!(status.contains("boom"));
}

#[test]
fn test_missing_module_reported_without_conversion()
{
    let ws = Workspace::new().with_dwarf().with_map();
    let tools = FakeTools::new(None, Some(WAT));

    let report = generate(&ws.size_options(), &tools).unwrap();
    assert!(tools.calls().is_empty());
    assert_eq!(module_status_line(&report), "status   : missing wasm");
}

#[test]
fn test_skip_wat_never_converts()
{
    let ws = Workspace::new().with_wasm().with_dwarf().with_map();
    let tools = FakeTools::new(None, Some(WAT));
    let mut options = ws.size_options();
    options.skip_wat = true;

    assert_eq!(prepare_module_text(&options, &tools), None);
    let report = generate(&options, &tools).unwrap();
    assert!(tools.calls().is_empty());
    assert_eq!(module_status_line(&report), "status   : missing");
}

#[test]
fn test_size_report_is_written()
{
    let ws = Workspace::new().with_dwarf().with_map().with_wat();
    let tools = FakeTools::new(None, None);
    let mut options = ws.size_options();
    options.out = ws.paths.size_report.parent().unwrap().join("reports").join("size.txt");

    let report = run_size_report(&options, &tools).unwrap();
    let written = fs::read_to_string(&options.out).unwrap();
    assert_eq!(written, report.to_string());
    assert!(written.starts_with("sizelens size report\nTime: "));
    assert!(written.contains("  1.    64 B    0.06 KB  main.c  render_frame"));
}
