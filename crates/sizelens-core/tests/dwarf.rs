//! Tests for DWARF dump extraction

use std::path::Path;

use sizelens_core::dwarf::table::render_function_table;
use sizelens_core::dwarf::{extract_functions, DieExtractor};
use sizelens_core::types::{ByteSize, FunctionKind};

const SINGLE_FUNCTION: &str = r#"
0x0000000b: DW_TAG_compile_unit
              DW_AT_producer    ("clang version 17.0.0")
              DW_AT_name        ("src/unit.c")

0x00000026:   DW_TAG_subprogram
                DW_AT_low_pc    (0x00000100)
                DW_AT_high_pc   (0x00000140)
                DW_AT_name      ("foo")
                DW_AT_decl_file ("a.c")
                DW_AT_decl_line (10)
"#;

#[test]
fn test_single_subprogram()
{
    let records = extract_functions(SINGLE_FUNCTION);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.size, ByteSize::new(64));
    assert_eq!(record.file, "a.c");
    assert_eq!(record.line, 10);
    assert_eq!(record.name, "foo");
    assert_eq!(record.kind, FunctionKind::Subprogram);
}

#[test]
fn test_high_pc_below_low_pc_is_a_length()
{
    let text = SINGLE_FUNCTION.replace("(0x00000140)", "(0x80)");
    let records = extract_functions(&text);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].size, ByteSize::new(128));
    assert_eq!(records[0].name, "foo");
}

#[test]
fn test_compile_unit_never_becomes_a_record()
{
    let text = r#"
0x0000000b: DW_TAG_compile_unit
              DW_AT_name        ("unit.c")
              DW_AT_low_pc      (0x0)
              DW_AT_high_pc     (0x400)
"#;
    assert!(extract_functions(text).is_empty());
}

#[test]
fn test_compile_unit_name_is_the_last_file_fallback()
{
    let text = r#"
0x0000000b: DW_TAG_compile_unit
              DW_AT_name        ("unit.c")
0x00000026:   DW_TAG_subprogram
                DW_AT_low_pc    (0x10)
                DW_AT_high_pc   (0x20)
                DW_AT_name      ("no_decl")
0x00000040:     DW_TAG_inlined_subroutine
                  DW_AT_abstract_origin (0x00000026 "inlined_helper")
                  DW_AT_low_pc  (0x12)
                  DW_AT_high_pc (0x18)
                  DW_AT_call_file ("caller.c")
                  DW_AT_call_line (44)
0x00000060: DW_TAG_compile_unit
              DW_AT_name        ("other.c")
0x00000070:   DW_TAG_subprogram
                DW_AT_low_pc    (0x30)
                DW_AT_high_pc   (0x31)
                DW_AT_name      ("tiny")
"#;
    let records = extract_functions(text);
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].name, "no_decl");
    assert_eq!(records[0].location(), "unit.c");

    assert_eq!(records[1].name, "inlined_helper");
    assert_eq!(records[1].kind, FunctionKind::InlinedSubroutine);
    assert_eq!(records[1].location(), "caller.c:44");

    assert_eq!(records[2].name, "tiny");
    assert_eq!(records[2].file, "other.c");
}

#[test]
fn test_incomplete_and_empty_dies_are_dropped()
{
    let text = r#"
0x00000026:   DW_TAG_subprogram
                DW_AT_name      ("no_range")
0x00000030:   DW_TAG_subprogram
                DW_AT_low_pc    (0x10)
                DW_AT_high_pc   (0x20)
0x00000040:   DW_TAG_subprogram
                DW_AT_low_pc    (0x10)
                DW_AT_high_pc   (0x10)
                DW_AT_name      ("empty_range")
0x00000050:   DW_TAG_variable
                DW_AT_low_pc    (0x10)
                DW_AT_high_pc   (0x20)
                DW_AT_name      ("not_a_function")
"#;
    assert!(extract_functions(text).is_empty());
}

#[test]
fn test_unrecognized_lines_are_ignored()
{
    let text = "garbage\n\
                0x00000026:   DW_TAG_subprogram\n\
                random text here\n\
                DW_AT_low_pc (32)\n\
                DW_AT_frame_base (DW_OP_WASM_location 0x0 0x1)\n\
                DW_AT_high_pc (48)\n\
                DW_AT_name (\"decimal\")\n\
                more garbage";
    let records = extract_functions(text);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].size, ByteSize::new(16));
    assert_eq!(records[0].location(), "<unknown>");
}

#[test]
fn test_records_sorted_by_size_then_name()
{
    let mut text = String::new();
    for (offset, (name, size)) in [("beta", 8u64), ("gamma", 64), ("alpha", 8)].iter().enumerate() {
        text.push_str(&format!(
            "0x{:08x}: DW_TAG_subprogram\n  DW_AT_low_pc (0x0)\n  DW_AT_high_pc ({:#x})\n  DW_AT_name (\"{}\")\n",
            offset * 16,
            size,
            name
        ));
    }
    let names: Vec<String> = extract_functions(&text).into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["gamma", "alpha", "beta"]);
}

#[test]
fn test_streaming_matches_whole_text()
{
    let mut extractor = DieExtractor::default();
    for line in SINGLE_FUNCTION.lines() {
        extractor.feed_line(line);
    }
    assert_eq!(extractor.finish(), extract_functions(SINGLE_FUNCTION));
}

#[test]
fn test_function_table_layout()
{
    let records = extract_functions(SINGLE_FUNCTION);
    let table = render_function_table(&records, Path::new("output.gl.dwarf.txt"));
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines[0], "DWARF size report");
    assert_eq!(lines[1], "Input: output.gl.dwarf.txt");
    assert_eq!(lines[2], "Count: 1");
    assert_eq!(lines[3], "");
    assert!(lines[4].ends_with("Function"));
    assert!(lines[5].chars().all(|c| c == '-'));
    assert!(lines[6].starts_with("  1         64    0.06 KB a.c:10"));
    assert!(lines[6].ends_with(" foo"));
}

#[test]
fn test_zero_length_below_low_pc_is_dropped()
{
    let text = r#"
0x00000026:   DW_TAG_subprogram
                DW_AT_low_pc    (0x10)
                DW_AT_high_pc   (0x0)
                DW_AT_name      ("zero_length")
"#;
    assert!(extract_functions(text).is_empty());
}
