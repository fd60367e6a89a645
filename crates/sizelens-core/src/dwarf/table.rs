//! Standalone function size table written by `sizelens dwarf`.

use std::fmt::{self, Write};
use std::path::Path;

use crate::types::FunctionSizeRecord;

/// Render every record as one fixed-width row under a short header.
///
/// ```text
/// DWARF size report
/// Input: out.dwarf.txt
/// Count: 1
///
/// No.    Size(B)   Size(KB) File:Line                                                    Function
/// -----------------------------------------------------------------------------------------------
///   1         64    0.06 KB a.c:10                                                       foo
/// ```
#[must_use]
pub fn render_function_table(records: &[FunctionSizeRecord], input: &Path) -> String
{
    let mut out = String::new();
    match write_function_table(&mut out, records, input) {
        Ok(()) => out,
        Err(fmt::Error) => String::new(),
    }
}

fn write_function_table(out: &mut impl Write, records: &[FunctionSizeRecord], input: &Path) -> fmt::Result
{
    let header = format!("{:>3} {:>10} {:>10} {:<60} Function", "No.", "Size(B)", "Size(KB)", "File:Line");

    writeln!(out, "DWARF size report")?;
    writeln!(out, "Input: {}", input.display())?;
    writeln!(out, "Count: {}", records.len())?;
    writeln!(out)?;
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(header.len()))?;
    for (index, record) in records.iter().enumerate() {
        writeln!(
            out,
            "{:>3} {:>10} {:>10} {:<60} {}",
            index + 1,
            record.size.value(),
            record.size.kib_label(),
            record.location(),
            record.name
        )?;
    }
    Ok(())
}
