//! CSV export of the curve response table.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::pipeline::mapper::CurveRow;

/// Column header for the curve table export.
const HEADER: &str = "bucket,power_kw,green_percent,red,green";

/// Exports the curve response table to a CSV file at the given path.
///
/// # Arguments
///
/// * `rows` - Table from [`crate::pipeline::OutputMapper::response_table`]
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_curve_csv(rows: &[CurveRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_curve_csv(rows, buf)
}

/// Writes the curve response table as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_curve_csv(rows: &[CurveRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;
    for r in rows {
        wtr.write_record(&[
            r.bucket.to_string(),
            format!("{:.1}", r.power_kw),
            format!("{:.2}", r.green_percent),
            r.red.to_string(),
            r.green.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
