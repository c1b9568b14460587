use crate::OutputRow;
use cli_table::{Cell, Table, TableStruct};
use std::io::Write;

/// Width of each left-aligned column of the plain report
pub const COLUMN_WIDTH: usize = 15;

pub const HEADER: [&str; 5] = ["config", "bytes", "time(s)", "bw(MB/s)", "cycles"];

/// Format like C's `%g`: 6 significant digits, trailing zeros removed
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // let the formatter do the rounding, then read back the decimal exponent
    let scientific = format!("{:.5e}", value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let precision = (5 - exponent) as usize;
        trim_fraction(&format!("{:.*}", precision, value)).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn fields(row: &OutputRow) -> [String; 5] {
    [
        row.config.to_string(),
        row.bytes.to_string(),
        format_general(row.time_seconds),
        format!("{:.2}", row.bandwidth_mbps),
        row.cycles.to_string(),
    ]
}

fn aligned<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|field| format!("{:<width$}", field.as_ref(), width = COLUMN_WIDTH))
        .collect()
}

pub fn header_line() -> String {
    aligned(&HEADER)
}

pub fn row_line(row: &OutputRow) -> String {
    aligned(&fields(row))
}

/// Write the column-aligned report
pub fn write_plain<W: Write>(mut out: W, rows: &[OutputRow]) -> std::io::Result<()> {
    writeln!(out, "{}", header_line())?;
    for row in rows {
        writeln!(out, "{}", row_line(row))?;
    }
    Ok(())
}

pub fn render_table(rows: &[OutputRow]) -> TableStruct {
    let table: Vec<_> = rows
        .iter()
        .map(|row| fields(row).into_iter().map(|field| field.cell()).collect::<Vec<_>>())
        .collect();
    table
        .table()
        .title(HEADER.iter().map(|title| title.cell()).collect::<Vec<_>>())
}
