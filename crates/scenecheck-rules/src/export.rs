//! CSV export of violation reports
//!
//! The file starts with a UTF-8 byte order mark so spreadsheet tools pick the
//! right encoding for the Japanese header. Rows end in CRLF; the items column
//! joins items with a bare newline inside a quoted field.

use crate::report::ViolationReport;
use scenecheck_core::Result;
use std::fs;
use std::path::Path;

const BOM: &str = "\u{feff}";

pub const CSV_HEADER: [&str; 5] = ["チェック名", "重要度", "件数", "説明", "エラー項目"];

/// Render reports as CSV text, including the byte order mark
pub fn render_csv(reports: &[ViolationReport]) -> String {
    let mut out = String::from(BOM);
    push_row(&mut out, CSV_HEADER.iter().map(|s| s.to_string()));

    for report in reports {
        push_row(
            &mut out,
            [
                report.rule_name.clone(),
                report.severity.as_str().to_string(),
                report.count().to_string(),
                report.description.clone(),
                report.items.join("\n"),
            ],
        );
    }

    out
}

/// Write reports to a CSV file, creating parent directories as needed
pub fn write_csv<P: AsRef<Path>>(path: P, reports: &[ViolationReport]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_csv(reports))?;
    tracing::info!(path = %path.display(), reports = reports.len(), "results exported");
    Ok(())
}

fn push_row<I>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = String>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(&field));
    }
    out.push_str("\r\n");
}

fn escape_field(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
