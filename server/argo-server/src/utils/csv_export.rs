//! CSV export rendering
//!
//! Exports use the same filter shape as the matching list endpoint, minus
//! pagination. Fields containing a comma, quote, CR or LF are wrapped in
//! quotes with internal quotes doubled (RFC 4180), the header row comes
//! first, and output is capped at [`MAX_EXPORT_ROWS`] rows regardless of
//! how many rows the query would return.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Hard cap on exported data rows (header row excluded)
pub const MAX_EXPORT_ROWS: usize = 10_000;

/// Incremental CSV writer with RFC-4180 quoting and a row cap
pub struct CsvExporter {
    buf: String,
    rows_written: usize,
    cap: usize,
}

impl CsvExporter {
    /// Start a document with the given header row
    pub fn new(headers: &[&str]) -> Self {
        let mut exporter = Self {
            buf: String::new(),
            rows_written: 0,
            cap: MAX_EXPORT_ROWS,
        };
        exporter.write_line(headers.iter().copied());
        exporter
    }

    #[cfg(test)]
    fn with_cap(headers: &[&str], cap: usize) -> Self {
        let mut exporter = Self::new(headers);
        exporter.cap = cap;
        exporter
    }

    /// Append a data row. Returns `false` once the cap is reached; further
    /// rows are dropped silently.
    pub fn push_row<'f>(&mut self, fields: impl IntoIterator<Item = &'f str>) -> bool {
        if self.rows_written >= self.cap {
            return false;
        }
        self.write_line(fields);
        self.rows_written += 1;
        true
    }

    fn write_line<'f>(&mut self, fields: impl IntoIterator<Item = &'f str>) {
        let mut first = true;
        for field in fields {
            if !first {
                self.buf.push(',');
            }
            first = false;
            self.buf.push_str(&escape_field(field));
        }
        self.buf.push_str("\r\n");
    }

    /// Number of data rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Finish and return the document
    pub fn finish(self) -> String {
        self.buf
    }
}

/// Quote a field when it contains a comma, quote, CR or LF; double any
/// internal quotes.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Wrap a finished CSV document in a download response
pub fn csv_response(filename: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_row_comes_first() {
        let exporter = CsvExporter::new(&["Reference", "Value"]);
        let doc = exporter.finish();
        assert!(doc.starts_with("Reference,Value\r\n"));
    }

    #[test]
    fn test_plain_fields_are_not_quoted() {
        let mut exporter = CsvExporter::new(&["a", "b"]);
        exporter.push_row(["hello", "world"]);
        assert_eq!(exporter.finish(), "a,b\r\nhello,world\r\n");
    }

    #[test]
    fn test_field_with_comma_quote_and_newline_is_escaped() {
        let mut exporter = CsvExporter::new(&["notes"]);
        exporter.push_row(["said \"hi\", then\nleft"]);
        let doc = exporter.finish();
        assert!(doc.contains("\"said \"\"hi\"\", then\nleft\""));
    }

    #[test]
    fn test_carriage_return_triggers_quoting() {
        assert_eq!(escape_field("a\rb"), "\"a\rb\"");
    }

    #[test]
    fn test_row_cap_is_enforced() {
        let mut exporter = CsvExporter::with_cap(&["n"], 3);
        for i in 0..10 {
            exporter.push_row([i.to_string().as_str()]);
        }
        assert_eq!(exporter.rows_written(), 3);
        let doc = exporter.finish();
        // Header plus exactly three data rows.
        assert_eq!(doc.lines().count(), 4);
    }

    #[test]
    fn test_push_row_reports_cap() {
        let mut exporter = CsvExporter::with_cap(&["n"], 1);
        assert!(exporter.push_row(["1"]));
        assert!(!exporter.push_row(["2"]));
    }

    #[test]
    fn test_empty_fields_are_preserved() {
        let mut exporter = CsvExporter::new(&["a", "b", "c"]);
        exporter.push_row(["", "x", ""]);
        assert!(exporter.finish().contains(",x,"));
    }
}
