//! Delimited-text and printable exports of a filtered record set
//!
//! An [`ExportJob`] is a point-in-time snapshot of headers and already
//! formatted rows. It is built from the whole filtered collection, never from
//! the current page.

use crate::core::error::ExportError;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values opened by spreadsheet software
    Excel,
    /// Standalone HTML table handed to a print or preview surface
    Print,
}

impl ExportFormat {
    pub fn delimiter(self) -> Option<u8> {
        match self {
            ExportFormat::Csv => Some(b','),
            ExportFormat::Excel => Some(b'\t'),
            ExportFormat::Print => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xls",
            ExportFormat::Print => "html",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Excel => "application/vnd.ms-excel",
            ExportFormat::Print => "text/html;charset=utf-8",
        }
    }
}

/// Snapshot of a table ready to be serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportJob {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    filename: String,
    title: String,
}

impl ExportJob {
    /// Build a job, checking that every row has one cell per header
    pub fn new(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        filename: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, ExportError> {
        if headers.is_empty() {
            return Err(ExportError::NoColumns);
        }

        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != headers.len())
        {
            return Err(ExportError::RowWidthMismatch {
                row,
                expected: headers.len(),
                actual: cells.len(),
            });
        }

        Ok(Self {
            headers,
            rows,
            filename: filename.into(),
            title: title.into(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Serialize the job into a payload for the given format
    pub fn render(&self, format: ExportFormat) -> Result<ExportPayload, ExportError> {
        let body = match format.delimiter() {
            Some(delimiter) => to_delimited(&self.headers, &self.rows, delimiter)?,
            None => to_print_document(&self.title, &self.headers, &self.rows),
        };

        tracing::info!(
            format = ?format,
            rows = self.rows.len(),
            filename = %self.filename,
            "Rendered export"
        );

        Ok(ExportPayload {
            filename: format!("{}.{}", self.filename, format.extension()),
            content_type: format.content_type(),
            body,
        })
    }

    /// Render and hand the payload to a target
    pub fn export_to(
        &self,
        format: ExportFormat,
        target: &dyn ExportTarget,
    ) -> Result<(), ExportError> {
        let payload = self.render(format)?;
        target.deliver(&payload).inspect_err(|e| {
            tracing::warn!(filename = %payload.filename, error = %e, "Export failed");
        })
    }
}

/// A fully formed export ready for download or printing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// Suggested file name including extension
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Host facility receiving finished exports (download folder, print preview)
///
/// Delivery is one-shot: a failure ends that export action and is not retried.
pub trait ExportTarget {
    fn deliver(&self, payload: &ExportPayload) -> Result<(), ExportError>;
}

/// Writes exports into a directory, standing in for a browser download
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, payload: &ExportPayload) -> PathBuf {
        self.dir.join(Path::new(&payload.filename))
    }
}

impl ExportTarget for DirectoryTarget {
    fn deliver(&self, payload: &ExportPayload) -> Result<(), ExportError> {
        std::fs::write(self.path_for(payload), &payload.body).map_err(|e| {
            ExportError::TargetUnavailable {
                message: format!("{}: {}", self.dir.display(), e),
            }
        })
    }
}

fn writer_for(delimiter: u8) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn encoding_failed(error: impl std::fmt::Display) -> ExportError {
    ExportError::EncodingFailed {
        message: error.to_string(),
    }
}

/// Header line followed by one `\n`-terminated line per row
///
/// Cells containing the delimiter, a double quote or a line break are wrapped
/// in double quotes with inner quotes doubled.
pub fn to_delimited(
    headers: &[String],
    rows: &[Vec<String>],
    delimiter: u8,
) -> Result<String, ExportError> {
    let mut writer = writer_for(delimiter);
    writer.write_record(headers).map_err(encoding_failed)?;
    for row in rows {
        writer.write_record(row).map_err(encoding_failed)?;
    }

    let bytes = writer.into_inner().map_err(encoding_failed)?;
    String::from_utf8(bytes).map_err(encoding_failed)
}

/// Split delimited text back into lines of unescaped cells
///
/// Accepts `\n` and `\r\n` line endings; blank lines are skipped.
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<Vec<Vec<String>>, ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(encoding_failed)
        })
        .collect()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Minimal printable HTML document: a title heading and one table
pub fn to_print_document(title: &str, headers: &[String], rows: &[Vec<String>]) -> String {
    let title = escape_html(title);
    let mut html = String::new();

    // Writing into a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n\
         body {{ font-family: Arial, sans-serif; margin: 20px; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}\n\
         th {{ background-color: #253850; color: #ffffff; }}\n\
         h1 {{ color: #253850; }}\n\
         </style>\n</head>\n<body>\n<h1>{title}</h1>\n<table>\n<thead>\n<tr>"
    );

    for header in headers {
        let _ = write!(html, "<th>{}</th>", escape_html(header));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}
