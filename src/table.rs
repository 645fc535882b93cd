//! Turns records into a display table.

use std::fmt::Write;

use crate::messages::Messages;
use crate::record::{ImageMetadataRecord, Resolution};

pub const COLUMNS: usize = 5;

pub type Row = [String; COLUMNS];

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Table {
    pub header: Row,
    pub rows: Vec<Row>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Presentation {
    /// Nothing to show; carries the placeholder text.
    NoData(String),
    Table(Table),
}

fn number(value: Option<u32>, messages: &Messages) -> String {
    match value {
        Some(n) => n.to_string(),
        None => messages.unavailable.clone(),
    }
}

fn resolution(value: Resolution, messages: &Messages) -> String {
    match value {
        Resolution::Dpi { x, y } => format!("{}×{}", x, y),
        Resolution::NotSpecified => messages.not_specified.clone(),
        Resolution::TiffReadError => messages.tiff_read_error.clone(),
        Resolution::LoadError => messages.load_error.clone(),
    }
}

pub fn row(record: &ImageMetadataRecord, messages: &Messages) -> Row {
    [
        record.name.clone(),
        format!("{} × {}", number(record.width, messages), number(record.height, messages)),
        resolution(record.resolution, messages),
        number(record.color_depth, messages),
        messages.compression.label(record.compression).to_owned(),
    ]
}

/// Builds the table, one row per record in the given order.
pub fn present(records: &[ImageMetadataRecord], messages: &Messages) -> Presentation {
    if records.is_empty() {
        return Presentation::NoData(messages.no_data.clone());
    }
    Presentation::Table(Table {
        header: messages.headers.clone(),
        rows: records.iter().map(|r| row(r, messages)).collect(),
    })
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
            c => out.push(c),
        }
    }
    out
}

impl Presentation {
    /// Plain text with columns padded to a common width.
    pub fn to_text(&self) -> String {
        let table = match *self {
            Presentation::NoData(ref text) => return format!("{}\n", text),
            Presentation::Table(ref table) => table,
        };

        let mut widths = [0usize; COLUMNS];
        for row in Some(&table.header).into_iter().chain(table.rows.iter()) {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let mut line = |row: &Row| {
            let cells: Vec<String> = row.iter()
                .zip(widths.iter())
                .map(|(cell, &w)| format!("{}{}", cell, " ".repeat(w - cell.chars().count())))
                .collect();
            let _ = writeln!(out, "{}", cells.join("  ").trim_end());
        };

        line(&table.header);
        let rule: Row = [
            "-".repeat(widths[0]),
            "-".repeat(widths[1]),
            "-".repeat(widths[2]),
            "-".repeat(widths[3]),
            "-".repeat(widths[4]),
        ];
        line(&rule);
        for row in &table.rows {
            line(row);
        }
        out
    }

    /// An HTML fragment; cell values are escaped.
    pub fn to_html(&self) -> String {
        let table = match *self {
            Presentation::NoData(ref text) => return format!("<p>{}</p>\n", escape_html(text)),
            Presentation::Table(ref table) => table,
        };

        let mut out = String::from("<table>\n<tr>");
        for cell in &table.header {
            let _ = write!(out, "<th>{}</th>", escape_html(cell));
        }
        out.push_str("</tr>\n");
        for row in &table.rows {
            out.push_str("<tr>");
            for cell in row {
                let _ = write!(out, "<td>{}</td>", escape_html(cell));
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</table>\n");
        out
    }
}

/// Records as a JSON array.
pub fn to_json(records: &[ImageMetadataRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
