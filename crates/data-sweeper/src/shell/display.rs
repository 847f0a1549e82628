//! Plain-text rendering of metadata, previews and the upload history.

use crate::types::{FileMetadata, HistoryRecord, TabularData};

/// Metadata block shown after an upload.
pub fn render_metadata(meta: &FileMetadata) -> Vec<String> {
    let mut lines = vec![
        format!("File: {}", meta.name),
        format!("Size: {}", meta.size_kb),
        format!("Rows: {}, Columns: {}", meta.row_count, meta.column_count),
    ];
    for col in &meta.columns {
        if col.null_count > 0 {
            lines.push(format!(
                "  - {} ({}, {} missing)",
                col.name, col.scalar_type, col.null_count
            ));
        } else {
            lines.push(format!("  - {} ({})", col.name, col.scalar_type));
        }
    }
    lines
}

/// The first `rows` rows in polars' table layout.
pub fn render_preview(data: &TabularData, rows: usize) -> Vec<String> {
    format!("{}", data.head(rows))
        .lines()
        .map(str::to_string)
        .collect()
}

/// The upload history as a two-column table.
pub fn render_history(records: &[HistoryRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No files uploaded yet!".to_string()];
    }

    let name_header = "File Name";
    let size_header = "Size (KB)";
    let name_width = records
        .iter()
        .map(|r| r.file_name.chars().count())
        .chain(std::iter::once(name_header.len()))
        .max()
        .unwrap_or(name_header.len());
    let size_width = records
        .iter()
        .map(|r| r.size_kb.len())
        .chain(std::iter::once(size_header.len()))
        .max()
        .unwrap_or(size_header.len());

    let mut lines = Vec::with_capacity(records.len() + 2);
    lines.push(format!(
        "{:<nw$} | {:<sw$}",
        name_header,
        size_header,
        nw = name_width,
        sw = size_width
    ));
    lines.push(format!("{}-+-{}", "-".repeat(name_width), "-".repeat(size_width)));
    for record in records {
        lines.push(format!(
            "{:<nw$} | {:<sw$}",
            record.file_name,
            record.size_kb,
            nw = name_width,
            sw = size_width
        ));
    }
    lines
}
