//! CSV export of the admin's filtered view, safe to open in a spreadsheet.

use serde::Serialize;

use crate::table::{csv_escape, SubmissionTable};

const DEFAULT_EXPORT_NAME: &str = "activity-submissions.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFile {
    pub filename: String,
    pub rows: usize,
    pub content: String,
}

pub fn export_table(table: &SubmissionTable, filename: &str) -> ExportFile {
    ExportFile {
        filename: sanitize_export_filename(filename),
        rows: table.len(),
        content: table_to_csv(table),
    }
}

pub fn table_to_csv(table: &SubmissionTable) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(table.len() + 1);
    lines.push(
        table
            .columns()
            .iter()
            .map(|col| export_cell(col.as_str()))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in table.rows() {
        lines.push(
            row.iter()
                .map(|cell| export_cell(cell.as_str()))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

fn export_cell(value: &str) -> String {
    csv_escape(neutralize_csv_formula(value).as_str())
}

fn should_neutralize_csv(value: &str) -> bool {
    let trimmed = value.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('\'') {
        return false;
    }
    matches!(
        trimmed.chars().next(),
        Some('=') | Some('+') | Some('-') | Some('@')
    )
}

fn neutralize_csv_formula(value: &str) -> String {
    if should_neutralize_csv(value) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

fn sanitize_filename(value: &str) -> String {
    let mut out = String::new();
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        DEFAULT_EXPORT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn sanitize_export_filename(value: &str) -> String {
    let trimmed: String = value.trim().chars().take(255).collect();
    let safe = sanitize_filename(trimmed.as_str());
    if safe.to_lowercase().ends_with(".csv") {
        safe
    } else {
        format!("{safe}.csv")
    }
}
