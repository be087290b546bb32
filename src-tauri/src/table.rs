//! In-memory submissions table and the CSV text codec used by the store.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::record::SUBMISSION_COLUMNS;

/// A loaded table: named columns and rows of string cells.
///
/// An empty cell stands for a missing value and never matches a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Default for SubmissionTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl SubmissionTable {
    /// An empty table with the canonical submission columns.
    pub fn empty() -> Self {
        Self {
            columns: SUBMISSION_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(idx))
            .map(String::as_str)
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&[String]) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// Project the table onto `names`, in that order. Unknown names are skipped.
    pub fn select(&self, names: &[&str]) -> Self {
        let picked: Vec<(usize, &str)> = names
            .iter()
            .filter_map(|name| self.column_index(name).map(|idx| (idx, *name)))
            .collect();
        Self {
            columns: picked.iter().map(|(_, name)| name.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| {
                    picked
                        .iter()
                        .map(|(idx, _)| row.get(*idx).cloned().unwrap_or_default())
                        .collect()
                })
                .collect(),
        }
    }

    /// Decode CSV text. The first non-blank line is the header.
    ///
    /// Zero-byte or header-only input yields an empty table. Every canonical
    /// column must be present in the header; short rows are padded.
    pub fn parse_csv(text: &str) -> Result<Self> {
        let records = parse_records(text)?;
        let mut iter = records.into_iter();
        let Some((_, header)) = iter.next() else {
            return Ok(Self::empty());
        };
        for required in SUBMISSION_COLUMNS {
            if !header.iter().any(|c| c == required) {
                return Err(AppError::MalformedStore {
                    line: 1,
                    reason: format!("missing column `{required}`"),
                });
            }
        }

        let width = header.len();
        let mut rows = Vec::new();
        for (line, mut cells) in iter {
            if cells.len() > width {
                return Err(AppError::MalformedStore {
                    line,
                    reason: format!("expected {width} fields, saw {}", cells.len()),
                });
            }
            cells.resize(width, String::new());
            rows.push(cells);
        }
        Ok(Self {
            columns: header,
            rows,
        })
    }
}

/// Quote a cell when it contains a delimiter, quote or line break.
pub fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One `\n`-terminated CSV line.
pub fn csv_line<S: AsRef<str>>(cells: &[S]) -> String {
    let mut line = cells
        .iter()
        .map(|cell| csv_escape(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Split CSV text into records, tagging each with its 1-based starting line.
/// Blank lines are skipped.
fn parse_records(text: &str) -> Result<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut cells: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut line = 1_usize;
    let mut record_line = 1_usize;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' if !field_started => {
                in_quotes = true;
                field_started = true;
            }
            ',' => {
                cells.push(std::mem::take(&mut field));
                field_started = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                finish_record(&mut records, &mut cells, &mut field, record_line);
                field_started = false;
                line += 1;
                record_line = line;
            }
            _ => {
                field.push(ch);
                field_started = true;
            }
        }
    }

    if in_quotes {
        return Err(AppError::MalformedStore {
            line: record_line,
            reason: "unterminated quoted field".to_string(),
        });
    }
    finish_record(&mut records, &mut cells, &mut field, record_line);
    Ok(records)
}

fn finish_record(
    records: &mut Vec<(usize, Vec<String>)>,
    cells: &mut Vec<String>,
    field: &mut String,
    line: usize,
) {
    if cells.is_empty() && field.is_empty() {
        return;
    }
    cells.push(std::mem::take(field));
    records.push((line, std::mem::take(cells)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> String {
        csv_line(&SUBMISSION_COLUMNS)
    }

    #[test]
    fn zero_bytes_is_an_empty_table() {
        let table = SubmissionTable::parse_csv("").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), SUBMISSION_COLUMNS.len());
    }

    #[test]
    fn header_only_is_an_empty_table() {
        let table = SubmissionTable::parse_csv(&header()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns()[0], "Employee Code");
    }

    #[test]
    fn quoted_cells_survive_commas_quotes_and_newlines() {
        let row = [
            "EMP1",
            "Doe, Jane",
            "No",
            "N/A",
            "Say \"hi\"",
            "line one\nline two",
            "Daily",
            "15",
            "Yes",
            "No",
        ];
        let text = format!("{}{}", header(), csv_line(&row));
        let table = SubmissionTable::parse_csv(&text).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0], row.map(String::from).to_vec());
    }

    #[test]
    fn short_rows_are_padded_and_blank_lines_skipped() {
        let text = format!("{}\r\nEMP1,Jane\r\n\r\n", header().trim_end());
        let table = SubmissionTable::parse_csv(&text).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "Full Name"), Some("Jane"));
        assert_eq!(table.cell(0, "Frequency"), Some(""));
    }

    #[test]
    fn overlong_rows_are_rejected_with_their_line() {
        let text = format!("{}a,b,c,d,e,f,g,h,i,j,k\n", header());
        let err = SubmissionTable::parse_csv(&text).unwrap_err();
        assert!(matches!(err, AppError::MalformedStore { line: 2, .. }));
    }

    #[test]
    fn missing_columns_are_rejected() {
        let err = SubmissionTable::parse_csv("Employee Code,Full Name\nEMP1,Jane\n").unwrap_err();
        assert!(matches!(err, AppError::MalformedStore { line: 1, .. }));
    }

    #[test]
    fn select_projects_in_requested_order() {
        let table = SubmissionTable::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec!["1".into(), "2".into(), "3".into()]],
        );
        let picked = table.select(&["c", "a", "missing"]);
        assert_eq!(picked.columns(), ["c".to_string(), "a".to_string()]);
        assert_eq!(picked.rows()[0], vec!["3".to_string(), "1".to_string()]);
    }
}
