//! Variables table: CSV text embedded in a record, rendered as a pipe-delimited markdown table.

use crate::data::product::Product;

/// Rendered in place of a variables table that does not parse.
pub const INVALID_TABLE: &str = "INVALID TABLE";

/// Minimum padding added to header widths.
const MIN_PADDING: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablesTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no columns to parse")]
    NoColumns,
    #[error("line {line}: expected at most {expected} fields, saw {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: control character in cell")]
    ControlCharacter { line: u64 },
    #[error("input ends inside a quoted field")]
    UnterminatedQuote,
}

fn has_control_character(cell: &str) -> bool {
    cell.chars()
        .any(|ch| ch.is_control() && !matches!(ch, '\t' | '\n' | '\r'))
}

/// True when `raw` ends inside a quoted field. A quote opens a field only at its start;
/// inside a quoted field `""` is an escaped quote.
fn ends_inside_quote(raw: &str) -> bool {
    let mut chars = raw.chars().peekable();
    let mut in_quotes = false;
    let mut at_field_start = true;
    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        if ch == '"' && at_field_start {
            in_quotes = true;
        }
        at_field_start = matches!(ch, ',' | '\n' | '\r');
    }
    in_quotes
}

/// Parse CSV text with a header row. Short rows are padded with empty cells; long rows and
/// cells holding control characters are errors, as is an unclosed quote.
pub fn parse_variables_table(raw: &str) -> Result<VariablesTable, TableError> {
    if ends_inside_quote(raw) {
        return Err(TableError::UnterminatedQuote);
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(TableError::NoColumns);
    }
    if headers.iter().any(|header| has_control_character(header)) {
        return Err(TableError::ControlCharacter { line: 1 });
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or(index as u64 + 2);
        if record.len() > headers.len() {
            return Err(TableError::TooManyFields {
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }
        if record.iter().any(has_control_character) {
            return Err(TableError::ControlCharacter { line });
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(VariablesTable { headers, rows })
}

/// Empty input renders as empty; unparseable input renders as [INVALID_TABLE].
pub fn tabulate_csv(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match parse_variables_table(raw) {
        Ok(table) => table.to_pipe_table(),
        Err(err) => {
            tracing::debug!("variables table rejected: {err}");
            INVALID_TABLE.to_string()
        }
    }
}

fn flatten_cell(cell: &str) -> String {
    cell.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn is_number(cell: &str) -> bool {
    cell.trim().parse::<f64>().is_ok()
}

impl VariablesTable {
    fn column_is_numeric(&self, column: usize) -> bool {
        let mut saw_value = false;
        for row in &self.rows {
            let cell = row[column].trim();
            if cell.is_empty() {
                continue;
            }
            if !is_number(cell) {
                return false;
            }
            saw_value = true;
        }
        saw_value
    }

    /// Render as a pipe table: numeric columns right-aligned, text columns left-aligned.
    pub fn to_pipe_table(&self) -> String {
        let headers: Vec<String> = self.headers.iter().map(|h| flatten_cell(h)).collect();
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| flatten_cell(cell)).collect())
            .collect();

        let numeric: Vec<bool> = (0..headers.len())
            .map(|column| self.column_is_numeric(column))
            .collect();
        let widths: Vec<usize> = (0..headers.len())
            .map(|column| {
                rows.iter()
                    .map(|row| row[column].chars().count())
                    .fold(headers[column].chars().count() + MIN_PADDING, usize::max)
            })
            .collect();

        let render_row = |cells: &[String]| -> String {
            let padded: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(column, cell)| {
                    let width = widths[column];
                    if numeric[column] {
                        format!("{cell:>width$}")
                    } else {
                        format!("{cell:<width$}")
                    }
                })
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        let separator: Vec<String> = widths
            .iter()
            .zip(&numeric)
            .map(|(width, is_numeric)| {
                if *is_numeric {
                    format!("{}:", "-".repeat(width + 1))
                } else {
                    format!(":{}", "-".repeat(width + 1))
                }
            })
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(render_row(headers.as_slice()));
        lines.push(format!("|{}|", separator.join("|")));
        lines.extend(rows.iter().map(|row| render_row(row.as_slice())));
        lines.join("\n")
    }
}

impl Product {
    /// Formatted variables table for the preview.
    pub fn tabulate_variables(&self) -> String {
        tabulate_csv(&self.variables_table)
    }
}
