use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Header row followed by data rows, every cell as text.
pub type RawTable = Vec<Vec<String>>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TableError {
    #[error("Required field '{field}' missing from header")]
    MissingField { field: String },
    #[error("Table has {rows} row(s), need a header and at least one data row")]
    TooFewRows { rows: usize },
    #[error("None of {total} data row(s) passed validation")]
    NoValidRows { total: usize },
}

impl TableError {
    /// Schema errors are about the header, everything else is about the data.
    pub fn is_schema(&self) -> bool {
        matches!(self, TableError::MissingField { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Must parse to a finite number or the row is dropped
    Numeric,
    /// Non-numeric cells read as 0.0 and the row is kept
    NumericOrZero,
    /// Carried verbatim, must not be blank
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn numeric(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Numeric }
    }

    pub const fn numeric_or_zero(name: &'static str) -> Self {
        Self { name, kind: FieldKind::NumericOrZero }
    }

    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

/// A validated data row, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRow {
    values: HashMap<&'static str, CellValue>,
}

impl ParsedRow {
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.values.get(field) {
            Some(CellValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.values.get(field) {
            Some(CellValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

fn parse_finite(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a raw feed table into validated rows, preserving row order.
///
/// Columns are located by exact header name. Rows that are too short for the
/// required columns, or whose strict numeric cells do not parse, are dropped.
#[instrument(skip(raw, specs), fields(rows = raw.len()))]
pub fn parse_table(raw: &RawTable, specs: &[FieldSpec]) -> Result<Vec<ParsedRow>, TableError> {
    let header = raw.first().ok_or(TableError::TooFewRows { rows: 0 })?;

    let mut columns = Vec::with_capacity(specs.len());
    for spec in specs {
        let index = header
            .iter()
            .position(|name| name == spec.name)
            .ok_or_else(|| {
                warn!("Header is missing required field '{}': {:?}", spec.name, header);
                TableError::MissingField {
                    field: spec.name.to_string(),
                }
            })?;
        columns.push((spec, index));
    }

    if raw.len() < 2 {
        return Err(TableError::TooFewRows { rows: raw.len() });
    }

    let required_len = columns.iter().map(|(_, index)| index + 1).max().unwrap_or(0);
    let total = raw.len() - 1;
    let mut rows = Vec::with_capacity(total);
    let mut skipped_rows = 0;

    'rows: for (row_number, cells) in raw.iter().enumerate().skip(1) {
        if cells.len() < required_len {
            debug!("Row {} has {} cells, need {}", row_number, cells.len(), required_len);
            skipped_rows += 1;
            continue;
        }

        let mut row = ParsedRow::default();
        for (spec, index) in &columns {
            let cell = &cells[*index];
            let value = match spec.kind {
                FieldKind::Numeric => match parse_finite(cell) {
                    Some(v) => CellValue::Number(v),
                    None => {
                        debug!("Row {}: '{}' is not numeric ({:?})", row_number, spec.name, cell);
                        skipped_rows += 1;
                        continue 'rows;
                    }
                },
                FieldKind::NumericOrZero => CellValue::Number(parse_finite(cell).unwrap_or(0.0)),
                FieldKind::Text => {
                    if cell.trim().is_empty() {
                        debug!("Row {}: '{}' is blank", row_number, spec.name);
                        skipped_rows += 1;
                        continue 'rows;
                    }
                    CellValue::Text(cell.clone())
                }
            };
            row.values.insert(spec.name, value);
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(TableError::NoValidRows { total });
    }

    debug!("Parsed {} valid rows, skipped {} of {}", rows.len(), skipped_rows, total);
    Ok(rows)
}
