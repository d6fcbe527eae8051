use crate::error::SourceError;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Reads the named column of a headed CSV table, in row order.
pub fn entities_from_csv<R: Read>(reader: R, column: &str) -> Result<Vec<String>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(SourceError::MissingHeader);
    }
    let position = column_position(&headers, column)?;

    let mut entities = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        push_cell(&mut entities, record.get(position), row + 2);
    }

    Ok(entities)
}

pub fn entities_from_csv_file(path: &Path, column: &str) -> Result<Vec<String>, SourceError> {
    let file = std::fs::File::open(path)?;
    entities_from_csv(file, column)
}

/// Same as [`entities_from_csv`] for sheet values whose first row is the header.
pub fn entities_from_rows(rows: &[Vec<String>], column: &str) -> Result<Vec<String>, SourceError> {
    let (headers, body) = rows.split_first().ok_or(SourceError::MissingHeader)?;
    let headers: Vec<String> = headers.iter().map(|header| header.trim().to_string()).collect();
    let position = column_position(&headers, column)?;

    let mut entities = Vec::new();
    for (row, values) in body.iter().enumerate() {
        push_cell(&mut entities, values.get(position).map(String::as_str), row + 2);
    }

    Ok(entities)
}

fn column_position(headers: &[String], column: &str) -> Result<usize, SourceError> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| SourceError::MissingColumn {
            column: column.to_string(),
            available: headers.to_vec(),
        })
}

fn push_cell(entities: &mut Vec<String>, cell: Option<&str>, line: usize) {
    match cell.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => entities.push(value.to_string()),
        None => warn!(line, "skipping row with a blank entity cell"),
    }
}
