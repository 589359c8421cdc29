use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A delimited file held fully in memory: one header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(&path.display().to_string(), file)
    }

    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);
        let headers = csv.headers()?.iter().map(str::to_string).collect();
        let rows = csv
            .records()
            .map(|record| -> Result<Vec<String>> {
                Ok(record?.iter().map(str::to_string).collect())
            })
            .collect::<Result<Vec<Vec<String>>>>()?;
        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| Error::MissingColumn {
                column: column.to_string(),
                source_name: self.name.clone(),
            })
    }

    /// Values of one column in row order.
    pub fn column(&self, column: &str) -> Result<Vec<String>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    /// Every column of row `idx` as a JSON object; empty cells become `null`.
    pub fn payload(&self, idx: usize) -> Map<String, Value> {
        self.headers
            .iter()
            .zip(&self.rows[idx])
            .map(|(header, cell)| {
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.clone())
                };
                (header.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKS: &str = "title,authors,description\n\
                         Dune,Frank Herbert,Desert planet saga\n\
                         \"Emma\",Jane Austen,\n";

    #[test]
    fn reads_headers_and_rows() {
        let table = Table::from_reader("books.csv", BOOKS.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["title", "authors", "description"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1][0], "Emma");
    }

    #[test]
    fn column_by_name() {
        let table = Table::from_reader("books.csv", BOOKS.as_bytes()).unwrap();
        assert_eq!(table.column("authors").unwrap(), vec!["Frank Herbert", "Jane Austen"]);
        match table.column("isbn") {
            Err(Error::MissingColumn {
                column,
                source_name,
            }) => {
                assert_eq!(column, "isbn");
                assert_eq!(source_name, "books.csv");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn payload_maps_empty_cells_to_null() {
        let table = Table::from_reader("books.csv", BOOKS.as_bytes()).unwrap();
        let payload = table.payload(1);
        assert_eq!(payload["title"], Value::String("Emma".into()));
        assert_eq!(payload["description"], Value::Null);
        assert_eq!(payload.len(), 3);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Table::from_reader("bad.csv", "a,b\n1,2,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn header_only_is_empty() {
        let table = Table::from_reader("empty.csv", "combined_column\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers, vec!["combined_column"]);
    }
}
