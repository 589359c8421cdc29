use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;

use super::table::Table;

/// Columns kept from the raw books table, in join order.
pub const BOOK_COLUMNS: [&str; 4] = ["title", "authors", "categories", "description"];

/// Column that must be present and not `null` for a row to be kept.
pub const REQUIRED_COLUMN: &str = "description";

/// Name of the single column written to the cleaned file.
pub const COMBINED_COLUMN: &str = "combined_column";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrepareSummary {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub duplicates: usize,
    pub rows_written: usize,
}

/// Clean the raw books table into one combined text column.
pub fn combine_book_columns(raw: &Table) -> Result<(Vec<String>, PrepareSummary)> {
    let indices = BOOK_COLUMNS
        .iter()
        .map(|c| raw.column_index(c))
        .collect::<Result<Vec<_>>>()?;
    let required = raw.column_index(REQUIRED_COLUMN)?;

    let mut seen = HashSet::new();
    let mut combined = Vec::new();
    let mut dropped = 0;
    let mut duplicates = 0;

    for row in &raw.rows {
        let description = row[required].trim();
        if description.is_empty() || description == "null" {
            dropped += 1;
            continue;
        }
        let text = indices
            .iter()
            .map(|&i| row[i].replace('"', ""))
            .collect::<Vec<_>>()
            .join(" ");
        if seen.insert(text.clone()) {
            combined.push(text);
        } else {
            duplicates += 1;
        }
    }

    let summary = PrepareSummary {
        rows_read: raw.len(),
        rows_dropped: dropped,
        duplicates,
        rows_written: combined.len(),
    };
    Ok((combined, summary))
}

/// Read `input`, clean it, and write the one-column result to `output`.
pub fn prepare_books(input: &Path, output: &Path) -> Result<PrepareSummary> {
    let raw = Table::read(input)?;
    let (combined, summary) = combine_book_columns(&raw)?;

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record([COMBINED_COLUMN])?;
    for text in &combined {
        writer.write_record([text])?;
    }
    writer.flush()?;

    info!(
        input = %input.display(),
        output = %output.display(),
        rows = summary.rows_written,
        "dataset prepared"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const RAW: &str = "isbn13,title,authors,categories,description,published_year\n\
                       1,Dune,Frank Herbert,Fiction,\"A \"\"desert\"\" saga\",1965\n\
                       2,Emma,Jane Austen,Fiction,null,1815\n\
                       3,Dune,Frank Herbert,Fiction,\"A \"\"desert\"\" saga\",1965\n\
                       4,It,Stephen King,Horror,A clown terrorizes a town,1986\n\
                       5,Blank,Nobody,,,2000\n";

    #[test]
    fn combines_cleans_and_dedupes() {
        let raw = Table::from_reader("books.csv", RAW.as_bytes()).unwrap();
        let (combined, summary) = combine_book_columns(&raw).unwrap();
        assert_eq!(
            combined,
            vec![
                "Dune Frank Herbert Fiction A desert saga",
                "It Stephen King Horror A clown terrorizes a town",
            ]
        );
        assert_eq!(
            summary,
            PrepareSummary {
                rows_read: 5,
                rows_dropped: 2,
                duplicates: 1,
                rows_written: 2,
            }
        );
    }

    #[test]
    fn missing_required_column_fails() {
        let raw = Table::from_reader("books.csv", "title,authors\nDune,Herbert\n".as_bytes()).unwrap();
        assert!(matches!(
            combine_book_columns(&raw),
            Err(Error::MissingColumn { .. })
        ));
    }

    #[test]
    fn writes_single_column_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("books.csv");
        let output = dir.path().join("datasets/books_clean.csv");
        std::fs::write(&input, RAW).unwrap();

        let summary = prepare_books(&input, &output).unwrap();
        assert_eq!(summary.rows_written, 2);

        let cleaned = Table::read(&output).unwrap();
        assert_eq!(cleaned.headers, vec![COMBINED_COLUMN]);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.rows[1][0], "It Stephen King Horror A clown terrorizes a town");
    }
}
