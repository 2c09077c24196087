use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::validation::{InputKind, SelectedFile};

#[derive(Debug, Error)]
pub enum LinksError {
    #[error("failed to read links CSV {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

fn looks_like_link(cell: &str) -> bool {
    let lower = cell.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.")
}

/// First-column values of a CSV file, skipping blanks and a non-link header row.
pub fn read_csv_links(path: &Path) -> Result<Vec<String>, LinksError> {
    let csv_err = |source: csv::Error| LinksError::Csv {
        path: path.display().to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut links = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let cell = match record.get(0).map(str::trim) {
            Some(cell) if !cell.is_empty() => cell,
            _ => continue,
        };
        if row == 0 && !looks_like_link(cell) {
            debug!(target: "run", header = cell, "skipping header row");
            continue;
        }
        links.push(cell.to_string());
    }
    Ok(links)
}

/// Links for a run. Excel workbooks are not parsed and yield no links.
pub fn load_links(file: &SelectedFile) -> Result<Vec<String>, LinksError> {
    match file.kind() {
        InputKind::Csv => read_csv_links(file.path()),
        InputKind::Excel => {
            debug!(target: "run", file = %file.path().display(), "excel input is not parsed");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::validation::validate_file_path;

    #[test]
    fn header_and_blank_rows_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("links.csv");
        fs::write(
            &path,
            "URL,notes\nhttps://omega.example/bt/1,first\n,\n  https://omega.example/bt/2  \nwww.omega.example/bt/3,x,extra\n",
        )
        .unwrap();

        let links = read_csv_links(&path).unwrap();
        assert_eq!(
            links,
            vec![
                "https://omega.example/bt/1",
                "https://omega.example/bt/2",
                "www.omega.example/bt/3",
            ]
        );
    }

    #[test]
    fn first_row_link_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("links.csv");
        fs::write(&path, "https://omega.example/bt/1\nhttps://omega.example/bt/2\n").unwrap();
        assert_eq!(read_csv_links(&path).unwrap().len(), 2);
    }

    #[test]
    fn excel_yields_no_links() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("links.xlsx");
        fs::write(&path, b"PK").unwrap();
        let selected = validate_file_path(Some(&path)).unwrap();
        assert!(load_links(&selected).unwrap().is_empty());
    }
}
