//! Series input from delimited text files.
//!
//! One value per line, extracted from a configurable column. Defective rows
//! (missing column, malformed number) are logged and skipped so a stray
//! header or corrupt line does not abort an hours-long analysis; only a file
//! that yields no values at all is an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::error::{Error, Result};

/// Read a series from a delimited text file.
pub fn series_from_file(
    path: &Path,
    delimiter: char,
    column: usize,
    skip: usize,
) -> Result<Vec<f32>> {
    let file = File::open(path)?;
    let series = series_from_reader(BufReader::new(file), delimiter, column, skip)?;
    if series.is_empty() {
        return Err(Error::EmptySeries {
            path: path.to_path_buf(),
        });
    }
    Ok(series)
}

/// Read a series from any buffered source, skipping `skip` leading lines.
pub fn series_from_reader<R: BufRead>(
    reader: R,
    delimiter: char,
    column: usize,
    skip: usize,
) -> Result<Vec<f32>> {
    let mut series = Vec::new();
    let mut defective = 0usize;

    for (line_number, line) in reader.lines().enumerate().skip(skip) {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.split(delimiter).nth(column) {
            Some(field) => match field.trim().parse::<f32>() {
                Ok(value) => series.push(value),
                Err(_) => {
                    warn!(
                        line = line_number + 1,
                        field, "skipping row with malformed value"
                    );
                    defective += 1;
                }
            },
            None => {
                warn!(
                    line = line_number + 1,
                    column, "skipping row without the requested column"
                );
                defective += 1;
            }
        }
    }

    if defective > 0 {
        warn!(rows = defective, "defective rows skipped");
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    #[test]
    fn test_single_column() {
        let data = "1.0\n2.5\n-3.25\n";
        let series = series_from_reader(Cursor::new(data), ',', 0, 0).unwrap();
        assert_eq!(series, vec![1.0, 2.5, -3.25]);
    }

    #[test]
    fn test_column_extraction_and_skip() {
        let data = "time,value\n0,1.5\n1,2.5\n2,3.5\n";
        let series = series_from_reader(Cursor::new(data), ',', 1, 1).unwrap();
        assert_eq!(series, vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_defective_rows_are_skipped() {
        let data = "1.0\nnot-a-number\n2.0\n\n3.0\n";
        let series = series_from_reader(Cursor::new(data), ',', 0, 0).unwrap();
        assert_eq!(series, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_missing_column_is_skipped() {
        let data = "1.0;2.0\n3.0\n4.0;5.0\n";
        let series = series_from_reader(Cursor::new(data), ';', 1, 0).unwrap();
        assert_eq!(series, vec![2.0, 5.0]);
    }

    #[test]
    fn test_empty_file_is_an_input_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "no numbers here").unwrap();
        let result = series_from_file(file.path(), ',', 0, 0);
        assert!(matches!(result, Err(Error::EmptySeries { .. })));
    }

    #[test]
    fn test_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.5\n1.5\n2.5").unwrap();
        let series = series_from_file(file.path(), ',', 0, 0).unwrap();
        assert_eq!(series, vec![0.5, 1.5, 2.5]);
    }
}
