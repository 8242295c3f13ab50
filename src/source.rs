use csv::{Reader, ReaderBuilder, StringRecord};
use std::{fs::File, io::Read, path::Path};

use crate::error::{ConvertError, Result};

/// Comma delimited, double-quote quoted, header row skipped. Rows may differ
/// in width; missing columns are reported per row instead.
pub fn csv_reader<R: Read>(reader: R) -> Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(b',')
        .quote(b'"')
        .from_reader(reader)
}

pub fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| ConvertError::io("opening", path, e))
}

/// Display name used in error messages: the file name when there is one.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 1-based line in the file; the header is line 1.
pub fn line_of(record: &StringRecord, data_row: u64) -> u64 {
    record
        .position()
        .map(|p| p.line())
        .unwrap_or(data_row + 1)
}

/// Trimmed value of `column`, or `MissingColumn`.
pub fn field<'r>(record: &'r StringRecord, column: usize, file: &str, line: u64) -> Result<&'r str> {
    record
        .get(column)
        .map(str::trim)
        .ok_or_else(|| ConvertError::MissingColumn {
            file: file.to_string(),
            line,
            column,
        })
}

pub fn csv_error(file: &str, source: csv::Error) -> ConvertError {
    ConvertError::Csv {
        file: file.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn skips_header_and_keeps_quoted_commas() {
        let data = "a,b,c\n1,\"x, y\",\"[1.0, 2.0]\"\n2,z\n";
        let mut rdr = csv_reader(Cursor::new(data));
        let rows: Vec<StringRecord> = rdr.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(field(&rows[0], 2, "t.csv", 2).unwrap(), "[1.0, 2.0]");
        assert_eq!(line_of(&rows[1], 2), 3);
        let err = field(&rows[1], 2, "t.csv", 3).unwrap_err();
        assert!(matches!(err, ConvertError::MissingColumn { column: 2, line: 3, .. }));
    }

    #[test]
    fn source_name_prefers_file_name() {
        assert_eq!(source_name(Path::new("/tmp/x/activities.csv")), "activities.csv");
    }
}
