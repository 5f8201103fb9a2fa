//! Line-oriented text input
//!
//! Files are read one line at a time. Each line is trimmed and cut at the first comment character,
//! and the remaining non-empty lines are handed to a [LineRecord].
use crate::traits::LineRecord;
use crate::{Error, Result};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Settings for reading line-oriented files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineReader {
    /// Each of these characters starts a comment that runs to the end of the line
    pub comment: String,
}

impl Default for LineReader {
    fn default() -> Self {
        Self {
            comment: "#".to_string(),
        }
    }
}

impl LineReader {
    /// Create a reader with the given comment characters
    pub fn new(comment: &str) -> Self {
        Self {
            comment: comment.to_string(),
        }
    }

    // Trim and strip comments, or None if nothing is left.
    fn clean<'l>(&self, line: &'l str) -> Option<&'l str> {
        let line = line.trim();
        let line = match line.find(|c: char| self.comment.contains(c)) {
            Some(n) => &line[..n],
            None => line,
        };
        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }

    /// Add every line of `reader` to `record`
    ///
    /// `record` may have been modified when an error is returned.
    pub fn parse(&self, reader: impl BufRead, record: &mut impl LineRecord) -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            if let Some(line) = self.clean(&line) {
                record.add(line)?;
            }
        }
        Ok(())
    }

    /// Add every line of the file at `path` to `record`
    pub fn parse_file(&self, path: impl AsRef<Path>, record: &mut impl LineRecord) -> Result<()> {
        let path = path.as_ref();
        debug!("Reading {}", path.display());
        let file = File::open(path)?;
        self.parse(BufReader::new(file), record)
    }
}

/// Read a file with the default settings
pub fn read(path: impl AsRef<Path>, record: &mut impl LineRecord) -> Result<()> {
    LineReader::default().parse_file(path, record)
}

fn fields<'l>(line: &'l str, sep: &'l str) -> impl Iterator<Item = &'l str> {
    line.split(sep).filter(|f| !f.is_empty())
}

fn parse_field(field: &str) -> Result<f64> {
    field.parse::<f64>().map_err(|source| Error::Parse {
        field: field.to_string(),
        source,
    })
}

/// Parse exactly `out.len()` numbers from `line`
///
/// Fields are separated by `sep`; empty fields, as produced by repeated separators, are skipped.
pub fn parse_floats(line: &str, sep: &str, out: &mut [f64]) -> Result<()> {
    let mut found = 0;
    for field in fields(line, sep) {
        let value = parse_field(field)?;
        if let Some(slot) = out.get_mut(found) {
            *slot = value;
        }
        found += 1;
    }
    if found != out.len() {
        return Err(Error::FieldCount {
            expected: out.len(),
            found,
        });
    }
    Ok(())
}

/// Parse numbers from `line` into `out`
///
/// Without `grow` the number of fields must equal `out.len()`. With `grow`, `out` is extended to
/// hold extra fields, but there must still be at least `out.len()` of them.
pub fn parse_float_vec(line: &str, sep: &str, out: &mut Vec<f64>, grow: bool) -> Result<()> {
    let expected = out.len();
    let mut found = 0;
    for field in fields(line, sep) {
        let value = parse_field(field)?;
        if found < out.len() {
            out[found] = value;
        } else if grow {
            out.push(value);
        }
        found += 1;
    }
    if found != out.len() {
        return Err(Error::FieldCount { expected, found });
    }
    Ok(())
}

/// Counts lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCount(pub usize);

impl LineRecord for LineCount {
    fn add(&mut self, _line: &str) -> Result<()> {
        self.0 += 1;
        Ok(())
    }
}

/// Rows of whitespace separated numbers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Option<usize>,
    rows: Vec<Vec<f64>>,
}

impl Table {
    /// A table whose rows may have any length
    pub fn new() -> Self {
        Self::default()
    }

    /// A table whose rows must have `columns` entries
    pub fn with_columns(columns: usize) -> Self {
        Self {
            columns: Some(columns),
            rows: vec![],
        }
    }

    /// Rows
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A column, or an error if some row is too short
    pub fn column(&self, index: usize) -> Result<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| {
                row.get(index).copied().ok_or(Error::IndexOutOfBounds {
                    index,
                    size: row.len(),
                })
            })
            .collect()
    }
}

impl LineRecord for Table {
    fn add(&mut self, line: &str) -> Result<()> {
        let row = match self.columns {
            Some(n) => {
                let mut row = vec![0.0; n];
                parse_floats(line, " ", &mut row)?;
                row
            }
            None => {
                let mut row = vec![];
                parse_float_vec(line, " ", &mut row, true)?;
                row
            }
        };
        self.rows.push(row);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    const LINE: &str = " 1.234   7.9 -2.3 1.2e4  1.2e-4  ";
    const TRUTH: [f64; 5] = [1.234, 7.9, -2.3, 1.2e4, 1.2e-4];

    fn check(values: &[f64]) {
        assert_eq!(values.len(), TRUTH.len());
        for (v, t) in values.iter().zip(TRUTH) {
            assert_abs_diff_eq!(*v, t, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_parse_floats() {
        let mut out = [0.0; 5];
        parse_floats(LINE, " ", &mut out).unwrap();
        check(&out);

        let mut short = [0.0; 4];
        assert!(matches!(
            parse_floats(LINE, " ", &mut short),
            Err(Error::FieldCount {
                expected: 4,
                found: 5
            })
        ));
        assert!(matches!(
            parse_floats("1.0 x", " ", &mut [0.0; 2]),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_float_vec_grow() {
        let mut out = vec![];
        parse_float_vec(LINE, " ", &mut out, true).unwrap();
        check(&out);

        let mut out = vec![0.0; 2];
        parse_float_vec(LINE, " ", &mut out, true).unwrap();
        check(&out);
    }

    #[test]
    fn test_parse_float_vec_fixed() {
        let mut out = vec![0.0; 5];
        parse_float_vec(LINE, " ", &mut out, false).unwrap();
        check(&out);

        let mut out = vec![0.0; 6];
        assert!(parse_float_vec(LINE, " ", &mut out, false).is_err());
        let mut out = vec![0.0; 6];
        assert!(parse_float_vec(LINE, " ", &mut out, true).is_err());
    }

    #[test]
    fn test_other_separator() {
        let mut out = [0.0; 3];
        parse_floats("1,,2,3", ",", &mut out).unwrap();
        assert_eq!(out, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_reader() {
        let text = "# header\n  1 2 3 \n\n4 5 6 # trailing\n   # only comment\n7 8 9\n";
        let mut count = LineCount::default();
        LineReader::default()
            .parse(text.as_bytes(), &mut count)
            .unwrap();
        assert_eq!(count.0, 3);

        let mut table = Table::with_columns(3);
        LineReader::default()
            .parse(text.as_bytes(), &mut table)
            .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column(1).unwrap(), vec![2.0, 5.0, 8.0]);
        assert!(table.column(3).is_err());
    }

    #[test]
    fn test_comment_characters() {
        let text = "1 2 ! a\n% skipped\n3 4\n";
        let mut table = Table::new();
        LineReader::new("!%")
            .parse(text.as_bytes(), &mut table)
            .unwrap();
        assert_eq!(table.rows(), &[vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_reader_propagates_errors() {
        let mut table = Table::with_columns(2);
        assert!(LineReader::default()
            .parse("1 2\n1 2 3\n".as_bytes(), &mut table)
            .is_err());
        assert_eq!(table.len(), 1);
    }
}
