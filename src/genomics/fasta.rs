use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::ToolError;

/// A single FASTA entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Identifier: header text up to the first whitespace.
    pub id: String,
    /// Remaining header text.
    pub description: String,
    /// Concatenated sequence lines, uppercased.
    pub sequence: String,
}

/// Load all records from a FASTA file.
pub fn read_fasta(path: &Path) -> Result<Vec<FastaRecord>, ToolError> {
    crate::require_input(path)?;
    let reader = BufReader::new(File::open(path)?);
    parse_fasta(reader)
}

/// Parse FASTA records from any buffered reader.
///
/// Sequence lines before the first header are collected into a record with
/// an empty identifier, so raw sequence files load as a single entry.
pub fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<FastaRecord>, ToolError> {
    let mut records = Vec::new();
    let mut current: Option<FastaRecord> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            if let Some(done) = current.take() {
                records.push(done);
            }
            let (id, description) = match header.split_once(char::is_whitespace) {
                Some((id, rest)) => (id.to_string(), rest.trim().to_string()),
                None => (header.to_string(), String::new()),
            };
            current = Some(FastaRecord {
                id,
                description,
                sequence: String::new(),
            });
        } else {
            current
                .get_or_insert_with(|| FastaRecord {
                    id: String::new(),
                    description: String::new(),
                    sequence: String::new(),
                })
                .sequence
                .push_str(&line.to_ascii_uppercase());
        }
    }

    if let Some(done) = current {
        records.push(done);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiline_records() {
        let input = ">sp|P1|A first protein\nmkwv\nTFIS\n\n>P2\nLLLL\n";
        let records = parse_fasta(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "sp|P1|A");
        assert_eq!(records[0].description, "first protein");
        assert_eq!(records[0].sequence, "MKWVTFIS");
        assert_eq!(records[1].id, "P2");
        assert_eq!(records[1].sequence, "LLLL");
    }

    #[test]
    fn headerless_sequence_is_one_record() {
        let records = parse_fasta("acgt\nACGT\n".as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, "ACGTACGT");
    }

    #[test]
    fn missing_file_is_missing_input() {
        let err = read_fasta(Path::new("/nonexistent/proteins.fasta")).unwrap_err();
        assert!(matches!(err, ToolError::MissingInput(_)));
    }
}
