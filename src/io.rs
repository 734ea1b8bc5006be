//! File helpers shared by the CLI and the correction workflow.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::definition::{parse_definition_str, BallotDefinition};
use crate::error::AccuvoteError;

/// Reads a definition file, returning its source text alongside the parsed
/// definition so corrections can be spliced back into the original bytes.
pub fn read_definition(path: &Path) -> Result<(String, BallotDefinition), AccuvoteError> {
    let xml = fs::read_to_string(path)?;
    let definition = parse_definition_str(&xml).map_err(|issues| AccuvoteError::DefinitionParse {
        path: path.to_path_buf(),
        issues,
    })?;
    Ok((xml, definition))
}

/// Writes `value` as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AccuvoteError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, value).map_err(|source| AccuvoteError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `value` as pretty-printed JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), AccuvoteError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| AccuvoteError::JsonWrite {
        path: "<stdout>".into(),
        source,
    })?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_definition_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xml");
        fs::write(&path, "<AVSInterface>").unwrap();
        let err = read_definition(&path).unwrap_err();
        match err {
            AccuvoteError::DefinitionParse { path: reported, issues } => {
                assert_eq!(reported, path);
                assert!(!issues.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_json_pretty_prints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"a\": 1\n}");
    }
}
