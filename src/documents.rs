use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read '{source_name}': {source}")]
    Read {
        source_name: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid JSON in '{source_name}' at line {line}: {source}")]
    Json {
        source_name: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// One input document and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// File path, or `-` for stdin
    pub source: String,
    /// Position within its source, starting at 0
    pub index: usize,
    pub value: Value,
}

/// Split input text into documents.
///
/// A top-level JSON array yields one document per element, any other single
/// JSON value yields itself, and everything else is read as newline-delimited
/// JSON with blank lines skipped.
pub fn parse_documents(source: &str, text: &str) -> Result<Vec<Document>, DocumentError> {
    let values = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(value) => vec![value],
        Err(_) => parse_lines(source, text)?,
    };

    Ok(values
        .into_iter()
        .enumerate()
        .map(|(index, value)| Document {
            source: source.to_string(),
            index,
            value,
        })
        .collect())
}

fn parse_lines(source: &str, text: &str) -> Result<Vec<Value>, DocumentError> {
    let mut values = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = serde_json::from_str(line).map_err(|err| DocumentError::Json {
            source_name: source.to_string(),
            line: idx + 1,
            source: err,
        })?;
        values.push(value);
    }
    Ok(values)
}

pub fn read_documents_file(path: &Path) -> Result<Vec<Document>, DocumentError> {
    let source = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|err| DocumentError::Read {
        source_name: source.clone(),
        source: err,
    })?;
    parse_documents(&source, &text)
}

pub fn read_documents_stdin() -> Result<Vec<Document>, DocumentError> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|err| DocumentError::Read {
            source_name: "-".to_string(),
            source: err,
        })?;
    parse_documents("-", &text)
}

/// Read every file in order, or stdin when no files are given.
/// A path of `-` also reads stdin.
pub fn read_documents<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Document>, DocumentError> {
    if paths.is_empty() {
        return read_documents_stdin();
    }

    let mut documents = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let mut batch = if path == Path::new("-") {
            read_documents_stdin()?
        } else {
            read_documents_file(path)?
        };
        documents.append(&mut batch);
    }
    Ok(documents)
}
