//! Collection import from JSON, JSON Lines and CSV exports

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::db::{Database, InsertStats};
use crate::error::{Error, Result};
use crate::models::Collection;

/// CSV columns that are integral in every schema generation. Other cells
/// stay text and are coerced by the normalizer when read.
const INTEGER_FIELDS: &[&str] = &[
    "lsTerm",
    "year",
    "month",
    "completionYear",
    "completionMonth",
    "recommendationYear",
    "recommendationMonth",
    "completedWorksCount",
    "recommendedWorksCount",
    "beneficiaries",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    JsonLines,
    Csv,
}

impl ImportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            "csv" => Ok(Self::Csv),
            _ => Err(Error::InvalidData(format!(
                "Unsupported import file {} (expected .json, .jsonl, .ndjson or .csv)",
                path.display()
            ))),
        }
    }
}

/// Read every document from a file, choosing the format by extension
pub fn read_documents(path: &Path) -> Result<Vec<Value>> {
    let format = ImportFormat::from_path(path)?;
    let file = File::open(path)?;
    let docs = parse_documents(BufReader::new(file), format)?;
    debug!(path = %path.display(), count = docs.len(), "Read documents");
    Ok(docs)
}

pub fn parse_documents<R: BufRead>(reader: R, format: ImportFormat) -> Result<Vec<Value>> {
    match format {
        ImportFormat::Json => parse_json(reader),
        ImportFormat::JsonLines => parse_json_lines(reader),
        ImportFormat::Csv => parse_csv(reader),
    }
}

fn parse_json<R: Read>(reader: R) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_reader(reader)?;
    match value {
        Value::Array(items) => Ok(items),
        obj @ Value::Object(_) => Ok(vec![obj]),
        _ => Err(Error::InvalidData(
            "JSON import must be an array of documents or a single document".into(),
        )),
    }
}

fn parse_json_lines<R: BufRead>(reader: R) -> Result<Vec<Value>> {
    let mut docs = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let doc = serde_json::from_str(line)
            .map_err(|e| Error::InvalidData(format!("Line {}: {}", i + 1, e)))?;
        docs.push(doc);
    }
    Ok(docs)
}

fn parse_csv<R: Read>(reader: R) -> Result<Vec<Value>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut docs = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut map = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if header.is_empty() || cell.is_empty() {
                continue;
            }
            map.insert(header.to_string(), cell_value(header, cell));
        }
        if !map.is_empty() {
            docs.push(Value::Object(map));
        }
    }
    Ok(docs)
}

fn cell_value(header: &str, cell: &str) -> Value {
    if INTEGER_FIELDS.contains(&header) {
        if let Ok(n) = cell.parse::<i64>() {
            return Value::from(n);
        }
    }
    Value::String(cell.to_string())
}

/// Read a file and insert its documents into `collection`
pub fn import_file(db: &Database, collection: Collection, path: &Path) -> Result<InsertStats> {
    let docs = read_documents(path)?;
    let stats = db.insert_documents(collection, &docs)?;
    info!(
        collection = %collection,
        file = %path.display(),
        inserted = stats.inserted,
        duplicates = stats.duplicates,
        "Import complete"
    );
    Ok(stats)
}
