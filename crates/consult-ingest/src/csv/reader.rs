//! CSV parsing of decoded source text.

use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;

use consult_model::TableSchema;

use crate::compression::read_decompressed;
use crate::error::{IngestError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decodes single-byte Latin-1 text.
///
/// A leading UTF-8 byte order mark is dropped so it cannot leak into the
/// first column name.
pub fn decode_latin1(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Parses comma-separated text with a header row into a DataFrame.
///
/// Every column is read as text; typing happens later in the pipeline so that
/// identifier values keep their exact spelling.
pub fn parse_csv_text(text: String, path: &Path) -> Result<DataFrame> {
    let parse_err = |e: PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if text.trim().is_empty() {
        return Err(IngestError::CsvParse {
            path: path.to_path_buf(),
            message: "empty input".to_string(),
        });
    }

    check_field_counts(&text, path)?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
        .finish()
        .map_err(parse_err)
}

/// Rejects any record whose field count differs from the header's.
fn check_field_counts(text: &str, path: &Path) -> Result<()> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    for record in reader.byte_records() {
        record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}

/// Reads one source table and checks its required columns.
pub fn read_source_table(path: &Path, schema: &TableSchema) -> Result<DataFrame> {
    let bytes = read_decompressed(path)?;
    let text = decode_latin1(&bytes);
    let df = parse_csv_text(text, path)?;

    schema
        .check_columns(df.get_column_names().into_iter().map(PlSmallStr::as_str))
        .map_err(|source| IngestError::Schema {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(df)
}
