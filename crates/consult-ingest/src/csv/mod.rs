//! CSV reading utilities.

mod reader;

pub use reader::{decode_latin1, parse_csv_text, read_source_table};
