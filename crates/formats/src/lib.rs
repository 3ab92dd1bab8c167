//! Tabular file formats for dataset cleaning
//!
//! This crate provides the in-memory table model along with CSV readers
//! (with text-encoding fallback and transparent gzip) and writers.

pub mod csv_reader;
pub mod csv_writer;
pub mod encoding;
pub mod error;
pub mod reader;
pub mod table;

pub use encoding::TextEncoding;
pub use error::{Error, Result};
pub use reader::{
    dataset_key, list_tabular_files, load_directory, load_file, LoadOutcome, LoaderConfig, SkippedFile,
};
pub use table::{Cell, ColumnType, Dataset, Table};
