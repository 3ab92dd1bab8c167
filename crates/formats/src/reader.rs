//! Directory loader
//!
//! Finds every tabular file in a directory, decodes it with the configured
//! encoding priority and parses it into a [`Dataset`]. A file that cannot be
//! read is logged and skipped; the load as a whole only fails when the
//! directory itself is missing.

use crate::csv_reader::{read_table, CsvConfig};
use crate::encoding::TextEncoding;
use crate::{Dataset, Error, Result};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Recognized file extensions, matched case-insensitively on the file name
    pub extensions: Vec<String>,
    /// Encodings to try, in priority order
    pub encodings: Vec<TextEncoding>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: vec![
                "csv".to_string(),
                "tsv".to_string(),
                "csv.gz".to_string(),
                "tsv.gz".to_string(),
            ],
            encodings: TextEncoding::default_priority(),
        }
    }
}

impl LoaderConfig {
    /// Whether `filename` carries one of the recognized extensions.
    pub fn is_recognized(&self, filename: &str) -> bool {
        let lower = filename.to_ascii_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext.to_ascii_lowercase())))
    }
}

/// A file the loader could not turn into a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Result of loading a directory
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    /// Datasets keyed by their derived key
    pub datasets: BTreeMap<String, Dataset>,
    pub skipped: Vec<SkippedFile>,
}

/// Derive the dataset key from a file name.
///
/// `"House Prices.csv"` becomes `"house_prices"`.
pub fn dataset_key(filename: &str) -> String {
    filename.replace(".csv", "").replace(' ', "_").to_lowercase()
}

fn is_gzip(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".gz")
}

/// Delimiter implied by the file name: tab for `.tsv`, comma otherwise.
pub fn delimiter_for(filename: &str) -> u8 {
    let lower = filename.to_ascii_lowercase();
    let stem = lower.strip_suffix(".gz").unwrap_or(&lower);
    if stem.ends_with(".tsv") {
        b'\t'
    } else {
        b','
    }
}

fn read_bytes(path: &Path, filename: &str) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    if is_gzip(filename) {
        debug!("Opening gzip-compressed file: {:?}", path);
        GzDecoder::new(file).read_to_end(&mut bytes)?;
    } else {
        debug!("Opening plain file: {:?}", path);
        file.read_to_end(&mut bytes)?;
    }
    Ok(bytes)
}

/// Load a single tabular file.
pub fn load_file<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<Dataset> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidFile(format!("{:?} has no usable file name", path)))?
        .to_string();

    if !config.is_recognized(&filename) {
        return Err(Error::UnsupportedFormat(filename));
    }

    let bytes = read_bytes(path, &filename)?;
    let csv_config = CsvConfig::default()
        .with_delimiter(delimiter_for(&filename))
        .with_encodings(config.encodings.clone());
    let (table, encoding) = read_table(&bytes, &csv_config)?;

    info!(
        "Loaded {} ({}) - Shape: {} rows x {} columns",
        filename,
        encoding,
        table.height(),
        table.width()
    );

    Ok(Dataset::new(dataset_key(&filename), filename, table))
}

/// Recognized tabular files directly inside `dir`, in name order.
pub fn list_tabular_files<P: AsRef<Path>>(dir: P, config: &LoaderConfig) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::MissingDirectory(dir.display().to_string()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            let recognized = config.is_recognized(&name);
            if !recognized {
                debug!("Ignoring non-tabular file {}", name);
            }
            recognized
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Load every recognized file in `dir`.
///
/// Files are visited in name order so that key collisions resolve the same
/// way on every run: the later file replaces the earlier one.
pub fn load_directory<P: AsRef<Path>>(dir: P, config: &LoaderConfig) -> Result<LoadOutcome> {
    let dir = dir.as_ref();
    let paths = list_tabular_files(dir, config)?;
    info!("Loading {} files from {:?}", paths.len(), dir);

    let mut outcome = LoadOutcome::default();

    for path in paths {
        match load_file(&path, config) {
            Ok(dataset) => {
                if let Some(previous) = outcome.datasets.insert(dataset.key.clone(), dataset) {
                    warn!(
                        "Dataset key '{}' from {} was replaced by a later file",
                        previous.key, previous.filename
                    );
                }
            }
            Err(e) => {
                let filename = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
                warn!("Could not load {}: {}", filename, e);
                outcome.skipped.push(SkippedFile {
                    filename,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Successfully loaded {} datasets ({} skipped)",
        outcome.datasets.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}
