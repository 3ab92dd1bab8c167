//! Configuration file support for filter runs

use anyhow::{bail, Context, Result};
use housefilter_core::{PipelineOptions, ReportFiles};
use housefilter_filters::{DatasetKind, KindAssignments, PolicySettings};
use housefilter_formats::LoaderConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete tool configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input: LoaderConfig,
    pub output: ReportFiles,
    pub datasets: KindAssignments,
    pub processing: ProcessingConfig,
    pub policies: PolicySettings,
}

/// Execution settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Filter datasets concurrently
    pub parallel: bool,
    /// Number of threads (None = auto-detect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,
}

/// Command-line settings that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub kinds: Vec<(String, DatasetKind)>,
    pub infer_kinds: bool,
    pub parallel: bool,
    pub num_threads: Option<usize>,
}

impl AppConfig {
    /// Load configuration from a file (YAML or TOML)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let config: Self = match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            _ => bail!(
                "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                extension
            ),
        };

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to a file
    #[cfg(test)]
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let content = match extension {
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            "toml" => toml::to_string_pretty(self)?,
            _ => bail!(
                "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                extension
            ),
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.policies.validate()?;
        if self.processing.num_threads == Some(0) {
            bail!("processing.num_threads must be at least 1");
        }
        if self.input.extensions.is_empty() {
            bail!("input.extensions must name at least one extension");
        }
        if self.input.encodings.is_empty() {
            bail!("input.encodings must name at least one encoding");
        }
        Ok(())
    }

    /// Fold command-line overrides into the file settings.
    pub fn apply(mut self, overrides: Overrides) -> Result<Self> {
        for (name, kind) in overrides.kinds {
            self.datasets.kinds.insert(name, kind);
        }
        self.datasets.infer_kinds |= overrides.infer_kinds;
        self.processing.parallel |= overrides.parallel;
        if overrides.num_threads.is_some() {
            self.processing.num_threads = overrides.num_threads;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn pipeline_options(&self, dry_run: bool) -> PipelineOptions {
        PipelineOptions {
            loader: self.input.clone(),
            kinds: self.datasets.clone(),
            parallel: self.processing.parallel,
            num_threads: self.processing.num_threads,
            dry_run,
            report_files: self.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use housefilter_filters::NumericRange;
    use housefilter_formats::TextEncoding;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> AppConfig {
        let mut config = AppConfig::default();
        config
            .datasets
            .kinds
            .insert("Housing.csv".to_string(), DatasetKind::CountySales);
        config.processing.num_threads = Some(4);
        config.policies.numeric_index.value = NumericRange::inclusive(0.0, 500.0);
        config
    }

    #[test]
    fn test_save_and_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("housefilter.yaml");

        sample().save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_save_and_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("housefilter.toml");

        sample().save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_partial_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(
            &path,
            r#"
[input]
encodings = ["utf-8", "cp1252"]

[datasets]
infer_kinds = true

[datasets.kinds]
"Real_Year.csv" = "index-by-year"

[policies.county_sales.price]
min = 1000.0
max = 2000000.0
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.input.encodings, vec![TextEncoding::Utf8, TextEncoding::Cp1252]);
        assert_eq!(config.input.extensions, LoaderConfig::default().extensions);
        assert!(config.datasets.infer_kinds);
        assert_eq!(config.datasets.kinds["Real_Year.csv"], DatasetKind::IndexByYear);
        assert_eq!(config.policies.county_sales.price.max, 2_000_000.0);
        assert_eq!(config.output, ReportFiles::default());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "datasets:\n  kinds:\n    a.csv: sales\n").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "policies:\n  numeric_index:\n    value: {min: 10, max: 1}\n").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_unsupported_format() {
        let dir = TempDir::new().unwrap();
        assert!(sample().save(&dir.path().join("config.json")).is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = sample()
            .apply(Overrides {
                kinds: vec![("Housing.csv".to_string(), DatasetKind::Generic)],
                infer_kinds: true,
                parallel: true,
                num_threads: Some(2),
            })
            .unwrap();

        assert_eq!(config.datasets.kinds["Housing.csv"], DatasetKind::Generic);
        assert!(config.datasets.infer_kinds);

        let options = config.pipeline_options(true);
        assert!(options.parallel);
        assert!(options.dry_run);
        assert_eq!(options.num_threads, Some(2));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let result = AppConfig::default().apply(Overrides {
            num_threads: Some(0),
            ..Overrides::default()
        });
        assert!(result.is_err());
    }
}
