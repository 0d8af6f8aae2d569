use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::{ConfigArgs, RunArgs};
use crate::error::{Error, Result};
use crate::retention::RetentionLimits;

const LOCAL_CONFIG: &str = "rhythm.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub storage: StorageConfig,
}

/// Where the stats generator writes its per-file documents.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub output: PathBuf,
    /// Extension of the metrics documents, without the dot.
    pub extension: String,
    /// Path segment every output path has to contain.
    pub project_dir: String,
    /// Replaces `output` when deriving source paths.
    pub source: PathBuf,
    pub source_extension: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            output: PathBuf::from("build/stats"),
            extension: String::from("json"),
            project_dir: String::from("eVolution 3.0"),
            source: PathBuf::from("src"),
            source_extension: String::from("css"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub overview: PathBuf,
    pub history: PathBuf,
    pub limits: RetentionLimits,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            overview: PathBuf::from("stats/overview"),
            history: PathBuf::from("stats/history"),
            limits: RetentionLimits::default(),
        }
    }
}

impl Config {
    pub fn from_run_args(args: &RunArgs) -> Result<Self> {
        let mut config = Config::from_config_args(&args.config)?;

        if let Some(output) = &args.output {
            config.generator.output = output.clone();
        }
        if let Some(extension) = &args.extension {
            config.generator.extension = extension_without_dot(extension);
        }

        Ok(config)
    }

    pub fn from_config_args(args: &ConfigArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Config::read(path),
            None => Config::discover(),
        }
    }

    /// `./rhythm.toml`, then the platform config dir, then built-in defaults.
    pub fn discover() -> Result<Self> {
        let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG)).chain(user_config_path());

        for candidate in candidates {
            match fs::read_to_string(&candidate) {
                Ok(text) => return Config::parse(&text, &candidate),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(Error::io(format!("failed to read {}", candidate.display()), e))
                }
            }
        }

        Ok(Config::default())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;
        Config::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.generator.extension = extension_without_dot(&config.generator.extension);
        Ok(config)
    }

    pub fn overview_document(&self) -> PathBuf {
        self.storage.overview.join(crate::store::DOCUMENT_NAME)
    }

    pub fn history_document(&self) -> PathBuf {
        self.storage.history.join(crate::store::DOCUMENT_NAME)
    }
}

fn extension_without_dot(extension: &str) -> String {
    extension.trim_start_matches('.').to_string()
}

/// ~/.config/rhythm/config.toml or platform equivalent
fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "rhythm")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
