use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::sql_engine::statements::SplitMode;

/// Environment variable overriding the configured project identifier
pub const PROJECT_ID_ENV: &str = "PROJECT_ID";

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "pipeline.yaml";

/// Pipeline configuration, read from `pipeline.yaml` when present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Warehouse project that both bills the jobs and fills `{{ project_id }}`
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// BigQuery job location (US, EU, ...); left to the service when unset
    #[serde(default)]
    pub location: Option<String>,

    /// Transformation scripts, run in this exact order
    #[serde(default = "default_transformations")]
    pub transformations: Vec<PathBuf>,

    /// Semicolon-delimited data-quality checks
    #[serde(default = "default_dq_file")]
    pub dq_file: PathBuf,

    /// How the DQ file is cut into statements
    #[serde(default)]
    pub statement_splitting: SplitMode,
}

fn default_project_id() -> String {
    "pocs19".to_string()
}

fn default_transformations() -> Vec<PathBuf> {
    [
        "sql/bronze/load_fees_raw.sql",
        "sql/silver/load_fees_clean.sql",
        "sql/gold/load_client_ltv.sql",
        "sql/gold/load_adviser_ltv.sql",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

fn default_dq_file() -> PathBuf {
    PathBuf::from("sql/dq/data_quality_checks.sql")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            location: None,
            transformations: default_transformations(),
            dq_file: default_dq_file(),
            statement_splitting: SplitMode::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document; missing keys fall back to defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Resolve paths relative to `base` unless they are already absolute
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |path: &PathBuf| {
            if path.is_absolute() {
                path.clone()
            } else {
                base.join(path)
            }
        };
        self.transformations = self.transformations.iter().map(resolve).collect();
        self.dq_file = resolve(&self.dq_file);
        self
    }

    /// Apply the project override; the flag wins over the environment
    pub fn with_project_override(mut self, flag: Option<String>, env: Option<String>) -> Self {
        if let Some(project_id) = flag.or(env).filter(|id| !id.trim().is_empty()) {
            self.project_id = project_id;
        }
        self
    }
}

/// Reads the configuration file from the specified path, or `pipeline.yaml`
/// in the current directory when it exists. Script paths in the file are
/// relative to the file's own directory; built-in defaults are relative to
/// the working directory.
pub fn read_config(config_path: Option<&Path>) -> Result<PipelineConfig> {
    let config_path = match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(PipelineError::Config(format!(
                    "Configuration file not found at: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default_path.exists() {
                tracing::info!("no {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                return Ok(PipelineConfig::default());
            }
            default_path
        }
    };

    let config_str =
        std::fs::read_to_string(&config_path).map_err(|e| PipelineError::io(&config_path, e))?;
    let base = config_path.parent().unwrap_or_else(|| Path::new(""));
    let config = PipelineConfig::from_yaml(&config_str)?.relative_to(base);
    tracing::info!(path = %config_path.display(), "loaded pipeline configuration");

    Ok(config)
}

/// Full resolution used by the CLI: file, then `PROJECT_ID`, then `--project`
pub fn resolve_config(
    config_path: Option<&Path>,
    project_flag: Option<String>,
) -> Result<PipelineConfig> {
    let config = read_config(config_path)?
        .with_project_override(project_flag, std::env::var(PROJECT_ID_ENV).ok());
    tracing::info!(project_id = %config.project_id, "resolved project");
    Ok(config)
}
