use crate::core::ConfigProvider;
use crate::core::solver::DEFAULT_BATCH_SIZE;
use crate::utils::error::{BalanceError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, validate_positive_number,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub input: InputConfig,
    pub redistribution: Option<RedistributionConfig>,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub grouped_ports: String,
    pub port_names: String,
    pub impacts: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedistributionConfig {
    pub batch_size: Option<usize>,
    pub cost_seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BalanceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BalanceError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Substitute environment variables of the form `${VAR_NAME}`.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        validate_path("input.grouped_ports", &self.input.grouped_ports)?;
        validate_path("input.port_names", &self.input.port_names)?;
        validate_path("output.file", &self.output.file)?;
        validate_file_extensions(
            "input",
            &[
                self.input.grouped_ports.as_str(),
                self.input.port_names.as_str(),
                self.output.file.as_str(),
            ],
            &["csv"],
        )?;

        if let Some(impacts) = self.impacts_path() {
            validate_path("input.impacts", impacts)?;
            validate_file_extensions("input.impacts", &[impacts], &["json"])?;
        }

        validate_positive_number("redistribution.batch_size", self.batch_size(), 1)?;

        Ok(())
    }

    pub fn impacts_path(&self) -> Option<&str> {
        self.input.impacts.as_deref()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn grouped_ports_path(&self) -> &str {
        &self.input.grouped_ports
    }

    fn port_names_path(&self) -> &str {
        &self.input.port_names
    }

    fn output_file(&self) -> &str {
        &self.output.file
    }

    fn batch_size(&self) -> usize {
        self.redistribution
            .as_ref()
            .and_then(|r| r.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE)
    }

    fn cost_seed(&self) -> Option<u64> {
        self.redistribution.as_ref().and_then(|r| r.cost_seed)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
