pub mod storage;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extensions, validate_path, validate_positive_number, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "port-balancer")]
#[command(about = "Redistributes cargo away from disrupted seaports")]
pub struct CliConfig {
    #[arg(long, default_value = "./public/grouped_ports.csv")]
    pub grouped_ports: String,

    #[arg(long, default_value = "./public/portnames.csv")]
    pub port_names: String,

    #[arg(long, default_value = "./public/result.csv")]
    pub output_file: String,

    #[arg(long, help = "JSON file of news impact signals to merge before solving")]
    pub impacts: Option<String>,

    #[arg(long, default_value = "10")]
    pub batch_size: usize,

    #[arg(long, help = "Seed for the stand-in random cost model")]
    pub cost_seed: Option<u64>,

    #[arg(long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn grouped_ports_path(&self) -> &str {
        &self.grouped_ports
    }

    fn port_names_path(&self) -> &str {
        &self.port_names
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn cost_seed(&self) -> Option<u64> {
        self.cost_seed
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("grouped_ports", &self.grouped_ports)?;
        validate_path("port_names", &self.port_names)?;
        validate_path("output_file", &self.output_file)?;
        validate_file_extensions(
            "input_files",
            &[
                self.grouped_ports.as_str(),
                self.port_names.as_str(),
                self.output_file.as_str(),
            ],
            &["csv"],
        )?;
        if let Some(impacts) = &self.impacts {
            validate_path("impacts", impacts)?;
            validate_file_extensions("impacts", &[impacts.as_str()], &["json"])?;
        }
        validate_positive_number("batch_size", self.batch_size, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig {
            grouped_ports: "./public/grouped_ports.csv".into(),
            port_names: "./public/portnames.csv".into(),
            output_file: "./public/result.csv".into(),
            impacts: None,
            batch_size: 10,
            cost_seed: None,
            config: None,
            verbose: false,
        }
    }

    #[test]
    fn default_config_validates() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = base_config();
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_csv_input_is_rejected() {
        let mut config = base_config();
        config.grouped_ports = "./ports.xlsx".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn impacts_must_be_json() {
        let mut config = base_config();
        config.impacts = Some("./impacts.csv".into());
        assert!(config.validate().is_err());

        config.impacts = Some("./impacts.json".into());
        assert!(config.validate().is_ok());
    }
}
