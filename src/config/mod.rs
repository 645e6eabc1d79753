pub mod cli;
pub mod toml_config;

use crate::adapters::horizons::{DEFAULT_CENTER, DEFAULT_ENDPOINT, DEFAULT_STEPS};
use crate::core::ConfigProvider;
use crate::domain::model::RefPlane;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::time::Duration;

pub const DEFAULT_INPUT_PATH: &str = "asteroids_test.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "asteroid_positions.json";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, clap::Parser)]
#[command(name = "pull-orbits")]
#[command(about = "Fetch heliocentric position vectors of small bodies over one orbital period")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    pub input_path: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn center(&self) -> &str {
        DEFAULT_CENTER
    }

    fn ref_plane(&self) -> RefPlane {
        RefPlane::Earth
    }

    fn step_count(&self) -> u32 {
        DEFAULT_STEPS
    }

    fn timeout(&self) -> Option<Duration> {
        None
    }
}

/// Checks shared by every configuration source.
pub(crate) fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validation::validate_url("api_endpoint", config.api_endpoint())?;
    validation::validate_path("input_path", config.input_path())?;
    validation::validate_file_extension("input_path", config.input_path(), &["csv"])?;
    validation::validate_path("output_path", config.output_path())?;
    validation::validate_file_extension("output_path", config.output_path(), &["json"])?;
    validation::validate_non_empty_string("center", config.center())?;
    validation::validate_range("steps", config.step_count(), 1, 90_000)?;
    Ok(())
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
