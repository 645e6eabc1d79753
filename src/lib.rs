pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HorizonsClient;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{etl::EtlEngine, pipeline::OrbitPipeline};
pub use domain::model::{BodyRecord, BodyTrajectory, Position, RefPlane};
pub use utils::error::{OrbitError, Result};
