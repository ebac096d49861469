pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::LocalStorage;
pub use config::toml_config::{ChartJob, TomlConfig};
pub use core::{etl::ChartEngine, pipeline::ChartPipeline};
pub use domain::model::{BoundsPolicy, ChartKind, OutputFormat};
pub use utils::error::{ChartError, Result};
