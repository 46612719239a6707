pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::app::pipelines::{read_unique_gstins, GstinPipeline};
pub use crate::config::{cli::LocalStorage, GstinConfig};
pub use crate::core::etl::{EtlEngine, RunReport};
pub use crate::core::lookup::GstinCheckClient;
pub use crate::domain::model::{Credential, LookupOutcome, LookupResult, ResultSet};
pub use crate::utils::error::{EtlError, Result};
