pub mod cli;
pub mod toml_config;

pub use toml_config::GstinConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Clone, Parser)]
#[command(name = "gstin-check")]
#[command(about = "Validate GSTINs in bulk and export an enriched Excel report")]
pub struct CliConfig {
    /// Spreadsheet with a `GSTIN` column (.xlsx, .xls, .xlsm, .ods or .csv)
    #[arg(short, long)]
    pub input: Option<String>,

    /// GSTIN Check API key
    #[arg(long, env = "GSTIN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub api_endpoint: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Number of result rows printed after the run
    #[arg(long, default_value = "10")]
    pub preview_rows: usize,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    /// Read the input and count GSTINs without calling the API
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入 TOML 配置 (若有) 並套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<GstinConfig> {
        let mut config = match &self.config {
            Some(path) => GstinConfig::from_file(path)?,
            None => GstinConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input.path = Some(input.clone());
        }
        if let Some(api_key) = &self.api_key {
            config.source.api_key = Some(api_key.clone());
        }
        if let Some(endpoint) = &self.api_endpoint {
            config.source.endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.source.timeout_seconds = Some(timeout);
        }
        if let Some(output_path) = &self.output_path {
            config.load.output_path = output_path.clone();
        }
        if self.monitor {
            config.monitoring = Some(toml_config::MonitoringConfig { enabled: true });
        }

        Ok(config)
    }
}
