use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "order-check")]
#[command(about = "Validate an order form and preview the payment card")]
pub struct CliConfig {
    /// Path to the form state (JSON)
    #[arg(short, long)]
    pub form: String,

    /// Path to TOML configuration file (built-in catalog when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Submit the order through the simulated gateway when it is valid
    #[arg(long)]
    pub submit: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("form", &self.form)?;
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        Ok(())
    }
}
