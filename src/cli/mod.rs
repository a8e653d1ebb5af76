use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "expense-config",
    version,
    about = "Configuration and secret resolution for the expense tracker API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve configuration and serve the health and admin endpoints.
    Serve(ServeOpts),
    /// Inspect or validate configuration.
    Config(ConfigOpts),
    /// Resolve configuration and print backend health as JSON.
    Health,
    Version,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ServeOpts {
    /// Overrides PORT.
    #[arg(short, long)]
    pub port: Option<u16>,
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: String,
}

impl Default for ServeOpts {
    fn default() -> Self {
        Self {
            port: None,
            bind: "0.0.0.0".to_string(),
        }
    }
}

#[derive(clap::Args)]
pub struct ConfigOpts {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the resolved snapshot with secrets redacted.
    Show,
    /// Check environment settings without contacting the backend.
    Validate,
}
