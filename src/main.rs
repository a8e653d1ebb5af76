use clap::Parser;
use expense_config::api::ApiServer;
use expense_config::cli::{Cli, Commands, ConfigAction};
use expense_config::config::{validate_settings, Settings};
use expense_config::logging;
use expense_config::resolver::ConfigResolver;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(opts) => {
            info!("Starting expense-config server");
            let resolver = Arc::new(ConfigResolver::new(Settings::from_env()?));
            let server = ApiServer::start(resolver, opts).await?;
            server.run_until_shutdown().await?;
        }
        Commands::Config(opts) => {
            let settings = Settings::from_env()?;
            match opts.action {
                ConfigAction::Show => {
                    let resolver = ConfigResolver::new(settings);
                    let snapshot = resolver.initialize().await;
                    println!("{}", serde_json::to_string_pretty(&snapshot.redacted())?);
                }
                ConfigAction::Validate => {
                    let errors = validate_settings(&settings);
                    if errors.is_empty() {
                        info!("Configuration is valid");
                    } else {
                        for e in &errors {
                            error!("{}", e);
                        }
                        anyhow::bail!("{} configuration error(s)", errors.len());
                    }
                }
            }
        }
        Commands::Health => {
            let resolver = ConfigResolver::new(Settings::from_env()?);
            resolver.initialize().await;
            let health = resolver.health_check().await;
            println!("{}", serde_json::to_string_pretty(&health)?);
            if !health.is_healthy() {
                anyhow::bail!("secret backend {} is unhealthy", health.backend_label);
            }
        }
        Commands::Version => {
            println!("expense-config {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
