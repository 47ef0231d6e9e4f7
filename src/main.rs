use clap::Parser;
use tracing::{error, info};
use zia::cli::{self, Cli, Commands};
use zia::config::AppConfig;
use zia::domain::ModelKind;
use zia::error::Result;
use zia::pipeline::{render_error, report_once, Predictor};

mod main_runtime;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    let log_guard = main_runtime::init_logging(&config.logging);

    let failed = match &cli.command {
        Commands::Regress { features } => {
            run_once(&config, ModelKind::Regression, features, cli.json).await?
        }
        Commands::Classify { features } => {
            run_once(&config, ModelKind::Classification, features, cli.json).await?
        }
        Commands::Shell => {
            match main_runtime::build_engine().and_then(|engine| Predictor::new(&config, engine)) {
                Ok(predictor) => {
                    info!(?predictor, "starting shell");
                    cli::shell::run(&predictor, cli.json).await?;
                    false
                }
                Err(e) => {
                    error!(error = %e, details = ?e, "could not start shell");
                    println!("{}", render_error(&e));
                    true
                }
            }
        }
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            false
        }
    };

    // Flush the file appender before a non-zero exit skips destructors.
    drop(log_guard);
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// One invocation. Prints the region text and returns whether it was an error.
async fn run_once(config: &AppConfig, kind: ModelKind, features: &str, json: bool) -> Result<bool> {
    let report = report_once(config, main_runtime::build_engine(), kind, features).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.text);
    }

    Ok(report.is_error())
}
