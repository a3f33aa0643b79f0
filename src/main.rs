use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};

use market_dash::app::bootstrap;
use market_dash::cli::{Cli, Commands};
use market_dash::config::{load_config, validate_config, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::builtin(),
    };
    cli.apply_overrides(&mut config);
    validate_config(&config)?;

    match &cli.command {
        Some(Commands::Show { symbol }) => {
            let symbol = market_dash::utils::normalize_symbol(symbol)
                .context("symbol must not be empty")?;
            bootstrap::show(config, &symbol).await?;
        }
        None => bootstrap::run(config).await?,
    }

    Ok(())
}

// The dashboard owns the terminal, so logs either go to a file or nowhere.
fn init_logging(cli: &Cli) -> Result<()> {
    let default_filter = match (&cli.command, &cli.log_file) {
        (Some(_), _) => "warn",
        (None, Some(_)) => "info",
        (None, None) => "off",
    };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));

    if let Some(path) = &cli.log_file {
        builder.target(Target::Pipe(Box::new(open_log_file(path)?)));
    }
    builder.init();
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("failed to create log file {}", path.display()))
}
