use adclone::cli::{commands, Cli, Commands};
use adclone::config::Config;
use anyhow::Result;
use clap::Parser;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to file so CLI output stays clean
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("adclone.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting adclone");

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Clone { campaign, to } => {
            commands::clone_command(&config, &campaign, &to).await?;
        }
        Commands::Export { campaign, output } => {
            commands::export_command(&config, &campaign, &output).await?;
        }
        Commands::Import { file, to } => {
            commands::import_command(&config, &file, &to).await?;
        }
        Commands::Accounts => {
            commands::accounts_command(&config).await?;
        }
    }

    Ok(())
}
