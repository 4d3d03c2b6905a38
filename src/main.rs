use clap::Parser;
use pos_rs::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (settings, environment) = cli::load_and_merge_config(&cli)?;
    cli::init_logger_from_settings(&settings)?;

    if let Err(e) = cli::execute_command(&cli, settings, environment).await {
        tracing::error!(error = %e, "pos-rs exited with an error");
        return Err(e.into());
    }

    Ok(())
}
