use std::path::PathBuf;

use clap::Parser;
use dotenvy::dotenv;
use miette::miette;
use tracing::{info, warn};
use weft_server::{Config, telemetry};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "WEFT_CONFIG",
        default_value = "weft.toml"
    )]
    config: PathBuf,

    /// Override `listen_addr` from the config file.
    #[arg(long, value_name = "ADDR", env = "WEFT_LISTEN_ADDR")]
    listen_addr: Option<String>,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let config = initialize()?;
    weft_server::serve(config).await?;
    Ok(())
}

pub fn initialize() -> miette::Result<Config> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .map_err(|e| miette!("Failed to set miette hook: {}", e))?;
    miette::set_panic_hook();
    dotenv().ok();
    telemetry::setup_tracing();

    let cli = Cli::parse();
    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        warn!(path = %cli.config.display(), "config file not found, using defaults");
        Config::default()
    };
    if let Some(addr) = cli.listen_addr {
        config.listen_addr = addr;
    }
    config.validate()?;
    info!(?config, "configuration loaded");
    Ok(config)
}
