use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use convo::api::ApiVariant;
use convo::core::config::{ConvoConfig, load_config, resolve};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "convo", about = "Terminal client for a remote chat conversation API")]
struct Args {
    /// Server base URL (overrides config and CONVO_BASE_URL)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Route layout the server speaks
    #[arg(short, long, value_enum)]
    variant: Option<ApiVariant>,

    /// Config file to read instead of ~/.convo/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to convo.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("convo.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Failed to load config, using defaults: {}", e);
            ConvoConfig::default()
        }
    };
    let config = resolve(&file_config, args.base_url.as_deref(), args.variant);

    log::info!("Convo starting up against {}", config.base_url);

    convo::tui::run(config)
}
