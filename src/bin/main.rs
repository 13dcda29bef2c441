use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movierec::commands::Command;
use movierec::config::Config;

#[derive(Parser, Debug)]
#[command(name = "movierec")]
#[command(about = "Search, rate and get recommendations from the movie catalog", long_about = None)]
struct Args {
    #[arg(short, long, env = "MOVIEREC_CONFIG")]
    config: Option<String>,
    /// Backend base URL, e.g. http://localhost:8000/api
    #[arg(long, env = "MOVIEREC_API_BASE_URL")]
    api: Option<String>,
    #[arg(short, long)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.debug { "movierec=debug" } else { "movierec=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match args.config {
        Some(ref path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Some(api) = args.api {
        config.api.base_url = api;
    }
    config.debug_logs = args.debug;

    if let Err(e) = movierec::run(config, args.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
