use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use simplebot::{BotBuilder, BotConfig, BotController, BotRegistry};

#[derive(Parser)]
#[command(name = "simple-bot")]
#[command(about = "Connect synthetic players to a game server")]
struct Cli {
    /// JSON config file (default: ~/.simplebot/config.json if present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    name: Option<String>,
    /// Number of bots; names get a numeric suffix when more than one
    #[arg(long, default_value_t = 1)]
    count: usize,
    /// Connect from the default address instead of the loopback pool
    #[arg(long)]
    no_bind: bool,
    #[arg(long, default_value_t = 5)]
    shutdown_timeout_secs: u64,
}

fn load_config(cli: &Cli) -> simplebot::Result<BotConfig> {
    let mut config = match &cli.config {
        Some(path) => BotConfig::load(path)?,
        None => {
            let path = BotConfig::default_path();
            if path.exists() { BotConfig::load(path)? } else { BotConfig::default() }
        }
    };

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(name) = &cli.name {
        config.name = name.clone();
    }
    if cli.no_bind {
        config.bind_local_address = false;
    }
    config.validate()?;
    Ok(config)
}

fn bot_names(base: &str, count: usize) -> Vec<String> {
    if count <= 1 {
        return vec![base.to_string()];
    }
    (1..=count).map(|i| format!("{base}{i}")).collect()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Connecting {} bot(s) to {}:{}", cli.count.max(1), config.host, config.port);

    let registry = Arc::new(BotRegistry::new());
    let mut bots = Vec::new();
    for name in bot_names(&config.name, cli.count) {
        if !registry.register(name.clone()) {
            warn!(bot = %name, "duplicate name, skipping");
            continue;
        }
        let mut bot_config = config.clone();
        bot_config.name = name.clone();
        match BotBuilder::new(bot_config).controller(&registry).connect().await {
            Ok(bot) => bots.push(bot),
            Err(e) => {
                registry.remove(&name);
                error!(bot = %name, "connect failed: {e}");
            }
        }
    }
    if bots.is_empty() {
        std::process::exit(1);
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Logging out {} bot(s)", registry.len());
            for bot in &bots {
                bot.logout().await;
            }
        }
        _ = async {
            while !registry.is_empty() {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        } => {
            info!("All bots disconnected");
        }
    }

    let timeout = Duration::from_secs(cli.shutdown_timeout_secs);
    for bot in bots {
        let name = bot.name().to_string();
        match tokio::time::timeout(timeout, bot.join()).await {
            Ok(Ok(())) => info!(bot = %name, "session closed"),
            Ok(Err(e)) => warn!(bot = %name, "session ended: {e}"),
            Err(_) => warn!(bot = %name, "server did not close the connection"),
        }
    }
}
