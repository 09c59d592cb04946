mod config;
mod converters;
mod error;
mod gemini_client;
mod logging;
mod models;
mod request_id;
mod router;
mod state;

use clap::Parser;
use config::Config;
use notify::{EventKind, RecursiveMode, Watcher};
use state::AppState;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Level, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "gemini-chat-proxy")]
#[command(about = "Proxies frontend chat requests to the Gemini generateContent API")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    ip: String,

    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Path to YAML config file; defaults plus GEMINI_API_KEY when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Also log to this file (capped at 10 MiB)
    #[arg(long)]
    log_file: Option<String>,

    /// socks and http proxy, example: socks5://192.168.0.2:10080
    #[arg(long)]
    proxy: Option<String>,
}

async fn watch_config_file(config_path: &str, app_state: &AppState) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel(100);

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            if let Err(e) = tx.blocking_send(event) {
                eprintln!("Failed to send event: {}", e);
            }
        }
    })?;

    watcher.watch(Path::new(config_path), RecursiveMode::NonRecursive)?;

    while let Some(event) = rx.recv().await {
        if let EventKind::Modify(_) = event.kind {
            info!("Config file modified, attempting to reload");
            match Config::from_file(config_path) {
                Ok(new_config) => {
                    app_state.replace_config(new_config).await;
                    info!("Configuration reloaded successfully");
                }
                Err(e) => {
                    error!("Failed to reload configuration: {}", e);
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = Level::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using INFO level.", args.log_level);
        Level::INFO
    });
    logging::init_logging(log_level, args.log_file.as_deref());

    let config = match &args.config {
        Some(path) => {
            let config = Config::from_file(path)?;
            info!("Configuration loaded successfully from: {}", path);
            config
        }
        None => Config::from_env(),
    };
    if config.api_key.is_none() {
        warn!(
            "No API key configured (api_key or ${}); chat requests will fail",
            config.api_key_env
        );
    }
    info!("Using model {} at {}", config.model, config.api_base);

    let client_builder = reqwest::Client::builder();
    let client_builder = match &args.proxy {
        Some(proxy) => client_builder.proxy(reqwest::Proxy::all(proxy)?),
        None => client_builder,
    };
    let http_client = Arc::new(client_builder.build()?);
    let gemini_client = Arc::new(gemini_client::GeminiClient::new(http_client));

    let max_body_bytes = config.max_body_bytes;
    let app_state = AppState::new(config, gemini_client);

    if let Some(path) = args.config.clone() {
        let state_for_watcher = app_state.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_config_file(&path, &state_for_watcher).await {
                warn!("Config file watcher error: {}", e);
            }
        });
    }

    let app = router::build_router(app_state, max_body_bytes);

    let bind_address = format!("{}:{}", args.ip, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server started on http://{}{}", bind_address, router::CHAT_PATH);

    axum::serve(listener, app).await?;
    Ok(())
}
