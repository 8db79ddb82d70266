use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use form_validator::config::AppConfig;
use form_validator::forms::FormKind;
use form_validator::startup::{build_app, API_PREFIX};

#[derive(Parser, Debug)]
#[command(name = "form-validator")]
#[command(about = "Shared form validation rules served over HTTP")]
struct Args {
    /// Configuration file path (default: config.yaml)
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides config file)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    let (mut app_config, using_defaults) =
        if args.config == "config.yaml" && !std::path::Path::new("config.yaml").exists() {
            tracing::warn!("No config.yaml found, using default configuration");
            (AppConfig::default_config(), true)
        } else {
            let config = AppConfig::load_from_file(&args.config)
                .map_err(|e| format!("Failed to load configuration: {}", e))?;
            (config, false)
        };

    if let Some(port) = args.port {
        app_config.server.port = port;
    }
    if let Some(host) = args.host {
        app_config.server.host = host;
    }

    if !using_defaults {
        tracing::info!(config = %args.config, "configuration loaded");
    }

    let host: std::net::IpAddr = app_config.server.host.parse().unwrap_or_else(|_| {
        tracing::warn!(
            "Invalid host address: {}, using 127.0.0.1",
            app_config.server.host
        );
        [127, 0, 0, 1].into()
    });
    let addr = SocketAddr::from((host, app_config.server.port));

    let app = build_app(app_config);

    tracing::info!("form-validator listening on {}", addr);
    for kind in FormKind::ALL {
        tracing::info!("  POST {}/validate/{}", API_PREFIX, kind);
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
