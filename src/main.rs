use anyhow::Result;
use clap::Parser;
use lifesim_server::chat::ModelScopeChatClient;
use lifesim_server::game::GameService;
use lifesim_server::imagegen::{ImageJobClient, ModelScopeImageApi, PollConfig};
use lifesim_server::models::Config;
use lifesim_server::server::{self, AppState};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "lifesim-server")]
#[command(about = "Life simulation game backend")]
struct CliArgs {
    /// Port to listen on.
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Directory for generated images (overrides IMAGES_DIR).
    #[arg(long)]
    images_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lifesim_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting lifesim-server");

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let images_dir = args
        .images_dir
        .unwrap_or_else(|| PathBuf::from(&config.images_dir));
    fs::create_dir_all(&images_dir)?;
    info!("Serving generated images from {}", images_dir.display());

    let chat = Arc::new(
        ModelScopeChatClient::new(config.api_key.clone(), config.chat_model.clone())
            .with_base_url(config.api_base_url.clone()),
    );
    let image_api = Arc::new(
        ModelScopeImageApi::new(config.api_key.clone())
            .with_base_url(config.api_base_url.clone()),
    );
    let images = Arc::new(
        ImageJobClient::new(image_api, &images_dir, config.image_model.clone())
            .with_poll_config(PollConfig {
                interval: config.poll_interval,
                max_attempts: config.poll_max_attempts,
            }),
    );

    let state = Arc::new(AppState {
        game: GameService::new(chat, images),
    });
    let app = server::router(state, &images_dir);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
