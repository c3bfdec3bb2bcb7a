use api_router::{api_router, api_state::ApiState};
use common::utils::config::get_config;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    let state = ApiState::new(&config);
    info!(
        embedding_backend = state.embedding_provider.backend_label(),
        embedding_dimension = state.embedding_provider.dimension(),
        index_dir = %state.index_store.dir().display(),
        "Service state initialized"
    );

    let app = api_router(state)?;

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
