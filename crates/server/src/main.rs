mod api;
mod router;
mod state;

use std::sync::Arc;

use tracing::info;

use cellscope_core::Config;

use crate::state::AppState;

fn load_config() -> Config {
    cellscope_core::config::load_dotenv();
    Config::from_env()
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.log_summary();
    if !config.llm.is_configured() {
        info!("GEMINI_API_KEY not set, /api/genai will answer 500");
    }

    let addr = config.server.bind_addr();
    let state = Arc::new(AppState::from_config(config));
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    serve(load_config()).await
}
