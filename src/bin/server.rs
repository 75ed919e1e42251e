use anyhow::{Context, Result};
use dotenvy::dotenv;
use log::{error, info, warn};
use std::sync::Arc;

use persona_chat::core::Config;
use persona_chat::features::chat::{CompletionService, OpenAiCompletion};
use persona_chat::web::{router, AppState};

/// How often idle sessions are swept
const SWEEP_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting persona chat server...");

    let completion: Option<Arc<dyn CompletionService>> = match &config.openai_api_key {
        Some(key) => {
            info!("OpenAI credential found | Model: {}", config.openai_model);
            let service: Arc<dyn CompletionService> =
                Arc::new(OpenAiCompletion::new(key, &config.openai_base_url));
            Some(service)
        }
        None => {
            warn!("OPENAI_API_KEY is not set - chat is disabled, pages show the key prompt");
            None
        }
    };

    let bind_addr = config.bind_addr;
    let idle = chrono::Duration::minutes(config.session_idle_minutes);
    let state = AppState::new(config, completion)?;

    for path in state.missing_avatar_files() {
        warn!(
            "Avatar {} not found - add it or set AVATAR_BASE_URL",
            path.display()
        );
    }

    // Spawn idle session sweeper
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let evicted = sessions.evict_idle(idle);
            if evicted > 0 {
                info!("Evicted {evicted} idle session(s), {} active", sessions.len());
            }
        }
    });

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!("Listening on http://{bind_addr}");

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
    {
        error!("Server error: {e}");
        return Err(anyhow::anyhow!("Server terminated: {}", e));
    }

    Ok(())
}
