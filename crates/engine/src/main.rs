//! Questforge Engine - Main entry point.

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questforge_engine::api;
use questforge_engine::infrastructure::settings::{load_dotenv, EngineSettings};
use questforge_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questforge_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Questforge Engine");

    let settings = EngineSettings::from_env();
    let app = Arc::new(App::new(App::store_from_settings(&settings)));

    if let Some(game) = &settings.default_game {
        match app.game.load_game(game).await {
            Ok(report) => {
                tracing::info!(
                    game = %report.game,
                    states = report.states,
                    connections = report.connections,
                    views = report.views.len(),
                    "Default game loaded"
                );
                if let Err(e) = app.bridge.refresh().await {
                    tracing::warn!(error = %e, "Failed to publish default game");
                }
            }
            Err(e) => tracing::warn!(game = %game, error = %e, "Failed to load default game"),
        }
    }

    let mut router = api::http::routes()
        .route("/ws/surface", get(api::websocket::surface_ws_handler))
        .route("/ws/editor", get(api::websocket::editor_ws_handler))
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(settings.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    let addr = settings.listen_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
