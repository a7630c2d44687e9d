use crate::config::AppConfig;
use crate::scene::{tooltip_html, Scene};
use crate::types::SubzoneInfo;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub struct AppState {
    pub scene: Scene,
}

/// Drawing-plane coordinate, in viewBox units.
#[derive(Deserialize)]
pub struct HoverParams {
    x: f64,
    y: f64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct HoverResponse {
    #[serde(flatten)]
    info: SubzoneInfo,
    tooltip: String,
}

pub fn router(state: Arc<AppState>, config: &AppConfig) -> Router {
    Router::new()
        .route("/api/hover", get(hover_handler))
        .fallback_service(ServeDir::new(&config.output.dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, scene: Scene) -> Result<()> {
    let state = Arc::new(AppState { scene });

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    info!("Starting server on http://{}", addr);

    let app = router(state, &config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn hover_response(scene: &Scene, x: f64, y: f64) -> Option<HoverResponse> {
    scene.info_at(x, y).map(|info| HoverResponse {
        tooltip: tooltip_html(info),
        info: info.clone(),
    })
}

async fn hover_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HoverParams>,
) -> Json<Option<HoverResponse>> {
    Json(hover_response(&state.scene, params.x, params.y))
}
