// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! API server
//!
//! Binds the axum router: `GET /health` and the per-user chat WebSocket at
//! `GET /chat/:user_id`. Also owns the periodic conversation-store eviction
//! sweep.

use axum::{
    extract::ws::WebSocket,
    extract::{Path, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::session::{ChatSession, SessionContext};

use super::transport::WebSocketTransport;

const EVICTION_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Clone)]
struct AppState {
    ctx: Arc<SessionContext>,
}

/// Start the API server. Runs until the process exits.
pub async fn start_server(ctx: Arc<SessionContext>, port: u16) -> anyhow::Result<()> {
    spawn_eviction_sweep(ctx.clone());

    let state = AppState { ctx };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/chat/:user_id", get(chat_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_eviction_sweep(ctx: Arc<SessionContext>) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(EVICTION_SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let evicted = ctx.store.evict_idle().await;
            if evicted > 0 {
                debug!("Evicted {} idle conversations", evicted);
            }
        }
    });
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::response::Json(json!({
        "status": "healthy",
        "index_entries": state.ctx.retriever.index_size(),
        "active_conversations": state.ctx.store.len().await,
        "search_providers": state.ctx.search.available_providers(),
    }))
}

async fn chat_handler(
    ws: WebSocketUpgrade,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_chat(socket, user_id, state))
}

async fn handle_chat(socket: WebSocket, user_id: String, state: AppState) {
    let conn_id = format!("conn-{}", uuid::Uuid::new_v4());
    info!("WebSocket connected: {} (user {})", conn_id, user_id);

    let mut transport = WebSocketTransport::new(socket);
    let session = ChatSession::new(user_id, state.ctx.clone());
    session.run(&mut transport).await;

    debug!("WebSocket closed: {}", conn_id);
}
