//! Keeps the process reachable on hosts that sleep idle services.

mod keep_alive;

use std::net::SocketAddr;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::{error, info};

use crate::error::AppError;
use crate::roster::RosterHandle;

pub use keep_alive::start_keep_alive;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    active_rosters: usize,
}

fn build_router(rosters: RosterHandle) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .with_state(rosters)
}

async fn handle_root() -> &'static str {
    "Team finder bot is alive!"
}

async fn handle_health(
    State(rosters): State<RosterHandle>,
) -> Result<Json<HealthResponse>, StatusCode> {
    match rosters.active_count().await {
        Ok(active_rosters) => Ok(Json(HealthResponse {
            status: "ok",
            active_rosters,
        })),
        Err(e) => {
            error!(error = %e, "🩺 ❌ Health check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Serve the liveness endpoints on every interface at `port`.
pub async fn serve(port: u16, rosters: RosterHandle) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "🩺 Liveness endpoint listening");

    axum::serve(listener, build_router(rosters)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use super::*;
    use crate::roster::{Capacity, DEFAULT_TEAM_SIZES, RosterStore};

    fn start_store() -> RosterHandle {
        let (tx, _rx) = mpsc::channel(1);
        let store = RosterStore::new(DEFAULT_TEAM_SIZES.to_vec(), tx);
        let handle = store.handle();
        store.start();
        handle
    }

    #[tokio::test]
    async fn root_answers_plain_text() {
        let app = build_router(start_store());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Team finder bot is alive!");
    }

    #[tokio::test]
    async fn health_reports_active_rosters() {
        let rosters = start_store();
        rosters
            .create(5, Capacity::new(1, 2, 2), None, None)
            .await
            .unwrap();
        let app = build_router(rosters);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["active_rosters"], 1);
    }
}
