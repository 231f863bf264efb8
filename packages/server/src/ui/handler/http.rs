//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{BoardSummaryDto, HealthDto},
    ui::state::AppState,
};
use liveboard_shared::time::iso_timestamp;

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        connections: state.registry.count().await,
        timestamp: iso_timestamp(),
    })
}

/// List active boards with their member counts.
pub async fn get_boards(State(state): State<Arc<AppState>>) -> Json<Vec<BoardSummaryDto>> {
    let mut boards: Vec<BoardSummaryDto> = state
        .rooms
        .boards()
        .await
        .into_iter()
        .map(|(board_id, connected_users)| BoardSummaryDto {
            id: board_id.as_str().to_string(),
            connected_users,
        })
        .collect();

    // Stable output for consumers and tests
    boards.sort_by(|a, b| a.id.cmp(&b.id));
    Json(boards)
}
