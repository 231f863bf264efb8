//! JSON shapes for the HTTP API endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub connections: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BoardSummaryDto {
    pub id: String,
    pub connected_users: usize,
}
