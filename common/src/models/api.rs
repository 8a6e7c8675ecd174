//! Request and response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::row::Row;

/// Body of `POST /execute`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExecuteRequest {
    /// Database to `USE` before running the query.
    #[serde(default)]
    pub database: Option<String>,

    /// SQL statement, run verbatim.
    pub query: String,
}

impl ExecuteRequest {
    /// Target database, with an empty name treated as absent.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref().filter(|db| !db.is_empty())
    }
}

/// Rows produced by `POST /execute`; empty for statements without a result set.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecuteResponse {
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<Row>,
}

/// Up to 1000 rows of a table.
#[derive(Debug, Serialize, ToSchema)]
pub struct TableData {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Row>,
}

/// Tables of one database.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatabaseTables {
    pub name: String,
    pub tables: Vec<String>,
}

/// Liveness report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            database: "connected".to_string(),
        }
    }
}

/// Static service banner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub status: String,
}
