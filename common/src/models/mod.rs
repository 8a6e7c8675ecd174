//! Wire models.

pub mod api;
pub mod row;

pub use api::{
    DatabaseTables, ExecuteRequest, ExecuteResponse, HealthStatus, ServiceInfo, TableData,
};
pub use row::{render_text, text_at, Row, ValueKind};
