//! 路由模块

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/databases", get(handlers::list_databases))
        .route("/database/{database_name}", get(handlers::get_database_info))
        .route(
            "/table/{database_name}/{table_name}",
            get(handlers::get_table_data),
        )
        .route("/execute", post(handlers::execute_query))
}
