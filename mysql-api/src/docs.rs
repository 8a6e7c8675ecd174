//! OpenAPI document and interactive documentation pages.

use axum::{response::Html, routing::get, Json, Router};
use utoipa::OpenApi;

use crate::handlers;
use crate::state::AppState;

pub const OPENAPI_PATH: &str = "/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MySQL MCP API",
        version = "1.0.0",
        description = "MySQL Management Control Panel API"
    ),
    paths(
        handlers::health_check,
        handlers::root,
        handlers::list_databases,
        handlers::get_database_info,
        handlers::get_table_data,
        handlers::execute_query,
    ),
    components(schemas(
        common::models::ExecuteRequest,
        common::models::ExecuteResponse,
        common::models::TableData,
        common::models::DatabaseTables,
        common::models::HealthStatus,
        common::models::ServiceInfo,
        common::errors::ErrorBody,
    )),
    tags(
        (name = "health", description = "健康检查端点"),
        (name = "info", description = "服务信息"),
        (name = "schema", description = "库、表浏览端点"),
        (name = "query", description = "SQL 执行端点")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>MySQL MCP API - Swagger UI</title>
  <meta charset="utf-8"/>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>
"##;

const REDOC: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>MySQL MCP API - ReDoc</title>
  <meta charset="utf-8"/>
</head>
<body>
  <redoc spec-url="/openapi.json"></redoc>
  <script src="https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js"></script>
</body>
</html>
"##;

/// `/docs` and `/redoc`; only mounted outside production.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/docs", get(|| async { Html(SWAGGER_UI) }))
        .route("/redoc", get(|| async { Html(REDOC) }))
}
