//! Handler模块

use axum::{
    extract::{Path, State},
    Json,
};

use common::errors::{AppError, ErrorBody};
use common::models::{
    DatabaseTables, ExecuteRequest, ExecuteResponse, HealthStatus, ServiceInfo, TableData,
};

use crate::state::AppState;

/// 健康检查：打开一条不指定库的连接并执行 `SELECT 1`
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "数据库可连接", body = HealthStatus),
        (status = 503, description = "数据库不可用", body = ErrorBody)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthStatus>, AppError> {
    state.backend.ping().await.map_err(AppError::into_unhealthy)?;
    Ok(Json(HealthStatus::healthy()))
}

/// 服务信息
#[utoipa::path(
    get,
    path = "/",
    tag = "info",
    responses(
        (status = 200, description = "服务运行中", body = ServiceInfo)
    )
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Welcome to MySQL MCP API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
    })
}

/// 列出当前凭据可见的所有数据库
#[utoipa::path(
    get,
    path = "/databases",
    tag = "schema",
    responses(
        (status = 200, description = "数据库名称列表", body = Vec<String>),
        (status = 500, description = "查询失败", body = ErrorBody)
    )
)]
pub async fn list_databases(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.backend.list_databases().await?))
}

/// 列出指定数据库中的表
#[utoipa::path(
    get,
    path = "/database/{database_name}",
    tag = "schema",
    params(
        ("database_name" = String, Path, description = "数据库名")
    ),
    responses(
        (status = 200, description = "表名列表", body = DatabaseTables),
        (status = 500, description = "查询失败或数据库不存在", body = ErrorBody)
    )
)]
pub async fn get_database_info(
    State(state): State<AppState>,
    Path(database_name): Path<String>,
) -> Result<Json<DatabaseTables>, AppError> {
    let tables = state.backend.list_tables(&database_name).await?;
    Ok(Json(DatabaseTables {
        name: database_name,
        tables,
    }))
}

/// 读取表数据（最多 1000 行）
#[utoipa::path(
    get,
    path = "/table/{database_name}/{table_name}",
    tag = "schema",
    params(
        ("database_name" = String, Path, description = "数据库名"),
        ("table_name" = String, Path, description = "表名")
    ),
    responses(
        (status = 200, description = "表数据", body = TableData),
        (status = 500, description = "查询失败", body = ErrorBody)
    )
)]
pub async fn get_table_data(
    State(state): State<AppState>,
    Path((database_name, table_name)): Path<(String, String)>,
) -> Result<Json<TableData>, AppError> {
    let data = state
        .backend
        .fetch_table(&database_name, &table_name)
        .await?;
    Ok(Json(TableData { data }))
}

/// 执行任意 SQL 语句（原样执行，不做校验）
#[utoipa::path(
    post,
    path = "/execute",
    tag = "query",
    request_body = ExecuteRequest,
    responses(
        (status = 200, description = "执行成功；无结果集的语句返回空数组", body = ExecuteResponse),
        (status = 500, description = "执行失败", body = ErrorBody)
    )
)]
pub async fn execute_query(
    State(state): State<AppState>,
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, AppError> {
    let results = state.backend.execute(req.database(), &req.query).await?;
    Ok(Json(ExecuteResponse { results }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use common::config::AppConfig;
    use common::models::Row;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::service::fake::FakeBackend;
    use crate::state::AppState;

    fn app(backend: Arc<FakeBackend>) -> Router {
        crate::create_router(AppState::with_backend(AppConfig::default(), backend))
    }

    fn shop_backend() -> FakeBackend {
        let mut backend = FakeBackend {
            databases: vec![
                "information_schema".to_string(),
                "mysql".to_string(),
                "shop".to_string(),
            ],
            ..Default::default()
        };
        backend.tables.insert(
            "shop".to_string(),
            vec!["orders".to_string(), "customers".to_string()],
        );
        let orders: Vec<Row> = (1..=3)
            .map(|id| {
                vec![("id", json!(id)), ("total", json!("9.99")), ("note", Value::Null)]
                    .into_iter()
                    .collect()
            })
            .collect();
        backend
            .table_rows
            .insert(("shop".to_string(), "orders".to_string()), orders);
        backend.results.insert(
            "SELECT 1 AS x".to_string(),
            vec![vec![("x", json!(1))].into_iter().collect()],
        );
        backend
            .results
            .insert("CREATE TABLE t (id INT)".to_string(), vec![]);
        backend
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_banner() {
        let (status, body) = send(app(Arc::new(FakeBackend::default())), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"message": "Welcome to MySQL MCP API", "version": "1.0.0", "status": "running"})
        );
    }

    #[tokio::test]
    async fn test_health_ok() {
        let (status, body) = send(app(Arc::new(shop_backend())), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy", "database": "connected"}));
    }

    #[tokio::test]
    async fn test_health_unreachable_is_503() {
        let backend = FakeBackend {
            unreachable: Some("Access denied for user 'root'@'localhost'".to_string()),
            ..Default::default()
        };
        let (status, body) = send(app(Arc::new(backend)), get("/health")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body["detail"],
            "Service unhealthy: Access denied for user 'root'@'localhost'"
        );
    }

    #[tokio::test]
    async fn test_databases_is_bare_array() {
        let (status, body) = send(app(Arc::new(shop_backend())), get("/databases")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["information_schema", "mysql", "shop"]));
    }

    #[tokio::test]
    async fn test_databases_connection_failure_is_500() {
        let backend = FakeBackend {
            unreachable: Some("Connection refused".to_string()),
            ..Default::default()
        };
        let (status, body) = send(app(Arc::new(backend)), get("/databases")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Connection refused");
    }

    #[tokio::test]
    async fn test_database_tables() {
        let (status, body) = send(app(Arc::new(shop_backend())), get("/database/shop")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"name": "shop", "tables": ["orders", "customers"]}));
    }

    #[tokio::test]
    async fn test_unknown_database_is_500() {
        let (status, body) = send(app(Arc::new(shop_backend())), get("/database/nope")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("Unknown database 'nope'"));
    }

    #[tokio::test]
    async fn test_table_data_requests_row_cap() {
        let backend = Arc::new(shop_backend());
        let (status, body) = send(app(backend.clone()), get("/table/shop/orders")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            *backend.executed.lock().unwrap(),
            vec!["SELECT * FROM orders LIMIT 1000".to_string()]
        );
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0], json!({"id": 1, "total": "9.99", "note": null}));
    }

    #[tokio::test]
    async fn test_missing_table_is_500() {
        let (status, body) = send(app(Arc::new(shop_backend())), get("/table/shop/ghosts")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Table 'shop.ghosts' doesn't exist");
    }

    #[tokio::test]
    async fn test_table_dump_is_idempotent() {
        let app = app(Arc::new(shop_backend()));
        let first = app.clone().oneshot(get("/table/shop/orders")).await.unwrap();
        let second = app.oneshot(get("/table/shop/orders")).await.unwrap();
        let first = to_bytes(first.into_body(), usize::MAX).await.unwrap();
        let second = to_bytes(second.into_body(), usize::MAX).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_execute_select() {
        let (status, body) = send(
            app(Arc::new(shop_backend())),
            post_json("/execute", json!({"query": "SELECT 1 AS x"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"results": [{"x": 1}]}));
    }

    #[tokio::test]
    async fn test_execute_statement_without_rows() {
        let backend = Arc::new(shop_backend());
        let (status, body) = send(
            app(backend.clone()),
            post_json(
                "/execute",
                json!({"database": "shop", "query": "CREATE TABLE t (id INT)"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"results": []}));
        assert_eq!(
            *backend.executed.lock().unwrap(),
            vec!["USE shop".to_string(), "CREATE TABLE t (id INT)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_execute_empty_database_skips_use() {
        let backend = Arc::new(shop_backend());
        send(
            app(backend.clone()),
            post_json("/execute", json!({"database": "", "query": "SELECT 1 AS x"})),
        )
        .await;
        assert_eq!(
            *backend.executed.lock().unwrap(),
            vec!["SELECT 1 AS x".to_string()]
        );
    }

    #[tokio::test]
    async fn test_execute_failure_is_500() {
        let (status, body) = send(
            app(Arc::new(shop_backend())),
            post_json("/execute", json!({"query": "SELEC 1"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "You have an error in your SQL syntax");
    }

    #[tokio::test]
    async fn test_execute_without_query_is_rejected() {
        let response = app(Arc::new(shop_backend()))
            .oneshot(post_json("/execute", json!({"database": "shop"})))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_path_segments_are_percent_decoded() {
        let mut backend = shop_backend();
        backend.databases.push("my db".to_string());
        backend
            .tables
            .insert("my db".to_string(), vec!["x".to_string()]);
        let (status, body) = send(app(Arc::new(backend)), get("/database/my%20db")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "my db");
    }
}
