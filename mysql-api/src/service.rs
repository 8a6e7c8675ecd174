//! MySQL 查询服务
//!
//! 每个操作：打开连接 → 执行语句 → 映射结果 → 关闭连接。
//!
//! 库名、表名以及 `/execute` 的 SQL 文本均原样拼接进语句，不做转义或参数绑定：
//! 服务完全信任调用方。

use async_trait::async_trait;
use common::errors::AppResult;
use common::models::{text_at, Row};
use sqlx::mysql::MySqlRow;
use sqlx::Executor;

use crate::connection::{close, ConnectionFactory};

/// Row cap for table dumps.
pub const TABLE_ROW_LIMIT: usize = 1000;

/// Database operations behind the HTTP endpoints.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Runs a trivial statement on a fresh connection.
    async fn ping(&self) -> AppResult<()>;

    /// Database names, in server order.
    async fn list_databases(&self) -> AppResult<Vec<String>>;

    /// Table names of `database`, in server order.
    async fn list_tables(&self, database: &str) -> AppResult<Vec<String>>;

    /// At most [`TABLE_ROW_LIMIT`] rows of `database.table`.
    async fn fetch_table(&self, database: &str, table: &str) -> AppResult<Vec<Row>>;

    /// Runs `query` verbatim, after `USE database` when one is given.
    /// Statements without a result set yield no rows.
    async fn execute(&self, database: Option<&str>, query: &str) -> AppResult<Vec<Row>>;
}

pub fn use_database_sql(database: &str) -> String {
    format!("USE {}", database)
}

pub fn table_dump_sql(table: &str) -> String {
    format!("SELECT * FROM {} LIMIT {}", table, TABLE_ROW_LIMIT)
}

/// [`QueryBackend`] talking to a live MySQL server.
pub struct MySqlBackend {
    factory: ConnectionFactory,
}

impl MySqlBackend {
    pub fn new(factory: ConnectionFactory) -> Self {
        Self { factory }
    }

    /// Opens a connection, runs `prelude` (if any) then `sql`, and closes it.
    ///
    /// Everything goes through the text protocol so that any statement MySQL
    /// accepts interactively is accepted here as well.
    async fn run(
        &self,
        database: Option<String>,
        prelude: Option<String>,
        sql: String,
    ) -> AppResult<Vec<MySqlRow>> {
        let mut conn = self.factory.open(database.as_deref()).await?;

        if let Some(prelude) = prelude {
            tracing::debug!(sql = %prelude, "executing");
            if let Err(e) = (&mut conn).execute(sqlx::raw_sql(&prelude)).await {
                close(conn).await;
                return Err(e.into());
            }
        }

        tracing::debug!(sql = %sql, "executing");
        let fetched = (&mut conn).fetch_all(sqlx::raw_sql(&sql)).await;
        close(conn).await;
        Ok(fetched?)
    }
}

fn first_column(rows: &[MySqlRow]) -> Vec<String> {
    rows.iter().filter_map(|row| text_at(row, 0)).collect()
}

#[async_trait]
impl QueryBackend for MySqlBackend {
    async fn ping(&self) -> AppResult<()> {
        self.run(None, None, "SELECT 1".to_string()).await?;
        Ok(())
    }

    async fn list_databases(&self) -> AppResult<Vec<String>> {
        let rows = self.run(None, None, "SHOW DATABASES".to_string()).await?;
        Ok(first_column(&rows))
    }

    async fn list_tables(&self, database: &str) -> AppResult<Vec<String>> {
        let rows = self
            .run(Some(database.to_string()), None, "SHOW TABLES".to_string())
            .await?;
        Ok(first_column(&rows))
    }

    async fn fetch_table(&self, database: &str, table: &str) -> AppResult<Vec<Row>> {
        let rows = self
            .run(Some(database.to_string()), None, table_dump_sql(table))
            .await?;
        tracing::info!(database, table, rows = rows.len(), "table dumped");
        Ok(rows.iter().map(Row::from_mysql).collect())
    }

    async fn execute(&self, database: Option<&str>, query: &str) -> AppResult<Vec<Row>> {
        let prelude = database.filter(|db| !db.is_empty()).map(use_database_sql);
        let rows = self.run(None, prelude, query.to_string()).await?;
        tracing::info!(database, rows = rows.len(), "query executed");
        Ok(rows.iter().map(Row::from_mysql).collect())
    }
}
