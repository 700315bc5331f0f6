//! PostgreSQL table backend.
//!
//! Rows travel as JSON: loads select `row_to_json` per row and parse the
//! result as JSON lines, saves serialize the frame as a JSON array and
//! expand it server-side with `json_populate_recordset`. Saving replaces the
//! table contents inside one transaction.
//!
//! Parameters: `user`, `dbname`, `host`, `port` (5432), `table` (defaults to
//! `key`), `password_env` (name of the variable holding the password,
//! `PGPASSWORD`).

use super::{Batch, DataBackend};
use crate::config::Params;
use crate::pipeline::channel::Payload;
use crate::pipeline::error::{PipelineError, PipelineResult};
use polars::io::json::{JsonFormat, JsonReader, JsonWriter};
use polars::prelude::{DataFrame, SerReader, SerWriter};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement,
    TransactionTrait,
};
use std::io::Cursor;
use tokio::runtime::Runtime;

pub const DEFAULT_PORT: u64 = 5432;
pub const DEFAULT_PASSWORD_ENV: &str = "PGPASSWORD";

pub struct PostgresBackend {
    key: String,
    table: String,
    url: String,
    runtime: Option<Runtime>,
    conn: Option<DatabaseConnection>,
}

fn is_identifier(name: &str) -> bool {
    let mut parts = name.split('.');
    let valid = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    let first = parts.next().is_some_and(valid);
    let rest: Vec<&str> = parts.collect();
    first && rest.len() <= 1 && rest.iter().all(|p| valid(p))
}

/// Connection URL with credentials and database name percent-encoded.
fn connection_url(user: &str, password: Option<&str>, host: &str, port: u64, dbname: &str) -> String {
    let user = urlencoding::encode(user);
    let dbname = urlencoding::encode(dbname);
    match password {
        Some(password) => format!(
            "postgres://{user}:{}@{host}:{port}/{dbname}",
            urlencoding::encode(password)
        ),
        None => format!("postgres://{user}@{host}:{port}/{dbname}"),
    }
}

impl PostgresBackend {
    pub fn from_params(node: &str, params: &Params) -> PipelineResult<Self> {
        let key = params.string(node, "key")?;
        let user = params.string(node, "user")?;
        let dbname = params.string(node, "dbname")?;
        let host = params.string(node, "host")?;
        let port = params.u64_or(node, "port", DEFAULT_PORT)?;
        let table = params.opt_string(node, "table")?.unwrap_or_else(|| key.clone());
        if !is_identifier(&table) {
            return Err(PipelineError::InvalidParam {
                node: node.to_string(),
                key: "table".to_string(),
                message: format!("'{}' is not a valid table name", table),
            });
        }

        let password_env = params
            .opt_string(node, "password_env")?
            .unwrap_or_else(|| DEFAULT_PASSWORD_ENV.to_string());
        let password = std::env::var(&password_env).ok();
        let url = connection_url(&user, password.as_deref(), &host, port, &dbname);

        Ok(Self {
            key,
            table,
            url,
            runtime: None,
            conn: None,
        })
    }

    fn connect(&mut self) -> PipelineResult<(&Runtime, &DatabaseConnection)> {
        let rt = match self.runtime.take() {
            Some(rt) => rt,
            None => tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?,
        };
        let rt = self.runtime.insert(rt);

        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                let mut options = ConnectOptions::new(self.url.clone());
                options.max_connections(1).sqlx_logging(false);
                let conn = rt.block_on(Database::connect(options))?;
                tracing::info!("connected to postgres table {}", self.table);
                conn
            }
        };
        let conn = self.conn.insert(conn);
        Ok((rt, conn))
    }
}

impl DataBackend for PostgresBackend {
    fn load(&mut self) -> PipelineResult<Batch> {
        let sql = format!("SELECT row_to_json(t)::text AS row FROM {} t", self.table);
        let (rt, conn) = self.connect()?;
        let rows = rt.block_on(conn.query_all(Statement::from_string(DbBackend::Postgres, sql)))?;

        let mut lines = String::new();
        for row in &rows {
            lines.push_str(&row.try_get::<String>("", "row")?);
            lines.push('\n');
        }
        let payload = if lines.is_empty() {
            DataFrame::empty()
        } else {
            JsonReader::new(Cursor::new(lines.into_bytes()))
                .with_json_format(JsonFormat::JsonLines)
                .finish()?
        };
        Ok(Batch {
            key: self.key.clone(),
            payload,
        })
    }

    fn save(&mut self, payload: &Payload) -> PipelineResult<()> {
        let mut buf = Vec::new();
        let mut df = payload.clone();
        JsonWriter::new(&mut buf)
            .with_json_format(JsonFormat::Json)
            .finish(&mut df)?;
        let json = String::from_utf8_lossy(&buf).into_owned();

        let table = self.table.clone();
        let (rt, conn) = self.connect()?;
        rt.block_on(async {
            let txn = conn.begin().await?;
            txn.execute(Statement::from_string(
                DbBackend::Postgres,
                format!("DELETE FROM {}", table),
            ))
            .await?;
            txn.execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                format!(
                    "INSERT INTO {table} SELECT * FROM json_populate_recordset(NULL::{table}, $1::json)"
                ),
                [json.into()],
            ))
            .await?;
            txn.commit().await
        })?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("postgres table {}", self.table)
    }
}
