//! Basic usage: discover JSON column types, then persist a record through
//! an in-memory driver that behaves like PostgreSQL.
//!
//! Run with `RUST_LOG=json_column=debug cargo run --example basic_usage`.

use json_column::{
    Binder, JsonColumn, JsonColumnResult, JsonSession, MemoryDriver, Parameter, Record,
    RowReader, TypeCatalog, TypeDescriptor, register_json_adapters,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Response {
    status_code: u16,
    message: String,
}

impl JsonColumn for Response {}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tag {
    name: String,
}

#[derive(Debug, Default)]
struct History {
    id: i64,
    tags: Option<Vec<Tag>>,
    response: Option<Response>,
}

impl Record for History {
    const TABLE: &'static str = "history";

    fn bind(&self, binder: &Binder<'_>) -> JsonColumnResult<Vec<Parameter>> {
        Ok(vec![
            binder.json("tags", self.tags.as_ref())?,
            binder.json("response", self.response.as_ref())?,
        ])
    }

    fn from_row(row: &RowReader<'_>) -> JsonColumnResult<Self> {
        Ok(Self {
            id: row.id(),
            tags: row.json("tags")?,
            response: row.json("response")?,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let catalog = TypeCatalog::new("demo")
        .with(TypeDescriptor::capable::<Response>())
        .with(TypeDescriptor::annotated::<Tag>())
        .with(TypeDescriptor::opaque::<History>());
    let registry = register_json_adapters(&catalog)?;
    tracing::info!(types = ?registry.type_names(), "Registry ready");

    let driver = Arc::new(MemoryDriver::from_url("postgres://localhost/demo"));
    let session = JsonSession::new(registry, driver.clone());

    let history = History {
        id: 0,
        tags: Some(vec![Tag { name: "smoke".to_string() }]),
        response: Some(Response {
            status_code: 200,
            message: "OK".to_string(),
        }),
    };
    let id = session.insert(&history).await?;
    session.insert(&History::default()).await?;

    if let Some(row) = session.get::<History>(id).await? {
        tracing::info!(id = row.id, tags = ?row.tags, response = ?row.response, "Read back");
    }

    let responses: Vec<Response> = session.aggregate(History::TABLE, "response").await?;
    tracing::info!(count = responses.len(), dialect = %session.dialect(), "Aggregated responses");

    let (inserts, updates) = driver.write_counts();
    tracing::info!(rows = driver.len(History::TABLE), inserts, updates, "Driver state");

    let stats = session.get_stats();
    tracing::info!(
        encodes = stats.encodes,
        decodes = stats.decodes,
        null_reads = stats.null_reads,
        "Session stats"
    );
    Ok(())
}
