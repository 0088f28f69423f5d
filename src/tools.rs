//! Agent-facing tool surface.
//!
//! Each tool validates its input, calls the backend, normalizes and renders.
//! Tools never fail: errors come back as Markdown error documents (metadata
//! tools) or as a FAILED [`QueryOutcome`] (query tool). The typed methods
//! ([`CatalogTools::list_schemas`] and friends) are available for callers
//! that want entities instead of text.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::auth::CredentialProvider;
use crate::backend::{CatalogBackend, HttpBackend};
use crate::catalog::{CatalogRef, SchemaRef, SchemaSummary, TableName, TableReport, TableSummary};
use crate::config::{ConfigError, QuerySettings, Settings, WorkspaceConfig};
use crate::error::Result;
use crate::markdown::{render_error, render_schemas, render_table_reports, render_tables};
use crate::normalize::{normalize_lineage, normalize_schemas, normalize_table, normalize_tables};
use crate::query::{QueryExecutor, QueryOutcome};

/// The four catalog tools, bound to one workspace.
pub struct CatalogTools {
    backend: Arc<dyn CatalogBackend>,
    executor: QueryExecutor,
    warehouse_id: Option<String>,
    wait_timeout: Duration,
}

impl CatalogTools {
    pub fn new(
        backend: Arc<dyn CatalogBackend>,
        warehouse_id: Option<String>,
        settings: &QuerySettings,
    ) -> Self {
        Self {
            executor: QueryExecutor::new(backend.clone(), settings),
            backend,
            warehouse_id,
            wait_timeout: settings.wait_timeout(),
        }
    }

    /// Build the HTTP stack for a workspace.
    ///
    /// Authentication is resolved here, so a missing or incomplete auth
    /// configuration fails before any tool runs.
    pub fn connect(config: &WorkspaceConfig, settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.http.timeout())
            .build()
            .map_err(|e| ConfigError::InvalidConfig(format!("could not build HTTP client: {}", e)))?;

        let credentials = CredentialProvider::from_config(&config.auth, http.clone(), &settings.auth)?;
        let backend = HttpBackend::new(&config.host, http, Arc::new(credentials), &settings.http)?;

        Ok(Self::new(
            Arc::new(backend),
            config.warehouse_id.clone(),
            &settings.query,
        ))
    }

    /// Schemas of a catalog.
    pub async fn list_schemas(&self, catalog: &str) -> Result<Vec<SchemaSummary>> {
        let catalog = CatalogRef::new(catalog)?;
        let raw = self.backend.list_schemas(&catalog).await?;
        Ok(normalize_schemas(&raw, &catalog)?)
    }

    /// Tables of a schema.
    pub async fn list_tables(&self, catalog: &str, schema: &str) -> Result<Vec<TableSummary>> {
        let schema = SchemaRef::new(catalog, schema)?;
        let raw = self.backend.list_tables(&schema).await?;
        Ok(normalize_tables(&raw, &schema)?)
    }

    /// Describe tables concurrently, one report per requested name, in order.
    pub async fn describe_tables(&self, table_names: &[String]) -> Vec<TableReport> {
        join_all(table_names.iter().map(|name| self.describe_table(name))).await
    }

    async fn describe_table(&self, requested: &str) -> TableReport {
        let name = match TableName::parse(requested) {
            Ok(name) => name,
            Err(e) => return TableReport::failed(requested, e),
        };

        let (table, lineage) = tokio::join!(
            self.backend.get_table(&name),
            self.backend.get_lineage(&name)
        );

        let table = match table.map_err(|e| e.to_string()).and_then(|raw| {
            normalize_table(&raw).map_err(|e| e.to_string())
        }) {
            Ok(table) => table,
            Err(reason) => {
                warn!(table = %name, %reason, "could not describe table");
                return TableReport::failed(requested, reason);
            }
        };

        let lineage = lineage.map_err(|e| e.to_string()).and_then(|raw| {
            normalize_lineage(&raw, &table.full_name).map_err(|e| e.to_string())
        });
        match lineage {
            Ok((upstream, downstream)) => TableReport::Described {
                table: table.with_lineage(upstream, downstream),
                lineage_error: None,
            },
            Err(reason) => {
                warn!(table = %name, %reason, "lineage unavailable");
                TableReport::Described {
                    table,
                    lineage_error: Some(reason),
                }
            }
        }
    }

    /// Markdown list of the schemas in `catalog`.
    pub async fn fetch_schemas_in_catalog(&self, catalog: &str) -> String {
        info!(catalog, "fetching list of schemas");
        let catalog_ref = match CatalogRef::new(catalog) {
            Ok(catalog_ref) => catalog_ref,
            Err(e) => return render_error("Could not retrieve list of schemas", &e.to_string()),
        };
        match self.list_schemas(catalog).await {
            Ok(schemas) => render_schemas(&catalog_ref, &schemas),
            Err(e) => {
                error!(catalog = %catalog_ref, error = %e, "could not list schemas");
                render_error("Could not retrieve list of schemas", &e.to_string())
            }
        }
    }

    /// Markdown list of the tables in `catalog.schema`.
    pub async fn fetch_tables_in_schema(&self, catalog: &str, schema: &str) -> String {
        info!(catalog, schema, "fetching list of tables");
        let schema_ref = match SchemaRef::new(catalog, schema) {
            Ok(schema_ref) => schema_ref,
            Err(e) => return render_error("Could not retrieve list of tables", &e.to_string()),
        };
        match self.list_tables(catalog, schema).await {
            Ok(tables) => render_tables(&schema_ref, &tables),
            Err(e) => {
                error!(schema = %schema_ref, error = %e, "could not list tables");
                render_error("Could not retrieve list of tables", &e.to_string())
            }
        }
    }

    /// Markdown description of each requested table, with lineage.
    pub async fn fetch_table_info(&self, table_names: &[String]) -> String {
        info!(tables = ?table_names, "fetching table metadata");
        let reports = self.describe_tables(table_names).await;
        render_table_reports(&reports)
    }

    /// Run a read-only query with the configured wait budget.
    pub async fn execute_spark_sql_query(&self, query: &str) -> QueryOutcome {
        self.execute_with_timeout(query, self.wait_timeout).await
    }

    /// Run a read-only query, waiting at most `wait_timeout` for a result.
    pub async fn execute_with_timeout(&self, query: &str, wait_timeout: Duration) -> QueryOutcome {
        let Some(warehouse_id) = self.warehouse_id.as_deref() else {
            warn!("query rejected: no SQL warehouse configured");
            return QueryOutcome::failed(
                query,
                None,
                "no SQL warehouse configured (set DATABRICKS_SQL_WAREHOUSE_ID)",
            );
        };

        match self.executor.execute(query, warehouse_id, wait_timeout).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "query failed");
                QueryOutcome::failed(query, e.statement_id().map(str::to_string), e.to_string())
            }
        }
    }
}
