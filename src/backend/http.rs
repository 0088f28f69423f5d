//! HTTP implementation of [`CatalogBackend`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode, Url};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::error::{BackendError, BackendResult};
use super::{paths, CatalogBackend, RawPayload};
use crate::auth::{Credential, CredentialProvider};
use crate::catalog::{CatalogRef, SchemaRef, TableName};
use crate::config::{ConfigError, HttpSettings};

/// Longest backend error body quoted back to the caller.
const MAX_ERROR_BODY: usize = 500;

/// Workspace client over reqwest.
///
/// Every request carries the provider's current bearer token. A 401/403 gets
/// exactly one retry with a refreshed token; nothing else is retried here.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<CredentialProvider>,
    max_pages: usize,
}

impl HttpBackend {
    /// Create a client for `host` (a full URL such as `https://adb-1.azuredatabricks.net`).
    ///
    /// The reqwest client should already carry the request timeout.
    pub fn new(
        host: &str,
        http: reqwest::Client,
        credentials: Arc<CredentialProvider>,
        settings: &HttpSettings,
    ) -> Result<Self, ConfigError> {
        let base_url = Url::parse(host)
            .map_err(|e| ConfigError::InvalidConfig(format!("invalid host `{}`: {}", host, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidConfig(format!(
                "host `{}` cannot be used as a base URL",
                host
            )));
        }

        Ok(Self {
            http,
            base_url,
            credentials,
            max_pages: settings.max_pages.max(1),
        })
    }

    fn endpoint(&self, base: &[&str], extra: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL always has path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(base).extend(extra);
        }
        url
    }

    /// Send a request, retrying once with a fresh credential on 401/403.
    async fn send(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> BackendResult<Value> {
        let credential = self.credentials.get_credential().await?;
        let mut response = self.dispatch(&method, &url, query, body, &credential).await?;

        if is_auth_rejection(response.status()) {
            warn!(
                method = %method,
                path = url.path(),
                status = response.status().as_u16(),
                "credential rejected, retrying with a refreshed one"
            );
            let fresh = self.credentials.force_refresh(&credential).await?;
            response = self.dispatch(&method, &url, query, body, &fresh).await?;

            if is_auth_rejection(response.status()) {
                return Err(BackendError::AuthRejected {
                    status: response.status().as_u16(),
                });
            }
        }

        into_payload(response).await
    }

    async fn dispatch(
        &self,
        method: &Method,
        url: &Url,
        query: &[(&str, String)],
        body: Option<&Value>,
        credential: &Credential,
    ) -> BackendResult<reqwest::Response> {
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, credential.header_value());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        debug!(
            method = %method,
            path = url.path(),
            status = response.status().as_u16(),
            "workspace response"
        );
        Ok(response)
    }

    /// GET a listing endpoint, following `next_page_token` up to `max_pages`.
    async fn list_paginated(
        &self,
        url: Url,
        query: Vec<(&str, String)>,
        key: &str,
    ) -> BackendResult<Value> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..self.max_pages {
            let mut params = query.clone();
            if let Some(token) = &page_token {
                params.push(("page_token", token.clone()));
            }

            let mut payload = self.send(Method::GET, url.clone(), &params, None).await?;
            if let Some(Value::Array(batch)) = payload.get_mut(key).map(Value::take) {
                items.extend(batch);
            }

            page_token = payload
                .get("next_page_token")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);

            if page_token.is_none() {
                break;
            }
            if page + 1 == self.max_pages {
                warn!(
                    path = url.path(),
                    pages = self.max_pages,
                    "stopping pagination at the configured page limit"
                );
            }
        }

        let mut merged = serde_json::Map::new();
        merged.insert(key.to_string(), Value::Array(items));
        Ok(Value::Object(merged))
    }
}

fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Map a response to its JSON body or a classified error.
async fn into_payload(response: reqwest::Response) -> BackendResult<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::Unavailable(e.to_string()))?;

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        return serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()));
    }

    let message = error_message(&body, status);
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(BackendError::Unavailable(format!(
            "HTTP {}: {}",
            status.as_u16(),
            message
        )))
    } else {
        Err(BackendError::Request {
            status: status.as_u16(),
            message,
        })
    }
}

/// Extract a readable message from an error body.
///
/// Structured bodies (`{"error_code": .., "message": ..}`) become
/// `ERROR_CODE: message`; anything else is quoted, truncated.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        let code = map.get("error_code").and_then(Value::as_str);
        let message = map.get("message").and_then(Value::as_str);
        match (code, message) {
            (Some(code), Some(message)) => return format!("{}: {}", code, message),
            (None, Some(message)) => return message.to_string(),
            (Some(code), None) => return code.to_string(),
            (None, None) => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string();
    }
    if trimmed.chars().count() > MAX_ERROR_BODY {
        let cut: String = trimmed.chars().take(MAX_ERROR_BODY).collect();
        format!("{}...", cut)
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl CatalogBackend for HttpBackend {
    async fn list_schemas(&self, catalog: &CatalogRef) -> BackendResult<RawPayload> {
        let url = self.endpoint(paths::SCHEMAS, &[]);
        self.list_paginated(
            url,
            vec![("catalog_name", catalog.catalog().to_string())],
            "schemas",
        )
        .await
    }

    async fn list_tables(&self, schema: &SchemaRef) -> BackendResult<RawPayload> {
        let url = self.endpoint(paths::TABLES, &[]);
        self.list_paginated(
            url,
            vec![
                ("catalog_name", schema.catalog().to_string()),
                ("schema_name", schema.schema().to_string()),
            ],
            "tables",
        )
        .await
    }

    async fn get_table(&self, table: &TableName) -> BackendResult<RawPayload> {
        let full_name = table.full_name();
        let url = self.endpoint(paths::TABLES, &[&full_name]);
        self.send(Method::GET, url, &[], None).await
    }

    async fn get_lineage(&self, table: &TableName) -> BackendResult<RawPayload> {
        let url = self.endpoint(paths::TABLE_LINEAGE, &[]);
        let query = [
            ("table_name", table.full_name()),
            ("include_entity_lineage", "true".to_string()),
        ];
        self.send(Method::GET, url, &query, None).await
    }

    async fn submit_statement(&self, sql: &str, warehouse_id: &str) -> BackendResult<String> {
        let url = self.endpoint(paths::STATEMENTS, &[]);
        let body = json!({
            "statement": sql,
            "warehouse_id": warehouse_id,
            "wait_timeout": "0s",
            "on_wait_timeout": "CONTINUE",
            "format": "JSON_ARRAY",
            "disposition": "INLINE",
        });

        let payload = self.send(Method::POST, url, &[], Some(&body)).await?;
        let statement_id = payload
            .get("statement_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                BackendError::Decode("statement submission returned no statement_id".to_string())
            })?;

        info!(statement_id, warehouse_id, "statement submitted");
        Ok(statement_id.to_string())
    }

    async fn get_statement_status(&self, statement_id: &str) -> BackendResult<RawPayload> {
        let url = self.endpoint(paths::STATEMENTS, &[statement_id]);
        self.send(Method::GET, url, &[], None).await
    }

    async fn get_result_chunk(
        &self,
        statement_id: &str,
        chunk_index: u64,
    ) -> BackendResult<RawPayload> {
        let index = chunk_index.to_string();
        let url = self.endpoint(paths::STATEMENTS, &[statement_id, "result", "chunks", &index]);
        self.send(Method::GET, url, &[], None).await
    }
}
