//! Local fake of a Databricks workspace and its OAuth token endpoint.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};

use heron::auth::{AuthStrategy, Credential, CredentialProvider, OAuthClient};
use heron::backend::HttpBackend;
use heron::config::{AuthSettings, HttpSettings};

/// Knobs and counters shared with the running server.
pub struct WorkspaceState {
    /// Number of token exchanges served.
    pub token_requests: AtomicUsize,
    /// `expires_in` returned by the token endpoint (`null` omits the field).
    pub expires_in: Mutex<Value>,
    /// Artificial latency of the token endpoint.
    pub token_delay_ms: AtomicU64,
    /// Status returned by the token endpoint.
    pub token_status: AtomicU16,
    /// Form fields of the last token request.
    pub last_token_form: Mutex<HashMap<String, String>>,
    /// API requests still to be answered with 401, regardless of token.
    pub reject_remaining: AtomicUsize,
    /// `Authorization` header of every API request, in order.
    pub seen_auth: Mutex<Vec<String>>,
    /// Body of the last statement submission.
    pub last_statement: Mutex<Option<Value>>,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self {
            token_requests: AtomicUsize::new(0),
            expires_in: Mutex::new(json!(3600)),
            token_delay_ms: AtomicU64::new(0),
            token_status: AtomicU16::new(200),
            last_token_form: Mutex::new(HashMap::new()),
            reject_remaining: AtomicUsize::new(0),
            seen_auth: Mutex::new(Vec::new()),
            last_statement: Mutex::new(None),
        }
    }
}

impl WorkspaceState {
    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn set_expires_in(&self, value: Value) {
        *self.expires_in.lock().unwrap() = value;
    }

    pub fn reject_next(&self, count: usize) {
        self.reject_remaining.store(count, Ordering::SeqCst);
    }

    pub fn seen_auth(&self) -> Vec<String> {
        self.seen_auth.lock().unwrap().clone()
    }

    /// Record the header and decide whether to reject this request.
    fn check_auth(&self, headers: &HeaderMap) -> Option<Response> {
        let header = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        self.seen_auth.lock().unwrap().push(header.clone());

        let rejected = self
            .reject_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected || !header.starts_with("Bearer ") {
            return Some(error(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Invalid access token."));
        }
        None
    }
}

/// A running fake workspace.
pub struct FakeWorkspace {
    pub base_url: String,
    pub state: Arc<WorkspaceState>,
}

impl FakeWorkspace {
    pub async fn start() -> Self {
        let state = Arc::new(WorkspaceState::default());
        let app = Router::new()
            .route("/oidc/v1/token", post(token))
            .route("/api/2.1/unity-catalog/schemas", get(list_schemas))
            .route("/api/2.1/unity-catalog/tables", get(list_tables))
            .route("/api/2.1/unity-catalog/tables/{full_name}", get(get_table))
            .route("/api/2.0/lineage-tracking/table-lineage", get(get_lineage))
            .route("/api/2.0/sql/statements", post(submit_statement))
            .route("/api/2.0/sql/statements/{id}", get(statement_status))
            .route("/api/2.0/sql/statements/{id}/result/chunks/{index}", get(result_chunk))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/oidc/v1/token", self.base_url)
    }

    pub fn oauth_provider(&self, settings: &AuthSettings) -> CredentialProvider {
        let client = OAuthClient {
            client_id: "heron-test".to_string(),
            client_secret: "s3cret".to_string(),
            token_url: self.token_url(),
            scope: Some("all-apis".to_string()),
        };
        CredentialProvider::new(AuthStrategy::OAuth(client), reqwest::Client::new(), settings)
    }

    pub fn static_provider(&self, token: &str) -> CredentialProvider {
        CredentialProvider::new(
            AuthStrategy::Static(Credential::from_static(token)),
            reqwest::Client::new(),
            &AuthSettings::default(),
        )
    }

    pub fn backend(&self, provider: CredentialProvider) -> HttpBackend {
        HttpBackend::new(
            &self.base_url,
            reqwest::Client::new(),
            Arc::new(provider),
            &HttpSettings::default(),
        )
        .unwrap()
    }
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({"error_code": code, "message": message}))).into_response()
}

async fn token(
    State(state): State<Arc<WorkspaceState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    *state.last_token_form.lock().unwrap() = form;

    let delay = state.token_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let status = StatusCode::from_u16(state.token_status.load(Ordering::SeqCst)).unwrap();
    if !status.is_success() {
        return (status, "invalid_client").into_response();
    }

    let expires_in = state.expires_in.lock().unwrap().clone();
    let mut body = json!({"access_token": format!("tok-{}", n), "token_type": "Bearer"});
    if !expires_in.is_null() {
        body["expires_in"] = expires_in;
    }
    Json(body).into_response()
}

async fn list_schemas(
    State(state): State<Arc<WorkspaceState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(rejection) = state.check_auth(&headers) {
        return rejection;
    }
    match params.get("page_token").map(String::as_str) {
        None => Json(json!({
            "schemas": [{"name": "sales", "catalog_name": "main", "comment": "Sales data"}],
            "next_page_token": "page-2"
        }))
        .into_response(),
        Some("page-2") => Json(json!({
            "schemas": [{"name": "default", "catalog_name": "main"}]
        }))
        .into_response(),
        Some(_) => error(StatusCode::BAD_REQUEST, "INVALID_PARAMETER_VALUE", "bad page token"),
    }
}

async fn list_tables(
    State(state): State<Arc<WorkspaceState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(rejection) = state.check_auth(&headers) {
        return rejection;
    }
    match params.get("schema_name").map(String::as_str) {
        Some("broken") => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        Some("throttled") => error(StatusCode::TOO_MANY_REQUESTS, "REQUEST_LIMIT_EXCEEDED", "slow down"),
        _ => Json(json!({
            "tables": [
                {"name": "orders", "catalog_name": "main", "schema_name": "sales", "table_type": "MANAGED"},
                {"name": "customers", "catalog_name": "main", "schema_name": "sales", "table_type": "MANAGED"}
            ]
        }))
        .into_response(),
    }
}

async fn get_table(
    State(state): State<Arc<WorkspaceState>>,
    headers: HeaderMap,
    Path(full_name): Path<String>,
) -> Response {
    if let Some(rejection) = state.check_auth(&headers) {
        return rejection;
    }
    if full_name != "main.sales.orders" {
        return error(
            StatusCode::NOT_FOUND,
            "TABLE_DOES_NOT_EXIST",
            &format!("Table '{}' does not exist.", full_name),
        );
    }
    Json(json!({
        "full_name": "main.sales.orders",
        "catalog_name": "main",
        "schema_name": "sales",
        "name": "orders",
        "table_type": "MANAGED",
        "data_source_format": "DELTA",
        "columns": [
            {"name": "amount", "type_text": "decimal(10,2)", "type_name": "DECIMAL", "position": 1, "nullable": true},
            {"name": "id", "type_text": "bigint", "type_name": "LONG", "position": 0, "nullable": false}
        ]
    }))
    .into_response()
}

async fn get_lineage(
    State(state): State<Arc<WorkspaceState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(rejection) = state.check_auth(&headers) {
        return rejection;
    }
    if params.get("include_entity_lineage").map(String::as_str) != Some("true") {
        return error(StatusCode::BAD_REQUEST, "INVALID_PARAMETER_VALUE", "entity lineage not requested");
    }
    Json(json!({
        "upstreams": [
            {"tableInfo": {"catalog_name": "main", "schema_name": "raw", "name": "orders_src"}}
        ],
        "downstreams": []
    }))
    .into_response()
}

async fn submit_statement(
    State(state): State<Arc<WorkspaceState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = state.check_auth(&headers) {
        return rejection;
    }
    *state.last_statement.lock().unwrap() = Some(body);
    Json(json!({"statement_id": "01ef-stmt", "status": {"state": "PENDING"}})).into_response()
}

async fn statement_status(
    State(state): State<Arc<WorkspaceState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Some(rejection) = state.check_auth(&headers) {
        return rejection;
    }
    Json(json!({
        "statement_id": id,
        "status": {"state": "SUCCEEDED"},
        "manifest": {
            "schema": {"columns": [{"name": "n", "type_name": "INT", "position": 0}]},
            "total_chunk_count": 2
        },
        "result": {"chunk_index": 0, "data_array": [["1"]], "next_chunk_index": 1}
    }))
    .into_response()
}

async fn result_chunk(
    State(state): State<Arc<WorkspaceState>>,
    headers: HeaderMap,
    Path((id, index)): Path<(String, u64)>,
) -> Response {
    if let Some(rejection) = state.check_auth(&headers) {
        return rejection;
    }
    if id != "01ef-stmt" || index != 1 {
        return error(StatusCode::NOT_FOUND, "RESOURCE_DOES_NOT_EXIST", "no such chunk");
    }
    Json(json!({"chunk_index": 1, "data_array": [["2"]]})).into_response()
}
