//! Local HTTP fixture for exercising the client end to end.
//!
//! `/todos` is an in-memory JSON document store with numeric ids. The other
//! routes reflect the request back or shape the response on demand.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

type Document = Map<String, Value>;

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    docs: BTreeMap<u64, Document>,
}

impl Store {
    fn insert(&mut self, mut doc: Document) -> Document {
        self.next_id += 1;
        doc.insert("id".to_string(), json!(self.next_id));
        self.docs.insert(self.next_id, doc.clone());
        doc
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
pub struct SlowQuery {
    #[serde(default)]
    pub ms: u64,
}

pub fn app() -> Router {
    let db: Db = Arc::default();
    Router::new()
        .route("/todos", get(list_docs).post(create_doc))
        .route(
            "/todos/{id}",
            get(get_doc).put(replace_doc).patch(merge_doc).delete(delete_doc),
        )
        .route("/echo", get(echo).post(echo))
        .route("/text", get(text))
        .route("/slow", get(slow))
        .route("/status/{code}", get(status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn object(body: Value) -> Result<Document, StatusCode> {
    match body {
        Value::Object(doc) => Ok(doc),
        _ => Err(StatusCode::UNPROCESSABLE_ENTITY),
    }
}

async fn list_docs(State(db): State<Db>) -> Json<Vec<Document>> {
    Json(db.read().await.docs.values().cloned().collect())
}

async fn create_doc(
    State(db): State<Db>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Document>), StatusCode> {
    let doc = db.write().await.insert(object(body)?);
    tracing::debug!(id = %doc["id"], "stored document");
    Ok((StatusCode::CREATED, Json(doc)))
}

async fn get_doc(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Document>, StatusCode> {
    db.read().await.docs.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// PUT: the body becomes the document; the id is kept.
async fn replace_doc(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Document>, StatusCode> {
    let mut fields = object(body)?;
    let mut store = db.write().await;
    let doc = store.docs.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    fields.insert("id".to_string(), json!(id));
    *doc = fields;
    Ok(Json(doc.clone()))
}

/// PATCH: top-level fields of the body overwrite the stored ones.
async fn merge_doc(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Document>, StatusCode> {
    let fields = object(body)?;
    let mut store = db.write().await;
    let doc = store.docs.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    doc.extend(fields);
    doc.insert("id".to_string(), json!(id));
    Ok(Json(doc.clone()))
}

async fn delete_doc(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    match db.write().await.docs.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

/// Describe the received request: method, query pairs in order, headers and body.
async fn echo(
    method: Method,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let headers: serde_json::Map<String, Value> = headers
        .iter()
        .map(|(key, value)| {
            (
                key.as_str().to_string(),
                Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "headers": headers,
        "body": body,
    }))
}

async fn text() -> &'static str {
    "plain text body"
}

async fn slow(Query(query): Query<SlowQuery>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(query.ms)).await;
    Json(json!({ "slept_ms": query.ms }))
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(json!({ "status": status.as_u16() })))
}
