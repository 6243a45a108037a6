//! In-process stub of the aggregator backend.
//!
//! Queries with special meaning:
//!
//! | Query | Behaviour |
//! |-------|-----------|
//! | `cats` | two pages: 3 Wikipedia items, then 2 Met items |
//! | `vases` | space-separated source keys plus an upstream error |
//! | `legacy` | per-source arrays at the top level, no `results` |
//! | `boom` | HTTP 500 |
//! | `garbled` | 200 with a body that is not JSON |
//! | `slow` | answers after 5 seconds |
//! | `gated` | waits until [`Stub::release`] is called |
//! | anything else | empty results |

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
pub struct Stub {
    search_calls: AtomicUsize,
    gate: Notify,
    added: Mutex<Vec<(String, Value)>>,
}

impl Stub {
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Let one waiting `gated` request answer.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Bodies posted to `/add_to_collection/<id>`, with their collection id.
    pub fn added(&self) -> Vec<(String, Value)> {
        self.added.lock().unwrap().clone()
    }
}

pub fn cats_page(page: u32) -> Value {
    match page {
        1 => json!({
            "results": {
                "wikipedia": [
                    {"title": "Cat", "pageid": 6678, "snippet": "The <span class=\"searchmatch\">cat</span> is a domestic species"},
                    {"title": "Cats (musical)", "pageid": 6679, "snippet": "Musical by Andrew Lloyd Webber"},
                    {"title": "Kitten", "pageid": 6680, "snippet": "A juvenile cat"}
                ],
                "met_museum": []
            },
            "current_page": 1,
            "total_pages": 2,
            "total_results": 5
        }),
        _ => json!({
            "results": {
                "met_museum": [
                    {
                        "title": "Cat Statuette",
                        "objectID": 544501,
                        "artistDisplayName": "",
                        "primaryImageSmall": "https://images.metmuseum.org/cat-small.jpg"
                    },
                    {"title": "Cat Mummy", "objectID": 544502}
                ]
            },
            "current_page": 2,
            "total_pages": 2,
            "total_results": 5
        }),
    }
}

async fn search(
    State(stub): State<Arc<Stub>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    stub.search_calls.fetch_add(1, Ordering::SeqCst);
    let query = params.get("q").cloned().unwrap_or_default();
    let page: u32 = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);

    match query.as_str() {
        "cats" => Json(cats_page(page)).into_response(),
        "vases" => Json(json!({
            "results": {
                "Cooper Hewitt": [{"title": "Vase", "id": "18643", "description": "Glazed porcelain vase"}],
                "Harvard Art Museums": [{"title": "Amphora", "objectid": 291204, "primaryimageurl": "https://nrs.harvard.edu/amphora"}]
            },
            "errors": ["Rijksmuseum: upstream timed out"],
            "current_page": 1,
            "total_pages": 1,
            "total_results": 2
        }))
        .into_response(),
        "legacy" => Json(json!({
            "wikipedia": [{"title": "Astrolabe", "pageid": 1}],
            "internet_archive": [{"title": "Astrolabe treatise", "identifier": "astrolabe-1391"}]
        }))
        .into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        "garbled" => "this is not json".into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(cats_page(page)).into_response()
        }
        "gated" => {
            stub.gate.notified().await;
            Json(cats_page(page)).into_response()
        }
        _ => Json(json!({
            "results": {"wikipedia": [], "met_museum": []},
            "current_page": 1,
            "total_pages": 0,
            "total_results": 0
        }))
        .into_response(),
    }
}

async fn details(Path((source, id)): Path<(String, String)>) -> Response {
    match (source.as_str(), id.as_str()) {
        ("met_museum", "544501") => Json(json!({
            "objectID": 544501,
            "title": "Cat Statuette",
            "artistDisplayName": "Unknown Egyptian artisan",
            "objectDate": "664-332 B.C.",
            "medium": "Bronze",
            "dimensions": "h. 11 cm",
            "department": "Egyptian Art",
            "primaryImage": "https://images.metmuseum.org/cat-large.jpg"
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"error": "Item not found"}))).into_response(),
    }
}

async fn collections() -> Json<Value> {
    Json(json!([
        {"id": 1, "title": "Favourites"},
        {"id": 2, "title": "Egyptian cats"}
    ]))
}

async fn add_to_collection(
    State(stub): State<Arc<Stub>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.added.lock().unwrap().push((id, body));
    Json(json!({"message": "Item added to collection successfully"}))
}

/// Serve the stub on an ephemeral local port.
pub async fn spawn(stub: Arc<Stub>) -> SocketAddr {
    let app = Router::new()
        .route("/api/search", get(search))
        .route("/api/details/{source}/{id}", get(details))
        .route("/api/collections", get(collections))
        .route("/add_to_collection/{id}", post(add_to_collection))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}
