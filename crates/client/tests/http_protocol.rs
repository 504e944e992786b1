use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use quotedesk_client::{load_catalog, submit_quote, ApiError, HttpQuoteApi, SubmissionError};
use quotedesk_core::cpq::{CatalogLoad, ProductCatalog, QuoteDraft};
use quotedesk_core::domain::product::ProductId;
use quotedesk_core::domain::quote::QuoteId;

#[derive(Clone, Default)]
struct StubState {
    created_bodies: Arc<Mutex<Vec<Value>>>,
    omit_id: bool,
}

async fn products() -> Json<Value> {
    Json(json!([
        { "id": 1, "name": "Widget", "price": 10.0, "has_colors": true,
          "colors": ["red", "blue"], "is_kit": false, "kit_components": [] },
        { "id": 2, "name": "Kit", "price": 0.0, "has_colors": false,
          "colors": [], "is_kit": true, "kit_components": [10, 11, 12] }
    ]))
}

async fn create_quote(State(state): State<StubState>, Json(body): Json<Value>) -> Json<Value> {
    state.created_bodies.lock().await.push(body);
    if state.omit_id {
        Json(json!({ "total": 10.0 }))
    } else {
        Json(json!({ "id": 42, "total": 10.0 }))
    }
}

async fn fetch_quote(Path(id): Path<i64>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if id != 42 {
        return Err((StatusCode::NOT_FOUND, Json(json!({ "error": "Quote not found" }))));
    }
    Ok(Json(json!({
        "id": 42,
        "customer": "Acme",
        "total": 10.0,
        "items": [
            { "product_id": 1, "product_name": "Widget", "quantity": 1,
              "color": "blue", "order": 0, "is_kit_component": false }
        ]
    })))
}

async fn spawn_stub(state: StubState) -> SocketAddr {
    let app = Router::new()
        .route("/products", get(products))
        .route("/quotes", post(create_quote))
        .route("/quotes/{id}", get(fetch_quote))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

fn client_for(addr: SocketAddr) -> HttpQuoteApi {
    HttpQuoteApi::new(&format!("http://{addr}"), Duration::from_secs(5), Duration::from_secs(2))
        .expect("client")
}

#[tokio::test]
async fn widget_flow_posts_payload_and_returns_refetched_quote() {
    let state = StubState::default();
    let api = client_for(spawn_stub(state.clone()).await);

    let mut catalog = ProductCatalog::default();
    let status = load_catalog(&api, &mut catalog).await;
    assert_eq!(status, CatalogLoad::Loaded { products: 2 });

    let widget = catalog.find_by_id(ProductId(1)).expect("widget").clone();
    let mut draft = QuoteDraft::new();
    let index = draft.add_item(&widget);
    draft.set_color(index, "blue").expect("color");

    let confirmed = submit_quote(&api, "Acme", &draft).await.expect("submit");

    assert_eq!(confirmed.id, Some(QuoteId(42)));
    assert_eq!(confirmed.items[0].color.as_deref(), Some("blue"));

    let bodies = state.created_bodies.lock().await;
    assert_eq!(
        bodies[0],
        json!({
            "customer": "Acme",
            "items": [{ "product_id": 1, "quantity": 1, "color": "blue" }]
        })
    );
}

#[tokio::test]
async fn kit_flow_sends_reversed_kit_order() {
    let state = StubState::default();
    let api = client_for(spawn_stub(state.clone()).await);

    let mut catalog = ProductCatalog::default();
    load_catalog(&api, &mut catalog).await;
    let kit = catalog.find_by_id(ProductId(2)).expect("kit").clone();
    let mut draft = QuoteDraft::new();
    let index = draft.add_item(&kit);
    draft.reverse_kit_order(index).expect("reverse");

    submit_quote(&api, "Acme", &draft).await.expect("submit");

    let bodies = state.created_bodies.lock().await;
    assert_eq!(bodies[0]["items"][0]["kit_order"], json!([12, 11, 10]));
    assert!(bodies[0]["items"][0].get("color").is_none());
}

#[tokio::test]
async fn create_without_id_surfaces_missing_quote_id() {
    let state = StubState { omit_id: true, ..StubState::default() };
    let api = client_for(spawn_stub(state).await);

    let result = submit_quote(&api, "Acme", &QuoteDraft::new()).await;

    assert!(matches!(result, Err(SubmissionError::MissingQuoteId)));
}

#[tokio::test]
async fn unreachable_backend_degrades_to_empty_catalog() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let api = client_for(addr);

    let mut catalog = ProductCatalog::default();
    let status = load_catalog(&api, &mut catalog).await;

    assert!(catalog.is_empty());
    assert!(matches!(status, CatalogLoad::Unavailable { .. }));
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let api = client_for(spawn_stub(StubState::default()).await);

    let result = quotedesk_client::QuoteApi::fetch_quote(&api, QuoteId(9)).await;

    let error = result.expect_err("missing quote");
    assert!(matches!(error, ApiError::UnexpectedStatus { status: 404, .. }));
    assert!(error.to_string().ends_with("status 404: Quote not found"), "{error}");
}
