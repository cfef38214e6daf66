//! Integration tests — build the router over the offline local provider
//! and exercise every endpoint with in-process requests.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;

use pacta_api::{AppState, config::ApiConfig};
use pacta_core::config::{ProviderRegistry, RegistryConfig};
use pacta_core::store::{InMemoryVectorStore, VectorStore};

fn test_state() -> (AppState, Arc<InMemoryVectorStore>) {
    let registry = ProviderRegistry::new(RegistryConfig::local_only()).expect("valid registry");
    let store = Arc::new(InMemoryVectorStore::new());
    let state = AppState::build(
        &registry,
        store.clone() as Arc<dyn VectorStore>,
        ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            providers_path: None,
        },
        CancellationToken::new(),
    )
    .expect("state builds");
    (state, store)
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn chunk_json(id: Uuid, document_id: Uuid, content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "documentId": document_id,
        "content": content,
    })
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

#[tokio::test]
async fn generate_returns_embeddings_in_input_order() {
    let (state, _) = test_state();
    let app = pacta_api::router(state);

    let doc = Uuid::new_v4();
    let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let chunks: Vec<serde_json::Value> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| chunk_json(*id, doc, &format!("clause {i}")))
        .collect();

    let resp = app
        .oneshot(json_request(
            "/embeddings/generate",
            serde_json::Value::Array(chunks),
        ))
        .await
        .expect("request");

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let embeddings = json.as_array().expect("array response");
    assert_eq!(embeddings.len(), 3);
    for (id, embedding) in ids.iter().zip(embeddings) {
        assert_eq!(embedding["chunkId"], serde_json::json!(id));
        assert_eq!(embedding["vector"].as_array().unwrap().len(), 768);
        assert_eq!(embedding["model"], "local-fnv");
    }
}

#[tokio::test]
async fn generate_rejects_empty_chunk_list() {
    let (state, _) = test_state();
    let app = pacta_api::router(state);

    let resp = app
        .oneshot(json_request("/embeddings/generate", serde_json::json!([])))
        .await
        .expect("request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn generate_single_returns_one_embedding() {
    let (state, _) = test_state();
    let app = pacta_api::router(state);

    let resp = app
        .oneshot(json_request(
            "/embeddings/generate-single",
            serde_json::json!({"text": "indemnification clause"}),
        ))
        .await
        .expect("request");

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["vector"].as_array().unwrap().len(), 768);
    assert!(json.get("id").is_some());
}

#[tokio::test]
async fn generate_single_rejects_blank_text() {
    let (state, _) = test_state();
    let app = pacta_api::router(state);

    let resp = app
        .oneshot(json_request(
            "/embeddings/generate-single",
            serde_json::json!({"text": "   "}),
        ))
        .await
        .expect("request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_defaults_to_not_started_for_unseen_document() {
    let (state, _) = test_state();
    let app = pacta_api::router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .uri(format!("/embeddings/status/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request");

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["stage"], "Not started");
    assert_eq!(json["progress"], 0.0);
}

#[tokio::test]
async fn batch_process_accepts_then_completes_and_persists() {
    let (state, store) = test_state();
    let app = pacta_api::router(state);

    let doc = Uuid::new_v4();
    let chunks: Vec<serde_json::Value> = (0..5)
        .map(|i| chunk_json(Uuid::new_v4(), doc, &format!("term {i}")))
        .collect();

    let resp = app
        .clone()
        .oneshot(json_request(
            &format!("/embeddings/batch-process/{doc}"),
            serde_json::Value::Array(chunks),
        ))
        .await
        .expect("request");

    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let ack = body_json(resp).await;
    assert_eq!(ack["documentId"], serde_json::json!(doc));

    // Poll the status endpoint until the background run finishes.
    let mut completed = false;
    for _ in 0..50 {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/embeddings/status/{doc}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("status request");
        let json = body_json(resp).await;
        if json["progress"] == 1.0 {
            completed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert!(completed, "background pipeline did not complete");
    assert_eq!(store.count(doc), 5);
}

#[tokio::test]
async fn batch_process_rejects_empty_chunk_list() {
    let (state, _) = test_state();
    let app = pacta_api::router(state);

    let resp = app
        .oneshot(json_request(
            &format!("/embeddings/batch-process/{}", Uuid::new_v4()),
            serde_json::json!([]),
        ))
        .await
        .expect("request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_ok() {
    let (state, _) = test_state();
    let app = pacta_api::router(state);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/embeddings/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request");

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["service"], "pacta-embeddings");
    assert_eq!(json["status"], "ok");
    assert!(json.get("timestamp").is_some());
}
