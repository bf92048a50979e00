use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{CategoryId, CityId, SortKey},
    error::UPDATE_EVENT_FAILED,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    bodies: Arc<Mutex<Vec<Value>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

fn event_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "desc",
        "address": "1 Rustaveli Ave",
        "eventDate": "2026-11-02T18:30:00.000Z",
        "city": { "id": "c1", "name": "Tbilisi" },
        "categories": [
            { "id": "k1", "name": "Music" },
            { "id": "k2", "name": "Outdoor" }
        ]
    })
}

async fn handle_list(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
    state.bodies.lock().await.push(body);
    Json(json!([event_json("e1", "Jazz"), event_json("e2", "Rock")]))
}

async fn handle_get(Path(id): Path<String>) -> impl IntoResponse {
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Event not found" })),
        )
            .into_response();
    }
    Json(event_json(&id, "Jazz")).into_response()
}

async fn handle_create(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.bodies.lock().await.push(body);
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": ["title must be unique", "address is taken"] })),
    )
}

async fn handle_update(Path(_id): Path<String>) -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn handle_delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.deleted.lock().await.push(id);
    StatusCode::NO_CONTENT
}

async fn handle_cities() -> Json<Value> {
    Json(json!([{ "id": "c1", "name": "Tbilisi" }, { "id": "c2", "name": "Batumi" }]))
}

async fn spawn_events_server() -> (String, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/events/list", post(handle_list))
        .route("/api/events", post(handle_create))
        .route(
            "/api/events/:id",
            get(handle_get).patch(handle_update).delete(handle_delete),
        )
        .route("/api/events/recommended/:id", get(handle_list_recommended))
        .route("/api/cities/list", get(handle_cities))
        .route("/api/categories/list", get(handle_cities))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api"), state)
}

async fn handle_list_recommended(Path(_id): Path<String>) -> Json<Value> {
    Json(json!([event_json("e9", "Recommended")]))
}

#[tokio::test]
async fn list_events_posts_sparse_body_and_decodes_page() {
    let (base_url, state) = spawn_events_server().await;
    let client = HttpEventsClient::new(&base_url).expect("client");

    let request = ListEventsRequest {
        page_size: 5,
        page_number: 2,
        title: Some("jazz".into()),
        city_ids: vec![CityId::new("c1")],
        category_ids: Vec::new(),
        sort_by: Some(SortKey::EventDate),
    };
    let events = client.list_events(&request).await.expect("list");

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, EventId::new("e1"));
    assert_eq!(events[0].city_name(), "Tbilisi");
    assert_eq!(events[1].category_names(), vec!["Music", "Outdoor"]);

    let bodies = state.bodies.lock().await;
    assert_eq!(
        bodies[0],
        json!({
            "pageSize": 5,
            "pageNumber": 2,
            "title": "jazz",
            "cityIds": ["c1"],
            "sortBy": "eventDate"
        })
    );
}

#[tokio::test]
async fn get_event_surfaces_server_message_on_not_found() {
    let (base_url, _) = spawn_events_server().await;
    let client = HttpEventsClient::new(&base_url).expect("client");

    let found = client.get_event(&EventId::new("e5")).await.expect("get");
    assert_eq!(found.id, EventId::new("e5"));

    let err = client
        .get_event(&EventId::new("missing"))
        .await
        .expect_err("missing event");
    match &err {
        ClientError::Endpoint { status, message } => {
            assert_eq!(*status, 404);
            assert_eq!(message.as_deref(), Some("Event not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message("fallback"), "Event not found");
}

#[tokio::test]
async fn create_event_joins_list_messages() {
    let (base_url, state) = spawn_events_server().await;
    let client = HttpEventsClient::new(&base_url).expect("client");

    let payload = EventPayload {
        title: "Jazz".into(),
        address: "1 Main".into(),
        city_id: Some(CityId::new("c1")),
        category_ids: vec![CategoryId::new("k1"), CategoryId::new("k2")],
        event_date: None,
        description: String::new(),
    };
    let err = client.create_event(&payload).await.expect_err("rejected");
    assert_eq!(
        err.user_message("fallback"),
        "title must be unique, address is taken"
    );

    let bodies = state.bodies.lock().await;
    assert_eq!(
        bodies[0],
        json!({
            "title": "Jazz",
            "address": "1 Main",
            "cityId": "c1",
            "categoryIds": ["k1", "k2"]
        })
    );
}

#[tokio::test]
async fn update_event_without_json_body_uses_fallback() {
    let (base_url, _) = spawn_events_server().await;
    let client = HttpEventsClient::new(&base_url).expect("client");

    let err = client
        .update_event(&EventId::new("e1"), &EventPayload::default())
        .await
        .expect_err("server error");
    assert!(matches!(
        err,
        ClientError::Endpoint {
            status: 500,
            message: None
        }
    ));
    assert_eq!(err.user_message(UPDATE_EVENT_FAILED), UPDATE_EVENT_FAILED);
}

#[tokio::test]
async fn delete_and_reference_routes_resolve_under_base_path() {
    let (base_url, state) = spawn_events_server().await;
    let client = HttpEventsClient::new(&format!("{base_url}/")).expect("client");

    client
        .delete_event(&EventId::new("e7"))
        .await
        .expect("delete");
    assert_eq!(state.deleted.lock().await.as_slice(), ["e7".to_string()]);

    let cities = client.list_cities().await.expect("cities");
    assert_eq!(cities.len(), 2);
    assert_eq!(cities[1].name, "Batumi");

    let recommended = client
        .recommended_events(&EventId::new("e1"))
        .await
        .expect("recommended");
    assert_eq!(recommended[0].title, "Recommended");
}

#[tokio::test]
async fn unreachable_server_maps_to_generic_message() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpEventsClient::new(&format!("http://{addr}/api")).expect("client");
    let err = client.list_cities().await.expect_err("connection refused");
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(
        err.user_message("fallback"),
        shared::error::UNEXPECTED_ERROR
    );
}

#[test]
fn rejects_relative_base_url() {
    assert!(matches!(
        HttpEventsClient::new("not a url"),
        Err(ClientError::InvalidUrl(_))
    ));
    assert!(matches!(
        HttpEventsClient::new("mailto:events@example.com"),
        Err(ClientError::InvalidUrl(_))
    ));
}
