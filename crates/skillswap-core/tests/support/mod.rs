//! In-process fake of the SkillSwap backend for integration tests.

// Each test binary uses a different subset of the helpers.
#![allow(dead_code)]

use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use skillswap_core::ApiClient;

pub const ORIGIN: &str = "http://localhost:5173";

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Value {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| Value::String(v.to_string()))
        .unwrap_or(Value::Null)
}

/// Echo the request headers the client is responsible for.
fn echo(headers: &HeaderMap) -> Value {
    json!({
        "authorization": header_value(headers, header::AUTHORIZATION),
        "contentType": header_value(headers, header::CONTENT_TYPE),
        "origin": header_value(headers, header::ORIGIN),
    })
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    match (email.as_str(), password) {
        ("a@b.com", "secret") => (
            StatusCode::OK,
            Json(json!({
                "token": "t1",
                "user": {
                    "id": "u1",
                    "name": "Ann",
                    "email": "a@b.com",
                    "offered_skills": ["Guitar"],
                    "wanted_skills": []
                }
            })),
        )
            .into_response(),
        ("camel@b.com", "secret") => (
            StatusCode::OK,
            Json(json!({
                "token": "t2",
                "user": {
                    "_id": "u2",
                    "fullName": "Bea",
                    "email": "camel@b.com",
                    "location": "Lisbon",
                    "skillsOffered": ["Rust"],
                    "skillsWanted": ["Cooking"],
                    "availability": ["Weekends"],
                    "profilePicture": "https://img.test/bea.png"
                }
            })),
        )
            .into_response(),
        ("notoken@b.com", _) => (
            StatusCode::OK,
            Json(json!({ "user": { "id": "u3", "email": "notoken@b.com" } })),
        )
            .into_response(),
        ("nouser@b.com", _) => (StatusCode::OK, Json(json!({ "token": "t3" }))).into_response(),
        ("garbage@b.com", _) => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        )
            .into_response(),
    }
}

async fn signup(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({ "received": body, "headers": echo(&headers) })),
    )
}

async fn reset_password(
    Path(token): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    Json(json!({ "token": token, "password": body["password"], "headers": echo(&headers) }))
}

async fn echo_json(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "received": body, "headers": echo(&headers) }))
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    Json(json!({ "headers": echo(&headers) }))
}

async fn search_users(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({ "skill": params.get("skill") }))
}

async fn dashboard_for(Path(id): Path<String>) -> impl IntoResponse {
    if id == "down" {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream timeout").into_response();
    }
    Json(json!({ "userId": id })).into_response()
}

async fn own_dashboard() -> impl IntoResponse {
    (StatusCode::OK, "definitely not json")
}

async fn missing_route() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Cannot GET /api/swap/requests")
}

async fn update_status(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "id": id, "status": body["status"] }))
}

async fn delete_request(Path(id): Path<String>, headers: HeaderMap) -> Json<Value> {
    Json(json!({ "deleted": id, "headers": echo(&headers) }))
}

async fn upload(headers: HeaderMap, mut multipart: Multipart) -> impl IntoResponse {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        fields.push(json!({ "name": name, "fileName": file_name, "size": bytes }));
    }
    Json(json!({ "fields": fields, "headers": echo(&headers) }))
}

async fn matches() -> Json<Value> {
    Json(json!([
        {
            "id": "m1", "name": "Cy",
            "skillOffered": "Piano", "skillWanted": "Spanish", "matchScore": 92
        },
        {
            "id": "m2", "name": "Di",
            "skillOffered": "Chess", "skillWanted": "Guitar", "matchScore": 75
        }
    ]))
}

fn router() -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/forgot-password", post(echo_json))
        .route("/api/auth/reset-password/:token", post(reset_password))
        .route("/api/auth/change-password", post(echo_json))
        .route("/api/user/dashboard", get(own_dashboard))
        .route("/api/users/dashboard/:id", get(dashboard_for))
        .route("/api/user/profile", put(echo_json))
        .route("/api/users/profile", put(echo_json))
        .route("/api/users/profile-picture", post(upload))
        .route("/api/users", get(search_users))
        .route("/api/swap/request", post(echo_json))
        .route("/api/swap/requests", get(missing_route))
        .route("/api/swap/requests/:id", patch(update_status).delete(delete_request))
        .route("/api/feedback", get(echo_headers).post(echo_json))
        .route("/api/matches", get(matches))
}

/// Start the fake backend on an ephemeral port and return its base URL.
pub async fn spawn_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router())
            .await
            .expect("fake backend crashed");
    });
    format!("http://{}", addr)
}

pub async fn client() -> ApiClient {
    let base = spawn_backend().await;
    ApiClient::new(base, ORIGIN).expect("client should build")
}

/// Base URL of a port nothing listens on.
pub async fn dead_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{}", addr)
}
