use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use bingo_admin_back::{
    config::AppConfig, dao::game_store::memory::InMemoryGameStore, routes, state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let state =
        AppState::with_store(AppConfig::default(), Arc::new(InMemoryGameStore::new())).await;
    routes::router(state)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    json_request("POST", uri, token, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn authorized(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn create_game(app: &Router, token: &str, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json("/api/admin/games", Some(token), json!({ "name": name })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["game"]["id"]
        .as_str()
        .unwrap()
        .to_owned()
}

async fn login(app: &Router) -> String {
    let credentials = AppConfig::default().admin;
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/admin/login",
            None,
            json!({ "email": credentials.email, "password": credentials.password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(cookie.starts_with("admin-token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    body["token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn health_is_public() {
    let response = app()
        .await
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn admin_routes_require_a_session() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/api/admin/games").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["kind"], "unauthorized");

    let response = app
        .oneshot(
            Request::get("/api/admin/games")
                .header(header::COOKIE, "admin-token=forged")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let response = app()
        .await
        .oneshot(post_json(
            "/api/admin/login",
            None,
            json!({ "email": "admin@bingo.local", "password": "nope" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn operator_runs_a_game_over_http() {
    let app = app().await;
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/admin/games",
            Some(&token),
            json!({ "name": "Bingo beneficente", "prize_full": 1000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let game = json_body(response).await["game"].clone();
    let game_id = game["id"].as_str().unwrap().to_owned();
    assert_eq!(game["status"], "waiting");

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/admin/games/{game_id}/draw"),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/admin/games/{game_id}/start"),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/admin/games/{game_id}/draw-manual"),
            Some(&token),
            json!({ "number": 7 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let drawn = json_body(response).await;
    assert_eq!(drawn["number"], 7);
    assert_eq!(drawn["isManual"], true);
    assert_eq!(drawn["remaining"], 74);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/admin/games/{game_id}/draw-manual"),
            Some(&token),
            json!({ "number": 76 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/android/games")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = json_body(response).await;
    assert_eq!(listing["games"][0]["id"], game_id.as_str());
    assert_eq!(listing["games"][0]["last_number"], 7);

    let response = app
        .oneshot(
            Request::get(format!("/api/android/prizes/{game_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_bodies_get_the_error_envelope() {
    let app = app().await;
    let token = login(&app).await;
    let game_id = create_game(&app, &token, "Bingo da quermesse").await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/admin/games/{game_id}/validate-bingo"),
            Some(&token),
            json!({ "participantId": "not-a-uuid", "claimType": "line" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body = json_body(response).await;
    assert_eq!(body["kind"], "validation");
    assert!(body["error"].as_str().unwrap().starts_with("invalid request body"));

    let response = app
        .oneshot(
            Request::post("/api/admin/participants")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["kind"], "validation");
}

#[tokio::test]
async fn games_are_edited_and_deleted_over_http() {
    let app = app().await;
    let token = login(&app).await;
    let game_id = create_game(&app, &token, "Bingo de sábado").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/games/{game_id}"),
            Some(&token),
            json!({ "name": "Bingo de domingo", "prize_line": 150 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let game = json_body(response).await["game"].clone();
    assert_eq!(game["name"], "Bingo de domingo");
    assert_eq!(game["status"], "waiting");

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/admin/games/{game_id}/start"),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authorized("DELETE", &format!("/api/admin/games/{game_id}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["kind"], "conflict");

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/admin/games/{game_id}/finish"),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authorized("DELETE", &format!("/api/admin/games/{game_id}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "Jogo deletado com sucesso");

    let response = app
        .oneshot(authorized("GET", &format!("/api/admin/games/{game_id}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn prize_catalog_is_maintained_over_http() {
    let app = app().await;
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_json("/api/admin/prizes", Some(&token), json!({ "type": "line" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/admin/prizes",
            Some(&token),
            json!({ "type": "full-card", "title": "Televisão", "value": 2000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let prize_id = json_body(response).await["prize"]["id"]
        .as_str()
        .unwrap()
        .to_owned();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/admin/prizes",
            Some(&token),
            json!({ "id": prize_id, "title": "Smart TV" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authorized("GET", "/api/admin/prizes", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let prizes = json_body(response).await["prizes"].clone();
    assert_eq!(prizes[0]["type"], "full-card");
    assert_eq!(prizes[0]["title"], "Smart TV");
    assert_eq!(prizes[0]["value"], 2000.0);
}
