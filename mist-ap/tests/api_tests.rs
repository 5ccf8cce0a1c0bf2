//! HTTP API tests
//!
//! Routes are exercised with `tower::ServiceExt::oneshot` against a service
//! whose catalog is the local fixture server and whose player only records.

mod helpers;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use mist_ap::api::{create_router, AppState};
use mist_ap::playback::{PlayTarget, Playback};
use mist_ap::service::SoundService;
use mist_common::config::PlayerSettings;

/// Records targets instead of playing them
#[derive(Default)]
struct RecordingPlayer {
    played: Mutex<Vec<PlayTarget>>,
}

#[async_trait]
impl Playback for RecordingPlayer {
    async fn play(&self, target: &PlayTarget, _volume: f32) -> bool {
        self.played.lock().unwrap().push(target.clone());
        true
    }
}

struct TestApp {
    router: axum::Router,
    player: Arc<RecordingPlayer>,
    fixture: helpers::Fixture,
}

async fn setup(extended_details: bool) -> TestApp {
    let fixture = helpers::start_fixture().await;
    let player = Arc::new(RecordingPlayer::default());
    let settings = PlayerSettings {
        catalog_url: fixture.base_url(),
        extended_details,
        ..PlayerSettings::default()
    };
    let service = SoundService::new(settings, reqwest::Client::new(), player.clone());
    let router = create_router(AppState {
        service: Arc::new(service),
        port: 5760,
    });
    TestApp {
        router,
        player,
        fixture,
    }
}

/// Send a request and return status plus body text
async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json_body) => builder
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get(app: &TestApp, uri: &str) -> (StatusCode, String) {
    send(app, Method::GET, uri, None).await
}

async fn post_play(app: &TestApp, body: Value) -> String {
    let (status, text) = send(app, Method::POST, "/api/v1/play", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    text
}

#[tokio::test]
async fn test_health() {
    let app = setup(false).await;
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "mist-ap");
    assert_eq!(json["port"], 5760);
}

#[tokio::test]
async fn test_search() {
    let app = setup(false).await;
    let (status, body) = get(&app, "/api/v1/search?query=airhorn").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "1. airhorn → `airhorn-1`\n2. mlg airhorn → `mlg-airhorn-2`");

    let (_, body) = get(&app, "/api/v1/search?query=zzz").await;
    assert_eq!(body, "No sounds found for \"zzz\"");
}

#[tokio::test]
async fn test_search_without_query_is_bad_request() {
    let app = setup(false).await;
    let (status, body) = get(&app, "/api/v1/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_categories_and_browse() {
    let app = setup(false).await;

    let (_, body) = get(&app, "/api/v1/categories").await;
    assert_eq!(body.lines().count(), 14);
    assert!(body.lines().any(|l| l == "whatsapp audios"));

    let (_, body) = get(&app, "/api/v1/categories/MEMES").await;
    assert_eq!(body, "**memes:**\n1. bruh → `bruh-77`\n2. vine boom → `vine-boom-392`");

    let (_, body) = get(&app, "/api/v1/categories/Anime%20&%20Manga").await;
    assert!(body.starts_with("**anime & manga:**\n"));

    let (_, body) = get(&app, "/api/v1/categories/cooking").await;
    assert_eq!(body, "No sounds in category \"cooking\"");
}

#[tokio::test]
async fn test_trending_and_best() {
    let app = setup(false).await;

    let (_, body) = get(&app, "/api/v1/trending").await;
    assert_eq!(
        body,
        format!("bruh-77: \"bruh\" → {}", app.fixture.url("/media/sounds/bruh.mp3"))
    );

    let (_, body) = get(&app, "/api/v1/best").await;
    assert_eq!(body.lines().count(), 2);
    assert!(body.starts_with("airhorn-1: \"airhorn\" → "));
}

#[tokio::test]
async fn test_play_by_slug_prefers_exact_match() {
    let app = setup(false).await;
    let reply = post_play(&app, json!({ "slug": "mlg-airhorn-2", "wait": true })).await;
    assert_eq!(reply, "🔊 mlg airhorn");

    let played = app.player.played.lock().unwrap().clone();
    assert_eq!(
        played,
        vec![PlayTarget::Url(app.fixture.url("/media/sounds/mlg-airhorn.mp3"))]
    );
}

#[tokio::test]
async fn test_play_messages() {
    let app = setup(false).await;

    assert_eq!(
        post_play(&app, json!({ "query": "nothing" })).await,
        "No sounds found for \"nothing\""
    );
    assert_eq!(
        post_play(&app, json!({ "slug": "ghost-1" })).await,
        "Sound \"ghost-1\" not found"
    );
    assert_eq!(post_play(&app, json!({})).await, "Provide slug, url, or query.");
    assert_eq!(
        post_play(&app, json!({ "url": "file:///etc/hosts", "wait": true })).await,
        "Unsupported URL \"file:///etc/hosts\"; use http or https."
    );
    assert!(post_play(&app, json!({ "query": "error" }))
        .await
        .starts_with("Catalog unavailable"));

    assert!(app.player.played.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_play_with_extended_details_reports_duration() {
    let app = setup(true).await;
    let reply = post_play(&app, json!({ "query": "airhorn", "wait": true })).await;
    assert_eq!(reply, "🔊 airhorn (10.0s)");
}

#[tokio::test]
async fn test_sound_details() {
    let app = setup(true).await;
    let (status, body) = get(&app, "/api/v1/sounds/airhorn-1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("**Airhorn**\n"));
    assert!(body.contains("Slug: `airhorn-1`"));
    assert!(body.contains("The classic."));
    assert!(body.ends_with("Duration: 10.0s"));

    let (_, body) = get(&app, "/api/v1/sounds/nope-3").await;
    assert_eq!(body, "Sound \"nope-3\" not found");
}

#[tokio::test]
async fn test_sound_details_disabled() {
    let app = setup(false).await;
    let (_, body) = get(&app, "/api/v1/sounds/airhorn-1").await;
    assert_eq!(body, "Sound details are disabled.");
}

#[tokio::test]
async fn test_queue_status() {
    let app = setup(false).await;
    let (status, body) = get(&app, "/api/v1/queue").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, json!({ "pending": 0, "playing": false }));
}
