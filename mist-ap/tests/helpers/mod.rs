//! Test helpers for mist-ap integration tests
//!
//! - A fixture HTTP server standing in for the catalog site and its media
//!   host (range-aware MP3 responses, redirects, scraped HTML pages)
//! - Fake player executables written as shell scripts

#![allow(dead_code)]

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use tokio::task::JoinHandle;

/// Size of the fixture clip: 10.0 s at 128 kbps
pub const CLIP_TOTAL: usize = 160_000;

/// Constant-bitrate MP3 stand-in: one MPEG-1 Layer III 128 kbps header, then zeros
pub fn clip_bytes() -> Vec<u8> {
    let mut bytes = vec![0u8; CLIP_TOTAL];
    bytes[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
    bytes
}

/// End offset of a `bytes=0-N` range request
fn requested_end(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::RANGE)?
        .to_str()
        .ok()?
        .strip_prefix("bytes=0-")?
        .parse()
        .ok()
}

async fn ranged_clip(headers: HeaderMap) -> Response {
    let body = clip_bytes();
    match requested_end(&headers) {
        Some(end) => {
            let end = end.min(body.len() - 1);
            (
                StatusCode::PARTIAL_CONTENT,
                [(
                    header::CONTENT_RANGE,
                    format!("bytes 0-{}/{}", end, body.len()),
                )],
                body[..=end].to_vec(),
            )
                .into_response()
        }
        None => body.into_response(),
    }
}

/// Ignores `Range` and sends the whole clip
async fn whole_clip() -> Response {
    clip_bytes().into_response()
}

/// Partial response whose total size is unknown
async fn unknown_total_clip() -> Response {
    let body = clip_bytes();
    (
        StatusCode::PARTIAL_CONTENT,
        [(header::CONTENT_RANGE, "bytes 0-4095/*".to_string())],
        body[..4096].to_vec(),
    )
        .into_response()
}

/// Partial response without `Content-Range`; only the body length is known
async fn partial_without_range_clip() -> Response {
    let body = clip_bytes();
    (StatusCode::PARTIAL_CONTENT, body[..4096].to_vec()).into_response()
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    name: Option<String>,
}

/// Results page in the catalog's markup
pub fn listing_html(entries: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body><div id=\"instants_container\">\n");
    for (i, (file, slug)) in entries.iter().enumerate() {
        html.push_str(&format!(
            "<div class=\"instant\"><button class=\"small-button\" \
             onclick=\"play('/media/sounds/{}', 'loader-{}', '{}')\"></button></div>\n",
            file, i, slug
        ));
    }
    html.push_str("</div></body></html>");
    html
}

fn airhorn_listing() -> String {
    listing_html(&[
        ("airhorn.mp3", "airhorn-1"),
        ("mlg-airhorn.mp3", "mlg-airhorn-2"),
    ])
}

async fn search_page(Query(query): Query<SearchQuery>) -> Response {
    let name = query.name.unwrap_or_default();
    if name.contains("error") {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if name.contains("airhorn") {
        return Html(airhorn_listing()).into_response();
    }
    Html(listing_html(&[])).into_response()
}

async fn category_page(Path(name): Path<String>) -> Response {
    if name == "memes" || name == "anime & manga" {
        Html(listing_html(&[("bruh.mp3", "bruh-77"), ("vine-boom.mp3", "vine-boom-392")]))
            .into_response()
    } else {
        Html(listing_html(&[])).into_response()
    }
}

async fn trending_page() -> Html<String> {
    Html(listing_html(&[("bruh.mp3", "bruh-77")]))
}

async fn best_page() -> Html<String> {
    Html(airhorn_listing())
}

async fn detail_page(Path(slug): Path<String>) -> Response {
    if slug != "airhorn-1" {
        return StatusCode::NOT_FOUND.into_response();
    }
    Html(
        "<html><head>\
         <meta property=\"og:title\" content=\"Airhorn\">\
         <meta property=\"og:description\" content=\"The classic.\">\
         <meta property=\"og:audio\" content=\"/media/sounds/airhorn.mp3\">\
         </head><body></body></html>"
            .to_string(),
    )
    .into_response()
}

/// Running fixture server, aborted on drop
pub struct Fixture {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl Fixture {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start the fixture server on an ephemeral port
pub async fn start_fixture() -> Fixture {
    let app = Router::new()
        .route("/media/sounds/:file", get(ranged_clip))
        .route("/plain/:file", get(whole_clip))
        .route("/unknown-total.mp3", get(unknown_total_clip))
        .route("/partial-no-range.mp3", get(partial_without_range_clip))
        .route(
            "/redirect.mp3",
            get(|| async { Redirect::temporary("/media/sounds/airhorn.mp3") }),
        )
        .route("/en/search/", get(search_page))
        .route("/en/categories/:name/", get(category_page))
        .route("/en/index/us/", get(trending_page))
        .route("/en/best_of_all_time/", get(best_page))
        .route("/en/instant/:slug/", get(detail_page));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let addr = listener.local_addr().expect("fixture address");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Fixture { addr, handle }
}

/// Write an executable `#!/bin/sh` script named `name` into `dir`
#[cfg(unix)]
pub fn write_player_script(dir: &FsPath, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod script");
    path
}

/// Arguments for fake players: just the target
pub fn target_only_args(target: &str, _volume: f32) -> Vec<String> {
    vec![target.to_string()]
}

/// Lines a recording script appended to `log`, empty if it never ran
pub fn read_log(log: &FsPath) -> Vec<String> {
    std::fs::read_to_string(log)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Files currently in `dir`
pub fn dir_entries(dir: &FsPath) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|rd| rd.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default()
}
