//! Sound service
//!
//! The operations exposed to callers. Every operation answers with
//! human-readable text; catalog and playback failures are logged and turned
//! into a message instead of being returned as errors.

use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use mist_common::config::{clamp_volume, PlayerSettings};
use mist_common::human_time::format_clip_duration;

use crate::catalog::{self, CatalogClient, SoundEntry};
use crate::error::{Error, Result};
use crate::playback::{
    BinaryLocator, DurationEstimator, PlayTarget, Playback, PlaybackQueue, PlayerChain,
};

/// Listings show at most this many sounds
const LISTING_LIMIT: usize = 20;

/// Build the outbound HTTP client shared by catalog, estimator and downloads
pub fn build_http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(format!("mist/{}", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// A play request; the first of `query`, `slug`, `url` that is set wins
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayRequest {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    /// Wait for playback to finish (defaults to the configured value)
    #[serde(default)]
    pub wait: Option<bool>,
    #[serde(default)]
    pub volume: Option<f32>,
}

/// Why a play request could not be turned into a sound
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No sounds found for \"{0}\"")]
    NoResults(String),

    #[error("Sound \"{0}\" not found")]
    SlugNotFound(String),

    #[error("Provide slug, url, or query.")]
    MissingTarget,

    #[error("Unsupported URL \"{0}\"; use http or https.")]
    UnsupportedUrl(String),

    #[error("Catalog unavailable: {0}")]
    Catalog(#[from] Error),
}

/// A request resolved to something playable
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSound {
    pub name: String,
    pub url: String,
}

impl ResolvedSound {
    pub fn target(&self) -> PlayTarget {
        PlayTarget::parse(&self.url)
    }
}

impl From<SoundEntry> for ResolvedSound {
    fn from(entry: SoundEntry) -> Self {
        Self {
            name: entry.name,
            url: entry.url,
        }
    }
}

/// Name for a direct URL: last path segment without its extension
fn name_from_url(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext))
            if !ext.is_empty() && ext.chars().all(|c| c.is_alphanumeric() || c == '_') =>
        {
            stem.to_string()
        }
        _ => last.to_string(),
    }
}

/// Treat empty strings like missing fields
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn numbered_list(results: &[SoundEntry]) -> String {
    results
        .iter()
        .take(LISTING_LIMIT)
        .enumerate()
        .map(|(i, r)| format!("{}. {} → `{}`", i + 1, r.name, r.slug))
        .collect::<Vec<_>>()
        .join("\n")
}

fn link_list(results: &[SoundEntry]) -> String {
    results
        .iter()
        .map(|r| format!("{}: \"{}\" → {}", r.slug, r.name, r.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Catalog lookups and playback behind text-returning operations
pub struct SoundService {
    catalog: CatalogClient,
    player: Arc<dyn Playback>,
    queue: Arc<PlaybackQueue>,
    estimator: DurationEstimator,
    settings: PlayerSettings,
}

impl SoundService {
    /// Service playing through `player`; the queue shares the same player
    pub fn new(settings: PlayerSettings, client: reqwest::Client, player: Arc<dyn Playback>) -> Self {
        let queue = PlaybackQueue::new(Arc::clone(&player), settings.volume);
        Self {
            catalog: CatalogClient::new(client.clone(), settings.catalog_url.clone()),
            player,
            queue,
            estimator: DurationEstimator::new(client),
            settings,
        }
    }

    /// Service over the stock player chain for this host
    pub fn from_settings(settings: PlayerSettings) -> Result<Self> {
        let client = build_http_client()?;
        let chain = PlayerChain::new(Arc::new(BinaryLocator::new()), client.clone());
        info!(
            players = chain.players().len(),
            "Player chain configured"
        );
        Ok(Self::new(settings, client, Arc::new(chain)))
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn queue(&self) -> &Arc<PlaybackQueue> {
        &self.queue
    }

    pub async fn search(&self, query: &str) -> String {
        match self.catalog.search(query).await {
            Ok(results) if results.is_empty() => format!("No sounds found for \"{}\"", query),
            Ok(results) => numbered_list(&results),
            Err(e) => {
                warn!("Search for {:?} failed: {}", query, e);
                format!("Search failed: {}", e)
            }
        }
    }

    pub fn categories(&self) -> String {
        catalog::CATEGORIES.join("\n")
    }

    /// Top sounds in a category; unknown names are passed through as typed
    pub async fn browse(&self, category: &str) -> String {
        let name = catalog::match_category(category).unwrap_or(category);
        match self.catalog.category(name).await {
            Ok(results) if results.is_empty() => {
                format!("No sounds in category \"{}\"", category)
            }
            Ok(results) => format!("**{}:**\n{}", name, numbered_list(&results)),
            Err(e) => {
                warn!("Browsing category {:?} failed: {}", name, e);
                format!("Could not load category \"{}\": {}", category, e)
            }
        }
    }

    pub async fn trending(&self) -> String {
        match self.catalog.trending().await {
            Ok(results) if results.is_empty() => "No trending sounds.".to_string(),
            Ok(results) => link_list(&results),
            Err(e) => {
                warn!("Loading trending sounds failed: {}", e);
                format!("Could not load trending sounds: {}", e)
            }
        }
    }

    pub async fn best_of_all_time(&self) -> String {
        match self.catalog.best_of_all_time().await {
            Ok(results) if results.is_empty() => "No results.".to_string(),
            Ok(results) => link_list(&results),
            Err(e) => {
                warn!("Loading best-of-all-time sounds failed: {}", e);
                format!("Could not load best sounds: {}", e)
            }
        }
    }

    /// Turn a request into a named, playable URL
    pub async fn resolve(&self, request: &PlayRequest) -> std::result::Result<ResolvedSound, ResolveError> {
        if let Some(query) = non_empty(&request.query) {
            let results = self.catalog.search(query).await?;
            return results
                .into_iter()
                .next()
                .map(ResolvedSound::from)
                .ok_or_else(|| ResolveError::NoResults(query.to_string()));
        }

        if let Some(slug) = non_empty(&request.slug) {
            let results = self.catalog.search(&slug.replace('-', " ")).await?;
            let exact = results.iter().position(|r| r.slug == slug);
            return results
                .into_iter()
                .nth(exact.unwrap_or(0))
                .map(ResolvedSound::from)
                .ok_or_else(|| ResolveError::SlugNotFound(slug.to_string()));
        }

        if let Some(url) = non_empty(&request.url) {
            if !PlayTarget::parse(url).is_url() {
                return Err(ResolveError::UnsupportedUrl(url.to_string()));
            }
            return Ok(ResolvedSound {
                name: name_from_url(url),
                url: url.to_string(),
            });
        }

        Err(ResolveError::MissingTarget)
    }

    /// Play `sound` through the player chain and wait for it to finish
    pub async fn play_blocking(&self, sound: &ResolvedSound, volume: f32) -> bool {
        self.player.play(&sound.target(), clamp_volume(volume)).await
    }

    /// Queue `sound` and return without waiting for audio
    pub async fn play_background(&self, sound: &ResolvedSound, volume: f32) {
        self.queue
            .enqueue_with_volume(sound.target(), clamp_volume(volume))
            .await;
    }

    /// Estimated length of a remote sound, when extended details are on
    async fn estimate(&self, sound: &ResolvedSound) -> Option<f64> {
        if !self.settings.extended_details {
            return None;
        }
        match sound.target() {
            PlayTarget::Url(url) => self.estimator.estimate(&url).await,
            PlayTarget::File(_) => None,
        }
    }

    pub async fn play_sound(&self, request: PlayRequest) -> String {
        let sound = match self.resolve(&request).await {
            Ok(sound) => sound,
            Err(e) => {
                if let ResolveError::Catalog(ref inner) = e {
                    warn!("Resolving play request failed: {}", inner);
                }
                return e.to_string();
            }
        };

        let volume = request.volume.unwrap_or(self.settings.volume);
        let wait = request.wait.unwrap_or(self.settings.wait);
        info!(name = %sound.name, wait, "Play request");

        let (played, duration) = if wait {
            tokio::join!(self.play_blocking(&sound, volume), self.estimate(&sound))
        } else {
            self.play_background(&sound, volume).await;
            (true, self.estimate(&sound).await)
        };

        let mut reply = format!("🔊 {}", sound.name);
        if let Some(seconds) = duration {
            reply.push_str(&format!(" ({})", format_clip_duration(seconds)));
        }
        if !played {
            reply.push_str(" (could not play)");
        }
        reply
    }

    /// Detail page summary for a slug, or for the first result of a query
    pub async fn sound_details(&self, slug: Option<&str>, query: Option<&str>) -> String {
        if !self.settings.extended_details {
            return "Sound details are disabled.".to_string();
        }

        let slug = match (slug.filter(|s| !s.is_empty()), query.filter(|q| !q.is_empty())) {
            (Some(slug), _) => slug.to_string(),
            (None, Some(query)) => match self.catalog.search(query).await {
                Ok(results) => match results.into_iter().next() {
                    Some(first) => first.slug,
                    None => return format!("No sounds found for \"{}\"", query),
                },
                Err(e) => {
                    warn!("Search for {:?} failed: {}", query, e);
                    return format!("Search failed: {}", e);
                }
            },
            (None, None) => return "Provide slug or query.".to_string(),
        };

        let mut details = match self.catalog.details(&slug).await {
            Ok(Some(details)) => details,
            Ok(None) => return format!("Sound \"{}\" not found", slug),
            Err(e) => {
                warn!("Loading details for {} failed: {}", slug, e);
                return format!("Could not load sound \"{}\": {}", slug, e);
            }
        };
        details.duration_secs = self.estimator.estimate(&details.url).await;

        let mut lines = vec![
            format!("**{}**", details.title),
            format!("Slug: `{}`", details.slug),
            format!("URL: {}", details.url),
        ];
        if let Some(description) = &details.description {
            lines.push(description.clone());
        }
        lines.push(format!(
            "Duration: {}",
            mist_common::human_time::format_clip_duration_opt(details.duration_secs)
        ));
        lines.join("\n")
    }
}
