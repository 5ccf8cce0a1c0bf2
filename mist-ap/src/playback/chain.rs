//! Player fallback chain
//!
//! Tries the configured players in priority order until one plays the target
//! and exits with status zero. Missing players are skipped; failing ones
//! hand over to the next candidate. Players that need a local file share a
//! single download per run, and the downloaded file is removed when the run
//! ends no matter how it ended.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::locator::BinaryLocator;
use super::players::{default_players, HostOs, Player};
use super::types::{PlayTarget, PlaybackOutcome};
use crate::error::{Error, Result};

/// Anything that can play a target to completion
#[async_trait]
pub trait Playback: Send + Sync {
    /// Play `target` at `volume` (0.0-1.0); true on success
    async fn play(&self, target: &PlayTarget, volume: f32) -> bool;
}

/// One player attempt within a chain run
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub player: String,
    pub outcome: PlaybackOutcome,
}

/// What happened during one chain run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainReport {
    /// Launched players in order; skipped (missing) players are not listed
    pub attempts: Vec<Attempt>,
    /// Player that succeeded, if any
    pub winner: Option<String>,
    /// Set when a needed download failed
    pub download_failed: bool,
}

impl ChainReport {
    pub fn succeeded(&self) -> bool {
        self.winner.is_some()
    }
}

/// Local copy state for one chain run
enum LocalCopy {
    /// Remote target, not fetched yet
    Pending,
    /// Target was a local file already
    Provided(PathBuf),
    /// Fetched clip, deleted when dropped
    Downloaded(TempPath),
    Failed,
}

/// Prioritized fallback over external players
pub struct PlayerChain {
    locator: Arc<BinaryLocator>,
    players: Vec<Player>,
    client: reqwest::Client,
    host_os: HostOs,
    temp_dir: PathBuf,
}

impl PlayerChain {
    /// Chain over the stock players for the current OS
    pub fn new(locator: Arc<BinaryLocator>, client: reqwest::Client) -> Self {
        Self::with_players(locator, client, default_players(), HostOs::current())
    }

    /// Chain over `players`, stably ordered by strategy priority
    pub fn with_players(
        locator: Arc<BinaryLocator>,
        client: reqwest::Client,
        mut players: Vec<Player>,
        host_os: HostOs,
    ) -> Self {
        players.sort_by_key(Player::priority);
        Self {
            locator,
            players,
            client,
            host_os,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Directory for downloaded clips
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Run the chain and describe every attempt
    pub async fn play_with_report(&self, target: &PlayTarget, volume: f32) -> ChainReport {
        let mut report = ChainReport::default();
        let mut local = match target {
            PlayTarget::Url(_) => LocalCopy::Pending,
            PlayTarget::File(path) => LocalCopy::Provided(path.clone()),
        };

        for player in self.players.iter().filter(|p| p.supported_on(self.host_os)) {
            let Some(program) = self.locator.resolve(player.program()) else {
                debug!(player = %player.name(), "Player not installed, skipping");
                continue;
            };

            let player_target = if player.requires_local_file() {
                match self.local_path(target, &mut local, &mut report).await {
                    Some(path) => PlayTarget::File(path),
                    None => continue,
                }
            } else {
                target.clone()
            };

            let outcome = run_player(player, &program, &player_target, volume).await;
            debug!(player = %player.name(), ?outcome, "Player attempt finished");

            let success = outcome.is_success();
            report.attempts.push(Attempt {
                player: player.name().to_string(),
                outcome,
            });
            if success {
                report.winner = Some(player.name().to_string());
                break;
            }
        }

        match &report.winner {
            Some(winner) => info!(player = %winner, target = %target, "Played sound"),
            None => warn!(
                target = %target,
                attempts = report.attempts.len(),
                "No player could play sound"
            ),
        }

        // `local` drops here, removing any downloaded clip
        drop(local);
        report
    }

    /// Path of a local copy, downloading on first need
    async fn local_path(
        &self,
        target: &PlayTarget,
        local: &mut LocalCopy,
        report: &mut ChainReport,
    ) -> Option<PathBuf> {
        if let LocalCopy::Pending = local {
            let url = target.as_url().unwrap_or_default();
            *local = match self.download(url).await {
                Ok(clip) => LocalCopy::Downloaded(clip),
                Err(e) => {
                    warn!(url = %url, "Download for local playback failed: {}", e);
                    report.download_failed = true;
                    LocalCopy::Failed
                }
            };
        }

        match local {
            LocalCopy::Provided(path) => Some(path.clone()),
            LocalCopy::Downloaded(clip) => Some(clip.to_path_buf()),
            LocalCopy::Pending | LocalCopy::Failed => None,
        }
    }

    /// Download `url` into a fresh `mist-*.mp3` file in the temp directory.
    /// The file is deleted when the returned path is dropped.
    pub async fn download(&self, url: &str) -> Result<TempPath> {
        // Created before the first byte so partial files are removed too
        let clip = tempfile::Builder::new()
            .prefix("mist-")
            .suffix(".mp3")
            .tempfile_in(&self.temp_dir)?
            .into_temp_path();

        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = tokio::fs::File::create(&clip).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!(url = %url, path = %clip.display(), "Downloaded clip");
        Ok(clip)
    }
}

#[async_trait]
impl Playback for PlayerChain {
    async fn play(&self, target: &PlayTarget, volume: f32) -> bool {
        self.play_with_report(target, volume).await.succeeded()
    }
}

/// Spawn one headless player process and wait for it
async fn run_player(
    player: &Player,
    program: &Path,
    target: &PlayTarget,
    volume: f32,
) -> PlaybackOutcome {
    let mut command = tokio::process::Command::new(program);
    command
        .args(player.command_args(target, volume))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(windows)]
    {
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    match command.status().await {
        Ok(status) if status.success() => PlaybackOutcome::Success,
        Ok(status) => PlaybackOutcome::ProcessFailed(status.code()),
        Err(e) => PlaybackOutcome::LaunchFailed(e.to_string()),
    }
}
