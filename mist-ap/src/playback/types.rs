//! Playback type definitions

use std::fmt;
use std::path::{Path, PathBuf};

/// Something a player can be pointed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayTarget {
    /// Remote resource, streamable by URL-capable players
    Url(String),
    /// Local file, e.g. after a download
    File(PathBuf),
}

impl PlayTarget {
    /// Classify a raw string: `http(s)://` is a URL, anything else a path
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            PlayTarget::Url(raw.to_string())
        } else {
            PlayTarget::File(PathBuf::from(raw))
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, PlayTarget::Url(_))
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            PlayTarget::Url(url) => Some(url),
            PlayTarget::File(_) => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            PlayTarget::File(path) => Some(path),
            PlayTarget::Url(_) => None,
        }
    }

    /// Argument form handed to a player process
    pub fn as_arg(&self) -> String {
        match self {
            PlayTarget::Url(url) => url.clone(),
            PlayTarget::File(path) => path.to_string_lossy().into_owned(),
        }
    }
}

impl fmt::Display for PlayTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayTarget::Url(url) => write!(f, "{}", url),
            PlayTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Result of a single player attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Player exited with status zero
    Success,
    /// Player ran but exited nonzero (`None` when killed by a signal)
    ProcessFailed(Option<i32>),
    /// Player could not be started
    LaunchFailed(String),
}

impl PlaybackOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PlaybackOutcome::Success)
    }
}

/// Queue lifecycle notifications
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A queued target was handed to the player
    Started { target: PlayTarget },
    /// The player finished with the target
    Finished { target: PlayTarget, success: bool },
    /// The queue ran empty and the drain loop exited
    Idle,
}
