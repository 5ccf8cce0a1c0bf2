//! External player strategies
//!
//! Each player is one of three strategies. Stream-capable players take a URL
//! directly; platform builtins exist only on one host OS; file-only players
//! need the clip on disk first. Every player owns the rule that turns a
//! target and a 0.0-1.0 volume into its command line, so no OS or tool
//! conditionals leak into the chain.

use super::types::PlayTarget;

/// Host operating system, as far as player selection cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            HostOs::Linux
        } else if cfg!(target_os = "macos") {
            HostOs::MacOs
        } else if cfg!(target_os = "windows") {
            HostOs::Windows
        } else {
            HostOs::Other
        }
    }
}

/// Builds a player's arguments from the target argument and volume
pub type ArgBuilder = fn(target: &str, volume: f32) -> Vec<String>;

/// Executable plus its command-line convention
#[derive(Debug, Clone)]
pub struct PlayerSpec {
    /// Display name used in logs and reports
    pub name: String,
    /// Executable looked up through the binary locator
    pub program: String,
    pub build_args: ArgBuilder,
}

impl PlayerSpec {
    pub fn new(name: impl Into<String>, program: impl Into<String>, build_args: ArgBuilder) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            build_args,
        }
    }
}

/// A player strategy
#[derive(Debug, Clone)]
pub enum Player {
    /// Plays URLs directly, on any OS
    StreamCapable(PlayerSpec),
    /// Ships with one OS; plays local files
    PlatformBuiltin { os: HostOs, spec: PlayerSpec },
    /// Plays local files only; `os` limits it to one host when set
    FileOnly { os: Option<HostOs>, spec: PlayerSpec },
}

impl Player {
    pub fn spec(&self) -> &PlayerSpec {
        match self {
            Player::StreamCapable(spec) => spec,
            Player::PlatformBuiltin { spec, .. } => spec,
            Player::FileOnly { spec, .. } => spec,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec().name
    }

    pub fn program(&self) -> &str {
        &self.spec().program
    }

    pub fn can_stream_url(&self) -> bool {
        matches!(self, Player::StreamCapable(_))
    }

    pub fn requires_local_file(&self) -> bool {
        !self.can_stream_url()
    }

    /// Whether this player is considered at all on `os`
    pub fn supported_on(&self, os: HostOs) -> bool {
        match self {
            Player::StreamCapable(_) => true,
            Player::PlatformBuiltin { os: only, .. } => *only == os,
            Player::FileOnly { os: only, .. } => only.map_or(true, |only| only == os),
        }
    }

    /// Chain priority: stream players, then builtins, then file-only players
    pub fn priority(&self) -> u8 {
        match self {
            Player::StreamCapable(_) => 0,
            Player::PlatformBuiltin { .. } => 1,
            Player::FileOnly { .. } => 2,
        }
    }

    /// Arguments for playing `target` at `volume` (clamped to 0.0-1.0)
    pub fn command_args(&self, target: &PlayTarget, volume: f32) -> Vec<String> {
        let volume = mist_common::config::clamp_volume(volume);
        (self.spec().build_args)(&target.as_arg(), volume)
    }
}

/// Volume as a rounded 0-100 percentage
pub fn volume_percent(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Volume on PulseAudio's 0-65536 scale, rounded
pub fn volume_pulse(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * 65536.0).round() as u32
}

fn ffplay_args(target: &str, volume: f32) -> Vec<String> {
    vec![
        "-nodisp".to_string(),
        "-autoexit".to_string(),
        "-volume".to_string(),
        volume_percent(volume).to_string(),
        "-loglevel".to_string(),
        "quiet".to_string(),
        target.to_string(),
    ]
}

fn mpv_args(target: &str, volume: f32) -> Vec<String> {
    vec![
        "--no-video".to_string(),
        "--really-quiet".to_string(),
        format!("--volume={}", volume_percent(volume)),
        target.to_string(),
    ]
}

fn afplay_args(target: &str, volume: f32) -> Vec<String> {
    vec!["-v".to_string(), format!("{:.2}", volume), target.to_string()]
}

fn powershell_args(target: &str, volume: f32) -> Vec<String> {
    // Single quotes are doubled inside a PowerShell single-quoted string
    let safe_path = target.replace('\'', "''");
    let script = format!(
        "Add-Type -AssemblyName presentationCore; \
         $p = New-Object system.windows.media.mediaplayer; \
         $p.open('{}'); $p.Volume = {:.2}; $p.Play(); Start-Sleep 1; \
         Start-Sleep -s $p.NaturalDuration.TimeSpan.TotalSeconds; Exit;",
        safe_path, volume
    );
    vec![
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-Command".to_string(),
        script,
    ]
}

fn paplay_args(target: &str, volume: f32) -> Vec<String> {
    vec![format!("--volume={}", volume_pulse(volume)), target.to_string()]
}

fn aplay_args(target: &str, _volume: f32) -> Vec<String> {
    vec!["-q".to_string(), target.to_string()]
}

/// The stock player list in preference order
pub fn default_players() -> Vec<Player> {
    vec![
        Player::StreamCapable(PlayerSpec::new("ffplay", "ffplay", ffplay_args)),
        Player::StreamCapable(PlayerSpec::new("mpv", "mpv", mpv_args)),
        Player::PlatformBuiltin {
            os: HostOs::MacOs,
            spec: PlayerSpec::new("afplay", "afplay", afplay_args),
        },
        Player::PlatformBuiltin {
            os: HostOs::Windows,
            spec: PlayerSpec::new("wpf-mediaplayer", "powershell", powershell_args),
        },
        Player::FileOnly {
            os: Some(HostOs::Linux),
            spec: PlayerSpec::new("paplay", "paplay", paplay_args),
        },
        Player::FileOnly {
            os: Some(HostOs::Linux),
            spec: PlayerSpec::new("aplay", "aplay", aplay_args),
        },
    ]
}
