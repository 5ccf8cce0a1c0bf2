//! Binary locator
//!
//! Answers "is this player installed?" by searching `PATH`. Every distinct
//! name is probed once per locator and the answer (negative included) is
//! kept for the locator's lifetime; player installations are assumed stable
//! while the service runs. The resolved path is what gets spawned.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Memoizing executable lookup
#[derive(Debug, Default)]
pub struct BinaryLocator {
    /// Directories to search; `None` reads `PATH` at probe time
    search_path: Option<Vec<PathBuf>>,
    cache: Mutex<HashMap<String, Option<PathBuf>>>,
    probes: AtomicUsize,
}

impl BinaryLocator {
    /// Locator searching the process `PATH`
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator searching only `dirs`
    pub fn with_search_path(dirs: Vec<PathBuf>) -> Self {
        Self {
            search_path: Some(dirs),
            ..Self::default()
        }
    }

    /// Whether `name` resolves to an executable. Never fails.
    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Full path of the executable `name`, if installed
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(found) = cache.get(name) {
            return found.clone();
        }

        self.probes.fetch_add(1, Ordering::Relaxed);
        let found = self.probe(name);
        debug!(binary = %name, path = ?found, "Probed for player executable");
        cache.insert(name.to_string(), found.clone());
        found
    }

    /// Number of underlying filesystem probes performed so far
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }

    fn probe(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        // Explicit paths are checked as given
        if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
            let path = PathBuf::from(name);
            return is_executable(&path).then_some(path);
        }

        let dirs: Vec<PathBuf> = match &self.search_path {
            Some(dirs) => dirs.clone(),
            None => std::env::split_paths(&std::env::var_os("PATH")?).collect(),
        };

        dirs.iter()
            .filter(|dir| !dir.as_os_str().is_empty())
            .flat_map(|dir| candidates(dir, name))
            .find(|candidate| is_executable(candidate))
    }
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    let exts = std::env::var_os("PATHEXT")
        .unwrap_or_else(|| std::ffi::OsString::from(".COM;.EXE;.BAT;.CMD"));
    let mut out = vec![dir.join(name)];
    for ext in exts.to_string_lossy().split(';').filter(|e| !e.is_empty()) {
        out.push(dir.join(format!("{}{}", name, ext.to_ascii_lowercase())));
    }
    out
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
