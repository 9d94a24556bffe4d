//! Startup ingestion of a packaged dataset.
//!
//! The bundle is a directory (or a single file) of JSON documents named
//! `users_*.json`, `locations_*.json`, `visits_*.json`. The file-name prefix
//! decides the entity kind, and each document carries one top-level
//! collection (`{"users": [...]}` and so on). Bundle data is trusted:
//! records go straight into the store without validation, files may arrive
//! in any order, and the visit indexes are built as records land. Ingestion
//! runs once, before the HTTP listener binds.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Location, Store, User, Visit};

/// Failures raised while ingesting a data bundle.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Filesystem access failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file or directory being read.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A bundle file held invalid JSON.
    #[error("failed to decode {path}: {source}")]
    Decode {
        /// The file being decoded.
        path: PathBuf,
        /// The underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Per-kind record counts of a completed load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Users ingested.
    pub users: usize,
    /// Locations ingested.
    pub locations: usize,
    /// Visits ingested.
    pub visits: usize,
}

#[derive(Deserialize)]
struct UsersFile {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct LocationsFile {
    locations: Vec<Location>,
}

#[derive(Deserialize)]
struct VisitsFile {
    visits: Vec<Visit>,
}

/// Load every record from the bundle at `path` into the store.
pub fn load_bundle(store: &Store, path: &Path) -> Result<LoadStats, LoadError> {
    let mut stats = LoadStats::default();
    if path.is_dir() {
        let entries = fs::read_dir(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|candidate| candidate.is_file())
            .collect();
        files.sort();
        for file in files {
            load_file(store, &file, &mut stats)?;
        }
    } else {
        load_file(store, path, &mut stats)?;
    }
    Ok(stats)
}

fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn decode<'a, T: Deserialize<'a>>(path: &Path, bytes: &'a [u8]) -> Result<T, LoadError> {
    serde_json::from_slice(bytes).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn load_file(store: &Store, path: &Path, stats: &mut LoadStats) -> Result<(), LoadError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    if name.starts_with("users") {
        let file: UsersFile = decode(path, &read_file(path)?)?;
        stats.users += file.users.len();
        for user in file.users {
            store.load_user(user);
        }
    } else if name.starts_with("locations") {
        let file: LocationsFile = decode(path, &read_file(path)?)?;
        stats.locations += file.locations.len();
        for location in file.locations {
            store.load_location(location);
        }
    } else if name.starts_with("visits") {
        let file: VisitsFile = decode(path, &read_file(path)?)?;
        stats.visits += file.visits.len();
        for visit in file.visits {
            store.load_visit(visit);
        }
    } else {
        debug!(file = %path.display(), "skipping file with unrecognized prefix");
        return Ok(());
    }

    info!(file = %path.display(), "bundle file loaded");
    Ok(())
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
