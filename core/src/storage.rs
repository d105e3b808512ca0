// core/src/storage.rs
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::SessionConfig;
use crate::error::{StorageError, ValidationError};
use crate::models::RunnerProfile;
use crate::types::RunSummary;

// --- runner profile ---

/// Reads the runner profile from disk (JSON).
/// If the file does not exist, the default profile is returned.
pub fn load_profile(path: impl AsRef<Path>) -> Result<RunnerProfile, StorageError> {
    let path = path.as_ref();
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let profile: RunnerProfile = serde_json::from_str(&contents)?;
        log::info!("profile loaded from {} (mass_kg={})", path.display(), profile.mass_kg);
        Ok(profile)
    } else {
        log::warn!("no profile at {}, using default (mass_kg={})", path.display(), RunnerProfile::default().mass_kg);
        Ok(RunnerProfile::default())
    }
}

/// Writes the profile to disk as pretty JSON.
pub fn save_profile(profile: &RunnerProfile, path: impl AsRef<Path>) -> Result<(), StorageError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(profile)?;
    std::fs::write(path, json)?;
    log::info!("profile saved to {} (mass_kg={})", path.display(), profile.mass_kg);
    Ok(())
}

// --- save boundary ---

/// Save-boundary policy: too short or too sparse sessions are not persisted.
pub fn validate_for_save(summary: &RunSummary, cfg: &SessionConfig) -> Result<(), ValidationError> {
    if summary.elapsed_seconds < cfg.min_save_seconds {
        return Err(ValidationError::TooShort {
            elapsed_seconds: summary.elapsed_seconds,
            minimum: cfg.min_save_seconds,
        });
    }
    if summary.path.len() < cfg.min_save_points {
        return Err(ValidationError::TooFewPoints {
            points: summary.path.len(),
            minimum: cfg.min_save_points,
        });
    }
    Ok(())
}

// --- run stores ---

/// Keyed record store for finished runs.
pub trait RunStore {
    fn put(&mut self, id: &str, summary: &RunSummary) -> Result<(), StorageError>;
    fn load(&self, id: &str) -> Result<RunSummary, StorageError>;
    fn list(&self) -> Result<Vec<String>, StorageError>;

    /// Validates, then stores.
    fn save(&mut self, id: &str, summary: &RunSummary, cfg: &SessionConfig) -> Result<(), StorageError> {
        validate_for_save(summary, cfg)?;
        self.put(id, summary)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    runs: BTreeMap<String, RunSummary>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunStore for MemoryStore {
    fn put(&mut self, id: &str, summary: &RunSummary) -> Result<(), StorageError> {
        self.runs.insert(id.to_owned(), summary.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<RunSummary, StorageError> {
        self.runs.get(id).cloned().ok_or_else(|| StorageError::NotFound(id.to_owned()))
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.runs.keys().cloned().collect())
    }
}

/// One pretty-printed JSON file per run: `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn file_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl RunStore for JsonDirStore {
    fn put(&mut self, id: &str, summary: &RunSummary) -> Result<(), StorageError> {
        let path = self.file_for(id);
        std::fs::write(&path, serde_json::to_string_pretty(summary)?)?;
        log::info!(
            "run {} saved to {} ({:.0} m, {} s)",
            id,
            path.display(),
            summary.distance_m,
            summary.elapsed_seconds
        );
        Ok(())
    }

    fn load(&self, id: &str) -> Result<RunSummary, StorageError> {
        let path = self.file_for(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_owned()));
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_owned());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
