//! Save/load persistence for scores and settings
//!
//! Features:
//! - Plain JSON files under the user's local data directory
//! - Atomic writes (tmp file, then rename over the old one)
//! - Missing files read as "nothing saved yet", never as an error

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Directory name under the platform data dir
pub const APP_DIR: &str = "degradius";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not determine a data directory")]
    NoDataDir,
}

/// `<data_local_dir>/degradius/<file>`
pub fn data_file(file: &str) -> Result<PathBuf, PersistenceError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR).join(file))
        .ok_or(PersistenceError::NoDataDir)
}

/// Read and parse a JSON file; `Ok(None)` if it does not exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Write pretty JSON atomically, creating parent directories as needed
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let io_err = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let json = serde_json::to_string_pretty(value).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

/// Where the best score lives between runs
///
/// Infallible from the caller's side: implementations log failures and
/// carry on, since losing a high score must never stop the game.
pub trait ScoreStore {
    fn load(&mut self) -> u64;
    fn save(&mut self, score: u64);
}

impl<T: ScoreStore + ?Sized> ScoreStore for Box<T> {
    fn load(&mut self) -> u64 {
        (**self).load()
    }

    fn save(&mut self, score: u64) {
        (**self).save(score)
    }
}

#[derive(Debug, Default, Serialize, serde::Deserialize)]
struct ScoreFile {
    high_score: u64,
}

/// JSON file store: `{ "high_score": n }`
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub const FILE_NAME: &'static str = "score.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory
    pub fn default_location() -> Result<Self, PersistenceError> {
        data_file(Self::FILE_NAME).map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_load(&self) -> Result<u64, PersistenceError> {
        Ok(read_json::<ScoreFile>(&self.path)?
            .map(|f| f.high_score)
            .unwrap_or(0))
    }

    pub fn try_save(&self, score: u64) -> Result<(), PersistenceError> {
        write_json(&self.path, &ScoreFile { high_score: score })
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&mut self) -> u64 {
        match self.try_load() {
            Ok(score) => {
                log::info!("Loaded high score {} from {:?}", score, self.path);
                score
            }
            Err(e) => {
                log::warn!("Failed to load high score: {}", e);
                0
            }
        }
    }

    fn save(&mut self, score: u64) {
        if let Err(e) = self.try_save(score) {
            log::warn!("Failed to save high score: {}", e);
        }
    }
}

/// In-memory store (tests, `--no-persist`)
#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    pub high_score: u64,
    /// Number of save calls seen
    pub saves: usize,
}

impl MemoryScoreStore {
    pub fn with_score(high_score: u64) -> Self {
        Self {
            high_score,
            saves: 0,
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&mut self) -> u64 {
        self.high_score
    }

    fn save(&mut self, score: u64) {
        self.high_score = score;
        self.saves += 1;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    /// Fresh scratch path under the system temp dir
    pub fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "degradius-test-{}-{}",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("data.json")
    }
}
