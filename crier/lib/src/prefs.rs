//! Persisted user preferences (voice, playback speed).
//!
//! Preferences are an explicit value object handed to whoever needs them,
//! not ambient global state. Persistence goes through the
//! [`PreferenceStore`] port; the default implementation keeps a
//! schema-versioned JSON dot-file in the home directory.
//!
//! ## Atomicity
//!
//! Writes use a temp file + rename in the same directory, so an interrupted
//! save cannot corrupt an existing preferences file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audio::VoiceName;

/// Current schema version for the preferences file format.
pub const PREFS_SCHEMA_VERSION: u32 = 1;

/// Default preferences file name under the home directory.
const PREFS_FILE_NAME: &str = ".crier-prefs.json";

/// Errors from preference persistence.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    /// Reading the preferences file failed
    #[error("failed to read preferences from {path}: {message}")]
    Read {
        /// File path involved.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// Writing the preferences file failed
    #[error("failed to write preferences to {path}")]
    Write {
        /// File path involved.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// User-tunable playback preferences.
///
/// `voice` only affects the *next* generation's cache key; `playback_speed`
/// applies immediately to the active buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Preferred synthesis voice.
    #[serde(default)]
    pub voice: VoiceName,
    /// Playback speed multiplier.
    #[serde(default = "default_speed")]
    pub playback_speed: f32,
}

fn default_speed() -> f32 {
    1.0
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            voice: VoiceName::default(),
            playback_speed: 1.0,
        }
    }
}

/// Wrapper struct for the preferences file that includes schema versioning.
#[derive(Debug, Serialize, Deserialize)]
struct PrefsEnvelope {
    /// Schema version for forward compatibility.
    schema_version: u32,
    /// The actual preferences.
    prefs: UserPreferences,
}

/// Port for preference persistence.
pub trait PreferenceStore {
    /// Load persisted preferences.
    ///
    /// ## Errors
    ///
    /// Returns `PrefsError` when the file is missing, unreadable or has an
    /// incompatible schema.
    fn load(&self) -> Result<UserPreferences, PrefsError>;

    /// Persist preferences.
    fn save(&self, prefs: &UserPreferences) -> Result<(), PrefsError>;

    /// Load, falling back to defaults on any failure (missing file is the
    /// common first-run case).
    fn load_or_default(&self) -> UserPreferences {
        match self.load() {
            Ok(prefs) => prefs,
            Err(error) => {
                tracing::debug!(error = %error, "Using default preferences");
                UserPreferences::default()
            }
        }
    }
}

/// JSON-file [`PreferenceStore`] with atomic writes.
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    /// Store at `~/.crier-prefs.json`.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn in_home_dir() -> Option<Self> {
        dirs::home_dir().map(|home| Self {
            path: home.join(PREFS_FILE_NAME),
        })
    }

    /// Store at an explicit path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn load(&self) -> Result<UserPreferences, PrefsError> {
        let path_str = self.path.display().to_string();

        let contents = fs::read_to_string(&self.path).map_err(|e| PrefsError::Read {
            path: path_str.clone(),
            message: e.to_string(),
        })?;

        let envelope: PrefsEnvelope =
            serde_json::from_str(&contents).map_err(|e| PrefsError::Read {
                path: path_str.clone(),
                message: format!("JSON parse error: {}", e),
            })?;

        if envelope.schema_version != PREFS_SCHEMA_VERSION {
            return Err(PrefsError::Read {
                path: path_str,
                message: format!(
                    "schema version mismatch: expected {}, found {}",
                    PREFS_SCHEMA_VERSION, envelope.schema_version
                ),
            });
        }

        Ok(envelope.prefs)
    }

    fn save(&self, prefs: &UserPreferences) -> Result<(), PrefsError> {
        let envelope = PrefsEnvelope {
            schema_version: PREFS_SCHEMA_VERSION,
            prefs: *prefs,
        };
        let json = serde_json::to_string_pretty(&envelope).map_err(|e| PrefsError::Write {
            path: self.path.display().to_string(),
            source: std::io::Error::other(e),
        })?;

        write_atomic(&self.path, json.as_bytes()).map_err(|e| PrefsError::Write {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

/// Atomically write data via a same-directory temp file and rename.
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = parent.join(format!(
        ".crier-prefs-tmp-{}-{}.tmp",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ));

    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.voice, VoiceName::Charon);
        assert_eq!(prefs.playback_speed, 1.0);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferenceStore::at_path(dir.path().join("prefs.json"));

        let prefs = UserPreferences {
            voice: VoiceName::Puck,
            playback_speed: 1.5,
        };
        store.save(&prefs).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferenceStore::at_path(dir.path().join("nope.json"));
        assert!(store.load().is_err());
        // But the fallback path yields defaults.
        assert_eq!(store.load_or_default(), UserPreferences::default());
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json at all").unwrap();

        let store = JsonPreferenceStore::at_path(&path);
        assert!(store.load().is_err());
    }

    #[test]
    fn test_schema_version_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(
            &path,
            r#"{"schema_version": 99, "prefs": {"voice": "Charon", "playback_speed": 1.0}}"#,
        )
        .unwrap();

        let store = JsonPreferenceStore::at_path(&path);
        match store.load() {
            Err(PrefsError::Read { message, .. }) => {
                assert!(message.contains("schema version mismatch"));
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_save_overwrites_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferenceStore::at_path(dir.path().join("prefs.json"));

        store.save(&UserPreferences::default()).unwrap();
        let updated = UserPreferences {
            voice: VoiceName::Kore,
            playback_speed: 2.0,
        };
        store.save(&updated).unwrap();

        assert_eq!(store.load().unwrap(), updated);
        // No temp files left behind.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
