//! Settings Persistence System
//!
//! Provides persistent editor settings with:
//! - Atomic file writes (temp file + rename)
//! - Schema validation with defaults
//! - Migration support for schema changes
//!
//! Storage location: {config_dir}/subtitleeditor/settings.json

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{
    fs::atomic_write_json_pretty, time::FrameRate, CoreResult, Newline, TimingMode,
};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Lock file name (advisory lock to prevent concurrent writers)
pub const SETTINGS_LOCK_FILE: &str = "settings.json.lock";

/// Directory created under the platform config dir
pub const APP_DIR_NAME: &str = "subtitleeditor";

/// Editor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Timing thresholds used by checks and QC
    #[serde(default)]
    pub timing: TimingSettings,

    /// Editor behaviour
    #[serde(default)]
    pub editor: EditorSettings,

    /// Defaults for new documents
    #[serde(default)]
    pub document: DocumentSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            timing: TimingSettings::default(),
            editor: EditorSettings::default(),
            document: DocumentSettings::default(),
        }
    }
}

impl AppSettings {
    /// Normalizes and clamps settings so persisted state is always valid.
    ///
    /// Tolerant: bad values are corrected instead of failing, so an old or
    /// hand-edited file still loads.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;

        let timing = &mut self.timing;
        timing.min_gap_between_subtitles = timing.min_gap_between_subtitles.clamp(0, 10_000);
        timing.min_display = timing.min_display.clamp(0, 60_000);
        timing.min_characters_per_second = clamp_f64(timing.min_characters_per_second, 0.0, 100.0);
        timing.max_characters_per_second = clamp_f64(timing.max_characters_per_second, 0.0, 100.0);
        if timing.min_characters_per_second > timing.max_characters_per_second {
            std::mem::swap(
                &mut timing.min_characters_per_second,
                &mut timing.max_characters_per_second,
            );
        }
        timing.max_characters_per_line = timing.max_characters_per_line.clamp(1, 500);
        timing.max_line_per_subtitle = timing.max_line_per_subtitle.clamp(1, 20);

        self.editor.max_undo_depth = self.editor.max_undo_depth.clamp(1, 10_000);

        if self.document.default_format.trim().is_empty() {
            self.document.default_format = default_format();
        }
        self.document.default_charset = normalize_charset(&self.document.default_charset);
    }
}

fn clamp_f64(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

fn normalize_charset(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default_charset()
    } else {
        trimmed.to_ascii_uppercase()
    }
}

/// Timing thresholds consumed read-only by the editing core
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimingSettings {
    /// Minimum gap between consecutive subtitles (ms)
    #[serde(default = "default_min_gap")]
    pub min_gap_between_subtitles: i64,

    /// Minimum display duration (ms)
    #[serde(default = "default_min_display")]
    pub min_display: i64,

    #[serde(default = "default_min_cps")]
    pub min_characters_per_second: f64,

    #[serde(default = "default_max_cps")]
    pub max_characters_per_second: f64,

    #[serde(default = "default_max_cpl")]
    pub max_characters_per_line: usize,

    #[serde(default = "default_max_lines")]
    pub max_line_per_subtitle: usize,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            min_gap_between_subtitles: default_min_gap(),
            min_display: default_min_display(),
            min_characters_per_second: default_min_cps(),
            max_characters_per_second: default_max_cps(),
            max_characters_per_line: default_max_cpl(),
            max_line_per_subtitle: default_max_lines(),
        }
    }
}

fn default_min_gap() -> i64 {
    100
}

fn default_min_display() -> i64 {
    1000
}

fn default_min_cps() -> f64 {
    5.0
}

fn default_max_cps() -> f64 {
    25.0
}

fn default_max_cpl() -> usize {
    40
}

fn default_max_lines() -> usize {
    2
}

/// Editor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    /// Maximum number of undo units kept per document
    #[serde(default = "default_max_undo_depth")]
    pub max_undo_depth: usize,

    /// Storage unit of new documents
    #[serde(default)]
    pub default_timing_mode: TimingMode,

    /// Unit in which new documents present timing for editing
    #[serde(default)]
    pub default_edit_timing_mode: TimingMode,

    #[serde(default)]
    pub default_framerate: FrameRate,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_undo_depth: default_max_undo_depth(),
            default_timing_mode: TimingMode::default(),
            default_edit_timing_mode: TimingMode::default(),
            default_framerate: FrameRate::default(),
        }
    }
}

fn default_max_undo_depth() -> usize {
    100
}

/// Metadata given to new and saved documents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSettings {
    #[serde(default = "default_format")]
    pub default_format: String,

    #[serde(default = "default_charset")]
    pub default_charset: String,

    #[serde(default)]
    pub default_newline: Newline,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            default_charset: default_charset(),
            default_newline: Newline::default(),
        }
    }
}

fn default_format() -> String {
    "SubRip".to_string()
}

fn default_charset() -> String {
    "UTF-8".to_string()
}

// =============================================================================
// Settings Manager
// =============================================================================

/// Settings manager for loading, saving, and resetting settings
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Create a new settings manager with the given app data directory
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILE),
        }
    }

    /// Settings manager rooted at the platform configuration directory
    pub fn from_default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join(APP_DIR_NAME)))
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    fn lock_path(&self) -> PathBuf {
        self.settings_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SETTINGS_LOCK_FILE)
    }

    fn with_lock<T>(&self, exclusive: bool, op: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_file: File = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;

        if exclusive {
            fs2::FileExt::lock_exclusive(&lock_file)?;
        } else {
            fs2::FileExt::lock_shared(&lock_file)?;
        }

        let result = op();

        if let Err(e) = fs2::FileExt::unlock(&lock_file) {
            warn!("Failed to unlock settings lock file: {}", e);
        }

        result
    }

    /// Load settings from disk, returning defaults if the file is missing or
    /// unreadable
    pub fn load(&self) -> AppSettings {
        let result = self.with_lock(false, || {
            if !self.settings_path.exists() {
                info!("Settings file not found, using defaults");
                return Ok(AppSettings::default());
            }

            let content = fs::read_to_string(&self.settings_path)?;
            let mut settings = serde_json::from_str::<AppSettings>(&content)?;

            if settings.version < SETTINGS_VERSION {
                info!(
                    "Migrating settings from version {} to {}",
                    settings.version, SETTINGS_VERSION
                );
                settings = migrate(settings);
            }

            settings.normalize();
            Ok(settings)
        });

        match result {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                AppSettings::default()
            }
        }
    }

    /// Normalize and save settings, returning what was written
    pub fn save(&self, settings: &AppSettings) -> CoreResult<AppSettings> {
        self.with_lock(true, || {
            let mut normalized = settings.clone();
            normalized.normalize();

            atomic_write_json_pretty(&self.settings_path, &normalized)?;

            info!("Settings saved to {:?}", self.settings_path);
            Ok(normalized)
        })
    }

    /// Reset settings to defaults and delete the settings file
    pub fn reset(&self) -> CoreResult<AppSettings> {
        self.with_lock(true, || {
            if self.settings_path.exists() {
                fs::remove_file(&self.settings_path)?;
                debug!("Settings file deleted");
            }
            Ok(AppSettings::default())
        })
    }
}

/// Migrate settings from an older schema version
fn migrate(mut settings: AppSettings) -> AppSettings {
    settings.version = SETTINGS_VERSION;
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.timing.min_gap_between_subtitles, 100);
        assert_eq!(settings.timing.min_display, 1000);
        assert_eq!(settings.timing.max_characters_per_line, 40);
        assert_eq!(settings.editor.max_undo_depth, 100);
        assert_eq!(settings.document.default_format, "SubRip");
        assert_eq!(settings.document.default_newline, Newline::Unix);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("minGapBetweenSubtitles"));
        let deserialized: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, deserialized);
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path().to_path_buf());

        assert_eq!(manager.load(), AppSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path().to_path_buf());

        let mut settings = AppSettings::default();
        settings.timing.max_characters_per_second = 17.0;
        settings.editor.default_timing_mode = TimingMode::Frame;
        settings.editor.default_framerate = FrameRate::Fps23_976;

        manager.save(&settings).unwrap();
        let loaded = manager.load();

        assert_eq!(loaded.timing.max_characters_per_second, 17.0);
        assert_eq!(loaded.editor.default_timing_mode, TimingMode::Frame);
        assert_eq!(loaded.editor.default_framerate, FrameRate::Fps23_976);
    }

    #[test]
    fn test_reset_deletes_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path().to_path_buf());

        manager.save(&AppSettings::default()).unwrap();
        assert!(manager.settings_path().exists());

        let reset = manager.reset().unwrap();
        assert!(!manager.settings_path().exists());
        assert_eq!(reset, AppSettings::default());
    }

    #[test]
    fn test_invalid_json_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(SETTINGS_FILE), "invalid json {{{").unwrap();

        let manager = SettingsManager::new(temp_dir.path().to_path_buf());
        assert_eq!(manager.load(), AppSettings::default());
    }

    #[test]
    fn test_partial_json_uses_defaults_for_missing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(SETTINGS_FILE),
            r#"{"version": 1, "timing": {"minDisplay": 700}}"#,
        )
        .unwrap();

        let manager = SettingsManager::new(temp_dir.path().to_path_buf());
        let settings = manager.load();

        assert_eq!(settings.timing.min_display, 700);
        assert_eq!(settings.timing.min_gap_between_subtitles, 100);
        assert_eq!(settings.document.default_charset, "UTF-8");
    }

    #[test]
    fn test_old_version_is_migrated() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(SETTINGS_FILE), r#"{"version": 0}"#).unwrap();

        let manager = SettingsManager::new(temp_dir.path().to_path_buf());
        assert_eq!(manager.load().version, SETTINGS_VERSION);
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path().to_path_buf());

        manager.save(&AppSettings::default()).unwrap();
        manager.save(&AppSettings::default()).unwrap();

        assert!(manager.settings_path().exists());
        assert!(!crate::core::fs::tmp_path_for(manager.settings_path()).exists());
    }

    #[test]
    fn test_normalization_clamps_values() {
        let mut settings = AppSettings::default();
        settings.timing.min_gap_between_subtitles = -5;
        settings.timing.min_characters_per_second = 30.0;
        settings.timing.max_characters_per_second = f64::NAN;
        settings.timing.max_characters_per_line = 0;
        settings.editor.max_undo_depth = 0;
        settings.document.default_charset = " utf-8 ".to_string();

        settings.normalize();

        assert_eq!(settings.timing.min_gap_between_subtitles, 0);
        // NaN falls back to the minimum, then the pair is swapped into order
        assert_eq!(settings.timing.min_characters_per_second, 0.0);
        assert_eq!(settings.timing.max_characters_per_second, 30.0);
        assert_eq!(settings.timing.max_characters_per_line, 1);
        assert_eq!(settings.editor.max_undo_depth, 1);
        assert_eq!(settings.document.default_charset, "UTF-8");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path().join("a").join("b"));

        manager.save(&AppSettings::default()).unwrap();
        assert!(manager.settings_path().exists());
    }
}
