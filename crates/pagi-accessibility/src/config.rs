//! Accessibility configuration: defaults, optional TOML file, then environment.
//!
//! | Source | Example |
//! |--------|---------|
//! | built-in defaults | every field below |
//! | TOML file | path from `PAGI_ACCESS_CONFIG`, default `config/accessibility.toml` (skipped when absent) |
//! | environment | `PAGI_ACCESS_SPEECH__REPEAT_WINDOW_MS=750`, `PAGI_ACCESS_ANNOUNCE__MENUS=false` |

use crate::audio::spatial::MixerProfile;
use crate::error::AccessResult;
use crate::vocabulary::StateVocabulary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_true() -> bool {
    true
}

fn default_min_dispatch_interval_ms() -> u64 {
    100
}

fn default_repeat_window_ms() -> u64 {
    500
}

fn default_welcome() -> String {
    "Accessibility cues loaded".to_string()
}

fn default_clip_dir() -> PathBuf {
    PathBuf::from("AccessibilityAudio")
}

/// Scheduler timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Minimum gap between two dispatches from the queue. Floored at 50ms.
    #[serde(default = "default_min_dispatch_interval_ms")]
    pub min_dispatch_interval_ms: u64,
    /// Identical text inside this window is dropped. Floored at 100ms.
    #[serde(default = "default_repeat_window_ms")]
    pub repeat_window_ms: u64,
    /// Spoken once when the sink comes up. Empty to skip.
    #[serde(default = "default_welcome")]
    pub welcome: String,
}

impl SpeechConfig {
    pub fn min_dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.min_dispatch_interval_ms)
    }

    pub fn repeat_window(&self) -> Duration {
        Duration::from_millis(self.repeat_window_ms)
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            min_dispatch_interval_ms: default_min_dispatch_interval_ms(),
            repeat_window_ms: default_repeat_window_ms(),
            welcome: default_welcome(),
        }
    }
}

/// Which announcement categories reach the scheduler at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnounceConfig {
    #[serde(default = "default_true")]
    pub dialogue: bool,
    #[serde(default = "default_true")]
    pub menus: bool,
    #[serde(default = "default_true")]
    pub interactables: bool,
    #[serde(default = "default_true")]
    pub notifications: bool,
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            dialogue: true,
            menus: true,
            interactables: true,
            notifications: true,
        }
    }
}

/// Clip location and per-mixer tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Directory of `*.wav` cue clips.
    #[serde(default = "default_clip_dir")]
    pub clip_dir: PathBuf,
    #[serde(default = "MixerProfile::stealth")]
    pub stealth: MixerProfile,
    #[serde(default = "MixerProfile::minigame")]
    pub minigame: MixerProfile,
    #[serde(default = "MixerProfile::interactable")]
    pub interactable: MixerProfile,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            clip_dir: default_clip_dir(),
            stealth: MixerProfile::stealth(),
            minigame: MixerProfile::minigame(),
            interactable: MixerProfile::interactable(),
        }
    }
}

/// Top-level configuration for an accessibility session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessibilityConfig {
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub announce: AnnounceConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    /// Variable-name patterns mapped to spoken on/off phrases.
    #[serde(default)]
    pub state_words: StateVocabulary,
}

impl AccessibilityConfig {
    /// Load config from file and environment. Precedence: env > `PAGI_ACCESS_CONFIG` file > defaults.
    pub fn load() -> AccessResult<Self> {
        let config_path = std::env::var("PAGI_ACCESS_CONFIG")
            .unwrap_or_else(|_| "config/accessibility.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Like [`load`](Self::load) with an explicit file path (skipped when it does not exist).
    pub fn load_from(path: &Path) -> AccessResult<Self> {
        let builder = config::Config::builder();
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("PAGI_ACCESS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(built.try_deserialize()?)
    }

    /// Parse a TOML document; missing sections take their defaults.
    pub fn from_toml_str(source: &str) -> AccessResult<Self> {
        Ok(toml::from_str(source)?)
    }
}
