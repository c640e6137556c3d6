//! # PAGI Accessibility - speech and spatial audio for screen-reader players
//!
//! Turns game events into two output streams a blind player can follow:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                 AccessibilitySession                        │
//! │  ┌──────────────┐   ┌─────────────────┐   ┌─────────────┐  │
//! │  │  Announcer   │ → │ SpeechScheduler │ → │ SpeechSink  │  │
//! │  │ (phrasing)   │   │ (priority/rate) │   │ (driver)    │  │
//! │  └──────────────┘   └─────────────────┘   └─────────────┘  │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────────┐    │
//! │  │ stealth mixer│ │minigame mixer│ │interactable mixer│    │
//! │  └──────┬───────┘ └──────┬───────┘ └────────┬─────────┘    │
//! │         ↓                ↓                  ↓              │
//! │                AudioBackend (rodio / headless)             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is driven by `tick()` from the host's frame loop; time comes from an
//! injected [`Clock`].

pub mod audio;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod speech;
pub mod vocabulary;

pub use audio::{
    AudioBackend, ChannelKey, ChannelSnapshot, Clip, ClipLibrary, HeadlessBackend,
    InteractableKind, MixerProfile, PlaybackParams, RodioBackend, SoundHandle, SpatialMixer,
    Vec2, VoiceId,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AccessibilityConfig, AnnounceConfig, AudioConfig, SpeechConfig};
pub use error::{AccessError, AccessResult};
pub use logging::init_tracing;
pub use session::{AccessibilitySession, MixerBackends};
pub use speech::{
    AnnouncementCategory, Announcer, PlaceholderTts, PlaybackSink, RecordingSink, SpeakOutcome,
    SpeechScheduler, SpeechSink, TtsBackend,
};
pub use vocabulary::{StateRule, StateVocabulary};
