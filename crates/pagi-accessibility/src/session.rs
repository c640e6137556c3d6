//! **AccessibilitySession** - one announcer and three independent mixers, owned together.
//!
//! The host's event adapter holds a session and calls into it from its frame loop. There
//! are no process-wide statics: two sessions never share a queue, a clip, or a voice.

use crate::audio::backend::{AudioBackend, HeadlessBackend};
use crate::audio::library::ClipLibrary;
use crate::audio::mixer::{SpatialMixer, LOOPING_CLIPS};
use crate::audio::rodio_backend::RodioBackend;
use crate::clock::Clock;
use crate::config::AccessibilityConfig;
use crate::error::AccessResult;
use crate::speech::announcer::{Announcer, PRIORITY_DIALOGUE};
use crate::speech::sink::SpeechSink;
use std::sync::Arc;
use tracing::{info, warn};

/// One backend per mixer.
pub struct MixerBackends {
    pub stealth: Box<dyn AudioBackend>,
    pub minigame: Box<dyn AudioBackend>,
    pub interactable: Box<dyn AudioBackend>,
}

impl MixerBackends {
    /// In-memory backends for device-less hosts.
    pub fn headless() -> Self {
        Self {
            stealth: Box::new(HeadlessBackend::new()),
            minigame: Box::new(HeadlessBackend::new()),
            interactable: Box::new(HeadlessBackend::new()),
        }
    }

    /// A `rodio` backend per mixer on the default output device.
    pub fn rodio() -> AccessResult<Self> {
        Ok(Self {
            stealth: Box::new(RodioBackend::new()?),
            minigame: Box::new(RodioBackend::new()?),
            interactable: Box::new(RodioBackend::new()?),
        })
    }

    /// `rodio` when an output device exists, headless otherwise.
    pub fn rodio_or_headless() -> Self {
        match Self::rodio() {
            Ok(backends) => backends,
            Err(e) => {
                warn!("No audio output, cues will be silent: {}", e);
                Self::headless()
            }
        }
    }
}

pub struct AccessibilitySession<S: SpeechSink> {
    announcer: Announcer<S>,
    stealth: SpatialMixer,
    minigame: SpatialMixer,
    interactable: SpatialMixer,
    speech_ready: bool,
}

impl<S: SpeechSink> AccessibilitySession<S> {
    /// Load clips from `config.audio.clip_dir` and start the session.
    pub fn new(
        config: &AccessibilityConfig,
        sink: S,
        clock: Arc<dyn Clock>,
        backends: MixerBackends,
    ) -> AccessResult<Self> {
        let library = ClipLibrary::new()
            .with_looping(LOOPING_CLIPS)
            .load_dir(&config.audio.clip_dir)?;
        Ok(Self::with_library(config, sink, clock, backends, library))
    }

    /// Start a session over clips already in memory. Each mixer gets its own copy.
    pub fn with_library(
        config: &AccessibilityConfig,
        mut sink: S,
        clock: Arc<dyn Clock>,
        backends: MixerBackends,
        library: ClipLibrary,
    ) -> Self {
        let speech_ready = sink.initialize();
        if speech_ready {
            info!(driver = %sink.detected_driver_name(), "Speech output ready");
        } else {
            warn!("Speech output unavailable, announcements will be dropped by the sink");
        }

        let audio = &config.audio;
        let stealth = SpatialMixer::new(
            "stealth",
            audio.stealth,
            library.clone(),
            backends.stealth,
            clock.clone(),
        );
        let minigame = SpatialMixer::new(
            "minigame",
            audio.minigame,
            library.clone(),
            backends.minigame,
            clock.clone(),
        );
        let interactable = SpatialMixer::new(
            "interactable",
            audio.interactable,
            library,
            backends.interactable,
            clock.clone(),
        );

        let mut announcer = Announcer::new(sink, clock, config);
        if speech_ready && !config.speech.welcome.trim().is_empty() {
            announcer.speak(&config.speech.welcome, true, PRIORITY_DIALOGUE);
        }

        Self {
            announcer,
            stealth,
            minigame,
            interactable,
            speech_ready,
        }
    }

    /// Per-frame step: speech first, then every mixer.
    pub fn tick(&mut self) {
        self.announcer.tick();
        self.stealth.tick();
        self.minigame.tick();
        self.interactable.tick();
    }

    /// Stop speaking and drop pending speech. Audio cues keep playing.
    pub fn silence(&mut self) {
        self.announcer.silence();
    }

    /// Stop all audio, silence speech, and release the speech driver.
    pub fn shutdown(&mut self) {
        self.stealth.stop_all();
        self.minigame.stop_all();
        self.interactable.stop_all();
        self.announcer.silence();
        self.announcer.scheduler_mut().sink_mut().shutdown();
        info!("Accessibility session shut down");
    }

    pub fn speech_ready(&self) -> bool {
        self.speech_ready
    }

    pub fn announcer(&self) -> &Announcer<S> {
        &self.announcer
    }

    pub fn announcer_mut(&mut self) -> &mut Announcer<S> {
        &mut self.announcer
    }

    pub fn stealth(&self) -> &SpatialMixer {
        &self.stealth
    }

    pub fn stealth_mut(&mut self) -> &mut SpatialMixer {
        &mut self.stealth
    }

    pub fn minigame(&self) -> &SpatialMixer {
        &self.minigame
    }

    pub fn minigame_mut(&mut self) -> &mut SpatialMixer {
        &mut self.minigame
    }

    pub fn interactable(&self) -> &SpatialMixer {
        &self.interactable
    }

    pub fn interactable_mut(&mut self) -> &mut SpatialMixer {
        &mut self.interactable
    }
}
