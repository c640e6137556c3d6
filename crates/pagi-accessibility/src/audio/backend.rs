//! Audio backend boundary used by the spatial mixer.
//!
//! A backend plays decoded clips as independent voices and lets the mixer adjust each
//! voice's pan, volume, and pitch while it plays. [`HeadlessBackend`] keeps the same
//! bookkeeping in memory for tests and hosts without an output device.

use crate::audio::library::Clip;
use crate::error::AccessResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Backend-assigned identifier of one playing voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

/// Initial parameters for a voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackParams {
    pub looping: bool,
    /// -1 (left) ..= 1 (right).
    pub pan: f32,
    /// 0 ..= 1.
    pub volume: f32,
    /// Playback-rate multiplier.
    pub pitch: f32,
}

impl PlaybackParams {
    pub fn one_shot(volume: f32) -> Self {
        Self {
            looping: false,
            pan: 0.0,
            volume,
            pitch: 1.0,
        }
    }

    pub fn looping(volume: f32) -> Self {
        Self {
            looping: true,
            ..Self::one_shot(volume)
        }
    }

    pub fn with_pan(mut self, pan: f32) -> Self {
        self.pan = pan;
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }
}

/// Clamp a tone request to what a beep generator can produce: 37..=32767 Hz, 10..=5000 ms.
pub fn clamp_tone(frequency_hz: u32, duration_ms: u32) -> (u32, u32) {
    (frequency_hz.clamp(37, 32_767), duration_ms.clamp(10, 5_000))
}

/// Plays clips as independently controllable voices.
pub trait AudioBackend {
    fn play(&mut self, clip: &Clip, params: PlaybackParams) -> AccessResult<VoiceId>;

    fn set_pan(&mut self, voice: VoiceId, pan: f32);

    fn set_volume(&mut self, voice: VoiceId, volume: f32);

    fn set_pitch(&mut self, voice: VoiceId, pitch: f32);

    /// False once the voice finished or was stopped, and for unknown ids.
    fn is_playing(&self, voice: VoiceId) -> bool;

    /// Stop and release the voice. Unknown ids are ignored.
    fn stop(&mut self, voice: VoiceId);

    /// Best-effort sine beep. Fire-and-forget: no ordering against other cues.
    fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32);
}

/// Snapshot of a voice inside a [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessVoice {
    pub id: VoiceId,
    pub clip: String,
    pub params: PlaybackParams,
    pub playing: bool,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_id: u64,
    voices: HashMap<VoiceId, HeadlessVoice>,
    tones: Vec<(u32, u32)>,
    failing: bool,
}

/// In-memory backend. Clones share state, so a test can keep one handle while the mixer
/// owns another.
///
/// One-shot voices keep "playing" until [`finish`](Self::finish) is called, which stands
/// in for the clip reaching its end.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `play` fail, as a backend with a dead device would.
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Simulate a voice reaching its end.
    pub fn finish(&self, voice: VoiceId) {
        if let Some(v) = self.state().voices.get_mut(&voice) {
            v.playing = false;
        }
    }

    /// Finish every voice playing `clip`.
    pub fn finish_clip(&self, clip: &str) {
        for v in self.state().voices.values_mut().filter(|v| v.clip == clip) {
            v.playing = false;
        }
    }

    pub fn voice(&self, voice: VoiceId) -> Option<HeadlessVoice> {
        self.state().voices.get(&voice).cloned()
    }

    /// All voices ever started, oldest first.
    pub fn voices(&self) -> Vec<HeadlessVoice> {
        let mut voices: Vec<HeadlessVoice> = self.state().voices.values().cloned().collect();
        voices.sort_by_key(|v| v.id);
        voices
    }

    pub fn playing(&self) -> Vec<HeadlessVoice> {
        self.voices().into_iter().filter(|v| v.playing).collect()
    }

    /// Voices (playing or not) started for `clip`.
    pub fn voices_for(&self, clip: &str) -> Vec<HeadlessVoice> {
        self.voices().into_iter().filter(|v| v.clip == clip).collect()
    }

    pub fn tones(&self) -> Vec<(u32, u32)> {
        self.state().tones.clone()
    }
}

impl AudioBackend for HeadlessBackend {
    fn play(&mut self, clip: &Clip, params: PlaybackParams) -> AccessResult<VoiceId> {
        let mut state = self.state();
        if state.failing {
            return Err(crate::error::AccessError::Playback(
                "headless backend set to fail".to_string(),
            ));
        }
        state.next_id += 1;
        let id = VoiceId(state.next_id);
        state.voices.insert(
            id,
            HeadlessVoice {
                id,
                clip: clip.name().to_string(),
                params,
                playing: true,
            },
        );
        debug!(clip = clip.name(), voice = id.0, "headless play");
        Ok(id)
    }

    fn set_pan(&mut self, voice: VoiceId, pan: f32) {
        if let Some(v) = self.state().voices.get_mut(&voice) {
            v.params.pan = pan;
        }
    }

    fn set_volume(&mut self, voice: VoiceId, volume: f32) {
        if let Some(v) = self.state().voices.get_mut(&voice) {
            v.params.volume = volume;
        }
    }

    fn set_pitch(&mut self, voice: VoiceId, pitch: f32) {
        if let Some(v) = self.state().voices.get_mut(&voice) {
            v.params.pitch = pitch;
        }
    }

    fn is_playing(&self, voice: VoiceId) -> bool {
        self.state().voices.get(&voice).is_some_and(|v| v.playing)
    }

    fn stop(&mut self, voice: VoiceId) {
        if let Some(v) = self.state().voices.get_mut(&voice) {
            v.playing = false;
        }
    }

    fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32) {
        let tone = clamp_tone(frequency_hz, duration_ms);
        self.state().tones.push(tone);
    }
}
