//! **SpatialMixer** - positional cue playback for one audio category.
//!
//! A mixer owns its clip library, its backend, and every handle it starts. Several mixers
//! can run side by side (stealth, minigame, interactable) without sharing any state, so a
//! looping tone started on one never collides with the same clip name on another.
//!
//! Handle kinds:
//! - one-shots: fire and forget, optionally tracked until they finish
//! - singleton loops: at most one voice per clip name
//! - directional channels: loops bound to an emitter key, retargeted as things move
//! - the progress tone: one voice, replaced on every call
//! - the focused interactable: one loop that follows the listener every tick

use crate::audio::backend::{AudioBackend, PlaybackParams, VoiceId};
use crate::audio::interactable::{InteractableKind, TrackedInteractable};
use crate::audio::library::ClipLibrary;
use crate::audio::spatial::{
    clamp_pan, clamp_volume, progress_pitch, volume_from_distance, MixerProfile, Vec2,
};
use crate::clock::Clock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const TIMING_BAR_SUCCESS: &str = "timing_bar_success.wav";
pub const THROW_TONE: &str = "throw_tone.wav";
pub const BUTTON_UP: &str = "button_up.wav";
pub const BUTTON_DOWN: &str = "button_down.wav";
pub const BUTTON_LEFT: &str = "button_left.wav";
pub const BUTTON_RIGHT: &str = "button_right.wav";
pub const DANGER_SOUND: &str = "danger.wav";
pub const PROGRESS_TONE: &str = "progress_tone.wav";
pub const SAFE_ZONE_LOOP: &str = "safe_zone_loop.wav";
pub const PROXIMITY_BEEP_NEAR: &str = "proximity_beep_near.wav";
pub const PROXIMITY_BEEP_MEDIUM: &str = "proximity_beep_medium.wav";
pub const PROXIMITY_BEEP_FAR: &str = "proximity_beep_far.wav";

/// Clips that loop by default when loaded from disk.
pub const LOOPING_CLIPS: [&str; 2] = [THROW_TONE, SAFE_ZONE_LOOP];

/// Caller volume is scaled by this for plain one-shots.
const ONE_SHOT_SCALE: f32 = 0.7;
const DIRECTIONAL_VOLUME: f32 = 0.8;
const BUTTON_CUE_VOLUME: f32 = 0.8;
const PROGRESS_VOLUME: f32 = 0.6;
const DANGER_VOLUME: f32 = 0.9;
const LOOP_PITCH_MIN: f32 = 0.5;
const LOOP_PITCH_MAX: f32 = 3.0;

/// Minimum gap between proximity beeps.
pub const PROXIMITY_BEEP_INTERVAL: Duration = Duration::from_millis(1500);

/// Opaque key of a directional channel: `{clip}_{emitter}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey(String);

impl ChannelKey {
    fn new(clip: &str, emitter_key: &str) -> Self {
        Self(format!("{}_{}", clip, emitter_key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A started voice and the parameters the mixer last applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundHandle {
    pub voice: VoiceId,
    pub clip: String,
    pub looping: bool,
    pub pan: f32,
    pub volume: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone)]
struct DirectionalChannel {
    handle: SoundHandle,
    emitter_key: String,
    emitter: Vec2,
}

/// Read-only view of a directional channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSnapshot {
    pub voice: VoiceId,
    pub clip: String,
    pub emitter_key: String,
    pub emitter: Vec2,
    pub pan: f32,
    pub volume: f32,
}

/// Clip selected for a button prompt, by substring of the direction label.
pub fn button_clip(direction: &str) -> Option<&'static str> {
    let direction = direction.to_lowercase();
    if direction.contains("up") {
        Some(BUTTON_UP)
    } else if direction.contains("down") {
        Some(BUTTON_DOWN)
    } else if direction.contains("left") {
        Some(BUTTON_LEFT)
    } else if direction.contains("right") {
        Some(BUTTON_RIGHT)
    } else {
        None
    }
}

/// Proximity beep clip by distance band: near (<2), medium (<5), far.
pub fn proximity_clip(distance: f32) -> &'static str {
    if distance < 2.0 {
        PROXIMITY_BEEP_NEAR
    } else if distance < 5.0 {
        PROXIMITY_BEEP_MEDIUM
    } else {
        PROXIMITY_BEEP_FAR
    }
}

pub struct SpatialMixer {
    label: String,
    profile: MixerProfile,
    library: ClipLibrary,
    backend: Box<dyn AudioBackend>,
    clock: Arc<dyn Clock>,
    listener: Vec2,
    loops: HashMap<String, SoundHandle>,
    channels: HashMap<ChannelKey, DirectionalChannel>,
    one_shots: Vec<VoiceId>,
    progress: Option<VoiceId>,
    last_proximity_beep: Option<Duration>,
    interactable: Option<TrackedInteractable>,
}

impl SpatialMixer {
    pub fn new(
        label: impl Into<String>,
        profile: MixerProfile,
        library: ClipLibrary,
        backend: Box<dyn AudioBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let label = label.into();
        info!(mixer = %label, clips = library.len(), "Mixer ready");
        Self {
            label,
            profile,
            library,
            backend,
            clock,
            listener: Vec2::ZERO,
            loops: HashMap::new(),
            channels: HashMap::new(),
            one_shots: Vec::new(),
            progress: None,
            last_proximity_beep: None,
            interactable: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn profile(&self) -> &MixerProfile {
        &self.profile
    }

    pub fn has_clip(&self, clip: &str) -> bool {
        self.library.contains(clip)
    }

    pub fn listener(&self) -> Vec2 {
        self.listener
    }

    /// Move the listener. Directional plays and the tracked interactable are placed relative to it.
    pub fn set_listener(&mut self, position: Vec2) {
        self.listener = position;
    }

    /// Start a voice, logging instead of failing when the clip or backend is unavailable.
    fn start(&mut self, clip: &str, params: PlaybackParams) -> Option<SoundHandle> {
        let loaded = match self.library.get(clip) {
            Ok(c) => c,
            Err(e) => {
                warn!(mixer = %self.label, "{}", e);
                return None;
            }
        };
        // Clips registered as looping loop wherever they are played.
        let params = PlaybackParams {
            looping: params.looping || loaded.looping(),
            ..params
        };
        match self.backend.play(loaded, params) {
            Ok(voice) => Some(SoundHandle {
                voice,
                clip: clip.to_string(),
                looping: params.looping,
                pan: params.pan,
                volume: params.volume,
                pitch: params.pitch,
            }),
            Err(e) => {
                warn!(mixer = %self.label, clip, "Failed to play: {}", e);
                None
            }
        }
    }

    /// Play a clip once. Nothing is kept once it starts, unless the clip loops, in which
    /// case it is tracked until `stop_all`.
    pub fn play_one_shot(&mut self, clip: &str, volume: f32) {
        let volume = clamp_volume(volume) * ONE_SHOT_SCALE;
        if let Some(handle) = self.start(clip, PlaybackParams::one_shot(volume)) {
            debug!(mixer = %self.label, clip, looping = handle.looping, "Playing one-shot");
            if handle.looping {
                self.one_shots.push(handle.voice);
            }
        }
    }

    /// Start the singleton loop for `clip`, or re-pitch it if it is already playing.
    pub fn play_looping_tone(&mut self, clip: &str, pitch: f32) {
        let pitch = pitch.clamp(LOOP_PITCH_MIN, LOOP_PITCH_MAX);
        if let Some(handle) = self.loops.get_mut(clip) {
            if self.backend.is_playing(handle.voice) {
                self.backend.set_pitch(handle.voice, pitch);
                handle.pitch = pitch;
                return;
            }
            self.loops.remove(clip);
        }

        if let Some(handle) = self.start(clip, PlaybackParams::looping(1.0).with_pitch(pitch)) {
            debug!(mixer = %self.label, clip, pitch, "Started looping tone");
            self.loops.insert(clip.to_string(), handle);
        }
    }

    /// Stop the singleton loop for `clip`. Unknown or already-stopped clips are ignored.
    pub fn stop_looping_tone(&mut self, clip: &str) {
        if let Some(handle) = self.loops.remove(clip) {
            self.backend.stop(handle.voice);
            debug!(mixer = %self.label, clip, "Stopped looping tone");
        }
    }

    /// Singleton loop placed by pan/volume, updated in place while it keeps playing.
    pub fn play_or_update_looping_spatial(&mut self, clip: &str, pan: f32, volume: f32) {
        let pan = clamp_pan(pan);
        let volume = clamp_volume(volume);
        if let Some(handle) = self.loops.get_mut(clip) {
            if self.backend.is_playing(handle.voice) {
                self.backend.set_pan(handle.voice, pan);
                self.backend.set_volume(handle.voice, volume);
                handle.pan = pan;
                handle.volume = volume;
                return;
            }
            self.loops.remove(clip);
        }

        let params = PlaybackParams::looping(volume).with_pan(pan);
        if let Some(handle) = self.start(clip, params) {
            info!(mixer = %self.label, clip, pan, volume, "Started looping spatial");
            self.loops.insert(clip.to_string(), handle);
        }
    }

    /// Tracked one-shot at an explicit pan.
    pub fn play_spatial(&mut self, clip: &str, pan: f32, volume: f32) {
        let params = PlaybackParams::one_shot(clamp_volume(volume)).with_pan(clamp_pan(pan));
        if let Some(handle) = self.start(clip, params) {
            debug!(mixer = %self.label, clip, pan = handle.pan, volume = handle.volume, "Playing spatial");
            self.one_shots.push(handle.voice);
        }
    }

    pub fn play_centered(&mut self, clip: &str, volume: f32) {
        self.play_spatial(clip, 0.0, volume);
    }

    /// Distance-banded beep, at most one per [`PROXIMITY_BEEP_INTERVAL`].
    ///
    /// Returns whether a beep was attempted.
    pub fn play_proximity_beep(&mut self, distance: f32, pan: f32) -> bool {
        let now = self.clock.now();
        if let Some(last) = self.last_proximity_beep {
            if now.saturating_sub(last) < PROXIMITY_BEEP_INTERVAL {
                return false;
            }
        }
        self.last_proximity_beep = Some(now);

        let distance = distance.abs();
        let volume = volume_from_distance(distance, self.profile.max_audible_distance, 0.0);
        self.play_spatial(proximity_clip(distance), pan, volume);
        true
    }

    /// Audible progress bar: pitch rises from 0.5x to 2.0x. Replaces any previous progress tone.
    pub fn play_progress_tone(&mut self, progress: f32) {
        if let Some(voice) = self.progress.take() {
            self.backend.stop(voice);
        }
        let pitch = progress_pitch(progress);
        let params = PlaybackParams::one_shot(PROGRESS_VOLUME).with_pitch(pitch);
        if let Some(handle) = self.start(PROGRESS_TONE, params) {
            debug!(mixer = %self.label, pitch, "Playing progress tone");
            self.progress = Some(handle.voice);
        }
    }

    /// Directional prompt: "up"/"down"/"left"/"right" picks the clip, pan and pitch place it.
    pub fn play_button_sequence_cue(&mut self, direction: &str, pan: f32, pitch: f32) {
        let Some(clip) = button_clip(direction) else {
            warn!(mixer = %self.label, direction, "No cue for direction");
            return;
        };
        let params = PlaybackParams::one_shot(BUTTON_CUE_VOLUME)
            .with_pan(clamp_pan(pan))
            .with_pitch(pitch.clamp(LOOP_PITCH_MIN, LOOP_PITCH_MAX));
        if self.start(clip, params).is_some() {
            debug!(mixer = %self.label, direction, pan, pitch, "Playing button cue");
        }
    }

    pub fn play_danger_sound(&mut self) {
        self.start(DANGER_SOUND, PlaybackParams::one_shot(DANGER_VOLUME));
    }

    /// Loop `clip` panned toward an emitter relative to the current listener.
    ///
    /// Returns the channel key for later updates, or `None` when the clip is unknown or
    /// playback failed. Playing the same clip for the same emitter replaces the old channel.
    pub fn play_directional_looping_sound(
        &mut self,
        clip: &str,
        emitter_x: f32,
        emitter_y: f32,
        emitter_key: impl fmt::Display,
    ) -> Option<ChannelKey> {
        let emitter_key = emitter_key.to_string();
        let pan = self.profile.pan(emitter_x, self.listener.x);
        let params = PlaybackParams::looping(DIRECTIONAL_VOLUME).with_pan(pan);
        let handle = self.start(clip, params)?;

        let key = ChannelKey::new(clip, &emitter_key);
        if let Some(old) = self.channels.remove(&key) {
            self.backend.stop(old.handle.voice);
        }
        info!(
            mixer = %self.label,
            clip,
            pan,
            offset = emitter_x - self.listener.x,
            id = %emitter_key,
            "Playing looping directional"
        );
        self.channels.insert(
            key.clone(),
            DirectionalChannel {
                handle,
                emitter_key,
                emitter: Vec2::new(emitter_x, emitter_y),
            },
        );
        Some(key)
    }

    /// Re-pan and re-level a channel for new emitter/listener positions.
    ///
    /// A channel that stopped playing is dropped from tracking and nothing else happens.
    pub fn update_directional_sound(
        &mut self,
        key: &ChannelKey,
        emitter_x: f32,
        listener_x: f32,
        listener_y: f32,
    ) {
        let Some(channel) = self.channels.get_mut(key) else {
            return;
        };
        if !self.backend.is_playing(channel.handle.voice) {
            debug!(mixer = %self.label, key = %key, "Pruning stopped channel");
            self.channels.remove(key);
            return;
        }

        let pan = self.profile.pan(emitter_x, listener_x);
        let volume = self.profile.volume_at((emitter_x - listener_x).abs());
        self.backend.set_pan(channel.handle.voice, pan);
        self.backend.set_volume(channel.handle.voice, volume);
        channel.handle.pan = pan;
        channel.handle.volume = volume;
        channel.emitter.x = emitter_x;
        debug!(mixer = %self.label, key = %key, pan, volume, listener_y, "Updated directional");
    }

    /// Stop one directional channel. Unknown keys are ignored.
    pub fn stop_directional_sound(&mut self, key: &ChannelKey) {
        if let Some(channel) = self.channels.remove(key) {
            self.backend.stop(channel.handle.voice);
            debug!(mixer = %self.label, key = %key, "Stopped directional");
        }
    }

    pub fn channel(&self, key: &ChannelKey) -> Option<ChannelSnapshot> {
        self.channels.get(key).map(|c| ChannelSnapshot {
            voice: c.handle.voice,
            clip: c.handle.clip.clone(),
            emitter_key: c.emitter_key.clone(),
            emitter: c.emitter,
            pan: c.handle.pan,
            volume: c.handle.volume,
        })
    }

    pub fn is_tracking(&self, key: &ChannelKey) -> bool {
        self.channels.contains_key(key)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// The singleton loop for `clip`, if one was started and not stopped.
    pub fn looping_handle(&self, clip: &str) -> Option<&SoundHandle> {
        self.loops.get(clip)
    }

    /// Number of tracked one-shot voices not yet pruned by `tick`.
    pub fn tracked_one_shots(&self) -> usize {
        self.one_shots.len()
    }

    pub fn progress_voice(&self) -> Option<VoiceId> {
        self.progress
    }

    /// Follow an interactable with its kind's looping clip.
    ///
    /// The same `id` only moves the cue; a new `id` stops the previous cue first.
    pub fn focus_interactable(
        &mut self,
        id: impl Into<String>,
        kind: InteractableKind,
        position: Vec2,
    ) {
        let id = id.into();
        if let Some(tracked) = self.interactable.as_mut() {
            if tracked.id == id {
                tracked.position = position;
                self.refresh_interactable();
                return;
            }
        }
        self.clear_interactable();

        let pan = self.profile.pan(position.x, self.listener.x);
        let volume = self.profile.volume_at(position.distance(self.listener));
        let params = PlaybackParams::looping(volume).with_pan(pan);
        let voice = self.start(kind.clip(), params).map(|h| h.voice);
        debug!(mixer = %self.label, id = %id, clip = kind.clip(), "Focused interactable");
        self.interactable = Some(TrackedInteractable {
            id,
            kind,
            position,
            voice,
        });
    }

    pub fn move_interactable(&mut self, position: Vec2) {
        if let Some(tracked) = self.interactable.as_mut() {
            tracked.position = position;
        }
        self.refresh_interactable();
    }

    pub fn clear_interactable(&mut self) {
        if let Some(tracked) = self.interactable.take() {
            if let Some(voice) = tracked.voice {
                self.backend.stop(voice);
            }
        }
    }

    /// Kind and id of the focused interactable.
    pub fn focused_interactable(&self) -> Option<(&str, &InteractableKind)> {
        self.interactable.as_ref().map(|t| (t.id.as_str(), &t.kind))
    }

    /// Voice of the focused interactable's cue, when it started.
    pub fn interactable_voice(&self) -> Option<VoiceId> {
        self.interactable.as_ref().and_then(|t| t.voice)
    }

    fn refresh_interactable(&mut self) {
        let Some(tracked) = self.interactable.as_ref() else {
            return;
        };
        let Some(voice) = tracked.voice else {
            return;
        };
        let pan = self.profile.pan(tracked.position.x, self.listener.x);
        let volume = self.profile.volume_at(tracked.position.distance(self.listener));
        self.backend.set_pan(voice, pan);
        self.backend.set_volume(voice, volume);
    }

    /// Best-effort beep through this mixer's backend.
    pub fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32) {
        self.backend.play_tone(frequency_hz, duration_ms);
    }

    /// Per-frame upkeep: forget finished voices and keep the interactable cue placed.
    pub fn tick(&mut self) {
        let backend = &self.backend;
        self.one_shots.retain(|voice| backend.is_playing(*voice));
        self.loops.retain(|_, handle| backend.is_playing(handle.voice));
        if let Some(voice) = self.progress {
            if !backend.is_playing(voice) {
                self.progress = None;
            }
        }
        self.refresh_interactable();
    }

    /// Stop every voice this mixer started.
    pub fn stop_all(&mut self) {
        for (_, handle) in self.loops.drain() {
            self.backend.stop(handle.voice);
        }
        for (_, channel) in self.channels.drain() {
            self.backend.stop(channel.handle.voice);
        }
        for voice in self.one_shots.drain(..) {
            self.backend.stop(voice);
        }
        if let Some(voice) = self.progress.take() {
            self.backend.stop(voice);
        }
        self.clear_interactable();
        debug!(mixer = %self.label, "Stopped all sounds");
    }
}

impl Drop for SpatialMixer {
    fn drop(&mut self) {
        self.stop_all();
    }
}
