//! `rodio` playback for the spatial mixer.
//!
//! Each voice gets its own `rodio::Sink` so volume and pitch (sink speed) can change while
//! it plays. Pan is applied by [`StereoPan`], which reads a shared atomic on every sample.

use crate::audio::backend::{clamp_tone, AudioBackend, PlaybackParams, VoiceId};
use crate::audio::library::Clip;
use crate::error::{AccessError, AccessResult};
use rodio::source::SineWave;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pan value shared between the mixer thread and the audio callback.
#[derive(Debug, Clone, Default)]
pub struct SharedPan(Arc<AtomicU32>);

impl SharedPan {
    pub fn new(pan: f32) -> Self {
        let shared = Self::default();
        shared.set(pan);
        shared
    }

    pub fn set(&self, pan: f32) {
        self.0.store(pan.clamp(-1.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Left/right gains: full level on the panned-to side, linear fade on the other.
    fn gains(&self) -> (f32, f32) {
        let pan = self.get();
        ((1.0 - pan).min(1.0), (1.0 + pan).min(1.0))
    }
}

/// Source adapter that emits stereo with an adjustable balance.
///
/// Mono input is duplicated to both channels; stereo input is scaled per channel; any
/// other layout passes through untouched.
pub struct StereoPan<I> {
    input: I,
    pan: SharedPan,
    input_channels: u16,
    channel: u16,
    pending_right: Option<f32>,
}

impl<I> StereoPan<I>
where
    I: Source<Item = f32>,
{
    pub fn new(input: I, pan: SharedPan) -> Self {
        let input_channels = input.channels();
        Self {
            input,
            pan,
            input_channels,
            channel: 0,
            pending_right: None,
        }
    }
}

impl<I> Iterator for StereoPan<I>
where
    I: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        match self.input_channels {
            1 => {
                if let Some(right) = self.pending_right.take() {
                    return Some(right);
                }
                let sample = self.input.next()?;
                let (left, right) = self.pan.gains();
                self.pending_right = Some(sample * right);
                Some(sample * left)
            }
            2 => {
                let sample = self.input.next()?;
                let (left, right) = self.pan.gains();
                let gain = if self.channel == 0 { left } else { right };
                self.channel = (self.channel + 1) % 2;
                Some(sample * gain)
            }
            _ => self.input.next(),
        }
    }
}

impl<I> Source for StereoPan<I>
where
    I: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        match self.input_channels {
            1 => self
                .input
                .current_frame_len()
                .map(|n| n * 2 + usize::from(self.pending_right.is_some())),
            _ => self.input.current_frame_len(),
        }
    }

    fn channels(&self) -> u16 {
        match self.input_channels {
            1 => 2,
            n => n,
        }
    }

    fn sample_rate(&self) -> u32 {
        self.input.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.input.total_duration()
    }
}

struct RodioVoice {
    sink: Sink,
    pan: SharedPan,
}

/// Backend that plays voices on the default output device.
pub struct RodioBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    voices: HashMap<VoiceId, RodioVoice>,
    next_id: u64,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn new() -> AccessResult<Self> {
        let (stream, handle) = OutputStream::try_default()?;
        info!("RodioBackend: output ready");
        Ok(Self {
            _stream: stream,
            handle,
            voices: HashMap::new(),
            next_id: 0,
        })
    }

    /// Release voices whose sinks ran dry.
    fn prune_finished(&mut self) {
        self.voices.retain(|_, voice| !voice.sink.empty());
    }
}

impl AudioBackend for RodioBackend {
    fn play(&mut self, clip: &Clip, params: PlaybackParams) -> AccessResult<VoiceId> {
        self.prune_finished();

        let sink = Sink::try_new(&self.handle)?;
        let decoder = Decoder::new(Cursor::new(clip.data())).map_err(|e| AccessError::ClipLoad {
            name: clip.name().to_string(),
            reason: e.to_string(),
        })?;
        let pan = SharedPan::new(params.pan);
        let source = decoder.convert_samples::<f32>();
        if params.looping {
            sink.append(StereoPan::new(source.repeat_infinite(), pan.clone()));
        } else {
            sink.append(StereoPan::new(source, pan.clone()));
        }
        sink.set_volume(params.volume);
        sink.set_speed(params.pitch);

        self.next_id += 1;
        let id = VoiceId(self.next_id);
        self.voices.insert(id, RodioVoice { sink, pan });
        debug!(clip = clip.name(), voice = id.0, "rodio play");
        Ok(id)
    }

    fn set_pan(&mut self, voice: VoiceId, pan: f32) {
        if let Some(v) = self.voices.get(&voice) {
            v.pan.set(pan);
        }
    }

    fn set_volume(&mut self, voice: VoiceId, volume: f32) {
        if let Some(v) = self.voices.get(&voice) {
            v.sink.set_volume(volume);
        }
    }

    fn set_pitch(&mut self, voice: VoiceId, pitch: f32) {
        if let Some(v) = self.voices.get(&voice) {
            v.sink.set_speed(pitch);
        }
    }

    fn is_playing(&self, voice: VoiceId) -> bool {
        self.voices.get(&voice).is_some_and(|v| !v.sink.empty())
    }

    fn stop(&mut self, voice: VoiceId) {
        if let Some(v) = self.voices.remove(&voice) {
            v.sink.stop();
        }
    }

    fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32) {
        let (frequency, duration) = clamp_tone(frequency_hz, duration_ms);
        // OutputStream is not Send, so the tone opens its own stream on its own thread.
        let spawned = thread::Builder::new()
            .name("cue-tone".to_string())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!("Tone: no output device: {}", e);
                        return;
                    }
                };
                match Sink::try_new(&handle) {
                    Ok(sink) => {
                        sink.append(
                            SineWave::new(frequency as f32)
                                .take_duration(Duration::from_millis(u64::from(duration)))
                                .amplify(0.25),
                        );
                        sink.sleep_until_end();
                    }
                    Err(e) => warn!("Tone: sink failed: {}", e),
                }
            });
        if let Err(e) = spawned {
            warn!("Tone: failed to spawn: {}", e);
        }
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        for voice in self.voices.values() {
            voice.sink.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::buffer::SamplesBuffer;

    #[test]
    fn mono_is_spread_to_stereo_with_pan() {
        let input = SamplesBuffer::new(1, 8000, vec![1.0f32, 0.5]);
        let pan = SharedPan::new(1.0);
        let panned = StereoPan::new(input, pan);
        assert_eq!(panned.channels(), 2);
        let samples: Vec<f32> = panned.collect();
        assert_eq!(samples, vec![0.0, 1.0, 0.0, 0.5]);
    }

    #[test]
    fn stereo_channels_are_scaled_independently() {
        let input = SamplesBuffer::new(2, 8000, vec![1.0f32, 1.0, 1.0, 1.0]);
        let pan = SharedPan::new(-0.5);
        let samples: Vec<f32> = StereoPan::new(input, pan).collect();
        assert_eq!(samples, vec![1.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn centered_pan_is_unity() {
        let pan = SharedPan::new(0.0);
        assert_eq!(pan.gains(), (1.0, 1.0));
        pan.set(4.0);
        assert_eq!(pan.get(), 1.0);
    }
}
