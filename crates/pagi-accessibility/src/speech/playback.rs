//! **PlaybackSink** - a speech sink that renders text through a TTS backend into `rodio`.
//!
//! Used when no screen reader is present but an audio device is. Interrupting speech
//! stops the current `rodio::Sink` and starts a fresh one so nothing queued survives.

use crate::error::{AccessError, AccessResult};
use crate::speech::sink::SpeechSink;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use tracing::{info, warn};

/// Backend that turns text into audio bytes (WAV/MP3).
pub trait TtsBackend: Send + Sync {
    /// Synthesize text to audio bytes. Return an empty vec to skip playback.
    fn synthesize(&self, text: &str) -> AccessResult<Vec<u8>>;

    fn name(&self) -> &str {
        "tts"
    }
}

/// Placeholder TTS: returns empty audio so nothing plays.
#[derive(Debug, Default)]
pub struct PlaceholderTts;

impl TtsBackend for PlaceholderTts {
    fn synthesize(&self, _text: &str) -> AccessResult<Vec<u8>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}

struct Output {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Sink,
}

impl Output {
    fn open() -> AccessResult<Self> {
        let (stream, handle) = OutputStream::try_default()?;
        let sink = Sink::try_new(&handle)?;
        Ok(Self {
            _stream: stream,
            handle,
            sink,
        })
    }

    /// Drop whatever is queued and replace the sink.
    fn reset(&mut self) -> AccessResult<()> {
        self.sink.stop();
        self.sink = Sink::try_new(&self.handle)?;
        Ok(())
    }
}

/// Speech sink backed by a [`TtsBackend`] and the default output device.
pub struct PlaybackSink {
    tts: Box<dyn TtsBackend>,
    output: Option<Output>,
}

impl PlaybackSink {
    pub fn new(tts: Box<dyn TtsBackend>) -> Self {
        Self { tts, output: None }
    }

    fn play_bytes(&mut self, bytes: Vec<u8>, interrupt: bool) -> AccessResult<()> {
        let output = self
            .output
            .as_mut()
            .ok_or_else(|| AccessError::Speech("output not initialized".to_string()))?;
        if interrupt {
            output.reset()?;
        }
        if bytes.is_empty() {
            return Ok(());
        }
        let source = rodio::Decoder::new(Cursor::new(bytes))?;
        output.sink.append(source.convert_samples::<f32>());
        Ok(())
    }

    /// Whether the sink currently has queued samples.
    pub fn is_playing(&self) -> bool {
        self.output.as_ref().is_some_and(|o| !o.sink.empty())
    }
}

impl SpeechSink for PlaybackSink {
    fn initialize(&mut self) -> bool {
        match Output::open() {
            Ok(output) => {
                self.output = Some(output);
                info!(backend = self.tts.name(), "PlaybackSink: output ready");
                true
            }
            Err(e) => {
                warn!("PlaybackSink: no output device: {}", e);
                false
            }
        }
    }

    fn speak(&mut self, text: &str, interrupt: bool) -> bool {
        if self.output.is_none() || text.trim().is_empty() {
            return false;
        }
        let result = self
            .tts
            .synthesize(text)
            .and_then(|bytes| self.play_bytes(bytes, interrupt));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("PlaybackSink: failed to speak: {}", e);
                false
            }
        }
    }

    fn silence(&mut self) -> bool {
        let Some(output) = self.output.as_mut() else {
            return false;
        };
        match output.reset() {
            Ok(()) => true,
            Err(e) => {
                warn!("PlaybackSink: failed to silence: {}", e);
                false
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(output) = self.output.take() {
            output.sink.stop();
            info!("PlaybackSink: shut down");
        }
    }

    fn has_speech_output(&self) -> bool {
        self.output.is_some()
    }

    fn has_braille_output(&self) -> bool {
        false
    }

    fn detected_driver_name(&self) -> String {
        if self.output.is_some() {
            self.tts.name().to_string()
        } else {
            "None".to_string()
        }
    }
}
