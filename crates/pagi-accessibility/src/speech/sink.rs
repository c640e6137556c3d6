//! Speech sink boundary: the opaque screen-reader or TTS driver behind the scheduler.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// A driver that speaks text asynchronously.
///
/// Every call is synchronous from the scheduler's point of view and reports failure as
/// `false`, never as a panic or error value.
pub trait SpeechSink {
    /// Load the driver. Returns whether speech output is usable.
    fn initialize(&mut self) -> bool;

    /// Begin speaking `text`; `interrupt` cuts off whatever is currently being spoken.
    fn speak(&mut self, text: &str, interrupt: bool) -> bool;

    /// Stop speaking immediately.
    fn silence(&mut self) -> bool;

    fn shutdown(&mut self);

    fn has_speech_output(&self) -> bool;

    fn has_braille_output(&self) -> bool;

    /// Name of the detected screen reader or engine ("None" when not initialized).
    fn detected_driver_name(&self) -> String;
}

impl<S: SpeechSink + ?Sized> SpeechSink for Box<S> {
    fn initialize(&mut self) -> bool {
        (**self).initialize()
    }

    fn speak(&mut self, text: &str, interrupt: bool) -> bool {
        (**self).speak(text, interrupt)
    }

    fn silence(&mut self) -> bool {
        (**self).silence()
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }

    fn has_speech_output(&self) -> bool {
        (**self).has_speech_output()
    }

    fn has_braille_output(&self) -> bool {
        (**self).has_braille_output()
    }

    fn detected_driver_name(&self) -> String {
        (**self).detected_driver_name()
    }
}

/// One call observed by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenLine {
    pub text: String,
    pub interrupt: bool,
}

#[derive(Debug, Default)]
struct RecordingState {
    initialized: bool,
    failing: bool,
    spoken: Vec<SpokenLine>,
    silence_count: usize,
}

/// In-memory sink: records what would have been spoken.
///
/// Used by tests and as the silent fallback when no driver is installed. Clones share
/// the same recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent `speak`/`silence` report failure (driver crashed or missing).
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Every line passed to `speak`, including ones that reported failure.
    pub fn spoken(&self) -> Vec<SpokenLine> {
        self.state().spoken.clone()
    }

    /// Just the texts, in dispatch order.
    pub fn texts(&self) -> Vec<String> {
        self.state().spoken.iter().map(|l| l.text.clone()).collect()
    }

    pub fn silence_count(&self) -> usize {
        self.state().silence_count
    }

    pub fn clear(&self) {
        let mut state = self.state();
        state.spoken.clear();
        state.silence_count = 0;
    }
}

impl SpeechSink for RecordingSink {
    fn initialize(&mut self) -> bool {
        let mut state = self.state();
        state.initialized = !state.failing;
        state.initialized
    }

    fn speak(&mut self, text: &str, interrupt: bool) -> bool {
        let mut state = self.state();
        state.spoken.push(SpokenLine {
            text: text.to_string(),
            interrupt,
        });
        debug!(interrupt, "RecordingSink: {}", text);
        !state.failing
    }

    fn silence(&mut self) -> bool {
        let mut state = self.state();
        state.silence_count += 1;
        !state.failing
    }

    fn shutdown(&mut self) {
        self.state().initialized = false;
        info!("RecordingSink: shut down");
    }

    fn has_speech_output(&self) -> bool {
        let state = self.state();
        state.initialized && !state.failing
    }

    fn has_braille_output(&self) -> bool {
        false
    }

    fn detected_driver_name(&self) -> String {
        if self.state().initialized {
            "Recording".to_string()
        } else {
            "None".to_string()
        }
    }
}
