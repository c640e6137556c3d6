//! Speech scheduler: priority queue, rate limiting, and repeat suppression in front of a
//! [`SpeechSink`].
//!
//! Single-threaded and tick-driven. Callers push utterances with [`SpeechScheduler::speak`]
//! at any time; [`SpeechScheduler::tick`] is called once per frame and dispatches at most
//! one queued utterance, no sooner than `min_dispatch_interval` after the previous one.

use crate::clock::Clock;
use crate::config::SpeechConfig;
use crate::speech::sink::SpeechSink;
use crate::speech::text::clean_text;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lower bound for the dispatch interval.
pub const MIN_DISPATCH_INTERVAL_FLOOR: Duration = Duration::from_millis(50);

/// Lower bound for the repeat window.
pub const REPEAT_WINDOW_FLOOR: Duration = Duration::from_millis(100);

/// One unit of speech waiting in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub interrupt: bool,
    pub priority: i32,
    /// Clock reading when the utterance was accepted.
    pub enqueued_at: Duration,
}

/// Outcome of a [`SpeechScheduler::speak`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// Nothing speakable after cleanup.
    Empty,
    /// Same text as the last accepted utterance, inside the repeat window.
    Repeated,
    /// Waiting in the priority queue.
    Queued,
    /// Sent straight to the sink (interrupt).
    Dispatched,
    /// Sent to the sink, which reported failure. The utterance is consumed.
    Failed,
    /// The announcement category is switched off in config.
    Disabled,
}

/// Remembers the last accepted text so identical repeats inside a window can be dropped.
#[derive(Debug, Clone)]
pub struct RepeatGuard {
    window: Duration,
    last: Option<(String, Duration)>,
}

impl RepeatGuard {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Whether `text` repeats the last admitted text within the window.
    pub fn is_repeat(&self, text: &str, now: Duration) -> bool {
        match &self.last {
            Some((last, at)) => last == text && now.saturating_sub(*at) < self.window,
            None => false,
        }
    }

    /// Record `text` as admitted at `now`.
    pub fn record(&mut self, text: &str, now: Duration) {
        self.last = Some((text.to_string(), now));
    }

    /// Check and record in one step. Returns false (and records nothing) for a repeat.
    pub fn admit(&mut self, text: &str, now: Duration) -> bool {
        if self.is_repeat(text, now) {
            return false;
        }
        self.record(text, now);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[derive(Debug, Clone)]
struct Deferred {
    due: Duration,
    text: String,
    priority: i32,
}

/// Priority-ordered speech queue driving a single [`SpeechSink`].
pub struct SpeechScheduler<S: SpeechSink> {
    sink: S,
    clock: Arc<dyn Clock>,
    min_dispatch_interval: Duration,
    repeats: RepeatGuard,
    queue: VecDeque<Utterance>,
    deferred: Vec<Deferred>,
    last_dispatch: Option<Duration>,
    last_spoken: Option<String>,
}

impl<S: SpeechSink> SpeechScheduler<S> {
    pub fn new(sink: S, clock: Arc<dyn Clock>, config: &SpeechConfig) -> Self {
        let mut scheduler = Self {
            sink,
            clock,
            min_dispatch_interval: MIN_DISPATCH_INTERVAL_FLOOR,
            repeats: RepeatGuard::new(REPEAT_WINDOW_FLOOR),
            queue: VecDeque::new(),
            deferred: Vec::new(),
            last_dispatch: None,
            last_spoken: None,
        };
        scheduler.set_min_dispatch_interval(config.min_dispatch_interval());
        scheduler.set_repeat_window(config.repeat_window());
        scheduler
    }

    /// Clean `text` and either dispatch it now (`interrupt`) or queue it by `priority`.
    pub fn speak(&mut self, text: &str, interrupt: bool, priority: i32) -> SpeakOutcome {
        let cleaned = clean_text(text);
        if cleaned.is_empty() {
            return SpeakOutcome::Empty;
        }

        let now = self.clock.now();
        if !self.repeats.admit(&cleaned, now) {
            debug!(target: "tts", "dropping repeat: {}", cleaned);
            return SpeakOutcome::Repeated;
        }

        let utterance = Utterance {
            text: cleaned,
            interrupt,
            priority,
            enqueued_at: now,
        };

        if interrupt {
            // Clear, silence, and dispatch with no queue mutation in between.
            self.queue.clear();
            self.sink.silence();
            if self.dispatch(utterance) {
                SpeakOutcome::Dispatched
            } else {
                SpeakOutcome::Failed
            }
        } else {
            self.enqueue(utterance);
            SpeakOutcome::Queued
        }
    }

    /// Schedule non-interrupting speech for `delay` from now.
    ///
    /// The text is handed to [`speak`](Self::speak) on the first tick at or after its due
    /// time, so it is subject to the same cleanup and repeat suppression as direct speech.
    pub fn speak_after(&mut self, text: &str, delay: Duration, priority: i32) {
        if text.trim().is_empty() {
            return;
        }
        let due = self.clock.now().saturating_add(delay);
        // Keep due-time order; equal due times stay in call order.
        let index = self.deferred.partition_point(|d| d.due <= due);
        self.deferred.insert(
            index,
            Deferred {
                due,
                text: text.to_string(),
                priority,
            },
        );
    }

    /// Per-frame step: release due deferred speech, then dispatch one queued utterance if
    /// the dispatch interval has elapsed.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        let due_count = self.deferred.partition_point(|d| d.due <= now);
        if due_count > 0 {
            let due: Vec<Deferred> = self.deferred.drain(..due_count).collect();
            for entry in due {
                self.speak(&entry.text, false, entry.priority);
            }
        }

        if self.queue.is_empty() {
            return;
        }
        let ready = self
            .last_dispatch
            .map_or(true, |last| now.saturating_sub(last) >= self.min_dispatch_interval);
        if !ready {
            return;
        }
        if let Some(next) = self.queue.pop_front() {
            self.dispatch(next);
        }
    }

    /// Drop all pending and deferred speech and stop the sink.
    pub fn silence(&mut self) {
        self.queue.clear();
        self.deferred.clear();
        if !self.sink.silence() {
            debug!(target: "tts", "sink refused silence");
        }
    }

    /// Insert before the first queued item with strictly lower priority, so equal
    /// priorities keep arrival order.
    fn enqueue(&mut self, utterance: Utterance) {
        let index = self
            .queue
            .iter()
            .position(|existing| utterance.priority > existing.priority)
            .unwrap_or(self.queue.len());
        self.queue.insert(index, utterance);
    }

    /// Hand an utterance to the sink. Failure still consumes it.
    fn dispatch(&mut self, utterance: Utterance) -> bool {
        let ok = self.sink.speak(&utterance.text, utterance.interrupt);
        if ok {
            info!(target: "tts", priority = utterance.priority, "[TTS] {}", utterance.text);
        } else {
            warn!(target: "tts", "sink failed to speak: {}", utterance.text);
        }
        self.last_dispatch = Some(self.clock.now());
        self.last_spoken = Some(utterance.text);
        ok
    }

    pub fn set_min_dispatch_interval(&mut self, interval: Duration) {
        self.min_dispatch_interval = interval.max(MIN_DISPATCH_INTERVAL_FLOOR);
    }

    pub fn set_repeat_window(&mut self, window: Duration) {
        self.repeats.set_window(window.max(REPEAT_WINDOW_FLOOR));
    }

    pub fn min_dispatch_interval(&self) -> Duration {
        self.min_dispatch_interval
    }

    pub fn repeat_window(&self) -> Duration {
        self.repeats.window()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Queued utterances in dispatch order.
    pub fn pending(&self) -> impl Iterator<Item = &Utterance> {
        self.queue.iter()
    }

    pub fn last_spoken(&self) -> Option<&str> {
        self.last_spoken.as_deref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::speech::sink::RecordingSink;

    fn scheduler() -> (SpeechScheduler<RecordingSink>, RecordingSink, ManualClock) {
        let sink = RecordingSink::new();
        let clock = ManualClock::new();
        let scheduler =
            SpeechScheduler::new(sink.clone(), Arc::new(clock.clone()), &SpeechConfig::default());
        (scheduler, sink, clock)
    }

    /// Tick once per 100ms frame until the queue drains.
    fn drain(scheduler: &mut SpeechScheduler<RecordingSink>, clock: &ManualClock) {
        for _ in 0..50 {
            scheduler.tick();
            if scheduler.pending_len() == 0 {
                break;
            }
            clock.advance_ms(100);
        }
    }

    #[test]
    fn priority_order_is_stable() {
        let (mut s, sink, clock) = scheduler();
        for (text, priority) in [("a3", 3), ("b9", 9), ("c5", 5), ("d9", 9), ("e1", 1)] {
            assert_eq!(s.speak(text, false, priority), SpeakOutcome::Queued);
        }
        drain(&mut s, &clock);
        assert_eq!(sink.texts(), vec!["b9", "d9", "c5", "a3", "e1"]);
    }

    #[test]
    fn interrupt_clears_queue_and_dispatches_immediately() {
        let (mut s, sink, clock) = scheduler();
        s.speak("one", false, 5);
        s.speak("two", false, 5);
        s.speak("three", false, 5);
        assert_eq!(s.speak("stop", true, 10), SpeakOutcome::Dispatched);
        assert_eq!(s.pending_len(), 0);
        drain(&mut s, &clock);
        assert_eq!(
            sink.spoken(),
            vec![crate::speech::sink::SpokenLine {
                text: "stop".to_string(),
                interrupt: true
            }]
        );
        assert_eq!(sink.silence_count(), 1);
    }

    #[test]
    fn repeats_inside_window_are_dropped() {
        let (mut s, sink, clock) = scheduler();
        assert_eq!(s.speak("Open door", false, 5), SpeakOutcome::Queued);
        s.tick();
        clock.advance_ms(300);
        assert_eq!(s.speak("Open door", false, 5), SpeakOutcome::Repeated);
        s.tick();
        clock.advance_ms(300);
        assert_eq!(s.speak("Open door", false, 5), SpeakOutcome::Queued);
        s.tick();
        assert_eq!(sink.texts(), vec!["Open door", "Open door"]);
    }

    #[test]
    fn repeat_check_applies_before_first_dispatch() {
        let (mut s, _sink, _clock) = scheduler();
        s.speak("Item", false, 3);
        assert_eq!(s.speak("Item", false, 3), SpeakOutcome::Repeated);
        assert_eq!(s.pending_len(), 1);
    }

    #[test]
    fn dispatch_is_rate_limited() {
        let (mut s, sink, clock) = scheduler();
        s.speak("first", false, 5);
        s.speak("second", false, 5);
        s.tick();
        clock.advance_ms(40);
        s.tick();
        assert_eq!(sink.texts(), vec!["first"]);
        clock.advance_ms(60);
        s.tick();
        assert_eq!(sink.texts(), vec!["first", "second"]);
    }

    #[test]
    fn empty_text_is_ignored() {
        let (mut s, sink, _clock) = scheduler();
        assert_eq!(s.speak("  <b></b> ", true, 10), SpeakOutcome::Empty);
        assert_eq!(s.pending_len(), 0);
        assert_eq!(sink.silence_count(), 0);
    }

    #[test]
    fn failed_sink_consumes_utterance() {
        let (mut s, sink, clock) = scheduler();
        sink.set_failing(true);
        assert_eq!(s.speak("lost", true, 10), SpeakOutcome::Failed);
        s.speak("queued", false, 5);
        clock.advance_ms(100);
        s.tick();
        assert_eq!(s.pending_len(), 0);
        assert_eq!(s.last_spoken(), Some("queued"));
        assert_eq!(sink.texts(), vec!["lost", "queued"]);
    }

    #[test]
    fn deferred_speech_is_released_when_due() {
        let (mut s, sink, clock) = scheduler();
        s.speak_after("later", Duration::from_millis(1500), 7);
        s.speak_after("sooner", Duration::from_millis(500), 7);
        assert_eq!(s.deferred_len(), 2);
        s.tick();
        assert!(sink.texts().is_empty());
        clock.advance_ms(500);
        s.tick();
        assert_eq!(sink.texts(), vec!["sooner"]);
        clock.advance_ms(1000);
        s.tick();
        assert_eq!(sink.texts(), vec!["sooner", "later"]);
        assert_eq!(s.deferred_len(), 0);
    }

    #[test]
    fn silence_discards_pending_and_deferred() {
        let (mut s, sink, clock) = scheduler();
        s.speak("a", false, 5);
        s.speak_after("b", Duration::from_millis(10), 5);
        s.silence();
        clock.advance_ms(200);
        s.tick();
        assert!(sink.texts().is_empty());
        assert_eq!(sink.silence_count(), 1);
    }

    #[test]
    fn tunables_respect_floors() {
        let (mut s, _sink, _clock) = scheduler();
        s.set_min_dispatch_interval(Duration::from_millis(1));
        s.set_repeat_window(Duration::ZERO);
        assert_eq!(s.min_dispatch_interval(), MIN_DISPATCH_INTERVAL_FLOOR);
        assert_eq!(s.repeat_window(), REPEAT_WINDOW_FLOOR);
    }

    #[test]
    fn huge_delay_saturates_instead_of_overflowing() {
        let (mut s, sink, clock) = scheduler();
        clock.advance_ms(1);
        s.speak_after("never", Duration::MAX, 7);
        s.speak_after("soon", Duration::from_millis(10), 7);
        assert_eq!(s.deferred_len(), 2);
        clock.advance_ms(10);
        s.tick();
        assert_eq!(sink.texts(), vec!["soon"]);
        assert_eq!(s.deferred_len(), 1);
    }

    #[test]
    fn repeat_guard_does_not_refresh_on_drop() {
        let mut guard = RepeatGuard::new(Duration::from_millis(500));
        assert!(guard.admit("x", Duration::ZERO));
        assert!(!guard.admit("x", Duration::from_millis(400)));
        assert!(guard.admit("x", Duration::from_millis(600)));
        assert!(guard.admit("y", Duration::from_millis(601)));
    }
}
