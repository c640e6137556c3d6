//! Caller-facing announcements: phrasing and priority conventions on top of the scheduler.
//!
//! | Call | Priority | Interrupts |
//! |------|----------|------------|
//! | `announce_dialogue` | 10 | caller decides, usually yes |
//! | `announce_status` | 9 | no |
//! | `announce_notification` | 7 | caller decides |
//! | `announce_ui` | 5 | caller decides |
//! | `announce_interactable` | 3 | never |

use crate::clock::Clock;
use crate::config::{AccessibilityConfig, AnnounceConfig};
use crate::speech::scheduler::{RepeatGuard, SpeakOutcome, SpeechScheduler};
use crate::speech::sink::SpeechSink;
use crate::speech::text::clean_text;
use crate::vocabulary::StateVocabulary;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const PRIORITY_DIALOGUE: i32 = 10;
pub const PRIORITY_STATUS: i32 = 9;
pub const PRIORITY_NOTIFICATION: i32 = 7;
pub const PRIORITY_UI: i32 = 5;
pub const PRIORITY_INTERACTABLE: i32 = 3;

/// Announcement streams with their own repeat memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementCategory {
    Dialogue,
    Notification,
    Generic,
}

impl AnnouncementCategory {
    fn index(self) -> usize {
        match self {
            AnnouncementCategory::Dialogue => 0,
            AnnouncementCategory::Notification => 1,
            AnnouncementCategory::Generic => 2,
        }
    }
}

/// Build the interactable prompt from an object name and an action phrase.
///
/// "Press E to talk to" + "Mia" reads "Press E to talk to Mia"; a bare verb gets "with".
pub fn interactable_phrase(name: &str, action: &str) -> String {
    let name = name.trim();
    let action = action.trim();
    if name.is_empty() {
        return action.to_string();
    }
    if action.is_empty() {
        return name.to_string();
    }
    if action.ends_with("to interact with")
        || action.ends_with("to talk to")
        || action.contains("with")
        || action.contains("to")
    {
        format!("{} {}", action, name)
    } else {
        format!("{} with {}", action, name)
    }
}

pub struct Announcer<S: SpeechSink> {
    scheduler: SpeechScheduler<S>,
    clock: Arc<dyn Clock>,
    toggles: AnnounceConfig,
    vocabulary: StateVocabulary,
    guards: [RepeatGuard; 3],
}

impl<S: SpeechSink> Announcer<S> {
    pub fn new(sink: S, clock: Arc<dyn Clock>, config: &AccessibilityConfig) -> Self {
        let scheduler = SpeechScheduler::new(sink, clock.clone(), &config.speech);
        let window = scheduler.repeat_window();
        Self {
            scheduler,
            clock,
            toggles: config.announce.clone(),
            vocabulary: config.state_words.clone(),
            guards: [
                RepeatGuard::new(window),
                RepeatGuard::new(window),
                RepeatGuard::new(window),
            ],
        }
    }

    /// Menu items, buttons, and other UI focus changes.
    pub fn announce_ui(&mut self, text: &str, interrupt: bool) -> SpeakOutcome {
        if !self.toggles.menus {
            return SpeakOutcome::Disabled;
        }
        self.announce(AnnouncementCategory::Generic, text, interrupt, PRIORITY_UI)
    }

    /// A dialogue line, prefixed with the speaker when one is known.
    pub fn announce_dialogue(&mut self, speaker: &str, text: &str, interrupt: bool) -> SpeakOutcome {
        if !self.toggles.dialogue {
            return SpeakOutcome::Disabled;
        }
        let speaker = speaker.trim();
        let line = if speaker.is_empty() {
            text.to_string()
        } else {
            format!("{} says: {}", speaker, text)
        };
        self.announce(AnnouncementCategory::Dialogue, &line, interrupt, PRIORITY_DIALOGUE)
    }

    /// The object the player can act on, phrased by [`interactable_phrase`]. Never interrupts.
    pub fn announce_interactable(&mut self, name: &str, action: &str) -> SpeakOutcome {
        if !self.toggles.interactables {
            return SpeakOutcome::Disabled;
        }
        let line = interactable_phrase(name, action);
        self.announce(AnnouncementCategory::Generic, &line, false, PRIORITY_INTERACTABLE)
    }

    /// Tutorials, pickups, and other game notifications.
    pub fn announce_notification(&mut self, text: &str, interrupt: bool) -> SpeakOutcome {
        if !self.toggles.notifications {
            return SpeakOutcome::Disabled;
        }
        let line = format!("Notification: {}", text);
        self.announce(
            AnnouncementCategory::Notification,
            &line,
            interrupt,
            PRIORITY_NOTIFICATION,
        )
    }

    /// Puzzle and status changes the player must not miss.
    pub fn announce_status(&mut self, text: &str) -> SpeakOutcome {
        self.announce(AnnouncementCategory::Generic, text, false, PRIORITY_STATUS)
    }

    /// "{object} {phrase}" for a host state variable, looked up in the state vocabulary.
    ///
    /// Names the vocabulary has no phrase for are not announced.
    pub fn announce_state(&mut self, object: &str, variable: &str, value: bool) -> SpeakOutcome {
        let Some(phrase) = self.vocabulary.describe(variable, value) else {
            debug!(target: "tts", variable, "no state phrase");
            return SpeakOutcome::Empty;
        };
        let line = format!("{} {}", object.trim(), phrase);
        self.announce_status(&line)
    }

    fn announce(
        &mut self,
        category: AnnouncementCategory,
        text: &str,
        interrupt: bool,
        priority: i32,
    ) -> SpeakOutcome {
        let cleaned = clean_text(text);
        if cleaned.is_empty() {
            return SpeakOutcome::Empty;
        }
        let now = self.clock.now();
        if !self.guards[category.index()].admit(&cleaned, now) {
            debug!(target: "tts", ?category, "dropping repeat: {}", cleaned);
            return SpeakOutcome::Repeated;
        }
        self.scheduler.speak(&cleaned, interrupt, priority)
    }

    /// Raw speech, bypassing categories and toggles.
    pub fn speak(&mut self, text: &str, interrupt: bool, priority: i32) -> SpeakOutcome {
        self.scheduler.speak(text, interrupt, priority)
    }

    pub fn speak_after(&mut self, text: &str, delay: Duration, priority: i32) {
        self.scheduler.speak_after(text, delay, priority);
    }

    pub fn tick(&mut self) {
        self.scheduler.tick();
    }

    pub fn silence(&mut self) {
        self.scheduler.silence();
    }

    /// Apply a new repeat window to the scheduler and every category.
    pub fn set_repeat_window(&mut self, window: Duration) {
        self.scheduler.set_repeat_window(window);
        let window = self.scheduler.repeat_window();
        for guard in &mut self.guards {
            guard.set_window(window);
        }
    }

    pub fn toggles(&self) -> &AnnounceConfig {
        &self.toggles
    }

    pub fn set_toggles(&mut self, toggles: AnnounceConfig) {
        self.toggles = toggles;
    }

    pub fn vocabulary(&self) -> &StateVocabulary {
        &self.vocabulary
    }

    pub fn scheduler(&self) -> &SpeechScheduler<S> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut SpeechScheduler<S> {
        &mut self.scheduler
    }
}
