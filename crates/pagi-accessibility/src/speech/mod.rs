//! Speech output: text cleanup, the priority scheduler, and the sinks it drives.

pub mod announcer;
pub mod playback;
pub mod scheduler;
pub mod sink;
pub mod text;

pub use announcer::{interactable_phrase, AnnouncementCategory, Announcer};
pub use playback::{PlaceholderTts, PlaybackSink, TtsBackend};
pub use scheduler::{RepeatGuard, SpeakOutcome, SpeechScheduler, Utterance};
pub use sink::{RecordingSink, SpeechSink, SpokenLine};
pub use text::clean_text;
