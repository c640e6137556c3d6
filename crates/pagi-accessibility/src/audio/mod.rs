//! Spatial audio cues: pan/volume mapping, clip loading, backends, and the mixer.

pub mod backend;
pub mod interactable;
pub mod library;
pub mod mixer;
pub mod rodio_backend;
pub mod spatial;

pub use backend::{AudioBackend, HeadlessBackend, HeadlessVoice, PlaybackParams, VoiceId};
pub use interactable::InteractableKind;
pub use library::{Clip, ClipLibrary};
pub use mixer::{ChannelKey, ChannelSnapshot, SoundHandle, SpatialMixer};
pub use rodio_backend::RodioBackend;
pub use spatial::{MixerProfile, Vec2};
