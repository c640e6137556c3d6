//! Interactable categories and the looping proximity cue that follows the focused one.

use crate::audio::spatial::Vec2;
use crate::audio::backend::VoiceId;

pub const DOOR_STAIRS: &str = "door_stairs.wav";
pub const CHARACTER: &str = "character.wav";
pub const ITEM: &str = "item.wav";

/// What kind of thing the player is standing near, as reported by the host adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractableKind {
    DoorStairs,
    Character,
    Item,
    /// Exit to another scene, optionally naming it.
    MoveScene { target: Option<String> },
    /// Lever, switch, fuse: something with an on/off state.
    Switch { on: bool },
}

impl InteractableKind {
    /// Looping clip that marks this kind of interactable.
    pub fn clip(&self) -> &'static str {
        match self {
            InteractableKind::DoorStairs | InteractableKind::MoveScene { .. } => DOOR_STAIRS,
            InteractableKind::Character => CHARACTER,
            InteractableKind::Item | InteractableKind::Switch { .. } => ITEM,
        }
    }

    /// Verb phrase used when the adapter has no prompt text of its own.
    pub fn default_action(&self) -> String {
        match self {
            InteractableKind::DoorStairs => "Press to enter".to_string(),
            InteractableKind::Character => "Press to talk to".to_string(),
            InteractableKind::Item => "Interact".to_string(),
            InteractableKind::MoveScene { target: Some(t) } => format!("Press to go to {}", t),
            InteractableKind::MoveScene { target: None } => "Press to leave".to_string(),
            InteractableKind::Switch { .. } => "Press to toggle".to_string(),
        }
    }
}

/// The interactable currently being tracked by a mixer.
#[derive(Debug, Clone)]
pub(crate) struct TrackedInteractable {
    pub id: String,
    pub kind: InteractableKind,
    pub position: Vec2,
    pub voice: Option<VoiceId>,
}
