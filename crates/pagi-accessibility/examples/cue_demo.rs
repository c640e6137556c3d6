//! Example: a guard walks past the player
//!
//! Builds a session from `config/accessibility.toml` (or defaults), then ticks it at
//! 60 Hz while an emitter crosses from right to left. Uses the default audio device when
//! there is one and falls back to silent in-memory output otherwise.
//!
//! Put `safe_zone_loop.wav` and `danger.wav` in the clip folder to hear the cues.

use pagi_accessibility::audio::mixer::{DANGER_SOUND, SAFE_ZONE_LOOP};
use pagi_accessibility::{
    init_tracing, AccessibilityConfig, AccessibilitySession, MixerBackends, PlaceholderTts,
    PlaybackSink, RecordingSink, SpeechSink, SystemClock,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const FRAME: Duration = Duration::from_millis(16);
const GUARD_SPEED: f32 = 2.5;

fn pick_sink() -> Box<dyn SpeechSink> {
    let mut playback = PlaybackSink::new(Box::new(PlaceholderTts));
    if playback.initialize() {
        Box::new(playback)
    } else {
        info!("No speech output device, recording speech instead");
        Box::new(RecordingSink::new())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info,tts=info");

    let config = AccessibilityConfig::load()?;
    let mut session = AccessibilitySession::new(
        &config,
        pick_sink(),
        Arc::new(SystemClock::new()),
        MixerBackends::rodio_or_headless(),
    )?;

    let stealth = session.stealth_mut();
    let guard = stealth.play_directional_looping_sound(SAFE_ZONE_LOOP, 6.0, 0.0, "guard");
    if guard.is_none() {
        info!("{} not loaded, the guard will be silent", SAFE_ZONE_LOOP);
    }
    session
        .announcer_mut()
        .announce_notification("A guard is patrolling. Stay out of sight.", false);

    let mut ticker = tokio::time::interval(FRAME);
    let mut guard_x = 6.0f32;
    let mut warned = false;
    while guard_x > -6.0 {
        ticker.tick().await;
        guard_x -= GUARD_SPEED * FRAME.as_secs_f32();

        if let Some(key) = guard.as_ref() {
            session
                .stealth_mut()
                .update_directional_sound(key, guard_x, 0.0, 0.0);
        }
        session
            .stealth_mut()
            .play_proximity_beep(guard_x.abs(), guard_x / 5.0);

        if !warned && guard_x.abs() < 1.0 && session.stealth().has_clip(DANGER_SOUND) {
            warned = true;
            session.stealth_mut().play_danger_sound();
            session.announcer_mut().announce_status("The guard is right next to you");
        }
        session.tick();
    }

    info!("Guard has passed");
    session.announcer_mut().announce_ui("Guard has left", true);
    tokio::time::sleep(Duration::from_millis(500)).await;
    session.shutdown();
    Ok(())
}
