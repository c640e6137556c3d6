//! Spatial mixer behavior against the headless backend.

use pagi_accessibility::audio::interactable::{CHARACTER, DOOR_STAIRS};
use pagi_accessibility::audio::mixer::{
    BUTTON_UP, DANGER_SOUND, PROGRESS_TONE, PROXIMITY_BEEP_FAR, PROXIMITY_BEEP_NEAR,
    SAFE_ZONE_LOOP, THROW_TONE, TIMING_BAR_SUCCESS,
};
use pagi_accessibility::audio::spatial::banded_volume;
use pagi_accessibility::{
    AudioBackend, Clip, ClipLibrary, HeadlessBackend, InteractableKind, ManualClock,
    MixerProfile, SpatialMixer, Vec2,
};
use std::sync::Arc;

const EPS: f32 = 1e-5;

fn library() -> ClipLibrary {
    let names = [
        SAFE_ZONE_LOOP,
        THROW_TONE,
        TIMING_BAR_SUCCESS,
        DANGER_SOUND,
        PROGRESS_TONE,
        BUTTON_UP,
        PROXIMITY_BEEP_NEAR,
        "proximity_beep_medium.wav",
        PROXIMITY_BEEP_FAR,
        DOOR_STAIRS,
        CHARACTER,
        "item.wav",
    ];
    ClipLibrary::from_clips(names.iter().map(|n| Clip::new(*n, vec![0u8; 16], false)))
}

fn mixer(profile: MixerProfile) -> (SpatialMixer, HeadlessBackend, ManualClock) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let backend = HeadlessBackend::new();
    let clock = ManualClock::new();
    let mixer = SpatialMixer::new(
        "test",
        profile,
        library(),
        Box::new(backend.clone()),
        Arc::new(clock.clone()),
    );
    (mixer, backend, clock)
}

#[test]
fn pan_is_symmetric_around_the_listener() {
    let (mut m, backend, _clock) = mixer(MixerProfile::minigame());
    let right = m
        .play_directional_looping_sound(SAFE_ZONE_LOOP, 2.0, 0.0, "right")
        .unwrap();
    let left = m
        .play_directional_looping_sound(SAFE_ZONE_LOOP, -2.0, 0.0, "left")
        .unwrap();
    let center = m
        .play_directional_looping_sound(SAFE_ZONE_LOOP, 0.0, 0.0, "center")
        .unwrap();

    assert_eq!(m.channel(&right).unwrap().pan, 1.0);
    assert_eq!(m.channel(&left).unwrap().pan, -1.0);
    assert_eq!(m.channel(&center).unwrap().pan, 0.0);

    let voice = m.channel(&right).unwrap().voice;
    let played = backend.voice(voice).unwrap();
    assert!(played.params.looping);
    assert_eq!(played.params.pan, 1.0);
    assert!((played.params.volume - 0.8).abs() < EPS);
}

#[test]
fn channel_volume_never_rises_as_the_listener_walks_away() {
    let (mut m, _backend, _clock) = mixer(MixerProfile::minigame());
    let key = m
        .play_directional_looping_sound(SAFE_ZONE_LOOP, 0.0, 0.0, 7)
        .unwrap();

    let mut last = f32::MAX;
    for step in 0..=24 {
        let listener_x = step as f32 * 0.25;
        m.update_directional_sound(&key, 0.0, listener_x, 0.0);
        let volume = m.channel(&key).unwrap().volume;
        assert!(volume <= last + EPS, "volume rose at {}", listener_x);
        assert!((0.3 - EPS..=0.9 + EPS).contains(&volume));
        assert!((volume - banded_volume(listener_x)).abs() < EPS);
        last = volume;
    }
    assert!((last - 0.3).abs() < EPS);
}

#[test]
fn nan_emitter_centers_the_channel() {
    let (mut m, backend, _clock) = mixer(MixerProfile::minigame());
    let key = m
        .play_directional_looping_sound(SAFE_ZONE_LOOP, 1.0, 0.0, "glitch")
        .unwrap();
    m.update_directional_sound(&key, f32::NAN, 0.0, 0.0);
    let channel = m.channel(&key).unwrap();
    assert_eq!(channel.pan, 0.0);
    assert!((channel.volume - 0.3).abs() < EPS);
    assert_eq!(backend.voice(channel.voice).unwrap().params.pan, 0.0);
}

#[test]
fn updating_a_finished_channel_prunes_it() {
    let (mut m, backend, _clock) = mixer(MixerProfile::minigame());
    let key = m
        .play_directional_looping_sound(SAFE_ZONE_LOOP, 1.0, 0.0, "obstacle-3")
        .unwrap();
    let voice = m.channel(&key).unwrap().voice;

    backend.finish(voice);
    m.update_directional_sound(&key, 4.0, 0.0, 0.0);

    assert!(!m.is_tracking(&key));
    assert!(m.channel(&key).is_none());
    assert_eq!(backend.voice(voice).unwrap().params.pan, 0.5);

    // Still a no-op the second time.
    m.update_directional_sound(&key, 4.0, 0.0, 0.0);
    assert_eq!(m.channel_count(), 0);
}

#[test]
fn emitter_walkthrough_recenters_when_the_listener_arrives() {
    let (mut m, backend, _clock) = mixer(MixerProfile::minigame());
    let key = m
        .play_directional_looping_sound(SAFE_ZONE_LOOP, 5.0, 0.0, "guard")
        .expect("clip is loaded");
    assert_eq!(key.as_str(), "safe_zone_loop.wav_guard");
    assert_eq!(m.channel(&key).unwrap().pan, 1.0);

    m.update_directional_sound(&key, 5.0, 5.0, 0.0);
    let channel = m.channel(&key).unwrap();
    assert!(channel.pan.abs() < EPS);
    assert!((channel.volume - 0.9).abs() < EPS);
    assert!(backend.voice(channel.voice).unwrap().params.pan.abs() < EPS);
}

#[test]
fn replaying_the_same_emitter_replaces_its_channel() {
    let (mut m, backend, _clock) = mixer(MixerProfile::minigame());
    let first = m
        .play_directional_looping_sound(SAFE_ZONE_LOOP, 1.0, 0.0, 1)
        .unwrap();
    let old_voice = m.channel(&first).unwrap().voice;
    let second = m
        .play_directional_looping_sound(SAFE_ZONE_LOOP, -1.0, 0.0, 1)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(m.channel_count(), 1);
    assert!(!backend.voice(old_voice).unwrap().playing);
    assert_eq!(m.channel(&second).unwrap().pan, -0.5);

    m.stop_directional_sound(&second);
    m.stop_directional_sound(&second);
    assert!(backend.playing().is_empty());
}

#[test]
fn unknown_clips_and_failed_playback_return_no_channel() {
    let (mut m, backend, _clock) = mixer(MixerProfile::stealth());
    assert!(m
        .play_directional_looping_sound("missing.wav", 1.0, 0.0, "x")
        .is_none());
    m.play_one_shot("missing.wav", 1.0);
    assert!(backend.voices().is_empty());

    backend.set_failing(true);
    assert!(m
        .play_directional_looping_sound(SAFE_ZONE_LOOP, 1.0, 0.0, "x")
        .is_none());
    assert!(!m.has_clip("missing.wav"));
    assert!(m.has_clip(SAFE_ZONE_LOOP));
}

#[test]
fn progress_tone_maps_and_clamps_pitch() {
    let (mut m, backend, _clock) = mixer(MixerProfile::minigame());
    let cases = [(0.0, 0.5), (1.0, 2.0), (-0.5, 0.5), (4.0, 2.0), (0.5, 1.25)];
    for (progress, pitch) in cases {
        m.play_progress_tone(progress);
        let playing: Vec<_> = backend
            .voices_for(PROGRESS_TONE)
            .into_iter()
            .filter(|v| v.playing)
            .collect();
        assert_eq!(playing.len(), 1, "progress tone was not replaced");
        assert!((playing[0].params.pitch - pitch).abs() < EPS);
        assert!((playing[0].params.volume - 0.6).abs() < EPS);
    }
    assert_eq!(backend.voices_for(PROGRESS_TONE).len(), cases.len());
}

#[test]
fn looping_tone_is_a_singleton_per_clip() {
    let (mut m, backend, _clock) = mixer(MixerProfile::minigame());
    m.play_looping_tone(THROW_TONE, 1.0);
    m.play_looping_tone(THROW_TONE, 9.0);
    let voices = backend.voices_for(THROW_TONE);
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0].params.pitch, 3.0);
    assert_eq!(m.looping_handle(THROW_TONE).unwrap().pitch, 3.0);

    m.stop_looping_tone(THROW_TONE);
    m.stop_looping_tone(THROW_TONE);
    assert!(m.looping_handle(THROW_TONE).is_none());

    // A finished loop restarts instead of being re-pitched.
    m.play_looping_tone(THROW_TONE, 1.0);
    backend.finish_clip(THROW_TONE);
    m.play_looping_tone(THROW_TONE, 1.5);
    assert_eq!(backend.voices_for(THROW_TONE).len(), 3);
}

#[test]
fn independent_mixers_do_not_share_loops() {
    let (mut stealth, stealth_backend, _c1) = mixer(MixerProfile::stealth());
    let (mut minigame, minigame_backend, _c2) = mixer(MixerProfile::minigame());

    stealth.play_looping_tone(THROW_TONE, 1.0);
    minigame.play_looping_tone(THROW_TONE, 2.0);
    assert_eq!(stealth.looping_handle(THROW_TONE).unwrap().pitch, 1.0);
    assert_eq!(minigame.looping_handle(THROW_TONE).unwrap().pitch, 2.0);

    stealth.stop_looping_tone(THROW_TONE);
    assert!(stealth_backend.playing().is_empty());
    assert_eq!(minigame_backend.playing().len(), 1);
    assert!(minigame.looping_handle(THROW_TONE).is_some());
}

#[test]
fn looping_spatial_updates_in_place() {
    let (mut m, backend, _clock) = mixer(MixerProfile::stealth());
    m.play_or_update_looping_spatial(SAFE_ZONE_LOOP, -0.4, 0.5);
    m.play_or_update_looping_spatial(SAFE_ZONE_LOOP, 3.0, 2.0);
    let voices = backend.voices_for(SAFE_ZONE_LOOP);
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0].params.pan, 1.0);
    assert_eq!(voices[0].params.volume, 1.0);
}

#[test]
fn proximity_beeps_are_banded_and_rate_limited() {
    let (mut m, backend, clock) = mixer(MixerProfile::stealth());
    assert!(m.play_proximity_beep(1.0, -0.2));
    assert!(!m.play_proximity_beep(1.0, -0.2));
    clock.advance_ms(1_499);
    assert!(!m.play_proximity_beep(1.0, -0.2));
    clock.advance_ms(1);
    assert!(m.play_proximity_beep(6.0, 0.3));

    let near = backend.voices_for(PROXIMITY_BEEP_NEAR);
    assert_eq!(near.len(), 1);
    assert!((near[0].params.volume - 0.9).abs() < EPS);
    assert!((near[0].params.pan + 0.2).abs() < EPS);
    let far = backend.voices_for(PROXIMITY_BEEP_FAR);
    assert_eq!(far.len(), 1);
    assert!((far[0].params.volume - 0.4).abs() < EPS);
}

#[test]
fn one_shot_cues_use_their_fixed_levels() {
    let (mut m, backend, _clock) = mixer(MixerProfile::minigame());
    m.play_one_shot(TIMING_BAR_SUCCESS, 1.0);
    m.play_danger_sound();
    m.play_button_sequence_cue("Press UP", 2.0, 0.1);
    m.play_button_sequence_cue("jump", 0.0, 1.0);

    let success = &backend.voices_for(TIMING_BAR_SUCCESS)[0];
    assert!((success.params.volume - 0.7).abs() < EPS);
    assert!(!success.params.looping);
    assert!((backend.voices_for(DANGER_SOUND)[0].params.volume - 0.9).abs() < EPS);

    let button = &backend.voices_for(BUTTON_UP)[0];
    assert_eq!(button.params.pan, 1.0);
    assert_eq!(button.params.pitch, 0.5);
    assert!((button.params.volume - 0.8).abs() < EPS);
    assert_eq!(backend.voices().len(), 3);
}

#[test]
fn tick_forgets_finished_one_shots() {
    let (mut m, backend, _clock) = mixer(MixerProfile::stealth());
    m.play_centered(DANGER_SOUND, 1.0);
    m.play_spatial(DANGER_SOUND, 0.5, 0.5);
    m.play_spatial(BUTTON_UP, -0.5, 0.5);
    assert_eq!(m.tracked_one_shots(), 3);

    backend.finish_clip(DANGER_SOUND);
    m.tick();
    assert_eq!(m.tracked_one_shots(), 1);

    backend.finish_clip(BUTTON_UP);
    m.tick();
    assert_eq!(m.tracked_one_shots(), 0);
}

#[test]
fn tick_forgets_finished_loops() {
    let (mut m, backend, _clock) = mixer(MixerProfile::minigame());
    m.play_looping_tone(THROW_TONE, 1.0);
    m.play_or_update_looping_spatial(SAFE_ZONE_LOOP, 0.2, 0.5);
    backend.finish_clip(THROW_TONE);
    m.tick();
    assert!(m.looping_handle(THROW_TONE).is_none());
    assert!(m.looping_handle(SAFE_ZONE_LOOP).is_some());

    // A finished spatial loop is started again rather than moved.
    backend.finish_clip(SAFE_ZONE_LOOP);
    m.play_or_update_looping_spatial(SAFE_ZONE_LOOP, -0.2, 0.5);
    let voices = backend.voices_for(SAFE_ZONE_LOOP);
    assert_eq!(voices.len(), 2);
    assert!(!voices[0].playing);
    assert!(voices[1].playing);
    assert_eq!(voices[1].params.pan, -0.2);
    assert_eq!(m.looping_handle(SAFE_ZONE_LOOP).unwrap().voice, voices[1].id);
}

#[test]
fn tick_releases_a_finished_progress_tone() {
    let (mut m, backend, _clock) = mixer(MixerProfile::minigame());
    m.play_progress_tone(0.2);
    let first = m.progress_voice().unwrap();
    backend.finish(first);
    m.tick();
    assert!(m.progress_voice().is_none());

    m.play_progress_tone(0.8);
    let second = m.progress_voice().unwrap();
    assert_ne!(first, second);
    assert_eq!(backend.playing().len(), 1);
    assert_eq!(backend.playing()[0].id, second);
}

#[test]
fn clips_registered_as_looping_loop_wherever_played() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let backend = HeadlessBackend::new();
    let library = ClipLibrary::from_clips([
        Clip::new(SAFE_ZONE_LOOP, vec![0u8; 16], true),
        Clip::new(DANGER_SOUND, vec![0u8; 16], false),
    ]);
    let mut m = SpatialMixer::new(
        "looping",
        MixerProfile::stealth(),
        library,
        Box::new(backend.clone()),
        Arc::new(ManualClock::new()),
    );

    m.play_one_shot(SAFE_ZONE_LOOP, 1.0);
    m.play_spatial(SAFE_ZONE_LOOP, 0.5, 0.5);
    m.play_one_shot(DANGER_SOUND, 1.0);
    let looping: Vec<_> = backend
        .voices_for(SAFE_ZONE_LOOP)
        .into_iter()
        .map(|v| v.params.looping)
        .collect();
    assert_eq!(looping, vec![true, true]);
    assert!(!backend.voices_for(DANGER_SOUND)[0].params.looping);
    // Only the looping one-shot is kept; the plain one is forgotten at once.
    assert_eq!(m.tracked_one_shots(), 2);

    backend.finish_clip(DANGER_SOUND);
    drop(m);
    assert!(backend.playing().is_empty());
}

#[test]
fn tones_go_to_the_backend_clamped() {
    let (mut m, backend, _clock) = mixer(MixerProfile::stealth());
    m.play_tone(20, 10_000);
    m.play_tone(880, 120);
    assert_eq!(backend.tones(), vec![(37, 5_000), (880, 120)]);
}

#[test]
fn focused_interactable_follows_the_listener() {
    let (mut m, backend, _clock) = mixer(MixerProfile::interactable());
    m.focus_interactable("door-1", InteractableKind::DoorStairs, Vec2::new(4.0, 0.0));
    let door = m.interactable_voice().unwrap();
    let played = backend.voice(door).unwrap();
    assert_eq!(played.clip, DOOR_STAIRS);
    assert_eq!(played.params.pan, 1.0);
    assert!((played.params.volume - 0.8).abs() < EPS);

    m.set_listener(Vec2::new(4.0, 3.0));
    m.tick();
    let played = backend.voice(door).unwrap();
    assert!(played.params.pan.abs() < EPS);
    assert!((played.params.volume - 0.85).abs() < EPS);

    // Same id only moves the cue.
    m.focus_interactable("door-1", InteractableKind::DoorStairs, Vec2::new(100.0, 3.0));
    assert_eq!(m.interactable_voice(), Some(door));
    assert!((backend.voice(door).unwrap().params.volume - 0.05).abs() < EPS);

    m.focus_interactable("npc-2", InteractableKind::Character, Vec2::new(2.0, 3.0));
    assert!(!backend.voice(door).unwrap().playing);
    let npc = m.interactable_voice().unwrap();
    assert_eq!(backend.voice(npc).unwrap().clip, CHARACTER);
    assert_eq!(m.focused_interactable().unwrap().0, "npc-2");

    m.clear_interactable();
    assert!(m.focused_interactable().is_none());
    assert!(backend.playing().is_empty());
}

#[test]
fn dropping_a_mixer_stops_its_voices() {
    let (mut m, backend, _clock) = mixer(MixerProfile::minigame());
    m.play_looping_tone(THROW_TONE, 1.0);
    m.play_directional_looping_sound(SAFE_ZONE_LOOP, 1.0, 0.0, "a");
    assert_eq!(backend.playing().len(), 2);
    drop(m);
    assert!(backend.playing().is_empty());
}

#[test]
fn headless_backend_ignores_unknown_voices() {
    let mut backend = HeadlessBackend::new();
    let id = pagi_accessibility::VoiceId(42);
    backend.set_pan(id, 1.0);
    backend.stop(id);
    assert!(!backend.is_playing(id));
}

#[test]
#[ignore] // Requires an audio output device
fn rodio_backend_opens_default_device() {
    let mut backend = pagi_accessibility::RodioBackend::new().expect("output device");
    backend.play_tone(440, 100);
    let clip = Clip::new("broken.wav", vec![0u8; 8], false);
    let params = pagi_accessibility::PlaybackParams::one_shot(0.5);
    assert!(backend.play(&clip, params).is_err());
    std::thread::sleep(std::time::Duration::from_millis(200));
}
