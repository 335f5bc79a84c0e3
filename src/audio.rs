/// Audio boundary.
///
/// The simulation only emits `SoundCue`s.  A host-provided `AudioSink`
/// turns them into playback; every call is fire-and-forget and nothing in
/// the game waits on it.

use std::io::Write;

use crate::entities::SoundCue;

/// How long the engine drone takes to fade when the plane leaves the screen.
pub const ENGINE_FADE_MS: u64 = 2000;

impl SoundCue {
    /// Logical sound name as understood by asset providers.
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Shot => "shot",
            SoundCue::EmptyMagazine => "empty-bullets",
            SoundCue::ImpactExplosion => "explosion-2",
            SoundCue::DeathExplosion => "explosion-3",
            SoundCue::EngineStart | SoundCue::EngineFadeOut | SoundCue::EngineStop => "airplane",
        }
    }
}

pub trait AudioSink {
    fn play(&mut self, name: &str);
    fn fade_out(&mut self, name: &str, duration_ms: u64);
    fn stop(&mut self, name: &str);
    /// `volume` is clamped to `0..=1` by `AudioSettings` before it gets here.
    fn set_volume(&mut self, name: &str, volume: f32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioSettings {
    pub effects_muted: bool,
    pub music_muted: bool,
    volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            effects_muted: false,
            music_muted: false,
            volume: 0.5,
        }
    }
}

impl AudioSettings {
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
    }

    pub fn toggle_effects(&mut self) {
        self.effects_muted = !self.effects_muted;
    }

    pub fn toggle_music(&mut self) {
        self.music_muted = !self.music_muted;
    }
}

/// Forward one cue to the sink unless effects are muted.  Stops always go
/// through so a muted engine doesn't keep droning.
pub fn dispatch(sink: &mut dyn AudioSink, settings: &AudioSettings, cue: SoundCue) {
    let name = cue.name();
    match cue {
        SoundCue::EngineStop => sink.stop(name),
        _ if settings.effects_muted => {}
        SoundCue::EngineFadeOut => sink.fade_out(name, ENGINE_FADE_MS),
        _ => {
            sink.set_volume(name, settings.volume);
            sink.play(name);
        }
    }
}

// ── Background music ──────────────────────────────────────────────────────────

pub const MUSIC_TRACKS: [&str; 2] = ["music-loop-1", "music-loop-2"];

/// Each track repeats this many times before handing over to the next.
pub const PLAYS_PER_TRACK: u32 = 4;

/// Music plays quieter than the effects.
const MUSIC_VOLUME_FACTOR: f32 = 0.6;

/// Assumed length of one music loop.  Sinks cannot report when a track
/// ends, so the host advances the playlist on this clock.
pub const MUSIC_LOOP_MS: u64 = 16_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MusicPlaylist {
    track: usize,
    plays: u32,
    /// When the current loop began; `None` while stopped.
    started_at_ms: Option<u64>,
}

impl MusicPlaylist {
    pub fn current(&self) -> &'static str {
        MUSIC_TRACKS[self.track]
    }

    /// The sink reports the current track ended; returns what to play next.
    pub fn track_finished(&mut self) -> &'static str {
        self.plays += 1;
        if self.plays >= PLAYS_PER_TRACK {
            self.plays = 0;
            self.track = (self.track + 1) % MUSIC_TRACKS.len();
        }
        self.current()
    }

    pub fn is_playing(&self) -> bool {
        self.started_at_ms.is_some()
    }

    pub fn start(&mut self, sink: &mut dyn AudioSink, settings: &AudioSettings, now_ms: u64) {
        if settings.music_muted {
            return;
        }
        self.play_current(sink, settings);
        self.started_at_ms = Some(now_ms);
    }

    pub fn stop(&mut self, sink: &mut dyn AudioSink) {
        sink.stop(self.current());
        self.started_at_ms = None;
    }

    /// Call once per frame.  When the current loop has run out, counts the
    /// play and starts the next loop.  Returns true if a loop was started.
    pub fn update(&mut self, sink: &mut dyn AudioSink, settings: &AudioSettings, now_ms: u64) -> bool {
        let Some(started) = self.started_at_ms else {
            return false;
        };
        let elapsed = now_ms.saturating_sub(started);
        if elapsed < MUSIC_LOOP_MS {
            return false;
        }
        let finished = self.current();
        if self.track_finished() != finished {
            sink.stop(finished);
        }
        self.play_current(sink, settings);
        // Keep loop boundaries on their own clock unless the host stalled.
        self.started_at_ms = Some(if elapsed < 2 * MUSIC_LOOP_MS {
            started + MUSIC_LOOP_MS
        } else {
            now_ms
        });
        true
    }

    fn play_current(&self, sink: &mut dyn AudioSink, settings: &AudioSettings) {
        sink.set_volume(self.current(), settings.volume * MUSIC_VOLUME_FACTOR);
        sink.play(self.current());
    }
}

// ── Sinks ─────────────────────────────────────────────────────────────────────

/// Writes every call to the log at debug level.
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, name: &str) {
        tracing::debug!(sound = name, "play");
    }

    fn fade_out(&mut self, name: &str, duration_ms: u64) {
        tracing::debug!(sound = name, duration_ms, "fade out");
    }

    fn stop(&mut self, name: &str) {
        tracing::debug!(sound = name, "stop");
    }

    fn set_volume(&mut self, name: &str, volume: f32) {
        tracing::trace!(sound = name, volume, "set volume");
    }
}

/// Rings the terminal bell for the loud sounds.  Write errors are ignored.
pub struct BellSink<W: Write> {
    out: W,
}

impl<W: Write> BellSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioSink for BellSink<W> {
    fn play(&mut self, name: &str) {
        if name == SoundCue::DeathExplosion.name() || name == SoundCue::EmptyMagazine.name() {
            let _ = self.out.write_all(b"\x07");
            let _ = self.out.flush();
        }
    }

    fn fade_out(&mut self, _name: &str, _duration_ms: u64) {}

    fn stop(&mut self, _name: &str) {}

    fn set_volume(&mut self, _name: &str, _volume: f32) {}
}
