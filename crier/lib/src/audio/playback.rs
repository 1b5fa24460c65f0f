//! Playback state machine for the single active audio buffer.
//!
//! Exactly one buffer is live at a time; installing a new one drops the
//! previous buffer's bytes. The controller is process-local state only and
//! is never persisted.
//!
//! ## Generation tokens
//!
//! Concurrent `generate_and_play` calls race: a slow early request could
//! otherwise finish after a faster later one and clobber it. Every
//! generation therefore takes a monotonic token from [`begin_generation`];
//! [`complete_generation`] discards any result whose token is no longer the
//! newest issued.
//!
//! [`begin_generation`]: PlaybackController::begin_generation
//! [`complete_generation`]: PlaybackController::complete_generation

use super::wav::wav_duration_secs;

/// Minimum and maximum playback speed multipliers.
const SPEED_RANGE: (f32, f32) = (0.25, 4.0);

/// Opaque ticket for one in-flight generation.
///
/// Obtained from [`PlaybackController::begin_generation`]; newer tickets
/// invalidate older ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationToken(u64);

/// Coarse view of the controller's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No buffer loaded, nothing in flight.
    Idle,
    /// A generation is in flight.
    Generating,
    /// A buffer is loaded and advancing.
    Playing,
    /// A buffer is loaded but not advancing.
    Paused,
}

/// The loaded audio buffer and its metadata.
#[derive(Debug, Clone)]
struct ActiveAudio {
    wav: Vec<u8>,
    label: String,
    duration: f64,
}

/// State machine over the single active audio buffer.
///
/// ## Examples
///
/// ```
/// use crier_lib::audio::PlaybackController;
///
/// let mut controller = PlaybackController::new();
/// let token = controller.begin_generation("v1.2.3 summary");
/// // ... pipeline produces WAV bytes ...
/// let installed = controller.complete_generation(token, vec![0u8; 44 + 48_000], "v1.2.3 summary");
/// assert!(installed);
/// assert!(controller.is_playing());
/// ```
#[derive(Debug)]
pub struct PlaybackController {
    active: Option<ActiveAudio>,
    generating_for: Option<String>,
    playing_for: Option<String>,
    playing: bool,
    current_time: f64,
    speed: f32,
    error: Option<String>,
    issued_tokens: u64,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    /// Create an idle controller at normal speed.
    pub fn new() -> Self {
        Self {
            active: None,
            generating_for: None,
            playing_for: None,
            playing: false,
            current_time: 0.0,
            speed: 1.0,
            error: None,
            issued_tokens: 0,
        }
    }

    /// Create a controller with a configured starting speed.
    pub fn with_speed(speed: f32) -> Self {
        let mut controller = Self::new();
        controller.set_speed(speed);
        controller
    }

    // ------------------------------------------------------------------
    // Generation lifecycle
    // ------------------------------------------------------------------

    /// Start a generation for the given label, invalidating any older
    /// in-flight generation's eventual result.
    ///
    /// Re-entrant while already generating: the newer call simply wins.
    pub fn begin_generation(&mut self, label: impl Into<String>) -> GenerationToken {
        self.issued_tokens += 1;
        self.generating_for = Some(label.into());
        self.error = None;
        GenerationToken(self.issued_tokens)
    }

    /// Install a finished generation's buffer and start playing it.
    ///
    /// Returns `false` (and drops the buffer) when a newer token has been
    /// issued since `token` — the stale result must not replace the newer
    /// request's. On success the previous buffer is released, the position
    /// resets and playback starts at the configured speed.
    pub fn complete_generation(
        &mut self,
        token: GenerationToken,
        wav: Vec<u8>,
        label: impl Into<String>,
    ) -> bool {
        if token.0 != self.issued_tokens {
            tracing::debug!(
                stale = token.0,
                newest = self.issued_tokens,
                "Discarding stale generation result"
            );
            return false;
        }

        let label = label.into();
        let duration = wav_duration_secs(&wav);

        // Replacing `active` drops the previous buffer.
        self.active = Some(ActiveAudio {
            wav,
            label: label.clone(),
            duration,
        });
        self.generating_for = None;
        self.playing_for = Some(label);
        self.playing = true;
        self.current_time = 0.0;
        self.error = None;
        true
    }

    /// Record a failed generation.
    ///
    /// Stale failures (older token) are ignored. A current failure surfaces
    /// the error, clears the pending label and leaves any previously loaded
    /// buffer playable.
    pub fn fail_generation(&mut self, token: GenerationToken, message: impl Into<String>) {
        if token.0 != self.issued_tokens {
            return;
        }
        self.generating_for = None;
        self.error = Some(message.into());
    }

    // ------------------------------------------------------------------
    // Transport controls
    // ------------------------------------------------------------------

    /// Resume playback. No-op when no buffer is loaded.
    pub fn play(&mut self) {
        if self.active.is_some() {
            self.playing = true;
        }
    }

    /// Pause playback without losing position. No-op when no buffer is
    /// loaded.
    pub fn pause(&mut self) {
        if self.active.is_some() {
            self.playing = false;
        }
    }

    /// Stop playback: position to 0, label cleared, not playing.
    ///
    /// The buffer stays loaded so `play` can restart it from the top. Does
    /// not touch in-flight generations.
    pub fn stop(&mut self) {
        self.playing = false;
        self.current_time = 0.0;
        self.playing_for = None;
    }

    /// Seek to a position, clamped to `[0, duration]`. Play/pause state is
    /// unchanged. No-op when no buffer is loaded.
    pub fn seek(&mut self, time: f64) {
        if let Some(active) = &self.active {
            self.current_time = time.clamp(0.0, active.duration);
        }
    }

    /// Set the playback speed multiplier, clamped to a sane range. Applies
    /// immediately to the active buffer; already-generated audio bytes are
    /// unaffected.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.clamp(SPEED_RANGE.0, SPEED_RANGE.1);
    }

    /// Advance the playhead by `dt` wall-clock seconds.
    ///
    /// Position moves at `dt * speed`. Reaching the end of the buffer is a
    /// natural stop: position resets to 0, playback halts and the playing
    /// label clears.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        let Some(active) = &self.active else {
            return;
        };

        self.current_time += dt * self.speed as f64;
        if self.current_time >= active.duration {
            self.current_time = 0.0;
            self.playing = false;
            self.playing_for = None;
        }
    }

    /// Record a playback error (e.g. decode failure in the output device).
    ///
    /// Leaves the controller not-playing with the label cleared; a
    /// subsequent generation may retry from scratch.
    pub fn fail_playback(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.playing = false;
        self.playing_for = None;
    }

    // ------------------------------------------------------------------
    // Observable state
    // ------------------------------------------------------------------

    /// Coarse state for UIs.
    pub fn state(&self) -> PlaybackState {
        if self.generating_for.is_some() {
            PlaybackState::Generating
        } else if self.active.is_none() {
            PlaybackState::Idle
        } else if self.playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }

    /// Whether the playhead is advancing.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Label of the in-flight generation, if any.
    pub fn generating_for(&self) -> Option<&str> {
        self.generating_for.as_deref()
    }

    /// Label of the currently playing buffer, if any.
    pub fn playing_for(&self) -> Option<&str> {
        self.playing_for.as_deref()
    }

    /// Current playhead position in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Duration of the loaded buffer in seconds (0 when none).
    pub fn duration(&self) -> f64 {
        self.active.as_ref().map(|a| a.duration).unwrap_or(0.0)
    }

    /// Configured speed multiplier.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Last surfaced error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The loaded WAV bytes, if any (for export/replay).
    pub fn active_wav(&self) -> Option<&[u8]> {
        self.active.as_ref().map(|a| a.wav.as_slice())
    }

    /// Label of the loaded buffer regardless of play state.
    pub fn active_label(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::pcm_to_wav;

    /// One second of silence at the pipeline's fixed format.
    fn one_second_wav() -> Vec<u8> {
        pcm_to_wav(&vec![0u8; 48_000])
    }

    #[test]
    fn test_starts_idle() {
        let controller = PlaybackController::new();
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert_eq!(controller.duration(), 0.0);
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_generation_to_playing() {
        let mut controller = PlaybackController::new();
        let token = controller.begin_generation("v1.0.0");
        assert_eq!(controller.state(), PlaybackState::Generating);
        assert_eq!(controller.generating_for(), Some("v1.0.0"));

        assert!(controller.complete_generation(token, one_second_wav(), "v1.0.0"));
        assert_eq!(controller.state(), PlaybackState::Playing);
        assert_eq!(controller.playing_for(), Some("v1.0.0"));
        assert!((controller.duration() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stale_generation_discarded() {
        let mut controller = PlaybackController::new();
        let slow = controller.begin_generation("first");
        let fast = controller.begin_generation("second");

        // The faster, newer request completes first and wins.
        assert!(controller.complete_generation(fast, one_second_wav(), "second"));
        // The slow result arrives late and must be dropped.
        assert!(!controller.complete_generation(slow, pcm_to_wav(&vec![0u8; 96_000]), "first"));

        assert_eq!(controller.playing_for(), Some("second"));
        assert!((controller.duration() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stale_failure_ignored() {
        let mut controller = PlaybackController::new();
        let old = controller.begin_generation("first");
        let new = controller.begin_generation("second");

        controller.fail_generation(old, "slow request failed");
        assert!(controller.error().is_none());
        assert_eq!(controller.state(), PlaybackState::Generating);

        controller.fail_generation(new, "provider down");
        assert_eq!(controller.error(), Some("provider down"));
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_play_pause_noop_without_buffer() {
        let mut controller = PlaybackController::new();
        controller.play();
        assert!(!controller.is_playing());
        controller.pause();
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_pause_and_resume_keep_position() {
        let mut controller = PlaybackController::new();
        let token = controller.begin_generation("x");
        controller.complete_generation(token, one_second_wav(), "x");

        controller.advance(0.25);
        controller.pause();
        assert_eq!(controller.state(), PlaybackState::Paused);
        let paused_at = controller.current_time();

        controller.advance(10.0); // paused: no movement
        assert_eq!(controller.current_time(), paused_at);

        controller.play();
        assert!(controller.is_playing());
    }

    #[test]
    fn test_stop_resets_position_and_label() {
        let mut controller = PlaybackController::new();
        let token = controller.begin_generation("x");
        controller.complete_generation(token, one_second_wav(), "x");
        controller.advance(0.5);

        controller.stop();
        assert!(!controller.is_playing());
        assert_eq!(controller.current_time(), 0.0);
        assert_eq!(controller.playing_for(), None);
        // Buffer stays loaded for replay.
        assert!(controller.active_wav().is_some());
        assert_eq!(controller.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let mut controller = PlaybackController::new();
        let token = controller.begin_generation("x");
        controller.complete_generation(token, one_second_wav(), "x");

        controller.seek(0.5);
        assert_eq!(controller.current_time(), 0.5);
        controller.seek(99.0);
        assert_eq!(controller.current_time(), 1.0);
        controller.seek(-5.0);
        assert_eq!(controller.current_time(), 0.0);
    }

    #[test]
    fn test_seek_does_not_change_play_state() {
        let mut controller = PlaybackController::new();
        let token = controller.begin_generation("x");
        controller.complete_generation(token, one_second_wav(), "x");
        controller.pause();

        controller.seek(0.3);
        assert_eq!(controller.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_natural_end_resets_to_start() {
        let mut controller = PlaybackController::new();
        let token = controller.begin_generation("x");
        controller.complete_generation(token, one_second_wav(), "x");

        controller.advance(2.0);
        assert!(!controller.is_playing());
        assert_eq!(controller.current_time(), 0.0);
        assert_eq!(controller.playing_for(), None);
    }

    #[test]
    fn test_speed_scales_advance() {
        let mut controller = PlaybackController::with_speed(2.0);
        let token = controller.begin_generation("x");
        controller.complete_generation(token, one_second_wav(), "x");

        controller.advance(0.25);
        assert!((controller.current_time() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_speed_clamped() {
        let mut controller = PlaybackController::new();
        controller.set_speed(100.0);
        assert_eq!(controller.speed(), 4.0);
        controller.set_speed(0.0);
        assert_eq!(controller.speed(), 0.25);
    }

    #[test]
    fn test_playback_failure_clears_label_keeps_buffer() {
        let mut controller = PlaybackController::new();
        let token = controller.begin_generation("x");
        controller.complete_generation(token, one_second_wav(), "x");

        controller.fail_playback("decode failed");
        assert_eq!(controller.error(), Some("decode failed"));
        assert!(!controller.is_playing());
        assert_eq!(controller.playing_for(), None);

        // A retry from scratch is possible.
        let retry = controller.begin_generation("x");
        assert!(controller.complete_generation(retry, one_second_wav(), "x"));
        assert!(controller.error().is_none());
        assert!(controller.is_playing());
    }

    #[test]
    fn test_new_generation_replaces_previous_buffer() {
        let mut controller = PlaybackController::new();
        let first = controller.begin_generation("a");
        controller.complete_generation(first, one_second_wav(), "a");

        let second = controller.begin_generation("b");
        let two_seconds = pcm_to_wav(&vec![0u8; 96_000]);
        controller.complete_generation(second, two_seconds, "b");

        assert_eq!(controller.active_label(), Some("b"));
        assert!((controller.duration() - 2.0).abs() < 1e-9);
        assert_eq!(controller.current_time(), 0.0);
    }
}
