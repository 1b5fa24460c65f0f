//! System audio player output for generated WAV buffers.
//!
//! Writes the buffer to a temp file and invokes the platform's audio player
//! (afplay on macOS, paplay/aplay on Linux, PowerShell on Windows). Only WAV
//! needs supporting — it is the only container the pipeline produces.

use std::path::Path;

use tempfile::NamedTempFile;

use super::tts::TtsError;

/// Audio players by platform preference.
#[cfg(target_os = "macos")]
const WAV_PLAYERS: &[&str] = &["afplay"];

/// paplay and aplay are preferred on Linux since they're lightweight and
/// handle WAV/PCM natively.
#[cfg(target_os = "linux")]
const WAV_PLAYERS: &[&str] = &["paplay", "aplay", "play", "mpv", "ffplay"];

#[cfg(target_os = "windows")]
const WAV_PLAYERS: &[&str] = &["powershell"];

/// Fallback for other platforms.
#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const WAV_PLAYERS: &[&str] = &["ffplay", "play"];

/// First available audio player on this system, in priority order.
///
/// Synchronous: only path lookups are involved.
pub fn get_audio_player() -> Option<&'static str> {
    WAV_PLAYERS
        .iter()
        .copied()
        .find(|player| which::which(player).is_ok())
}

/// Play WAV bytes through the system player.
///
/// The buffer is written to a temp file which is cleaned up when playback
/// finishes.
///
/// ## Errors
///
/// Returns `TtsError::NoAudioPlayer` if no player is installed,
/// `TtsError::SpawnFailed`/`TtsError::PlaybackFailed` if the player cannot
/// run or exits nonzero.
pub async fn play_wav_bytes(wav: &[u8]) -> Result<(), TtsError> {
    let temp_file = NamedTempFile::with_suffix(".wav")
        .map_err(|e| TtsError::TempFile { source: e })?;

    tokio::fs::write(temp_file.path(), wav).await?;

    play_wav_file(temp_file.path()).await

    // temp_file is cleaned up on drop
}

/// Play a WAV file through the system player.
pub async fn play_wav_file(path: &Path) -> Result<(), TtsError> {
    let player = get_audio_player().ok_or(TtsError::NoAudioPlayer)?;
    let args = build_player_args(player, path);

    tracing::debug!(player = player, path = %path.display(), "Playing audio file");

    let output = tokio::process::Command::new(player)
        .args(&args)
        .output()
        .await
        .map_err(|e| TtsError::SpawnFailed {
            player: player.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(TtsError::PlaybackFailed {
            player: player.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}

/// Build the command-line arguments for the audio player.
fn build_player_args(player: &str, path: &Path) -> Vec<String> {
    let path_str = path.to_string_lossy().to_string();

    match player {
        "powershell" => vec![
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-Command".to_string(),
            format!(
                "(New-Object Media.SoundPlayer '{}').PlaySync()",
                path_str.replace('\'', "''")
            ),
        ],
        "ffplay" => vec![
            "-nodisp".to_string(),
            "-autoexit".to_string(),
            "-loglevel".to_string(),
            "quiet".to_string(),
            path_str,
        ],
        "mpv" => vec![
            "--no-video".to_string(),
            "--really-quiet".to_string(),
            path_str,
        ],
        // afplay, paplay, aplay, play: just the file path
        _ => vec![path_str],
    }
}
