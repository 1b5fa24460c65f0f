//! Raw-PCM-to-WAV container encoding.
//!
//! The TTS provider returns raw little-endian 16-bit signed mono PCM at
//! 24000 Hz. This module wraps that payload in a standard 44-byte RIFF/WAVE
//! header; the PCM bytes themselves are copied through untouched. A pure
//! transform with no I/O.

/// Sample rate of the provider's PCM output, in Hz. Not configurable.
pub const SAMPLE_RATE: u32 = 24_000;

/// Channel count (mono).
pub const NUM_CHANNELS: u16 = 1;

/// Bits per sample.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Size of the RIFF/WAVE header in bytes.
pub const HEADER_SIZE: usize = 44;

/// Wrap raw PCM bytes in a WAV container.
///
/// Output is exactly `44 + pcm.len()` bytes: the RIFF header describing
/// mono/16-bit/24 kHz audio, followed by the payload unchanged.
///
/// ## Examples
///
/// ```
/// use crier_lib::audio::wav::pcm_to_wav;
///
/// let wav = pcm_to_wav(&[0u8; 48_000]);
/// assert_eq!(wav.len(), 44 + 48_000);
/// assert_eq!(&wav[0..4], b"RIFF");
/// ```
pub fn pcm_to_wav(pcm: &[u8]) -> Vec<u8> {
    let data_size = pcm.len() as u32;
    let block_align = NUM_CHANNELS * (BITS_PER_SAMPLE / 8);
    let byte_rate = SAMPLE_RATE * block_align as u32;

    let mut wav = Vec::with_capacity(HEADER_SIZE + pcm.len());

    // RIFF chunk descriptor
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // "fmt " subchunk: PCM, mono, 24 kHz, 16-bit
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&NUM_CHANNELS.to_le_bytes());
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // "data" subchunk: payload verbatim
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.extend_from_slice(pcm);

    wav
}

/// Playable duration of a WAV buffer produced by [`pcm_to_wav`], in seconds.
///
/// Derived from the payload length and the fixed format (2 bytes per sample,
/// mono, 24 kHz). Buffers shorter than a header count as zero-length.
pub fn wav_duration_secs(wav: &[u8]) -> f64 {
    let data_len = wav.len().saturating_sub(HEADER_SIZE);
    data_len as f64 / (SAMPLE_RATE as f64 * (BITS_PER_SAMPLE / 8) as f64 * NUM_CHANNELS as f64)
}
