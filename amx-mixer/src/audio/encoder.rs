//! MP3 encoder using LAME
//!
//! The only output encoding the service produces: stereo MP3 at 44100 Hz.

use crate::audio::resampler::TARGET_SAMPLE_RATE;
use crate::audio::types::{AudioTrack, STEREO};
use amx_common::{Error, Result};
use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, InterleavedPcm, Quality};
use std::path::Path;
use tracing::debug;

/// Frames handed to LAME per encode call
const ENCODE_CHUNK_FRAMES: usize = 1152 * 64;

/// MP3 encoder configured for the pipeline output format.
#[derive(Debug, Clone, Copy)]
pub struct Mp3Encoder {
    bitrate_kbps: u32,
}

impl Mp3Encoder {
    /// Create an encoder for the given constant bitrate.
    ///
    /// # Errors
    /// [`Error::Encode`] if LAME has no preset for `bitrate_kbps`.
    pub fn new(bitrate_kbps: u32) -> Result<Self> {
        bitrate_preset(bitrate_kbps)?;
        Ok(Self { bitrate_kbps })
    }

    pub fn bitrate_kbps(&self) -> u32 {
        self.bitrate_kbps
    }

    /// Encode a stereo track at [`TARGET_SAMPLE_RATE`] to MP3 bytes.
    ///
    /// Samples are clamped to [-1.0, 1.0] during the i16 conversion. The
    /// track's gain is not applied; the compositor has already baked gains
    /// into the mix.
    pub fn encode(&self, track: &AudioTrack) -> Result<Vec<u8>> {
        if track.sample_rate != TARGET_SAMPLE_RATE {
            return Err(Error::Encode(format!(
                "Expected {}Hz input, got {}Hz",
                TARGET_SAMPLE_RATE, track.sample_rate
            )));
        }
        if track.channels != STEREO {
            return Err(Error::Encode(format!(
                "Expected stereo input, got {} channel(s)",
                track.channels
            )));
        }

        let mut builder =
            Builder::new().ok_or_else(|| Error::Encode("Failed to allocate LAME".to_string()))?;
        builder
            .set_num_channels(STEREO as u8)
            .map_err(|e| Error::Encode(format!("set_num_channels: {:?}", e)))?;
        builder
            .set_sample_rate(TARGET_SAMPLE_RATE)
            .map_err(|e| Error::Encode(format!("set_sample_rate: {:?}", e)))?;
        builder
            .set_brate(bitrate_preset(self.bitrate_kbps)?)
            .map_err(|e| Error::Encode(format!("set_brate: {:?}", e)))?;
        builder
            .set_quality(Quality::Best)
            .map_err(|e| Error::Encode(format!("set_quality: {:?}", e)))?;
        let mut encoder = builder
            .build()
            .map_err(|e| Error::Encode(format!("Failed to initialise LAME: {:?}", e)))?;

        let pcm: Vec<i16> = track.samples.iter().map(|&s| to_i16(s)).collect();
        let mut mp3 = Vec::new();

        for chunk in pcm.chunks(ENCODE_CHUNK_FRAMES * STEREO as usize) {
            mp3.reserve(mp3lame_encoder::max_required_buffer_size(chunk.len()));
            encoder
                .encode_to_vec(InterleavedPcm(chunk), &mut mp3)
                .map_err(|e| Error::Encode(format!("LAME encode failed: {:?}", e)))?;
        }

        mp3.reserve(mp3lame_encoder::max_required_buffer_size(0));
        encoder
            .flush_to_vec::<FlushNoGap>(&mut mp3)
            .map_err(|e| Error::Encode(format!("LAME flush failed: {:?}", e)))?;

        debug!(
            "Encoded {} frames to {} bytes of MP3 at {}kbps",
            track.frames(),
            mp3.len(),
            self.bitrate_kbps
        );

        Ok(mp3)
    }

    /// Encode a track and write it to `path`.
    pub fn encode_to_file(&self, track: &AudioTrack, path: &Path) -> Result<()> {
        let bytes = self.encode(track)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn bitrate_preset(kbps: u32) -> Result<Bitrate> {
    let preset = match kbps {
        8 => Bitrate::Kbps8,
        16 => Bitrate::Kbps16,
        24 => Bitrate::Kbps24,
        32 => Bitrate::Kbps32,
        40 => Bitrate::Kbps40,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        80 => Bitrate::Kbps80,
        96 => Bitrate::Kbps96,
        112 => Bitrate::Kbps112,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        other => {
            return Err(Error::Encode(format!("Unsupported MP3 bitrate: {}kbps", other)));
        }
    };
    Ok(preset)
}
