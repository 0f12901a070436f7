//! Audio decoder using symphonia
//!
//! Decodes staged asset files (MP3, WAV, FLAC, AAC, Vorbis) to interleaved
//! stereo f32 PCM. The source sample rate is preserved; rate conversion is
//! the resampler's job.

use crate::audio::types::{AudioTrack, STEREO};
use amx_common::{Error, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Simple whole-file audio decoder using symphonia.
pub struct SimpleDecoder;

impl SimpleDecoder {
    /// Decode entire audio file to a stereo [`AudioTrack`].
    ///
    /// # Returns
    /// Track at unity gain holding interleaved stereo samples at the source
    /// sample rate. Mono sources are duplicated to both channels; sources
    /// with more than two channels keep their first two.
    ///
    /// # Errors
    /// [`Error::Decode`] when the file cannot be opened, its format is not
    /// recognised, or no decoder exists for its codec.
    pub fn decode_file(path: &Path) -> Result<AudioTrack> {
        debug!("Decoding entire file: {}", path.display());

        let file = std::fs::File::open(path)
            .map_err(|e| Error::Decode(format!("Failed to open file {}: {}", path.display(), e)))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Extension hint helps the probe with headerless formats
        let mut hint = Hint::new();
        if let Some(ext_str) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext_str);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to probe format: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let mut sample_rate = codec_params.sample_rate;
        let mut channels = codec_params.channels.map(|c| c.count() as u16);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to create decoder: {}", e)))?;

        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    debug!("Reached end of file");
                    break;
                }
                Err(e) => {
                    warn!("Error reading packet: {}", e);
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate.get_or_insert(spec.rate);
                    channels.get_or_insert(spec.channels.count() as u16);

                    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    // Corrupt packet; skip it and keep going
                    warn!("Decode error: {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(Error::Decode(format!("Decoder failed: {}", e)));
                }
            }
        }

        let sample_rate =
            sample_rate.ok_or_else(|| Error::Decode("Sample rate not found".to_string()))?;
        let channels =
            channels.ok_or_else(|| Error::Decode("Channel count not found".to_string()))?;

        let stereo = Self::to_stereo(samples, channels)?;

        debug!(
            "Decoded {} frames at {}Hz from {} source channel(s)",
            stereo.len() / STEREO as usize,
            sample_rate,
            channels
        );

        Ok(AudioTrack::new(stereo, sample_rate, STEREO))
    }

    /// Normalise interleaved samples of any channel count to stereo.
    ///
    /// - 1 channel: [M, M, ...] -> [M, M, M, M, ...]
    /// - 2 channels: unchanged
    /// - N > 2 channels: first two channels of every frame
    fn to_stereo(samples: Vec<f32>, channels: u16) -> Result<Vec<f32>> {
        match channels {
            0 => Err(Error::Decode("Source reports zero channels".to_string())),
            1 => Ok(samples.iter().flat_map(|&s| [s, s]).collect()),
            2 => Ok(samples),
            n => Ok(samples
                .chunks_exact(n as usize)
                .flat_map(|frame| [frame[0], frame[1]])
                .collect()),
        }
    }
}
