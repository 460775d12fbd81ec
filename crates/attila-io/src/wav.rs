//! WAV file reading and writing.
//!
//! Files are interleaved on disk; buffers are channel-major in memory.
//! Integer PCM is scaled to `[-1, 1)` on read and clamped on write.

use crate::{ChannelBuffer, Error, MAX_CHANNELS, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Sample encoding of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Integer PCM.
    Pcm,
    /// 32-bit IEEE float.
    IeeeFloat,
}

/// Header information of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    /// Number of channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Samples per channel.
    pub num_frames: u32,
    /// Length in seconds.
    pub duration_secs: f64,
    /// Sample encoding.
    pub format: WavFormat,
}

/// Read the header of a WAV file without decoding samples.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = reader.duration();
    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: f64::from(num_frames) / f64::from(spec.sample_rate),
        format: match spec.sample_format {
            SampleFormat::Float => WavFormat::IeeeFloat,
            SampleFormat::Int => WavFormat::Pcm,
        },
    })
}

/// Output format of a WAV file.
///
/// 32 bits writes IEEE float; 16 and 24 write integer PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample: 16, 24 or 32.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl WavSpec {
    fn to_hound(self) -> Result<hound::WavSpec> {
        let sample_format = match self.bits_per_sample {
            16 | 24 => SampleFormat::Int,
            32 => SampleFormat::Float,
            bits => {
                return Err(Error::UnsupportedFormat(format!(
                    "{bits}-bit output (expected 16, 24 or 32)"
                )));
            }
        };
        Ok(hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format,
        })
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

/// Read a mono or stereo WAV file into a channel-major buffer.
///
/// Integer samples of any width are scaled to `[-1, 1)`. Files with more
/// than two channels are rejected with [`Error::UnsupportedChannels`].
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(ChannelBuffer, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.channels > MAX_CHANNELS {
        return Err(Error::UnsupportedChannels(spec.channels));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let buffer = ChannelBuffer::from_interleaved(&interleaved, usize::from(spec.channels));
    tracing::debug!(
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        frames = buffer.num_frames(),
        "read wav"
    );
    Ok((buffer, spec.into()))
}

/// Write a channel-major buffer as a WAV file.
///
/// The buffer's channel count must match `spec.channels`. Integer output
/// clamps to full scale.
pub fn write_wav<P: AsRef<Path>>(path: P, buffer: &ChannelBuffer, spec: WavSpec) -> Result<()> {
    if buffer.num_channels() != usize::from(spec.channels) {
        return Err(Error::ChannelMismatch {
            buffer: buffer.num_channels(),
            spec: spec.channels,
        });
    }
    if spec.channels == 0 || spec.channels > MAX_CHANNELS {
        return Err(Error::UnsupportedChannels(spec.channels));
    }

    let hound_spec = spec.to_hound()?;
    let mut writer = WavWriter::create(path, hound_spec)?;
    let interleaved = buffer.to_interleaved();

    match hound_spec.sample_format {
        SampleFormat::Float => {
            for &s in &interleaved {
                writer.write_sample(s)?;
            }
        }
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            let max = full_scale - 1.0;
            for &s in &interleaved {
                let v = (s * full_scale).round().clamp(-full_scale, max);
                writer.write_sample(v as i32)?;
            }
        }
    }

    writer.finalize()?;
    tracing::debug!(
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        frames = buffer.num_frames(),
        "wrote wav"
    );
    Ok(())
}
