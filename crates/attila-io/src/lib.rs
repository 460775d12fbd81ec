//! Audio file I/O for attila.
//!
//! This crate provides:
//!
//! - **Channel-major buffers**: [`ChannelBuffer`], the layout the effect
//!   processes in place
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`], converting between
//!   interleaved files and channel-major buffers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use attila_effects::AttilaProcessor;
//! use attila_io::{read_wav, write_wav};
//!
//! let (mut buffer, spec) = read_wav("input.wav")?;
//!
//! let mut processor = AttilaProcessor::new();
//! processor.prepare(spec.sample_rate as f32, 512, buffer.num_channels());
//! let num_inputs = buffer.num_channels();
//! processor.process(&mut buffer.channels_mut(), num_inputs);
//!
//! write_wav("output.wav", &buffer, spec)?;
//! # Ok::<(), attila_io::Error>(())
//! ```

mod buffer;
mod wav;

pub use buffer::ChannelBuffer;
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

/// Most channels a file may have to be processed.
pub const MAX_CHANNELS: u16 = 2;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file has a channel layout the effect does not handle.
    #[error("Unsupported channel count: {0} (expected 1 or 2)")]
    UnsupportedChannels(u16),

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Buffer and output format disagree on the channel count.
    #[error("Channel mismatch: buffer has {buffer}, spec has {spec}")]
    ChannelMismatch {
        /// Channels in the buffer.
        buffer: usize,
        /// Channels in the spec.
        spec: u16,
    },

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
