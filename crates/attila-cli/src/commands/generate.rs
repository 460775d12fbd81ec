//! Test signal generation command.

use attila_io::{ChannelBuffer, WavSpec, write_wav};
use clap::{Args, Subcommand};
use std::f64::consts::PI;
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    #[command(subcommand)]
    command: GenerateCommand,
}

/// Options shared by every signal.
#[derive(Args)]
struct OutputArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Duration in seconds
    #[arg(long, default_value = "1.0")]
    duration: f32,

    /// Sample rate
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Number of channels (1 or 2)
    #[arg(long, default_value = "1")]
    channels: u16,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate a sine tone
    Sine {
        #[command(flatten)]
        out: OutputArgs,

        /// Frequency in Hz
        #[arg(long, default_value = "1000.0")]
        freq: f32,

        /// Level in dBFS
        #[arg(long, default_value = "-6.0", allow_hyphen_values = true)]
        level_db: f32,
    },

    /// Generate an exponential sine sweep, useful for hearing each band
    Sweep {
        #[command(flatten)]
        out: OutputArgs,

        /// Start frequency in Hz
        #[arg(long, default_value = "20.0")]
        start: f32,

        /// End frequency in Hz
        #[arg(long, default_value = "20000.0")]
        end: f32,

        /// Level in dBFS
        #[arg(long, default_value = "-6.0", allow_hyphen_values = true)]
        level_db: f32,
    },
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    match args.command {
        GenerateCommand::Sine { out, freq, level_db } => {
            anyhow::ensure!(
                freq > 0.0 && freq < out.sample_rate as f32 / 2.0,
                "frequency {} Hz must be between 0 and Nyquist",
                freq
            );
            let samples = sine(freq, db_to_gain(level_db), frames(&out)?, out.sample_rate);
            tracing::info!(freq, level_db, "generating sine");
            write(&out, samples)
        }
        GenerateCommand::Sweep {
            out,
            start,
            end,
            level_db,
        } => {
            let nyquist = out.sample_rate as f32 / 2.0;
            anyhow::ensure!(
                start > 0.0 && end > start && end <= nyquist,
                "sweep must satisfy 0 < start < end <= {} Hz",
                nyquist
            );
            let samples = sweep(start, end, db_to_gain(level_db), frames(&out)?, out.sample_rate);
            tracing::info!(start, end, level_db, "generating sweep");
            write(&out, samples)
        }
    }
}

fn frames(out: &OutputArgs) -> anyhow::Result<usize> {
    anyhow::ensure!(
        out.duration.is_finite() && out.duration > 0.0,
        "duration must be positive"
    );
    anyhow::ensure!(out.sample_rate > 0, "sample rate must be positive");
    Ok((f64::from(out.duration) * f64::from(out.sample_rate)).round() as usize)
}

fn write(out: &OutputArgs, samples: Vec<f32>) -> anyhow::Result<()> {
    anyhow::ensure!(
        matches!(out.channels, 1 | 2),
        "unsupported channel count {} (expected 1 or 2)",
        out.channels
    );
    let buffer = ChannelBuffer::from_channels(vec![samples; usize::from(out.channels)]);
    let spec = WavSpec {
        channels: out.channels,
        sample_rate: out.sample_rate,
        bits_per_sample: out.bit_depth,
    };
    write_wav(&out.output, &buffer, spec)?;
    tracing::info!(
        path = %out.output.display(),
        frames = buffer.num_frames(),
        "wrote signal"
    );
    Ok(())
}

fn db_to_gain(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

fn sine(freq: f32, amplitude: f32, frames: usize, sample_rate: u32) -> Vec<f32> {
    let w = 2.0 * PI * f64::from(freq) / f64::from(sample_rate);
    (0..frames)
        .map(|i| (f64::from(amplitude) * (w * i as f64).sin()) as f32)
        .collect()
}

fn sweep(start: f32, end: f32, amplitude: f32, frames: usize, sample_rate: u32) -> Vec<f32> {
    let duration = frames as f64 / f64::from(sample_rate);
    let ratio = (f64::from(end) / f64::from(start)).ln();
    let k = 2.0 * PI * f64::from(start) * duration / ratio;
    (0..frames)
        .map(|i| {
            let t = i as f64 / f64::from(sample_rate);
            let phase = k * ((t * ratio / duration).exp() - 1.0);
            (f64::from(amplitude) * phase.sin()) as f32
        })
        .collect()
}
