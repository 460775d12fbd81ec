//! Offline rendering of a WAV file through the distortion.

use anyhow::Context;
use attila_core::linear_to_db;
use attila_config::{ParamPolicy, ParamSetting, RenderConfig, validate_engine};
use attila_effects::AttilaProcessor;
use attila_io::{ChannelBuffer, WavSpec, read_wav, write_wav};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file (mono or stereo)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Render configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Parameter override, e.g. "drive1=12" or "midHighCut=4.5kHz"
    #[arg(short, long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, String)>,

    /// Oversampling factor (1, 2, 4 or 8)
    #[arg(long)]
    oversample: Option<usize>,

    /// Processing block size
    #[arg(long)]
    block_size: Option<usize>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Clamp out-of-range parameter values instead of failing
    #[arg(long)]
    clamp: bool,

    /// Keep the oversampling filter delay in the output
    #[arg(long)]
    keep_latency: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!(
            "Invalid parameter format: '{}' (expected id=value)",
            s
        )),
    }
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        matches!(args.bit_depth, 16 | 24 | 32),
        "unsupported bit depth {} (expected 16, 24 or 32)",
        args.bit_depth
    );

    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RenderConfig::new(),
    };
    if let Some(factor) = args.oversample {
        config.engine.oversample_factor = factor;
    }
    if let Some(block_size) = args.block_size {
        config.engine.block_size = block_size;
    }
    for (id, value) in args.param {
        config.params.insert(id, ParamSetting::Text(value));
    }

    let policy = if args.clamp {
        ParamPolicy::Clamp
    } else {
        ParamPolicy::Reject
    };
    let overrides = config.resolve_params(policy)?;
    let factor = config.oversample_factor()?;
    let block_size = config.engine.block_size;

    tracing::info!(path = %args.input.display(), "reading input");
    let (input, spec) =
        read_wav(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let sample_rate = spec.sample_rate as f32;
    let num_channels = input.num_channels();
    validate_engine(sample_rate, block_size, num_channels)?;
    tracing::info!(
        channels = num_channels,
        sample_rate = spec.sample_rate,
        frames = input.num_frames(),
        seconds = format_args!("{:.2}", input.num_frames() as f32 / sample_rate),
        "input loaded"
    );

    let mut processor = AttilaProcessor::new();
    processor.set_smoothing_ms(config.engine.smoothing_ms);
    processor.set_oversample_factor(factor);
    processor.set_non_realtime(true);
    let shared = processor.shared();
    for (key, value) in overrides {
        tracing::debug!(param = key.id(), value, "override");
        shared.set(key, value);
    }
    processor.prepare(sample_rate, block_size, num_channels);

    let latency = if args.keep_latency {
        0
    } else {
        processor.latency_samples()
    };
    let output = render(&mut processor, &input, block_size, latency)?;

    let (rms_db, peak_db) = levels_db(&input);
    tracing::info!(
        rms_db = format_args!("{rms_db:.1}"),
        peak_db = format_args!("{peak_db:.1}"),
        "input level"
    );
    let (rms_db, peak_db) = levels_db(&output);
    tracing::info!(
        rms_db = format_args!("{rms_db:.1}"),
        peak_db = format_args!("{peak_db:.1}"),
        "output level"
    );

    let out_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    tracing::info!(path = %args.output.display(), bits = args.bit_depth, "writing output");
    write_wav(&args.output, &output, out_spec)
        .with_context(|| format!("writing {}", args.output.display()))?;

    Ok(())
}

/// Run the whole file through the processor in blocks. `latency` extra
/// frames of silence are fed at the end and the same number dropped from
/// the start, so the output lines up with the input.
fn render(
    processor: &mut AttilaProcessor,
    input: &ChannelBuffer,
    block_size: usize,
    latency: usize,
) -> anyhow::Result<ChannelBuffer> {
    let num_channels = input.num_channels();
    let frames = input.num_frames();
    let total = frames + latency;

    let mut work = ChannelBuffer::new(num_channels, total);
    for ch in 0..num_channels {
        work.channel_mut(ch)[..frames].copy_from_slice(input.channel(ch));
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut start = 0;
    while start < total {
        let end = (start + block_size).min(total);
        let mut channels: Vec<&mut [f32]> = work
            .channels_mut()
            .into_iter()
            .map(|ch| &mut ch[start..end])
            .collect();
        processor.process(&mut channels, num_channels);
        start = end;
        pb.set_position(start as u64);
    }
    pb.finish_and_clear();

    let aligned = (0..num_channels)
        .map(|ch| work.channel(ch)[latency..].to_vec())
        .collect();
    Ok(ChannelBuffer::from_channels(aligned))
}

/// RMS and peak level in dBFS.
fn levels_db(buffer: &ChannelBuffer) -> (f32, f32) {
    (linear_to_db(buffer.rms()), linear_to_db(buffer.peak()))
}
