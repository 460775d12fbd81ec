//! Integration tests: WAV files through the processor.

use attila_core::OversampleFactor;
use attila_effects::AttilaProcessor;
use attila_io::{ChannelBuffer, WavSpec, read_wav, write_wav};
use tempfile::TempDir;

fn sine(freq_hz: f32, sample_rate: u32, amplitude: f32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| {
            amplitude * (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate as f32).sin()
        })
        .collect()
}

fn render(buffer: &mut ChannelBuffer, processor: &mut AttilaProcessor, block: usize) {
    let num_channels = buffer.num_channels();
    let frames = buffer.num_frames();
    let mut start = 0;
    while start < frames {
        let end = (start + block).min(frames);
        let mut channels: Vec<&mut [f32]> = buffer
            .channels_mut()
            .into_iter()
            .map(|ch| &mut ch[start..end])
            .collect();
        processor.process(&mut channels, num_channels);
        start = end;
    }
}

#[test]
fn stereo_file_round_trip_through_processor() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");

    let left = sine(220.0, 48000, 0.5, 4800);
    let right = sine(1000.0, 48000, 0.25, 4800);
    let spec = WavSpec {
        channels: 2,
        sample_rate: 48000,
        bits_per_sample: 32,
    };
    write_wav(&input, &ChannelBuffer::from_channels(vec![left, right]), spec).unwrap();

    let (mut buffer, read_spec) = read_wav(&input).unwrap();
    assert_eq!(read_spec, spec);

    let mut processor = AttilaProcessor::new();
    processor.set_non_realtime(true);
    processor.shared().set_by_id("drive1", 18.0).unwrap();
    processor.prepare(read_spec.sample_rate as f32, 256, buffer.num_channels());
    render(&mut buffer, &mut processor, 256);

    assert!(buffer.as_slice().iter().all(|s| s.is_finite()));
    write_wav(&output, &buffer, read_spec).unwrap();

    let (rendered, _) = read_wav(&output).unwrap();
    assert_eq!(rendered, buffer);
    assert!(rendered.peak() > 0.0);
}

#[test]
fn bypassed_render_is_bit_exact_at_unity_rate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dry.wav");
    let original = ChannelBuffer::from_mono(sine(440.0, 44100, 0.8, 2048));
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 32,
    };
    write_wav(&path, &original, spec).unwrap();

    let (mut buffer, _) = read_wav(&path).unwrap();
    let mut processor = AttilaProcessor::new();
    processor.set_oversample_factor(OversampleFactor::X1);
    processor.shared().set_by_id("bypass", 1.0).unwrap();
    processor.prepare(44100.0, 512, 1);
    render(&mut buffer, &mut processor, 512);

    assert_eq!(buffer, original);
}
