//! End-to-end scenarios for the multiband chain: neutral settings, full
//! bypass, dry mix, and mono/stereo consistency.

use attila_core::{BandSplitter, Effect, OversampleFactor};
use attila_effects::{AttilaProcessor, MultibandDistortion, ParameterSnapshot};

const SR: f32 = 48000.0;

fn sine(freq: f32, n: usize, amp: f32) -> Vec<f32> {
    (0..n)
        .map(|i| amp * (2.0 * std::f32::consts::PI * freq * i as f32 / SR).sin())
        .collect()
}

fn rms(x: &[f32]) -> f32 {
    (x.iter().map(|s| s * s).sum::<f32>() / x.len() as f32).sqrt()
}

fn prepared(snapshot: &ParameterSnapshot) -> MultibandDistortion {
    let mut engine = MultibandDistortion::new();
    engine.prepare(snapshot);
    engine
}

/// Neutral settings at low level: every stage is transparent, so the chain
/// reduces to the crossover's allpass reconstruction.
#[test]
fn neutral_settings_reconstruct_allpass() {
    let n = 4800;
    let snap = ParameterSnapshot::new(SR, n, 1);
    let mut engine = prepared(&snap);
    let mut reference = BandSplitter::new(SR, 1, 440.0, 5000.0);

    // Broadband, small enough that fast_atan is linear to ~1e-7
    let input: Vec<f32> = sine(100.0, n, 4e-4)
        .iter()
        .zip(sine(1000.0, n, 3e-4))
        .zip(sine(9000.0, n, 3e-4))
        .map(|((a, b), c)| a + b + c)
        .collect();

    let mut output = input.clone();
    engine.process_block(&mut output, 1, n);

    for (i, (&x, &y)) in input.iter().zip(&output).enumerate() {
        let expected: f32 = reference.split(0, x).iter().sum();
        assert!(
            (y - expected).abs() < 1e-8,
            "sample {i}: {y} vs allpass {expected}"
        );
    }
}

#[test]
fn neutral_settings_preserve_level() {
    for freq in [60.0, 440.0, 2000.0, 5000.0, 12000.0] {
        let n = 9600;
        let snap = ParameterSnapshot::new(SR, n, 1);
        let mut engine = prepared(&snap);
        let input = sine(freq, n, 1e-3);
        let mut output = input.clone();
        engine.process_block(&mut output, 1, n);

        let ratio = rms(&output[n / 2..]) / rms(&input[n / 2..]);
        assert!((ratio - 1.0).abs() < 1e-3, "{freq} Hz: level ratio {ratio}");
    }
}

#[test]
fn full_bypass_is_exact_through_processor() {
    let mut processor = AttilaProcessor::new();
    processor.set_oversample_factor(OversampleFactor::X1);
    let shared = processor.shared();
    shared.set_by_id("bypass", 1.0);
    shared.set_by_id("drive1", 36.0);
    shared.set_by_id("bit2", 3.0);
    shared.set_by_id("inputGain", 6.0);
    processor.prepare(SR, 512, 2);

    let left = sine(440.0, 512, 0.9);
    let right = sine(6000.0, 512, 0.4);
    let (mut l, mut r) = (left.clone(), right.clone());
    processor.process(&mut [&mut l[..], &mut r[..]], 2);
    assert_eq!(l, left);
    assert_eq!(r, right);
}

#[test]
fn bypass_settles_after_toggle() {
    let mut snap = ParameterSnapshot::new(SR, 4800, 1);
    snap.set_by_id("drive2", 30.0);
    let mut engine = prepared(&snap);

    snap.set_by_id("bypass", 1.0);
    engine.update(&snap);

    let input = sine(1000.0, 4800, 0.5);
    let mut output = input.clone();
    engine.process_block(&mut output, 1, 4800);

    // 20 ms ramp at 48 kHz
    assert_eq!(&output[960..], &input[960..]);
    assert_ne!(&output[..100], &input[..100]);
}

#[test]
fn zero_mix_scales_by_gains_only() {
    let mut snap = ParameterSnapshot::new(SR, 1024, 1);
    snap.set_by_id("mix", 0.0);
    snap.set_by_id("drive1", 36.0);
    snap.set_by_id("bit1", 2.0);
    snap.set_by_id("inputGain", -6.0);
    snap.set_by_id("outputGain", 6.0);
    let mut engine = prepared(&snap);

    let input = sine(300.0, 1024, 0.5);
    let mut output = input.clone();
    engine.process_block(&mut output, 1, 1024);

    let g_in = attila_core::db_to_linear(-6.0);
    let g_out = attila_core::db_to_linear(6.0);
    for (&x, &y) in input.iter().zip(&output) {
        assert!((y - x * g_in * g_out).abs() < 1e-6);
    }
}

#[test]
fn stereo_matches_mono_per_channel() {
    let n = 2048;
    let mut snap = ParameterSnapshot::new(SR, n, 1);
    snap.set_by_id("drive1", 18.0);
    snap.set_by_id("drive3", 9.0);
    snap.set_by_id("bit2", 8.0);
    let mut mono_l = prepared(&snap);
    let mut mono_r = prepared(&snap);
    snap.num_channels = 2;
    let mut stereo = prepared(&snap);

    let left = sine(220.0, n, 0.6);
    let right = sine(3300.0, n, 0.3);

    let mut ml = left.clone();
    mono_l.process_block(&mut ml, 1, n);
    let mut mr = right.clone();
    mono_r.process_block(&mut mr, 1, n);

    let mut buf: Vec<f32> = left.iter().chain(&right).copied().collect();
    stereo.process_block(&mut buf, 2, n);

    assert_eq!(&buf[..n], &ml[..]);
    assert_eq!(&buf[n..], &mr[..]);
}

#[test]
fn oversampled_processor_delays_by_reported_latency() {
    let mut processor = AttilaProcessor::new();
    processor.set_oversample_factor(OversampleFactor::X2);
    processor.shared().set_by_id("bypass", 1.0);
    processor.prepare(SR, 256, 1);
    let latency = processor.latency_samples();
    assert!(latency > 0);

    // Low-frequency content passes the anti-aliasing filter unchanged
    let input = sine(200.0, 2048, 0.5);
    let mut output = input.clone();
    for block in output.chunks_mut(256) {
        processor.process(&mut [block], 1);
    }
    for i in 512..2048 {
        assert!(
            (output[i] - input[i - latency]).abs() < 5e-3,
            "sample {i}: {} vs {}",
            output[i],
            input[i - latency]
        );
    }
}
