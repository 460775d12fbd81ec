//! Block-processing effect trait.
//!
//! The [`Effect`] trait is the seam between processors and the wrappers that
//! drive them (the [`Oversampler`](crate::Oversampler), the host-facing
//! processor, benchmarks). Processing is in place over a channel-major
//! buffer: channel `c` of an `n`-sample block occupies `[c·n, (c+1)·n)`.
//!
//! ## Design Decisions
//!
//! - **Multichannel blocks**: the orchestrator advances its smoothers once per
//!   frame and shares them across channels, so it needs every channel of a
//!   block at once.
//! - **Object-safe**: `dyn Effect` works, but generic dispatch is preferred.
//! - **No allocations**: all methods are callable from the audio thread.

/// Core trait for in-place block effects.
///
/// # Example
///
/// ```rust
/// use attila_core::Effect;
///
/// struct Gain(f32);
///
/// impl Effect for Gain {
///     fn process_block(&mut self, buffer: &mut [f32], _num_channels: usize, _num_samples: usize) {
///         for s in buffer.iter_mut() {
///             *s *= self.0;
///         }
///     }
///
///     fn reset(&mut self) {}
/// }
///
/// let mut g = Gain(0.5);
/// let mut buf = [1.0, 1.0, 1.0, 1.0];
/// g.process_block(&mut buf, 2, 2);
/// assert_eq!(buf, [0.5; 4]);
/// ```
pub trait Effect {
    /// Process `num_channels × num_samples` samples in place.
    ///
    /// `buffer.len()` must be at least `num_channels * num_samples`.
    fn process_block(&mut self, buffer: &mut [f32], num_channels: usize, num_samples: usize);

    /// Clear internal state (filter memories, smoother positions) without
    /// changing parameters.
    fn reset(&mut self);

    /// Processing latency in samples. Default 0.
    fn latency_samples(&self) -> usize {
        0
    }
}

impl<E: Effect + ?Sized> Effect for &mut E {
    fn process_block(&mut self, buffer: &mut [f32], num_channels: usize, num_samples: usize) {
        (**self).process_block(buffer, num_channels, num_samples);
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn latency_samples(&self) -> usize {
        (**self).latency_samples()
    }
}
