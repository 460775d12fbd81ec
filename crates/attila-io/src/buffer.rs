//! Channel-major sample buffer.

/// Multichannel audio stored channel-major: all samples of channel 0, then
/// all samples of channel 1, and so on.
///
/// [`channels_mut`](Self::channels_mut) gives the per-channel slices the
/// processor works on in place.
///
/// # Example
///
/// ```rust
/// use attila_io::ChannelBuffer;
///
/// let buffer = ChannelBuffer::from_interleaved(&[0.1, -0.1, 0.2, -0.2], 2);
/// assert_eq!(buffer.channel(0), &[0.1, 0.2]);
/// assert_eq!(buffer.channel(1), &[-0.1, -0.2]);
/// assert_eq!(buffer.to_interleaved(), vec![0.1, -0.1, 0.2, -0.2]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelBuffer {
    data: Vec<f32>,
    num_channels: usize,
    num_frames: usize,
}

impl ChannelBuffer {
    /// Silent buffer.
    pub fn new(num_channels: usize, num_frames: usize) -> Self {
        Self {
            data: vec![0.0; num_channels * num_frames],
            num_channels,
            num_frames,
        }
    }

    /// Single-channel buffer.
    pub fn from_mono(samples: Vec<f32>) -> Self {
        let num_frames = samples.len();
        Self {
            data: samples,
            num_channels: 1,
            num_frames,
        }
    }

    /// Buffer from separate channels. Shorter channels are padded with
    /// silence to the longest.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Self {
        let num_channels = channels.len();
        let num_frames = channels.iter().map(Vec::len).max().unwrap_or(0);
        let mut data = Vec::with_capacity(num_channels * num_frames);
        for mut ch in channels {
            ch.resize(num_frames, 0.0);
            data.extend_from_slice(&ch);
        }
        Self {
            data,
            num_channels,
            num_frames,
        }
    }

    /// Deinterleave frames of `num_channels` samples. A trailing partial
    /// frame is dropped.
    pub fn from_interleaved(samples: &[f32], num_channels: usize) -> Self {
        if num_channels == 0 {
            return Self::default();
        }
        let num_frames = samples.len() / num_channels;
        let mut buffer = Self::new(num_channels, num_frames);
        for (frame, chunk) in samples.chunks_exact(num_channels).enumerate() {
            for (ch, &s) in chunk.iter().enumerate() {
                buffer.data[ch * num_frames + frame] = s;
            }
        }
        buffer
    }

    /// Interleaved copy.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.data.len());
        for frame in 0..self.num_frames {
            for ch in 0..self.num_channels {
                out.push(self.data[ch * self.num_frames + frame]);
            }
        }
        out
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Samples per channel.
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// One channel.
    pub fn channel(&self, ch: usize) -> &[f32] {
        &self.data[ch * self.num_frames..(ch + 1) * self.num_frames]
    }

    /// One channel, mutably.
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        &mut self.data[ch * self.num_frames..(ch + 1) * self.num_frames]
    }

    /// Mutable slices of every channel.
    pub fn channels_mut(&mut self) -> Vec<&mut [f32]> {
        if self.num_frames == 0 {
            return (0..self.num_channels).map(|_| <&mut [f32]>::default()).collect();
        }
        self.data.chunks_mut(self.num_frames).collect()
    }

    /// The whole channel-major block.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The whole channel-major block, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.data.iter().fold(0.0f32, |m, &s| m.max(s.abs()))
    }

    /// RMS over all channels.
    pub fn rms(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        (sum / self.data.len() as f64).sqrt() as f32
    }
}
