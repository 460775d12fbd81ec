//! Parameter table and the flat parameter snapshot.
//!
//! Every control of the multiband distortion is addressed by a [`ParamKey`]:
//! either a per-band control ([`BandParam`] on one of the three [`Band`]s) or
//! a global one ([`GlobalParam`]). Keys map to a dense index, so a
//! [`ParameterSnapshot`] is a plain `[f32; PARAM_COUNT]` plus the engine
//! settings (`sample_rate`, `block_size`, `num_channels`).
//!
//! Each key also has a stable string id (`"drive1"`, `"lowMidCut"`, ...)
//! and a static [`ParamDescriptor`] with range, default and unit.
//!
//! # Parameter table
//!
//! | Id | Range | Default | Unit |
//! |----|-------|---------|------|
//! | `inputGain{b}` / `outputGain{b}` | −60..6 | 0 | dB |
//! | `drive{b}` | 0..36 | 0 | dB |
//! | `knee{b}` | 1..48 | 1 | |
//! | `bit{b}` | 1..32 | 32 | int |
//! | `shape{b}` | 10..400 | 100 | % |
//! | `curve{b}` | Soft..Fold | Soft | choice |
//! | `bypass{b}` | off/on | off | bool |
//! | `mix` | 0..100 | 100 | % |
//! | `inputGain` / `outputGain` | −60..6 | 0 | dB |
//! | `bypass` | off/on | off | bool |
//! | `lowMidCut` | 20..20000 | 440 | Hz |
//! | `midHighCut` | 20..20000 | 5000 | Hz |

use attila_core::{Curve, ParamDescriptor, ParamScale, ParamUnit, ParamValue};

/// Number of per-band controls.
pub const BAND_PARAM_COUNT: usize = 8;

/// Number of global controls.
pub const GLOBAL_PARAM_COUNT: usize = 6;

/// Total number of parameters.
pub const PARAM_COUNT: usize = 3 * BAND_PARAM_COUNT + GLOBAL_PARAM_COUNT;

/// Frequency band of the three-way split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// Below the low/mid cutoff.
    Low,
    /// Between the two cutoffs.
    Mid,
    /// Above the mid/high cutoff.
    High,
}

impl Band {
    /// All bands, low to high.
    pub const ALL: [Band; 3] = [Band::Low, Band::Mid, Band::High];

    /// Zero-based position.
    pub const fn index(self) -> usize {
        match self {
            Band::Low => 0,
            Band::Mid => 1,
            Band::High => 2,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Band::Low => "Low",
            Band::Mid => "Mid",
            Band::High => "High",
        }
    }
}

/// Per-band control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandParam {
    /// Gain before the shaper, dB.
    InputGain,
    /// Gain after the limiter, dB.
    OutputGain,
    /// Shaper pre-gain, dB.
    Drive,
    /// Knee hardness.
    Knee,
    /// Bitcrush depth.
    Bits,
    /// Bitcrush companding exponent, %.
    Shape,
    /// Transfer function.
    Curve,
    /// Band bypass.
    Bypass,
}

impl BandParam {
    /// All per-band controls in table order.
    pub const ALL: [BandParam; BAND_PARAM_COUNT] = [
        BandParam::InputGain,
        BandParam::OutputGain,
        BandParam::Drive,
        BandParam::Knee,
        BandParam::Bits,
        BandParam::Shape,
        BandParam::Curve,
        BandParam::Bypass,
    ];

    const fn index(self) -> usize {
        match self {
            BandParam::InputGain => 0,
            BandParam::OutputGain => 1,
            BandParam::Drive => 2,
            BandParam::Knee => 3,
            BandParam::Bits => 4,
            BandParam::Shape => 5,
            BandParam::Curve => 6,
            BandParam::Bypass => 7,
        }
    }
}

/// Global control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalParam {
    /// Dry/wet, %.
    Mix,
    /// Gain before the split, dB.
    InputGain,
    /// Gain after the mix, dB.
    OutputGain,
    /// Global bypass.
    Bypass,
    /// Low/mid crossover, Hz.
    LowMidCut,
    /// Mid/high crossover, Hz.
    MidHighCut,
}

impl GlobalParam {
    /// All global controls in table order.
    pub const ALL: [GlobalParam; GLOBAL_PARAM_COUNT] = [
        GlobalParam::Mix,
        GlobalParam::InputGain,
        GlobalParam::OutputGain,
        GlobalParam::Bypass,
        GlobalParam::LowMidCut,
        GlobalParam::MidHighCut,
    ];

    const fn index(self) -> usize {
        match self {
            GlobalParam::Mix => 0,
            GlobalParam::InputGain => 1,
            GlobalParam::OutputGain => 2,
            GlobalParam::Bypass => 3,
            GlobalParam::LowMidCut => 4,
            GlobalParam::MidHighCut => 5,
        }
    }
}

/// Strongly typed parameter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Control of one band.
    Band(Band, BandParam),
    /// Global control.
    Global(GlobalParam),
}

impl ParamKey {
    /// Dense index into [`PARAMS`] and snapshot storage.
    pub const fn index(self) -> usize {
        match self {
            ParamKey::Band(band, param) => band.index() * BAND_PARAM_COUNT + param.index(),
            ParamKey::Global(param) => 3 * BAND_PARAM_COUNT + param.index(),
        }
    }

    /// Key for a dense index.
    pub fn from_index(index: usize) -> Option<Self> {
        if index < 3 * BAND_PARAM_COUNT {
            let band = Band::ALL[index / BAND_PARAM_COUNT];
            Some(ParamKey::Band(band, BandParam::ALL[index % BAND_PARAM_COUNT]))
        } else {
            GlobalParam::ALL
                .get(index - 3 * BAND_PARAM_COUNT)
                .map(|&p| ParamKey::Global(p))
        }
    }

    /// Key for a stable string id such as `"knee2"` or `"midHighCut"`.
    pub fn from_id(id: &str) -> Option<Self> {
        PARAMS
            .iter()
            .position(|d| d.string_id == id)
            .and_then(Self::from_index)
    }

    /// All keys in table order.
    pub fn all() -> impl Iterator<Item = ParamKey> {
        (0..PARAM_COUNT).filter_map(Self::from_index)
    }

    /// Static metadata.
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &PARAMS[self.index()]
    }

    /// Stable string id.
    pub fn id(self) -> &'static str {
        self.descriptor().string_id
    }
}

/// Labels of the `curve{b}` choice, in [`Curve::ALL`] order.
pub const CURVE_LABELS: &[&str] = &["Soft", "Hard", "Tanh", "Sigmoid", "Fuzz", "Fold"];

/// Skew of both crossover knobs (more travel at the low end).
const CUTOFF_SKEW: f32 = 0.3;

macro_rules! band_params {
    ($group:literal, $label:literal, $n:literal) => {
        [
            ParamDescriptor::gain_db(
                concat!($label, " Input Gain"),
                "In",
                concat!("inputGain", $n),
                -60.0,
                6.0,
                0.0,
            )
            .with_group($group),
            ParamDescriptor::gain_db(
                concat!($label, " Output Gain"),
                "Out",
                concat!("outputGain", $n),
                -60.0,
                6.0,
                0.0,
            )
            .with_group($group),
            ParamDescriptor::gain_db(concat!($label, " Drive"), "Drive", concat!("drive", $n), 0.0, 36.0, 0.0)
                .with_group($group),
            ParamDescriptor::float(
                concat!($label, " Knee"),
                "Knee",
                concat!("knee", $n),
                ParamUnit::None,
                1.0,
                48.0,
                1.0,
            )
            .with_group($group),
            ParamDescriptor::int(concat!($label, " Bit Depth"), "Bits", concat!("bit", $n), 1, 32, 32)
                .with_group($group),
            ParamDescriptor::float(
                concat!($label, " Crush Shape"),
                "Shape",
                concat!("shape", $n),
                ParamUnit::Percent,
                10.0,
                400.0,
                100.0,
            )
            .with_group($group),
            ParamDescriptor::choice(concat!($label, " Curve"), "Curve", concat!("curve", $n), CURVE_LABELS, 0)
                .with_group($group),
            ParamDescriptor::toggle(concat!($label, " Bypass"), "Bypass", concat!("bypass", $n), false)
                .with_group($group),
        ]
    };
}

const LOW_PARAMS: [ParamDescriptor; BAND_PARAM_COUNT] = band_params!("low", "Low", "1");
const MID_PARAMS: [ParamDescriptor; BAND_PARAM_COUNT] = band_params!("mid", "Mid", "2");
const HIGH_PARAMS: [ParamDescriptor; BAND_PARAM_COUNT] = band_params!("high", "High", "3");

const GLOBAL_PARAMS: [ParamDescriptor; GLOBAL_PARAM_COUNT] = [
    ParamDescriptor::float("Mix", "Mix", "mix", ParamUnit::Percent, 0.0, 100.0, 100.0),
    ParamDescriptor::gain_db("Input Gain", "Input", "inputGain", -60.0, 6.0, 0.0),
    ParamDescriptor::gain_db("Output Gain", "Output", "outputGain", -60.0, 6.0, 0.0),
    ParamDescriptor::toggle("Bypass", "Bypass", "bypass", false),
    ParamDescriptor::float(
        "Low/Mid Crossover",
        "LowMid",
        "lowMidCut",
        ParamUnit::Hertz,
        20.0,
        20000.0,
        440.0,
    )
    .with_scale(ParamScale::Power(1.0 / CUTOFF_SKEW)),
    ParamDescriptor::float(
        "Mid/High Crossover",
        "MidHigh",
        "midHighCut",
        ParamUnit::Hertz,
        20.0,
        20000.0,
        5000.0,
    )
    .with_scale(ParamScale::Power(1.0 / CUTOFF_SKEW)),
];

const fn build_table() -> [ParamDescriptor; PARAM_COUNT] {
    let mut table = [GLOBAL_PARAMS[0]; PARAM_COUNT];
    let mut i = 0;
    while i < BAND_PARAM_COUNT {
        table[i] = LOW_PARAMS[i];
        table[BAND_PARAM_COUNT + i] = MID_PARAMS[i];
        table[2 * BAND_PARAM_COUNT + i] = HIGH_PARAMS[i];
        i += 1;
    }
    let mut g = 0;
    while g < GLOBAL_PARAM_COUNT {
        table[3 * BAND_PARAM_COUNT + g] = GLOBAL_PARAMS[g];
        g += 1;
    }
    table
}

/// Every parameter descriptor, indexed by [`ParamKey::index`].
pub static PARAMS: [ParamDescriptor; PARAM_COUNT] = build_table();

/// Typed view of one band's controls, taken from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSettings {
    /// Input gain in dB.
    pub input_gain_db: f32,
    /// Output gain in dB.
    pub output_gain_db: f32,
    /// Drive in dB.
    pub drive_db: f32,
    /// Knee hardness (> 0).
    pub knee: f32,
    /// Bitcrush depth (>= 1).
    pub bits: u32,
    /// Companding exponent in percent (100 = linear).
    pub shape_pct: f32,
    /// Transfer function.
    pub curve: Curve,
    /// Band bypass.
    pub bypass: bool,
}

impl Default for BandSettings {
    fn default() -> Self {
        Self {
            input_gain_db: 0.0,
            output_gain_db: 0.0,
            drive_db: 0.0,
            knee: 1.0,
            bits: 32,
            shape_pct: 100.0,
            curve: Curve::SoftKnee,
            bypass: false,
        }
    }
}

/// Flat snapshot of every parameter plus engine settings.
///
/// Created once at prepare time with defaults and refreshed from the live
/// parameter store at control rate. Values are stored as plain `f32`s and
/// are not range-checked here.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSnapshot {
    /// Effective processing rate in Hz (nominal rate × oversampling factor).
    pub sample_rate: f32,
    /// Maximum block size in samples at the effective rate.
    pub block_size: usize,
    /// Channel count.
    pub num_channels: usize,
    values: [f32; PARAM_COUNT],
}

impl ParameterSnapshot {
    /// Snapshot with every parameter at its default.
    pub fn new(sample_rate: f32, block_size: usize, num_channels: usize) -> Self {
        let mut values = [0.0; PARAM_COUNT];
        for (v, d) in values.iter_mut().zip(PARAMS.iter()) {
            *v = d.default;
        }
        Self {
            sample_rate,
            block_size,
            num_channels,
            values,
        }
    }

    /// Plain value of `key`.
    #[inline]
    pub fn get(&self, key: ParamKey) -> f32 {
        self.values[key.index()]
    }

    /// Set the plain value of `key`.
    #[inline]
    pub fn set(&mut self, key: ParamKey, value: f32) {
        self.values[key.index()] = value;
    }

    /// Typed value of `key`, clamped and snapped to the parameter kind.
    pub fn typed(&self, key: ParamKey) -> ParamValue {
        key.descriptor().value(self.get(key))
    }

    /// Plain value by string id.
    pub fn get_by_id(&self, id: &str) -> Option<f32> {
        ParamKey::from_id(id).map(|k| self.get(k))
    }

    /// Set by string id. Returns the key, or `None` for an unknown id.
    pub fn set_by_id(&mut self, id: &str, value: f32) -> Option<ParamKey> {
        let key = ParamKey::from_id(id)?;
        self.set(key, value);
        Some(key)
    }

    /// All values in table order.
    pub fn values(&self) -> &[f32; PARAM_COUNT] {
        &self.values
    }

    /// Mutable access to all values in table order.
    pub fn values_mut(&mut self) -> &mut [f32; PARAM_COUNT] {
        &mut self.values
    }

    /// Typed view of one band.
    pub fn band(&self, band: Band) -> BandSettings {
        let get = |p| self.get(ParamKey::Band(band, p));
        let curve = match self.typed(ParamKey::Band(band, BandParam::Curve)) {
            ParamValue::Choice(i) => Curve::from_index(i),
            _ => Curve::default(),
        };
        BandSettings {
            input_gain_db: get(BandParam::InputGain),
            output_gain_db: get(BandParam::OutputGain),
            drive_db: get(BandParam::Drive),
            knee: get(BandParam::Knee),
            bits: get(BandParam::Bits) as u32,
            shape_pct: get(BandParam::Shape),
            curve,
            bypass: get(BandParam::Bypass) >= 0.5,
        }
    }

    /// Global control value.
    #[inline]
    pub fn global(&self, param: GlobalParam) -> f32 {
        self.get(ParamKey::Global(param))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for i in 0..PARAM_COUNT {
            let key = ParamKey::from_index(i).unwrap();
            assert_eq!(key.index(), i);
        }
        assert!(ParamKey::from_index(PARAM_COUNT).is_none());
        assert_eq!(ParamKey::all().count(), PARAM_COUNT);
    }

    #[test]
    fn ids_are_unique_and_resolve() {
        for key in ParamKey::all() {
            assert_eq!(ParamKey::from_id(key.id()), Some(key), "{}", key.id());
        }
        assert_eq!(
            ParamKey::from_id("drive2"),
            Some(ParamKey::Band(Band::Mid, BandParam::Drive))
        );
        assert_eq!(
            ParamKey::from_id("lowMidCut"),
            Some(ParamKey::Global(GlobalParam::LowMidCut))
        );
        assert_eq!(ParamKey::from_id("drive4"), None);
    }

    #[test]
    fn table_matches_documented_ranges() {
        let bits = ParamKey::Band(Band::High, BandParam::Bits).descriptor();
        assert_eq!((bits.min, bits.max, bits.default), (1.0, 32.0, 32.0));
        assert_eq!(bits.string_id, "bit3");
        assert_eq!(bits.group, "high");

        let drive = ParamKey::Band(Band::Low, BandParam::Drive).descriptor();
        assert_eq!((drive.min, drive.max, drive.default), (0.0, 36.0, 0.0));

        let mh = ParamKey::Global(GlobalParam::MidHighCut).descriptor();
        assert_eq!((mh.min, mh.max, mh.default), (20.0, 20000.0, 5000.0));

        let mix = ParamKey::Global(GlobalParam::Mix).descriptor();
        assert_eq!(mix.default, 100.0);
    }

    #[test]
    fn crossover_knobs_share_skew() {
        let lm = ParamKey::Global(GlobalParam::LowMidCut).descriptor();
        let mh = ParamKey::Global(GlobalParam::MidHighCut).descriptor();
        assert_eq!(lm.scale, ParamScale::Power(1.0 / 0.3));
        assert_eq!(lm.scale, mh.scale);
        for hz in [20.0, 440.0, 1000.0, 5000.0, 20000.0] {
            assert_eq!(lm.normalize(hz), mh.normalize(hz));
        }
        // A linear knob would put 1 kHz at 5% of its travel
        assert!(lm.normalize(1000.0) > 0.3);
    }

    #[test]
    fn snapshot_starts_at_defaults() {
        let snap = ParameterSnapshot::new(48000.0, 512, 2);
        for key in ParamKey::all() {
            assert_eq!(snap.get(key), key.descriptor().default);
        }
        assert_eq!(snap.band(Band::Mid), BandSettings::default());
        assert_eq!(snap.global(GlobalParam::LowMidCut), 440.0);
    }

    #[test]
    fn set_by_id_updates_band_view() {
        let mut snap = ParameterSnapshot::new(48000.0, 512, 2);
        assert!(snap.set_by_id("knee3", 12.0).is_some());
        assert!(snap.set_by_id("curve3", 2.0).is_some());
        assert!(snap.set_by_id("bypass3", 1.0).is_some());
        assert!(snap.set_by_id("nope", 1.0).is_none());

        let high = snap.band(Band::High);
        assert_eq!(high.knee, 12.0);
        assert_eq!(high.curve, Curve::Tanh);
        assert!(high.bypass);
        assert_eq!(snap.get_by_id("knee3"), Some(12.0));
    }

    #[test]
    fn curve_labels_follow_curve_order() {
        for (i, curve) in Curve::ALL.iter().enumerate() {
            assert_eq!(CURVE_LABELS[i], curve.label());
        }
    }
}
