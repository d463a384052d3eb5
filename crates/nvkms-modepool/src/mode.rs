use nvkms_timing::ModeTimings;

/// Where a candidate mode came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ModeSource {
    /// Client supplied and not found in any catalog.
    #[default]
    Unknown,
    Edid,
    Vesa,
}

/// A mode as clients name it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KmsMode {
    pub timings: ModeTimings,
    pub name: String,
}

impl KmsMode {
    pub fn new(timings: ModeTimings) -> Self {
        Self {
            name: timings.name(),
            timings,
        }
    }
}

/// Provenance facts that relax or tighten individual checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ValidateModeFlags {
    pub source: ModeSource,
    pub patched_stereo_timings: bool,
}
