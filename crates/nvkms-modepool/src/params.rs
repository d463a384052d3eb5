//! Client-supplied validation parameters and device-wide modeset configuration.

use bitflags::bitflags;
use nvkms_timing::FrequencyRange;
use serde::{Deserialize, Serialize};

/// Capacity of each valid-sync range list. A client list must hold strictly fewer entries.
pub const MAX_VALID_SYNC_RANGES: usize = 8;

bitflags! {
    /// Checks a client may bypass, and stricter behaviors it may opt into.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ModeValidationOverrides: u32 {
        const NO_MAX_PCLK_CHECK = 1 << 0;
        const NO_EDID_MAX_PCLK_CHECK = 1 << 1;
        const NO_HORIZ_SYNC_CHECK = 1 << 2;
        const NO_VERT_REFRESH_CHECK = 1 << 3;
        const NO_EDID_DFP_MAX_SIZE_CHECK = 1 << 4;
        const NO_EXTENDED_GPU_CAPABILITIES_CHECK = 1 << 5;
        const OBEY_EDID_CONTRADICTIONS = 1 << 6;
        const NO_TOTAL_SIZE_CHECK = 1 << 7;
        const NO_DUAL_LINK_DVI_CHECK = 1 << 8;
        const NO_DISPLAYPORT_BANDWIDTH_CHECK = 1 << 9;
        const ALLOW_NON_3DVISION_MODES = 1 << 10;
        const ALLOW_NON_EDID_MODES = 1 << 11;
        const ALLOW_NON_HDMI3D_MODES = 1 << 12;
        const NO_MAX_SIZE_CHECK = 1 << 13;
        const NO_HDMI2_CHECK = 1 << 14;
        const NO_RRX1K_CHECK = 1 << 15;
        const REQUIRE_BOOT_CLOCKS = 1 << 16;
        const ALLOW_DP_INTERLACED = 1 << 17;
        const NO_INTERLACED_MODES = 1 << 18;
        const MAX_ONE_HARDWARE_HEAD = 1 << 19;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StereoMode {
    #[default]
    Disabled,
    Nvidia3DVision,
    Nvidia3DVisionPro,
    Hdmi3D,
    Other,
}

impl StereoMode {
    pub fn is_3d_vision(self) -> bool {
        matches!(self, StereoMode::Nvidia3DVision | StereoMode::Nvidia3DVisionPro)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DscMode {
    #[default]
    Default,
    ForceEnable,
    ForceDisable,
}

/// Provenance of a set of valid-sync ranges.
///
/// Clients tag their ranges with one of the `Client*` variants to choose whether they take
/// priority over the EDID range limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrequencyRangeSource {
    #[default]
    None,
    ClientBeforeEdid,
    Edid,
    ClientAfterEdid,
    ConservativeDefaults,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyRanges {
    pub source: FrequencyRangeSource,
    pub ranges: Vec<FrequencyRange>,
}

impl FrequencyRanges {
    pub fn new(source: FrequencyRangeSource, ranges: Vec<FrequencyRange>) -> Self {
        Self { source, ranges }
    }
}

/// Horizontal sync (Hz) and vertical refresh (1/1000 Hz) acceptance windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidSyncs {
    /// Skip the EDID range limits when picking the effective ranges.
    pub ignore_edid_source: bool,
    pub horiz_sync_hz: FrequencyRanges,
    pub vert_refresh_hz1k: FrequencyRanges,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeValidationParams {
    pub verbose: bool,
    pub more_verbose: bool,
    pub prefer_yuv420: bool,
    pub stereo_mode: StereoMode,
    pub overrides: ModeValidationOverrides,
    pub valid_syncs: ValidSyncs,
    pub dsc_mode: DscMode,
    /// Forced DSC target in 1/16 bits per pixel; 0 lets the link library choose.
    pub dsc_override_bits_per_pixel_x16: u32,
}

impl ModeValidationParams {
    pub fn has(&self, flag: ModeValidationOverrides) -> bool {
        self.overrides.contains(flag)
    }
}

/// Device-wide switches, fixed for the life of a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ModesetConfig {
    pub disable_hdmi_frl: bool,
    pub hdmi_deepcolor: bool,
    /// Budget for one FRL link training attempt.
    pub frl_link_training_timeout_ms: u64,
}

impl Default for ModesetConfig {
    fn default() -> Self {
        Self {
            disable_hdmi_frl: false,
            hdmi_deepcolor: true,
            frl_link_training_timeout_ms: 1000,
        }
    }
}
