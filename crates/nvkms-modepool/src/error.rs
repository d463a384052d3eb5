use nvkms_timing::{MhzPoint1, Yuv420Mode};
use thiserror::Error;

use crate::prealloc::PreallocKind;

fn mhz(khz: &u32) -> MhzPoint1 {
    MhzPoint1(*khz)
}

fn hdmi3d_note(hdmi3d: &bool) -> &'static str {
    if *hdmi3d {
        ", doubled for HDMI 3D"
    } else {
        ""
    }
}

/// Why a candidate mode was rejected.
///
/// The `Display` text is the sentence written to the diagnostic info string after
/// `"Mode is rejected: "`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeRejection {
    #[error("Interlaced modes are not supported on this GPU")]
    InterlacedUnsupported,

    #[error("Only EDID-provided modes are allowed on {dpy} (continuous frequency modes not allowed)")]
    NonContinuousFrequency { dpy: String },

    #[error("Only EDID-provided modes are allowed on {dpy}")]
    NonEdidMode { dpy: String },

    #[error("This mode's visible horizontal size ({visible}) exceeds the horizontal sync start ({sync_start})")]
    HVisibleExceedsHSyncStart { visible: u16, sync_start: u16 },

    #[error("This mode's horizontal sync start ({sync_start}) exceeds the horizontal sync end ({sync_end})")]
    HSyncStartExceedsHSyncEnd { sync_start: u16, sync_end: u16 },

    #[error("This mode's horizontal sync end ({sync_end}) exceeds the horizontal total size ({total})")]
    HSyncEndExceedsHTotal { sync_end: u16, total: u16 },

    #[error("This mode's visible vertical size ({visible}) exceeds the vertical sync start ({sync_start})")]
    VVisibleExceedsVSyncStart { visible: u16, sync_start: u16 },

    #[error("This mode's vertical sync start ({sync_start}) exceeds the vertical sync end ({sync_end})")]
    VSyncStartExceedsVSyncEnd { sync_start: u16, sync_end: u16 },

    #[error("This mode's vertical sync end ({sync_end}) exceeds the vertical total size ({total})")]
    VSyncEndExceedsVTotal { sync_end: u16, total: u16 },

    #[error(
        "PixelClock ({} MHz{}) too high for Display Device (Max: {} MHz)",
        mhz(.pclk_khz),
        hdmi3d_note(.hdmi3d),
        mhz(.max_khz)
    )]
    PixelClockTooHigh {
        pclk_khz: u32,
        hdmi3d: bool,
        max_khz: u32,
    },

    #[error(
        "PixelClock ({} MHz{}) too high for EDID (EDID Max: {} MHz)",
        mhz(.pclk_khz),
        hdmi3d_note(.hdmi3d),
        mhz(.max_khz)
    )]
    EdidPixelClockTooHigh {
        pclk_khz: u32,
        hdmi3d: bool,
        max_khz: u32,
    },

    #[error("Mode total size ({h_total} x {v_total}), with visible size ({h_visible} x {v_visible}), larger than maximum size ({max_width} x {max_height})")]
    TotalSizeTooLarge {
        h_total: u16,
        v_total: u16,
        h_visible: u16,
        v_visible: u16,
        max_width: u16,
        max_height: u16,
    },

    #[error("HorizSync ({hsync} kHz) out of range ({ranges} kHz)")]
    HorizSyncOutOfRange { hsync: String, ranges: String },

    #[error("VertRefresh ({vrefresh} Hz{}) out of range ({ranges} Hz)", hdmi3d_note(.hdmi3d))]
    VertRefreshOutOfRange {
        vrefresh: String,
        hdmi3d: bool,
        ranges: String,
    },

    #[error("Mode not compatible with 3D Vision Stereo")]
    Not3DVisionCompatible,

    #[error("Mode not compatible with HDMI 3D")]
    NotHdmi3DCompatible,

    #[error("Interlaced frame packed HDMI 3D modes are not supported")]
    InterlacedHdmi3D,

    #[error("Interlaced modes are not supported over DisplayPort")]
    InterlacedOverDisplayPort,

    #[error("Interlaced modes are not allowed")]
    InterlacedNotAllowed,

    #[error("Interlaced modes are not allowed with stereo")]
    InterlacedWithStereo,

    #[error("Requested YUV 4:2:0 mode {requested:?} does not match the EDID timing ({expected:?})")]
    Yuv420Mismatch {
        requested: Yuv420Mode,
        expected: Yuv420Mode,
    },

    #[error("HDMI 3D is not available for this mode")]
    Hdmi3DUnavailable,

    #[error("Failed to get default color space and Bpc")]
    NoDefaultColor,

    #[error("Unable to construct hardware-specific mode timings")]
    HwTimingsConstruction,

    #[error("Unable to determine HDMI 2.1 Fixed Rate Link configuration")]
    HdmiFrlConfig,

    #[error("DP Bandwidth check failed")]
    DpBandwidth,

    #[error("No valid scaler taps for the requested viewport")]
    ViewPort,

    #[error("GPU extended capability check failed")]
    ImpCheck,

    #[error(transparent)]
    Prealloc(#[from] PreallocError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreallocError {
    #[error("scratch buffer {0:?} is already in use")]
    InUse(PreallocKind),
}

/// Failures reported by the HDMI link library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HdmiLibError {
    #[error("no FRL configuration fits the requested mode")]
    InsufficientBandwidth,

    #[error("FRL link training failed")]
    LinkTrainingFailed,

    #[error("FRL link training timed out")]
    Timeout,

    #[error("HDMI library request failed: {0}")]
    Other(String),
}
