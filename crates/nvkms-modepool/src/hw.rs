//! Hardware-facing raster description produced by timing synthesis.

use nvkms_timing::Yuv420Mode;

use crate::usage::UsageBounds;

/// Physical heads the IMP check may spread one logical head across.
pub const MAX_HEADS_PER_DISP: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ViewPortSize {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ViewPortRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalerTaps {
    #[default]
    Taps1,
    Taps2,
    Taps5,
}

impl ScalerTaps {
    pub fn count(self) -> u8 {
        match self {
            ScalerTaps::Taps1 => 1,
            ScalerTaps::Taps2 => 2,
            ScalerTaps::Taps5 => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ViewPort {
    pub input: ViewPortSize,
    pub output: ViewPortRect,
    pub h_taps: ScalerTaps,
    pub v_taps: ScalerTaps,
    /// Usage envelope the head can honor with this viewport.
    pub possible_usage: UsageBounds,
}

/// Output resource protocol selected for a timing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Protocol {
    #[default]
    Crt,
    SingleTmdsA,
    DualTmds,
    HdmiFrl,
    DpA,
}

/// Raster timings in the layout the display engine is programmed with.
///
/// Horizontal positions are relative to the start of sync: `raster_sync_end` is the last
/// sync pixel, `raster_blank_end` the last blanking pixel before active, and
/// `raster_blank_start` the first blanking pixel after active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HwModeTimings {
    pub raster_size: Point,
    pub raster_sync_end: Point,
    pub raster_blank_end: Point,
    pub raster_blank_start: Point,
    pub pixel_clock_khz: u32,
    pub interlaced: bool,
    pub double_scan: bool,
    pub h_sync_positive: bool,
    pub v_sync_positive: bool,
    pub hdmi3d: bool,
    pub yuv420_mode: Yuv420Mode,
    pub protocol: Protocol,
    pub viewport: ViewPort,
}

impl HwModeTimings {
    pub fn h_visible(&self) -> u16 {
        self.raster_blank_start.x.saturating_sub(self.raster_blank_end.x)
    }

    pub fn v_visible(&self) -> u16 {
        self.raster_blank_start.y.saturating_sub(self.raster_blank_end.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DscInfoKind {
    #[default]
    Disabled,
    Hdmi,
    Dp,
}

/// Whether DSC runs on one head or is split across a 2-heads-1-OR pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DscEvoMode {
    #[default]
    Single,
    Dual,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HdmiDscInfo {
    pub dsc_mode: DscEvoMode,
    pub bits_per_pixel_x16: u32,
    pub pps: [u32; 32],
    pub h_active_bytes: u32,
    pub h_active_tri_bytes: u32,
    pub h_blank_tri_bytes: u32,
    pub t_blank_to_t_total_ratio_x1k: u32,
    pub hblank_min: u32,
}

/// Display Stream Compression parameters chosen during link negotiation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DscInfo {
    pub kind: DscInfoKind,
    pub slice_count: u32,
    pub possible_slice_count_mask: u32,
    pub hdmi: HdmiDscInfo,
}

impl DscInfo {
    pub fn is_enabled(&self) -> bool {
        self.kind != DscInfoKind::Disabled
    }
}
