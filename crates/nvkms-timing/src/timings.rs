use serde::{Deserialize, Serialize};

/// Maximum length of a generated mode name, including room for a terminator in fixed-size
/// client buffers.
pub const MAX_MODE_NAME_LEN: usize = 32;

/// How a mode is carried as YUV 4:2:0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Yuv420Mode {
    /// The mode is scanned out as-is.
    #[default]
    None,
    /// The GPU cannot emit 4:2:0 natively; the scanout is emulated by halving the horizontal
    /// raster and pixel clock.
    Sw,
    /// The output resource emits 4:2:0 directly from full-rate timings.
    Hw,
}

/// Physical image size in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SizeMm {
    pub w: u16,
    pub h: u16,
}

/// A candidate raster timing.
///
/// Horizontal and vertical values are in pixels/lines, counted from the start of the active
/// region, so a well-formed timing satisfies `visible <= sync_start <= sync_end <= total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModeTimings {
    /// Refresh rate in 1/1000 Hz.
    pub rr_x1k: u32,
    pub pixel_clock_hz: u32,
    pub h_visible: u16,
    pub h_sync_start: u16,
    pub h_sync_end: u16,
    pub h_total: u16,
    pub h_skew: u16,
    pub v_visible: u16,
    pub v_sync_start: u16,
    pub v_sync_end: u16,
    pub v_total: u16,
    pub size_mm: SizeMm,
    pub interlaced: bool,
    pub double_scan: bool,
    pub h_sync_pos: bool,
    pub h_sync_neg: bool,
    pub v_sync_pos: bool,
    pub v_sync_neg: bool,
    /// Frame-packed HDMI 3D. When set, `pixel_clock_hz` and `rr_x1k` are doubled relative to
    /// the underlying 2D timing.
    pub hdmi3d: bool,
    pub yuv420_mode: Yuv420Mode,
}

impl ModeTimings {
    /// Compares two timings field by field.
    ///
    /// The physical size never participates. The refresh rate is skipped when `ignore_rr_x1k`
    /// is set, for clients that compute it with different rounding.
    pub fn matches(&self, other: &ModeTimings, ignore_rr_x1k: bool) -> bool {
        (ignore_rr_x1k || self.rr_x1k == other.rr_x1k)
            && self.pixel_clock_hz == other.pixel_clock_hz
            && self.h_visible == other.h_visible
            && self.h_sync_start == other.h_sync_start
            && self.h_sync_end == other.h_sync_end
            && self.h_total == other.h_total
            && self.h_skew == other.h_skew
            && self.v_visible == other.v_visible
            && self.v_sync_start == other.v_sync_start
            && self.v_sync_end == other.v_sync_end
            && self.v_total == other.v_total
            && self.interlaced == other.interlaced
            && self.double_scan == other.double_scan
            && self.h_sync_pos == other.h_sync_pos
            && self.h_sync_neg == other.h_sync_neg
            && self.v_sync_pos == other.v_sync_pos
            && self.v_sync_neg == other.v_sync_neg
            && self.hdmi3d == other.hdmi3d
            && self.yuv420_mode == other.yuv420_mode
    }

    /// Returns a copy with frame-packed HDMI 3D switched on or off.
    ///
    /// Enabling doubles the pixel clock and refresh rate; disabling halves them. Asking for the
    /// state the timing is already in returns it unchanged.
    pub fn with_hdmi3d(&self, enable: bool) -> ModeTimings {
        let mut timings = *self;
        if timings.hdmi3d == enable {
            return timings;
        }
        if enable {
            timings.pixel_clock_hz = timings.pixel_clock_hz.saturating_mul(2);
            timings.rr_x1k = timings.rr_x1k.saturating_mul(2);
        } else {
            timings.pixel_clock_hz /= 2;
            timings.rr_x1k /= 2;
        }
        timings.hdmi3d = enable;
        timings
    }

    /// Human readable `"WxH"` name for this timing.
    pub fn name(&self) -> String {
        build_mode_name(self.h_visible, self.v_visible)
    }
}

/// Formats `"{width}x{height}"`, bounded to [`MAX_MODE_NAME_LEN`] - 1 characters.
pub fn build_mode_name(width: u16, height: u16) -> String {
    let mut name = format!("{width}x{height}");
    name.truncate(MAX_MODE_NAME_LEN - 1);
    name
}
