//! Per-timing YUV 4:2:0 and HDMI 3D decisions.
//!
//! These are pure functions of the dpy, the device capabilities and the client parameters.

use nvkms_timing::{EdidTiming, Hdmi3dStructure, TimingType, Yuv420Mode};

use crate::device::Device;
use crate::dpy::Dpy;
use crate::hdmi::{dpy_is_hdmi, dpy_supports_hdmi3d, hdmi20_4k60_rgb444_allowed};
use crate::params::{ModeValidationParams, StereoMode};

/// Frame-packed HDMI 3D state for one EDID timing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hdmi3dValue {
    /// Drive the timing frame packed.
    pub hdmi3d: bool,
    /// The timing could be driven frame packed, but the client did not ask for HDMI 3D.
    pub available: bool,
}

/// Looks up a CEA-861 timing's VIC in the sink's HDMI 3D map; only frame packing counts.
pub fn get_hdmi3d_value(
    dev: &Device,
    dpy: &Dpy,
    params: &ModeValidationParams,
    timing: &EdidTiming,
) -> Hdmi3dValue {
    debug_assert!(dpy.parsed_edid.valid);

    let Some(status) = timing.status else {
        return Hdmi3dValue::default();
    };
    if status.kind != TimingType::Edid861St || !dpy_supports_hdmi3d(dev, dpy) {
        return Hdmi3dValue::default();
    }

    let frame_packed = dpy.parsed_edid.info.hdmi_3d_support.iter().any(|entry| {
        entry.vic == status.seq && entry.structures.contains(Hdmi3dStructure::FRAME_PACKING)
    });
    if !frame_packed {
        return Hdmi3dValue::default();
    }

    let requested = params.stereo_mode == StereoMode::Hdmi3D;
    Hdmi3dValue {
        hdmi3d: requested,
        available: !requested,
    }
}

/// DP 1.3 decimated 4:2:0 is needed when the sink cannot take RGB 4:4:4 for this timing, or
/// when the client prefers 4:2:0.
pub fn dp_yuv420_required(dev: &Device, params: &ModeValidationParams, timing: &EdidTiming) -> bool {
    if !dev.caps().supports_dp13 {
        return false;
    }
    if timing.rgb444.is_empty() {
        true
    } else {
        params.prefer_yuv420
    }
}

/// How `timing` must be carried as YUV 4:2:0 on this dpy.
///
/// Chroma subsampling needs even horizontal sync width, front porch, visible and total
/// widths and an even visible height; any odd value rules 4:2:0 out.
pub fn get_yuv420_value(
    dev: &Device,
    dpy: &Dpy,
    params: &ModeValidationParams,
    timing: &EdidTiming,
) -> Yuv420Mode {
    let odd = |v: u16| v & 1 != 0;
    if timing.yuv420.is_empty()
        || odd(timing.h_sync_width)
        || odd(timing.h_front_porch)
        || odd(timing.h_visible)
        || odd(timing.h_total)
        || odd(timing.v_visible)
    {
        return Yuv420Mode::None;
    }

    if dpy.connector.is_dp() {
        return if dp_yuv420_required(dev, params, timing) {
            Yuv420Mode::Sw
        } else {
            Yuv420Mode::None
        };
    }

    if dpy_is_hdmi(dpy) {
        // 4K@60 needs 4:2:0 unless both ends can do HDMI 2.0 6G RGB.
        if !hdmi20_4k60_rgb444_allowed(dev, dpy, params, timing) || params.prefer_yuv420 {
            return if dev.caps().supports_hdmi_yuv420_hw {
                Yuv420Mode::Hw
            } else {
                Yuv420Mode::Sw
            };
        }
    }

    Yuv420Mode::None
}
