//! Classification of client-supplied modes against the EDID and VESA catalogs.

use nvkms_timing::{EdidTiming, ModeTimings, Yuv420Mode, VESA_MODES};

use crate::decisions::{get_hdmi3d_value, get_yuv420_value};
use crate::device::Device;
use crate::dpy::Dpy;
use crate::error::ModeRejection;
use crate::hdmi::{dpy_is_hdmi, dpy_supports_hdmi3d, VideoInfoFrameCtrl};
use crate::info_string::InfoString;
use crate::mode::{KmsMode, ModeSource, ValidateModeFlags};
use crate::params::{ModeValidationOverrides, ModeValidationParams, StereoMode};

/// The EDID timing `mode` was derived from, if any.
///
/// HDMI 3D and YUV 4:2:0 adjustments are undone before comparing. The entry's own 4:2:0
/// decision must reproduce the mode's `yuv420_mode`.
pub fn find_edid_timing<'a>(
    dev: &Device,
    dpy: &'a Dpy,
    mode: &ModeTimings,
    params: &ModeValidationParams,
) -> Option<&'a EdidTiming> {
    if !dpy.parsed_edid.valid {
        return None;
    }

    let mut plain = mode.with_hdmi3d(false);
    plain.yuv420_mode = Yuv420Mode::None;
    let ignore_rr = params.has(ModeValidationOverrides::NO_RRX1K_CHECK);

    dpy.parsed_edid.info.timings.iter().find(|timing| {
        timing.to_mode_timings().matches(&plain, ignore_rr)
            && mode.yuv420_mode == get_yuv420_value(dev, dpy, params, timing)
    })
}

pub fn is_vesa_mode(mode: &ModeTimings, params: &ModeValidationParams) -> bool {
    let ignore_rr = params.has(ModeValidationOverrides::NO_RRX1K_CHECK);
    VESA_MODES.iter().any(|vesa| vesa.matches(mode, ignore_rr))
}

/// A client mode with its provenance resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeMetadata {
    /// The client's mode, with 3D Vision patching applied when it was needed.
    pub kms_mode: KmsMode,
    pub flags: ValidateModeFlags,
    pub info_frame_ctrl: VideoInfoFrameCtrl,
}

/// Works out where `kms_mode` came from and applies the same corrections enumeration would.
///
/// Fails only when the client asked for a YUV 4:2:0 or HDMI 3D state its matching EDID
/// entry cannot have.
pub fn construct_mode_timings_metadata(
    dev: &Device,
    dpy: &Dpy,
    params: &ModeValidationParams,
    kms_mode: &KmsMode,
) -> Result<ModeMetadata, ModeRejection> {
    let client = &kms_mode.timings;
    let mut timings = *client;
    let mut flags = ValidateModeFlags::default();
    let mut info_frame_ctrl = VideoInfoFrameCtrl::default();

    if let Some(edid_timing) = find_edid_timing(dev, dpy, client, params) {
        let mut timing = edid_timing.clone();
        flags.source = ModeSource::Edid;

        if params.stereo_mode.is_3d_vision()
            && dpy.stereo_3d_vision.requires_modetiming_patching
            && dev
                .hal()
                .patch_3d_vision_timings(dpy, &mut timing, &mut InfoString::discard())
        {
            flags.patched_stereo_timings = true;
            timings = timing.to_mode_timings();
            timings.yuv420_mode = client.yuv420_mode;
            timings = timings.with_hdmi3d(client.hdmi3d);
        }

        let expected = get_yuv420_value(dev, dpy, params, &timing);
        if timings.yuv420_mode != expected {
            return Err(ModeRejection::Yuv420Mismatch {
                requested: timings.yuv420_mode,
                expected,
            });
        }

        let hdmi3d = get_hdmi3d_value(dev, dpy, params, &timing);
        if timings.hdmi3d != hdmi3d.hdmi3d && !hdmi3d.available {
            return Err(ModeRejection::Hdmi3DUnavailable);
        }

        if params.stereo_mode == StereoMode::Hdmi3D {
            if !dpy_supports_hdmi3d(dev, dpy) {
                tracing::warn!(
                    "HDMI 3D mode is selected, but HDMI 3D is not supported by {dpy}; HDMI 3D may not function properly. This might happen if no EDID is available for {dpy}, if the display is not connected over HDMI, or if the display does not support HDMI 3D.",
                    dpy = dpy.name
                );
            } else if !timings.hdmi3d {
                tracing::warn!(
                    "HDMI 3D mode is selected, but the currently selected mode is incompatible with HDMI 3D. HDMI 3D will be disabled."
                );
            }
        }

        if dpy_is_hdmi(dpy) {
            info_frame_ctrl = VideoInfoFrameCtrl::from_timing(&timing);
        }
    } else if is_vesa_mode(&timings, params) {
        flags.source = ModeSource::Vesa;
    }

    tracing::trace!(dpy = %dpy.name, source = ?flags.source, patched = flags.patched_stereo_timings, "classified mode");

    Ok(ModeMetadata {
        kms_mode: KmsMode {
            timings,
            name: kms_mode.name.clone(),
        },
        flags,
        info_frame_ctrl,
    })
}
