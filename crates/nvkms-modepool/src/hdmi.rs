//! HDMI sink capability queries.

use nvkms_timing::EdidTiming;

use crate::device::Device;
use crate::dpy::Dpy;
use crate::params::{ModeValidationOverrides, ModeValidationParams};

/// The GPU drives HDMI on this connector and the sink advertises an HDMI LLC VSDB.
pub fn dpy_is_hdmi(dpy: &Dpy) -> bool {
    dpy.hdmi_capable
        && dpy.parsed_edid.valid
        && dpy
            .parsed_edid
            .info
            .hdmi_llc_vsdb()
            .is_some()
}

/// Both ends support 30-bit deep color, and deep color is enabled for the device.
pub fn dpy_is_hdmi_depth30(dev: &Device, dpy: &Dpy) -> bool {
    dev.config().hdmi_deepcolor
        && dpy_is_hdmi(dpy)
        && dev.caps().supports_hdmi_10bpc
        && dpy
            .parsed_edid
            .info
            .hdmi_llc_vsdb()
            .is_some_and(|vsdb| vsdb.dc_30bit)
}

/// HDMI 2.0 4K@60 uncompressed RGB 4:4:4 ("6G mode") is usable for `timing`.
pub fn hdmi20_4k60_rgb444_allowed(
    dev: &Device,
    dpy: &Dpy,
    params: &ModeValidationParams,
    timing: &EdidTiming,
) -> bool {
    debug_assert!(dpy.parsed_edid.valid);

    let monitor_supports_444 =
        !timing.rgb444.is_empty() && dpy.parsed_edid.info.hdmi_forum.max_tmds_char_rate > 0;

    dev.caps().supports_hdmi20
        && (params.has(ModeValidationOverrides::NO_HDMI2_CHECK) || monitor_supports_444)
}

pub fn dpy_supports_hdmi3d(dev: &Device, dpy: &Dpy) -> bool {
    dpy.parsed_edid.valid
        && dpy_is_hdmi(dpy)
        && dpy.parsed_edid.info.hdmi_3d_supported
        && dev.caps().supports_hdmi_3d
}

/// FRL is enabled for the device, implemented by the GPU, advertised by the sink and not
/// blocked by a passive DP dongle.
pub fn dpy_supports_frl(dev: &Device, dpy: &Dpy) -> bool {
    debug_assert!(dpy_is_hdmi(dpy));

    !dev.config().disable_hdmi_frl
        && dev.caps().supports_hdmi_frl
        && dpy.parsed_edid.valid
        && dpy.parsed_edid.info.hdmi_forum.max_frl_rate != 0
        && !dpy.connector.passive_dp_dongle
}

/// Video infoframe fields derived from the matched EDID timing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VideoInfoFrameCtrl {
    /// CEA-861 VIC; `None` leaves the field to the infoframe defaults.
    pub video_format_id: Option<u8>,
}

impl VideoInfoFrameCtrl {
    pub fn from_timing(timing: &EdidTiming) -> Self {
        Self {
            video_format_id: timing.vic(),
        }
    }
}
