use nvkms_timing::ParsedEdid;

use crate::color::OutputColorFormatInfo;
use crate::frl::HdmiLinkCaps;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectorKind {
    #[default]
    Analog,
    /// DVI or HDMI.
    Tmds,
    DisplayPort,
}

/// Main link capability of a DisplayPort connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DpLinkCaps {
    pub lane_count: u8,
    /// Raw per-lane rate in Mbps, before 8b/10b coding.
    pub lane_rate_mbps: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub dp_link: Option<DpLinkCaps>,
    /// A DP++ source driving an HDMI/DVI sink through a level shifter.
    pub passive_dp_dongle: bool,
}

impl Connector {
    pub fn new(kind: ConnectorKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn is_dp(&self) -> bool {
        self.kind == ConnectorKind::DisplayPort
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Stereo3DVision {
    pub supported: bool,
    /// Timings must be stretched before the emitter can sync to them.
    pub requires_modetiming_patching: bool,
}

/// A display connected to one connector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dpy {
    pub name: String,
    pub connector: Connector,
    pub parsed_edid: ParsedEdid,
    /// Maximum pixel clock the GPU can drive on this connector.
    pub max_pixel_clock_khz: u32,
    /// Above this, a TMDS link needs dual link or FRL.
    pub max_single_link_pixel_clock_khz: u32,
    pub stereo_3d_vision: Stereo3DVision,
    /// The GPU can emit HDMI on this connector.
    pub hdmi_capable: bool,
    pub hdmi: HdmiLinkCaps,
    pub output_color_formats: OutputColorFormatInfo,
}

impl Dpy {
    pub fn new(name: impl Into<String>, connector: Connector) -> Self {
        Self {
            name: name.into(),
            connector,
            ..Self::default()
        }
    }
}
