//! Parsed EDID model.
//!
//! These types describe the output of an EDID/CEA-861 parser: the timing list, range limits,
//! feature bits and the HDMI-specific extension data that mode validation consults.

use bitflags::bitflags;

use crate::timings::{ModeTimings, SizeMm, Yuv420Mode};

/// IEEE OUI of the HDMI Licensing LLC vendor specific data block.
pub const HDMI_LLC_IEEE_ID: u32 = 0x00_0C03;

/// First CEA-861 extension revision; it predates data block collections.
pub const CEA861_REV_ORIGINAL: u8 = 1;

bitflags! {
    /// Bits per component supported for one pixel encoding.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ColorDepths: u8 {
        const BPC_6 = 1 << 0;
        const BPC_8 = 1 << 1;
        const BPC_10 = 1 << 2;
        const BPC_12 = 1 << 3;
        const BPC_14 = 1 << 4;
        const BPC_16 = 1 << 5;
    }
}

bitflags! {
    /// HDMI 1.4 3D structures a sink accepts for one VIC.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Hdmi3dStructure: u16 {
        const FRAME_PACKING = 1 << 0;
        const FIELD_ALTERNATIVE = 1 << 1;
        const LINE_ALTERNATIVE = 1 << 2;
        const SIDE_BY_SIDE_FULL = 1 << 3;
        const L_DEPTH = 1 << 4;
        const L_DEPTH_GFX = 1 << 5;
        const TOP_BOTTOM = 1 << 6;
        const SIDE_BY_SIDE_HALF = 1 << 8;
    }
}

/// EDID structure version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdidVersion {
    pub major: u8,
    pub minor: u8,
}

impl EdidVersion {
    pub const V1_3: EdidVersion = EdidVersion { major: 1, minor: 3 };
    pub const V1_4: EdidVersion = EdidVersion { major: 1, minor: 4 };
}

/// Where in the EDID a timing was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimingType {
    /// Detailed timing descriptor.
    #[default]
    EdidDtd,
    /// Standard timing identifier.
    EdidStd,
    /// Established timing bitmap.
    EdidEst,
    /// CEA-861 short video descriptor.
    Edid861St,
    /// DisplayID type I/VII descriptor.
    EdidDisplayId,
    Dmt,
    Gtf,
    Cvt,
    CvtRb,
}

/// Parser bookkeeping for one EDID timing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TimingStatus {
    pub kind: TimingType,
    /// Position within its source. For CEA-861 short video descriptors this is the VIC.
    pub seq: u8,
    /// Non-zero when the timing is a CEA-861 video format.
    pub cea_format: u8,
}

/// One timing in EDID layout: porches and widths rather than absolute sync positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EdidTiming {
    pub h_visible: u16,
    pub h_border: u16,
    pub h_front_porch: u16,
    pub h_sync_width: u16,
    pub h_total: u16,
    pub h_sync_negative: bool,
    pub v_visible: u16,
    pub v_border: u16,
    pub v_front_porch: u16,
    pub v_sync_width: u16,
    pub v_total: u16,
    pub v_sync_negative: bool,
    pub interlaced: bool,
    pub double_scan: bool,
    /// Pixel clock in 10 kHz units.
    pub pclk_10khz: u32,
    pub rr_x1k: u32,
    pub size_mm: SizeMm,
    pub rgb444: ColorDepths,
    pub yuv444: ColorDepths,
    pub yuv422: ColorDepths,
    pub yuv420: ColorDepths,
    /// `None` marks an entry the parser rejected; enumeration skips it.
    pub status: Option<TimingStatus>,
    pub name: String,
}

impl EdidTiming {
    /// The CEA-861 VIC of a short video descriptor timing.
    pub fn vic(&self) -> Option<u8> {
        match self.status {
            Some(TimingStatus {
                kind: TimingType::Edid861St,
                seq,
                ..
            }) => Some(seq),
            _ => None,
        }
    }

    /// Converts to absolute sync positions.
    ///
    /// Interlaced EDID timings describe one field; the result describes the frame, with the
    /// extra half line folded into the total.
    pub fn to_mode_timings(&self) -> ModeTimings {
        let h_sync_start = self.h_visible.saturating_add(self.h_front_porch);
        let h_sync_end = h_sync_start.saturating_add(self.h_sync_width);
        let mut v_visible = self.v_visible;
        let mut v_sync_start = self.v_visible.saturating_add(self.v_front_porch);
        let mut v_sync_end = v_sync_start.saturating_add(self.v_sync_width);
        let mut v_total = self.v_total;

        if self.interlaced {
            v_visible = v_visible.saturating_mul(2);
            v_sync_start = v_sync_start.saturating_mul(2);
            v_sync_end = v_sync_end.saturating_mul(2);
            v_total = v_total.saturating_mul(2).saturating_add(1);
        }

        ModeTimings {
            rr_x1k: self.rr_x1k,
            pixel_clock_hz: self.pclk_10khz.saturating_mul(10_000),
            h_visible: self.h_visible,
            h_sync_start,
            h_sync_end,
            h_total: self.h_total,
            h_skew: 0,
            v_visible,
            v_sync_start,
            v_sync_end,
            v_total,
            size_mm: self.size_mm,
            interlaced: self.interlaced,
            double_scan: self.double_scan,
            h_sync_pos: !self.h_sync_negative,
            h_sync_neg: self.h_sync_negative,
            v_sync_pos: !self.v_sync_negative,
            v_sync_neg: self.v_sync_negative,
            hdmi3d: false,
            yuv420_mode: Yuv420Mode::None,
        }
    }
}

/// Basic display parameters feature bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EdidFeatures {
    /// EDID 1.3: default GTF timings supported.
    pub support_gtf: bool,
    /// EDID 1.4: continuous frequency display. Bit 0 of the feature byte means this for
    /// both analog and digital inputs, so one field serves either.
    pub continuous_frequency: bool,
    pub preferred_timing_is_native: bool,
}

/// Display range limits descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EdidRangeLimits {
    pub min_h_rate_hz: u32,
    pub max_h_rate_hz: u32,
    pub min_v_rate_hzx1k: u32,
    pub max_v_rate_hzx1k: u32,
    /// Maximum pixel clock in 10 kHz units; 0 when unspecified.
    pub max_pclk_10khz: u32,
}

/// HDMI 1.4 3D support entry from the HDMI VSDB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hdmi3dDetails {
    pub vic: u8,
    pub structures: Hdmi3dStructure,
}

/// Vendor specific data block header plus the HDMI LLC deep color bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Vsdb {
    pub ieee_id: u32,
    pub dc_30bit: bool,
    pub dc_36bit: bool,
    pub dc_48bit: bool,
}

/// A CEA-861 extension block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CeaExtension {
    pub revision: u8,
    pub vsdbs: Vec<Vsdb>,
}

/// HDMI Forum VSDB (HF-VSDB) contents relevant to link selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HdmiForumInfo {
    /// Max TMDS character rate in 5 MHz units; 0 when the sink is limited to HDMI 1.x rates.
    pub max_tmds_char_rate: u32,
    /// Max fixed rate link index; 0 when FRL is unsupported.
    pub max_frl_rate: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EdidInfo {
    pub version: EdidVersion,
    pub is_digital: bool,
    pub features: EdidFeatures,
    pub timings: Vec<EdidTiming>,
    pub hdmi_3d_supported: bool,
    pub hdmi_3d_support: Vec<Hdmi3dDetails>,
    pub hdmi_forum: HdmiForumInfo,
    pub cea_extensions: Vec<CeaExtension>,
}

impl EdidInfo {
    /// Returns the HDMI LLC VSDB, looking only at extensions new enough to carry one.
    pub fn hdmi_llc_vsdb(&self) -> Option<&Vsdb> {
        self.cea_extensions
            .iter()
            .filter(|ext| ext.revision > CEA861_REV_ORIGINAL)
            .flat_map(|ext| ext.vsdbs.iter())
            .find(|vsdb| vsdb.ieee_id == HDMI_LLC_IEEE_ID)
    }
}

/// Result of parsing a sink's EDID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParsedEdid {
    pub valid: bool,
    pub info: EdidInfo,
    pub limits: EdidRangeLimits,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn llc_vsdb_requires_extended_cea_revision() {
        let vsdb = Vsdb {
            ieee_id: HDMI_LLC_IEEE_ID,
            dc_30bit: true,
            ..Vsdb::default()
        };
        let mut info = EdidInfo {
            cea_extensions: vec![CeaExtension {
                revision: CEA861_REV_ORIGINAL,
                vsdbs: vec![vsdb],
            }],
            ..EdidInfo::default()
        };
        assert_eq!(info.hdmi_llc_vsdb(), None);

        info.cea_extensions[0].revision = 3;
        assert_eq!(info.hdmi_llc_vsdb(), Some(&vsdb));
    }

    #[test]
    fn vic_only_for_short_video_descriptors() {
        let mut timing = EdidTiming {
            status: Some(TimingStatus {
                kind: TimingType::Edid861St,
                seq: 16,
                cea_format: 16,
            }),
            ..EdidTiming::default()
        };
        assert_eq!(timing.vic(), Some(16));

        timing.status = Some(TimingStatus {
            kind: TimingType::EdidDtd,
            seq: 1,
            cea_format: 0,
        });
        assert_eq!(timing.vic(), None);
    }
}
