#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use nvkms_modepool::frl::{
    FrlClientControl, FrlDscConfig, HdmiBpc, HdmiSinkCaps, HdmiSrcCaps, VideoTransportInfo,
};
use nvkms_modepool::hw::DscInfo;
use nvkms_modepool::{
    Bpc, BpcRange, Connector, ConnectorKind, Deadline, Device, DispHal, DisplayClass, Dpy,
    DpyColor, FrlConfig, FrlRate, HdmiLib, HdmiLibError, HdmiLinkCaps, HeadCaps, HwModeTimings,
    InfoString, KmsMode, LayerUsageBounds, ModeValidationParams, ModesetConfig, NullHdmiLib,
    OutputColorFormatInfo, SimpleDispHal, SurfaceMemoryFormats, UsageBounds, ViewPortRect,
    ViewPortSize,
};
use nvkms_timing::{
    CeaExtension, ColorDepths, EdidInfo, EdidRangeLimits, EdidTiming, EdidVersion, ParsedEdid,
    TimingStatus, TimingType, Vsdb, HDMI_LLC_IEEE_ID,
};

pub fn usage(formats: SurfaceMemoryFormats) -> UsageBounds {
    let mut usage = UsageBounds::default();
    usage.layers[0] = LayerUsageBounds {
        usable: true,
        supported_surface_memory_formats: formats,
        ..LayerUsageBounds::default()
    };
    usage
}

pub fn heads(count: usize, max_pixel_clock_khz: u32) -> Vec<HeadCaps> {
    vec![
        HeadCaps {
            max_pixel_clock_khz,
            usage: usage(SurfaceMemoryFormats::A8R8G8B8 | SurfaceMemoryFormats::X8R8G8B8),
        };
        count
    ]
}

pub fn device(class: DisplayClass, hal: SimpleDispHal) -> Device {
    Device::new(class, ModesetConfig::default(), Box::new(hal), Box::new(NullHdmiLib))
}

pub fn device_with_lib(class: DisplayClass, hal: SimpleDispHal, lib: impl HdmiLib + 'static) -> Device {
    Device::new(class, ModesetConfig::default(), Box::new(hal), Box::new(lib))
}

/// [`SimpleDispHal`] with hooks for behavior it never shows on its own.
pub struct QuirkyHal {
    pub inner: SimpleDispHal,
    /// No viewport gets scaler taps.
    pub refuse_viewports: bool,
    /// Stereo patching also adds one pixel to the horizontal total.
    pub stereo_patch_widens: bool,
}

impl QuirkyHal {
    pub fn new(inner: SimpleDispHal) -> Self {
        Self {
            inner,
            refuse_viewports: false,
            stereo_patch_widens: false,
        }
    }
}

impl DispHal for QuirkyHal {
    #[allow(clippy::too_many_arguments)]
    fn construct_hw_mode_timings(
        &self,
        dev: &Device,
        dpy: &Dpy,
        mode: &KmsMode,
        viewport_in: Option<&ViewPortSize>,
        viewport_out: Option<&ViewPortRect>,
        color: &DpyColor,
        params: &ModeValidationParams,
        info: &mut InfoString,
    ) -> Option<HwModeTimings> {
        self.inner
            .construct_hw_mode_timings(dev, dpy, mode, viewport_in, viewport_out, color, params, info)
    }

    fn use_2heads_1or(&self, dpy: &Dpy, timings: &HwModeTimings, params: &ModeValidationParams) -> bool {
        self.inner.use_2heads_1or(dpy, timings, params)
    }

    fn validate_dp_mode(
        &self,
        dpy: &Dpy,
        timings: &HwModeTimings,
        color: &DpyColor,
        dual_head: bool,
        dsc: &mut DscInfo,
        params: &ModeValidationParams,
    ) -> bool {
        self.inner
            .validate_dp_mode(dpy, timings, color, dual_head, dsc, params)
    }

    fn validate_viewport(&self, timings: &mut HwModeTimings, info: &mut InfoString) -> bool {
        !self.refuse_viewports && self.inner.validate_viewport(timings, info)
    }

    #[allow(clippy::too_many_arguments)]
    fn imp_check(
        &self,
        dpy: &Dpy,
        timings: &HwModeTimings,
        dsc_enabled: bool,
        dual_head: bool,
        color: &DpyColor,
        params: &ModeValidationParams,
        out: &mut [HwModeTimings],
        info: &mut InfoString,
    ) -> Option<usize> {
        self.inner
            .imp_check(dpy, timings, dsc_enabled, dual_head, color, params, out, info)
    }

    fn patch_3d_vision_timings(
        &self,
        dpy: &Dpy,
        timing: &mut EdidTiming,
        info: &mut InfoString,
    ) -> bool {
        let patched = self.inner.patch_3d_vision_timings(dpy, timing, info);
        if patched && self.stereo_patch_widens {
            timing.h_total += 1;
        }
        patched
    }
}

pub fn quirky_device(class: DisplayClass, hal: QuirkyHal) -> Device {
    Device::new(class, ModesetConfig::default(), Box::new(hal), Box::new(NullHdmiLib))
}

pub fn rgb(min_bpc: Bpc, max_bpc: Bpc) -> OutputColorFormatInfo {
    OutputColorFormatInfo {
        rgb444: BpcRange::new(min_bpc, max_bpc),
        ..OutputColorFormatInfo::default()
    }
}

/// CRT without an EDID.
pub fn analog_dpy(max_pixel_clock_khz: u32) -> Dpy {
    Dpy {
        max_pixel_clock_khz,
        max_single_link_pixel_clock_khz: max_pixel_clock_khz,
        output_color_formats: rgb(Bpc::Eight, Bpc::Eight),
        ..Dpy::new("CRT-0", Connector::new(ConnectorKind::Analog))
    }
}

pub fn status(kind: TimingType, seq: u8) -> Option<TimingStatus> {
    Some(TimingStatus {
        kind,
        seq,
        cea_format: if kind == TimingType::Edid861St { seq } else { 0 },
    })
}

/// CEA-861 1920x1080 @ 60 Hz.
pub fn timing_1080p60(kind: TimingType, seq: u8) -> EdidTiming {
    EdidTiming {
        h_visible: 1920,
        h_front_porch: 88,
        h_sync_width: 44,
        h_total: 2200,
        v_visible: 1080,
        v_front_porch: 4,
        v_sync_width: 5,
        v_total: 1125,
        pclk_10khz: 14_850,
        rr_x1k: 60_000,
        rgb444: ColorDepths::BPC_8,
        status: status(kind, seq),
        name: if kind == TimingType::Edid861St {
            "1920x1080p60 16:9".to_owned()
        } else {
            String::new()
        },
        ..EdidTiming::default()
    }
}

/// CEA-861 1280x720 @ 60 Hz.
pub fn timing_720p60(kind: TimingType, seq: u8) -> EdidTiming {
    EdidTiming {
        h_visible: 1280,
        h_front_porch: 110,
        h_sync_width: 40,
        h_total: 1650,
        v_visible: 720,
        v_front_porch: 5,
        v_sync_width: 5,
        v_total: 750,
        pclk_10khz: 7_425,
        rr_x1k: 60_000,
        rgb444: ColorDepths::BPC_8,
        status: status(kind, seq),
        ..EdidTiming::default()
    }
}

/// CEA-861 3840x2160 @ 120 Hz.
pub fn timing_4k120() -> EdidTiming {
    EdidTiming {
        h_visible: 3840,
        h_front_porch: 176,
        h_sync_width: 88,
        h_total: 4400,
        v_visible: 2160,
        v_front_porch: 8,
        v_sync_width: 10,
        v_total: 2250,
        pclk_10khz: 118_800,
        rr_x1k: 120_000,
        rgb444: ColorDepths::BPC_8 | ColorDepths::BPC_10,
        status: status(TimingType::Edid861St, 118),
        ..EdidTiming::default()
    }
}

pub fn wide_limits() -> EdidRangeLimits {
    EdidRangeLimits {
        min_h_rate_hz: 15_000,
        max_h_rate_hz: 300_000,
        min_v_rate_hzx1k: 23_000,
        max_v_rate_hzx1k: 122_000,
        max_pclk_10khz: 0,
    }
}

pub fn digital_edid(timings: Vec<EdidTiming>) -> ParsedEdid {
    ParsedEdid {
        valid: true,
        info: EdidInfo {
            version: EdidVersion::V1_4,
            is_digital: true,
            timings,
            ..EdidInfo::default()
        },
        limits: wide_limits(),
    }
}

/// HDMI sink with an LLC VSDB and deep color support.
pub fn hdmi_dpy(timings: Vec<EdidTiming>) -> Dpy {
    let mut edid = digital_edid(timings);
    edid.info.cea_extensions = vec![CeaExtension {
        revision: 3,
        vsdbs: vec![Vsdb {
            ieee_id: HDMI_LLC_IEEE_ID,
            dc_30bit: true,
            ..Vsdb::default()
        }],
    }];
    Dpy {
        parsed_edid: edid,
        max_pixel_clock_khz: 1_200_000,
        max_single_link_pixel_clock_khz: 600_000,
        hdmi_capable: true,
        output_color_formats: rgb(Bpc::Eight, Bpc::Eight),
        ..Dpy::new("HDMI-0", Connector::new(ConnectorKind::Tmds))
    }
}

/// HDMI 2.1 sink advertising FRL, with link caps already assessed.
pub fn frl_dpy(timings: Vec<EdidTiming>) -> Dpy {
    let mut dpy = hdmi_dpy(timings);
    dpy.parsed_edid.info.hdmi_forum.max_tmds_char_rate = 600;
    dpy.parsed_edid.info.hdmi_forum.max_frl_rate = 5;
    dpy.output_color_formats = rgb(Bpc::Eight, Bpc::Ten);
    dpy.hdmi = HdmiLinkCaps {
        src_caps: HdmiSrcCaps {
            link_max_frl_rate: FrlRate::FourLanes12G,
            dsc_supported: true,
        },
        sink_caps: HdmiSinkCaps {
            link_max_frl_rate: FrlRate::FourLanes10G,
            dsc_supported: true,
        },
    };
    dpy
}

/// Shared view of what a [`ScriptedHdmiLib`] was asked.
#[derive(Debug, Default)]
pub struct HdmiLibLog {
    pub queried_bpcs: RefCell<Vec<HdmiBpc>>,
    pub queried_controls: RefCell<Vec<FrlClientControl>>,
    pub set_attempts: RefCell<Vec<bool>>,
}

/// HDMI library double with scripted answers.
pub struct ScriptedHdmiLib {
    pub log: Rc<HdmiLibLog>,
    /// Bit depths whose query succeeds.
    pub accept: Vec<HdmiBpc>,
    /// Returned by successful queries.
    pub config: FrlConfig,
    /// Real link training attempts that fail before one succeeds; `None` fails all of them.
    pub set_failures: Option<u32>,
    pub fake_lt_succeeds: bool,
    set_calls: Cell<u32>,
}

impl ScriptedHdmiLib {
    pub fn new(accept: Vec<HdmiBpc>) -> (Self, Rc<HdmiLibLog>) {
        let log = Rc::new(HdmiLibLog::default());
        let lib = Self {
            log: Rc::clone(&log),
            accept,
            config: FrlConfig {
                frl_rate: FrlRate::FourLanes10G,
                dsc_info: FrlDscConfig::default(),
            },
            set_failures: Some(0),
            fake_lt_succeeds: true,
            set_calls: Cell::new(0),
        };
        (lib, log)
    }

    pub fn with_dsc(mut self) -> Self {
        self.config.dsc_info = FrlDscConfig {
            enable_dsc: true,
            slice_count: 4,
            bits_per_pixel_x16: 12 * 16,
            h_blank_tri_bytes: 240,
            ..FrlDscConfig::default()
        };
        self
    }
}

impl HdmiLib for ScriptedHdmiLib {
    fn assess_link_capabilities(&self, _edid: &EdidInfo) -> Result<HdmiLinkCaps, HdmiLibError> {
        Ok(HdmiLinkCaps {
            src_caps: HdmiSrcCaps {
                link_max_frl_rate: FrlRate::FourLanes12G,
                dsc_supported: true,
            },
            sink_caps: HdmiSinkCaps {
                link_max_frl_rate: FrlRate::FourLanes10G,
                dsc_supported: true,
            },
        })
    }

    fn query_frl_config(
        &self,
        video: &VideoTransportInfo<'_>,
        control: &FrlClientControl,
        _src_caps: &HdmiSrcCaps,
        _sink_caps: &HdmiSinkCaps,
    ) -> Result<FrlConfig, HdmiLibError> {
        self.log.queried_bpcs.borrow_mut().push(video.bpc);
        self.log.queried_controls.borrow_mut().push(*control);
        if self.accept.contains(&video.bpc) {
            Ok(self.config)
        } else {
            Err(HdmiLibError::InsufficientBandwidth)
        }
    }

    fn set_frl_config(
        &self,
        _active_rm_id: u32,
        fake_lt: bool,
        _config: &FrlConfig,
        _deadline: &Deadline,
    ) -> Result<(), HdmiLibError> {
        self.log.set_attempts.borrow_mut().push(fake_lt);
        if fake_lt {
            return if self.fake_lt_succeeds {
                Ok(())
            } else {
                Err(HdmiLibError::Timeout)
            };
        }
        let calls = self.set_calls.get();
        self.set_calls.set(calls + 1);
        match self.set_failures {
            Some(failures) if calls >= failures => Ok(()),
            _ => Err(HdmiLibError::LinkTrainingFailed),
        }
    }

    fn clear_frl_config(&self, _active_rm_id: u32) -> Result<(), HdmiLibError> {
        Ok(())
    }
}
