//! HDMI 2.1 Fixed Rate Link negotiation and programming.
//!
//! Bandwidth math and link training belong to the HDMI library behind [`HdmiLib`]. This module
//! decides what to ask it for: which bit depth, whether DSC must be forced, and how its answer
//! maps onto the DSC descriptor programmed into the head.

use std::time::{Duration, Instant};

use nvkms_timing::{EdidInfo, EdidTiming, ModeTimings, Yuv420Mode};

use crate::color::{frl_color_candidates, Bpc, ColorFormat, DpyColor};
use crate::device::Device;
use crate::dpy::Dpy;
use crate::error::HdmiLibError;
use crate::hdmi::dpy_is_hdmi;
use crate::hw::{DscEvoMode, DscInfo, DscInfoKind, HdmiDscInfo, HwModeTimings, Protocol};
use crate::metadata::find_edid_timing;
use crate::params::{DscMode, ModeValidationParams};

/// Link training attempts after the first, before falling back to fake link training.
pub const FRL_MAX_RETRIES: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FrlRate {
    #[default]
    None,
    ThreeLanes3G,
    ThreeLanes6G,
    FourLanes6G,
    FourLanes8G,
    FourLanes10G,
    FourLanes12G,
    Unspecified,
}

impl FrlRate {
    /// Per-lane bit rate.
    pub fn link_rate_bps(self) -> u64 {
        const GIGA: u64 = 1_000_000_000;
        match self {
            FrlRate::None => 0,
            FrlRate::ThreeLanes3G => 3 * GIGA,
            FrlRate::ThreeLanes6G | FrlRate::FourLanes6G => 6 * GIGA,
            FrlRate::FourLanes8G => 8 * GIGA,
            FrlRate::FourLanes10G => 10 * GIGA,
            FrlRate::FourLanes12G => 12 * GIGA,
            FrlRate::Unspecified => {
                debug_assert!(false, "unspecified FRL data rate");
                0
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HdmiSrcCaps {
    pub link_max_frl_rate: FrlRate,
    pub dsc_supported: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HdmiSinkCaps {
    pub link_max_frl_rate: FrlRate,
    pub dsc_supported: bool,
}

/// Source and sink link capabilities recorded when the link was assessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HdmiLinkCaps {
    pub src_caps: HdmiSrcCaps,
    pub sink_caps: HdmiSinkCaps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HdmiBpc {
    Bpc8,
    Bpc10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelPacking {
    Rgb,
    YCbCr420,
}

/// What the link has to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTransportInfo<'a> {
    /// Only pixel clock, `h_total`, `h_visible`, `v_visible` and the CEA format are consulted.
    pub timing: &'a EdidTiming,
    pub bpc: HdmiBpc,
    pub packing: PixelPacking,
    pub dual_head: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FrlQueryOption {
    #[default]
    HighestPixelQuality,
    HighestFrlRate,
    LowestFrlRate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FrlClientControl {
    pub option: FrlQueryOption,
    pub enable_dsc: bool,
    pub force_bpp_x16: bool,
    pub bits_per_pixel_x16: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FrlDscConfig {
    pub enable_dsc: bool,
    pub slice_count: u32,
    pub bits_per_pixel_x16: u32,
    pub pps: [u32; 32],
    pub h_active_bytes: u32,
    pub h_active_tri_bytes: u32,
    pub h_blank_tri_bytes: u32,
    pub t_blank_to_t_total_ratio_x1k: u32,
}

/// Negotiated link configuration for one head.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FrlConfig {
    pub frl_rate: FrlRate,
    pub dsc_info: FrlDscConfig,
}

/// Time budget for one link training attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    start: Instant,
    timeout: Duration,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            start: Instant::now(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.start.elapsed())
    }

    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.timeout
    }
}

/// The HDMI link library: FRL bandwidth tables and link training.
pub trait HdmiLib {
    /// Trains the link far enough to learn the source and sink FRL limits.
    fn assess_link_capabilities(&self, edid: &EdidInfo) -> Result<HdmiLinkCaps, HdmiLibError>;

    /// Finds a link configuration able to carry `video`.
    fn query_frl_config(
        &self,
        video: &VideoTransportInfo<'_>,
        control: &FrlClientControl,
        src_caps: &HdmiSrcCaps,
        sink_caps: &HdmiSinkCaps,
    ) -> Result<FrlConfig, HdmiLibError>;

    /// Trains the link for `config`. `fake_lt` enables the output resource without a
    /// successful training handshake.
    fn set_frl_config(
        &self,
        active_rm_id: u32,
        fake_lt: bool,
        config: &FrlConfig,
        deadline: &Deadline,
    ) -> Result<(), HdmiLibError>;

    fn clear_frl_config(&self, active_rm_id: u32) -> Result<(), HdmiLibError>;
}

/// HDMI library for GPUs without FRL: every link query fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHdmiLib;

impl HdmiLib for NullHdmiLib {
    fn assess_link_capabilities(&self, _edid: &EdidInfo) -> Result<HdmiLinkCaps, HdmiLibError> {
        Ok(HdmiLinkCaps::default())
    }

    fn query_frl_config(
        &self,
        _video: &VideoTransportInfo<'_>,
        _control: &FrlClientControl,
        _src_caps: &HdmiSrcCaps,
        _sink_caps: &HdmiSinkCaps,
    ) -> Result<FrlConfig, HdmiLibError> {
        Err(HdmiLibError::InsufficientBandwidth)
    }

    fn set_frl_config(
        &self,
        _active_rm_id: u32,
        _fake_lt: bool,
        _config: &FrlConfig,
        _deadline: &Deadline,
    ) -> Result<(), HdmiLibError> {
        Err(HdmiLibError::LinkTrainingFailed)
    }

    fn clear_frl_config(&self, _active_rm_id: u32) -> Result<(), HdmiLibError> {
        Ok(())
    }
}

/// Assesses the FRL link of an HDMI dpy and records the result on it.
///
/// Returns whether the sink can run any FRL rate.
pub fn hdmi_frl_assess_link(dev: &Device, dpy: &mut Dpy) -> bool {
    debug_assert!(dpy_is_hdmi(dpy));
    debug_assert!(dpy.parsed_edid.valid);

    match dev
        .hdmi_lib()
        .assess_link_capabilities(&dpy.parsed_edid.info)
    {
        Ok(caps) => {
            dpy.hdmi = caps;
            caps.sink_caps.link_max_frl_rate != FrlRate::None
        }
        Err(err) => {
            tracing::warn!(dpy = %dpy.name, error = %err, "HDMI FRL link assessment failed");
            false
        }
    }
}

/// Result of programming a head's FRL configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrlLinkTraining {
    /// The head runs TMDS; nothing to train.
    NotNeeded,
    Trained { retries: u32 },
    /// Every real attempt failed; the output is enabled with fake link training.
    FakeTrained,
    Failed(HdmiLibError),
}

/// Trains the link for a committed FRL configuration.
///
/// Training happens after the modeset is committed, so exhausting the retries falls back to
/// one fake-link-training attempt to keep the output resource from hanging.
pub fn hdmi_frl_set_config(dev: &Device, active_rm_id: u32, config: &FrlConfig) -> FrlLinkTraining {
    if config.frl_rate == FrlRate::None {
        return FrlLinkTraining::NotNeeded;
    }
    debug_assert!(active_rm_id != 0);

    let timeout = Duration::from_millis(dev.config().frl_link_training_timeout_ms);
    let lib = dev.hdmi_lib();

    let mut retries = 0;
    let mut result = lib.set_frl_config(active_rm_id, false, config, &Deadline::after(timeout));
    while result.is_err() && retries < FRL_MAX_RETRIES {
        retries += 1;
        result = lib.set_frl_config(active_rm_id, false, config, &Deadline::after(timeout));
    }

    if retries != 0 {
        tracing::debug!(retries, "HDMI FRL link training retried");
    }

    if result.is_ok() {
        return FrlLinkTraining::Trained { retries };
    }

    tracing::warn!("HDMI FRL link training failed.");
    match lib.set_frl_config(active_rm_id, true, config, &Deadline::after(timeout)) {
        Ok(()) => FrlLinkTraining::FakeTrained,
        Err(err) => {
            tracing::error!(error = %err, "HDMI FRL fallback link training failed.");
            FrlLinkTraining::Failed(err)
        }
    }
}

pub fn hdmi_frl_clear_config(dev: &Device, active_rm_id: u32) {
    if let Err(err) = dev.hdmi_lib().clear_frl_config(active_rm_id) {
        tracing::warn!(active_rm_id, error = %err, "clearing HDMI FRL configuration failed");
    }
}

/// Pixel rate the link must carry after YUV 4:2:0 and deep color adjustments.
pub fn hdmi_effective_pixel_clock_khz(timings: &HwModeTimings, color: &DpyColor) -> u32 {
    let pixel_clock = if timings.yuv420_mode == Yuv420Mode::Hw {
        timings.pixel_clock_khz / 2
    } else {
        timings.pixel_clock_khz
    };

    debug_assert!(
        timings.yuv420_mode == Yuv420Mode::None
            || color.format == ColorFormat::YCbCr420
    );

    if color.format == ColorFormat::YCbCr422 {
        return pixel_clock;
    }

    let scaled = u64::from(pixel_clock) * u64::from(color.bpc.bits()) / 8;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Minimal EDID-style timing for the bandwidth query when the mode is not in the EDID.
fn synthesize_edid_timing(hw: &HwModeTimings) -> EdidTiming {
    EdidTiming {
        // kHz to 10 kHz, rounded up so the minimum FRL rate is never underestimated.
        pclk_10khz: hw.pixel_clock_khz.div_ceil(10),
        h_visible: hw.h_visible(),
        h_total: hw.raster_size.x,
        v_visible: hw.v_visible(),
        status: None,
        ..EdidTiming::default()
    }
}

/// Queries the link library at one fixed bit depth.
///
/// Heads not using the FRL protocol get an empty configuration and DSC disabled.
#[allow(clippy::too_many_arguments)]
pub fn hdmi_frl_query_config_one_bpc(
    dev: &Device,
    dpy: &Dpy,
    mode_timings: &ModeTimings,
    hw: &HwModeTimings,
    color: &DpyColor,
    b2h1or: bool,
    params: &ModeValidationParams,
    config: &mut FrlConfig,
    dsc: &mut DscInfo,
) -> bool {
    if hw.protocol != Protocol::HdmiFrl {
        *dsc = DscInfo::default();
        *config = FrlConfig::default();
        return true;
    }
    debug_assert!(dpy_is_hdmi(dpy));

    let synthesized;
    let timing = match find_edid_timing(dev, dpy, mode_timings, params) {
        Some(timing) => timing,
        None => {
            synthesized = synthesize_edid_timing(hw);
            &synthesized
        }
    };

    let bpc = match color.bpc {
        Bpc::Ten => HdmiBpc::Bpc10,
        Bpc::Eight => HdmiBpc::Bpc8,
        _ => return false,
    };

    // FRL and native 4:2:0 arrived in the same display generation.
    let packing = match mode_timings.yuv420_mode {
        Yuv420Mode::None => PixelPacking::Rgb,
        Yuv420Mode::Sw => return false,
        Yuv420Mode::Hw => PixelPacking::YCbCr420,
    };

    let video = VideoTransportInfo {
        timing,
        bpc,
        packing,
        dual_head: b2h1or,
    };

    let mut control = FrlClientControl {
        option: FrlQueryOption::HighestPixelQuality,
        enable_dsc: params.dsc_mode == DscMode::ForceEnable,
        ..FrlClientControl::default()
    };

    // 2Heads1OR needs either native 4:2:0 or DSC.
    if b2h1or && hw.yuv420_mode != Yuv420Mode::Hw {
        if params.dsc_mode == DscMode::ForceDisable {
            return false;
        }
        control.enable_dsc = true;
    }

    if params.dsc_override_bits_per_pixel_x16 != 0 {
        control.force_bpp_x16 = true;
        control.bits_per_pixel_x16 = params.dsc_override_bits_per_pixel_x16;
    }

    *config = match dev.hdmi_lib().query_frl_config(
        &video,
        &control,
        &dpy.hdmi.src_caps,
        &dpy.hdmi.sink_caps,
    ) {
        Ok(config) => config,
        Err(err) => {
            tracing::debug!(dpy = %dpy.name, ?bpc, error = %err, "FRL query failed");
            return false;
        }
    };

    if b2h1or {
        debug_assert!(config.dsc_info.enable_dsc || hw.yuv420_mode == Yuv420Mode::Hw);
    }

    let link_rate = config.frl_rate.link_rate_bps();
    debug_assert!(link_rate != 0 || config.frl_rate == FrlRate::None);

    *dsc = DscInfo::default();
    if config.frl_rate != FrlRate::None && config.dsc_info.enable_dsc && link_rate != 0 {
        if params.dsc_mode == DscMode::ForceDisable {
            return false;
        }

        let dsc_config = &config.dsc_info;
        dsc.kind = DscInfoKind::Hdmi;
        dsc.slice_count = dsc_config.slice_count;
        // Only the slice count used for the PPS is known.
        dsc.possible_slice_count_mask = dsc_config
            .slice_count
            .checked_sub(1)
            .and_then(|shift| 1u32.checked_shl(shift))
            .unwrap_or(0);
        let hblank_min = (u64::from(hw.pixel_clock_khz) * 1000
            * u64::from(dsc_config.h_blank_tri_bytes))
        .div_ceil(link_rate / 6);
        dsc.hdmi = HdmiDscInfo {
            dsc_mode: if b2h1or {
                DscEvoMode::Dual
            } else {
                DscEvoMode::Single
            },
            bits_per_pixel_x16: dsc_config.bits_per_pixel_x16,
            pps: dsc_config.pps,
            h_active_bytes: dsc_config.h_active_bytes,
            h_active_tri_bytes: dsc_config.h_active_tri_bytes,
            h_blank_tri_bytes: dsc_config.h_blank_tri_bytes,
            t_blank_to_t_total_ratio_x1k: dsc_config.t_blank_to_t_total_ratio_x1k,
            hblank_min: u32::try_from(hblank_min).unwrap_or(u32::MAX),
        };
    } else {
        dsc.kind = DscInfoKind::Disabled;
    }

    true
}

/// Searches bit depths from `color` downward until the link library accepts one.
///
/// On success `color` holds the accepted depth.
#[allow(clippy::too_many_arguments)]
pub fn hdmi_frl_query_config(
    dev: &Device,
    dpy: &Dpy,
    mode_timings: &ModeTimings,
    hw: &HwModeTimings,
    color: &mut DpyColor,
    b2h1or: bool,
    params: &ModeValidationParams,
    config: &mut FrlConfig,
    dsc: &mut DscInfo,
) -> bool {
    for candidate in frl_color_candidates(&dpy.output_color_formats, *color) {
        if hdmi_frl_query_config_one_bpc(
            dev,
            dpy,
            mode_timings,
            hw,
            &candidate,
            b2h1or,
            params,
            config,
            dsc,
        ) {
            *color = candidate;
            return true;
        }
    }
    false
}
