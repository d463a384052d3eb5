//! Display hardware abstraction.
//!
//! [`DispHal`] is everything the validator needs from a display engine generation: raster
//! synthesis, the 2Heads1OR decision, DisplayPort bandwidth, scaler taps and IMP. It is chosen
//! once when the [`Device`] is created.

use nvkms_timing::{EdidTiming, Yuv420Mode};

use crate::color::{Bpc, ColorFormat, DpyColor};
use crate::device::Device;
use crate::dpy::{ConnectorKind, Dpy};
use crate::frl::hdmi_effective_pixel_clock_khz;
use crate::hdmi::{dpy_is_hdmi, dpy_supports_frl};
use crate::hw::{
    DscInfo, HwModeTimings, Point, Protocol, ScalerTaps, ViewPort, ViewPortRect, ViewPortSize,
};
use crate::info_string::InfoString;
use crate::mode::KmsMode;
use crate::params::{ModeValidationOverrides, ModeValidationParams};
use crate::usage::UsageBounds;

pub trait DispHal {
    /// Builds the raster descriptor for `mode`. `None` viewports mean the full visible raster.
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
    ) -> Option<HwModeTimings>;

    /// Whether the raster must be split across two heads driving one output resource.
    fn use_2heads_1or(&self, dpy: &Dpy, timings: &HwModeTimings, params: &ModeValidationParams)
        -> bool;

    /// DisplayPort link bandwidth check. Connectors that are not DisplayPort always pass.
    fn validate_dp_mode(
        &self,
        dpy: &Dpy,
        timings: &HwModeTimings,
        color: &DpyColor,
        dual_head: bool,
        dsc: &mut DscInfo,
        params: &ModeValidationParams,
    ) -> bool;

    /// Assigns scaler taps for the viewport; false if no tap count can serve it.
    fn validate_viewport(&self, timings: &mut HwModeTimings, info: &mut InfoString) -> bool;

    /// Checks the raster against head and memory bandwidth limits.
    ///
    /// Fills one descriptor per hardware head in `out` and returns how many were used.
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
    ) -> Option<usize>;

    /// Stretches `timing` so a 3D Vision emitter can sync to it. Returns whether it changed.
    fn patch_3d_vision_timings(
        &self,
        dpy: &Dpy,
        timing: &mut EdidTiming,
        info: &mut InfoString,
    ) -> bool;
}

/// Limits of one hardware head.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HeadCaps {
    pub max_pixel_clock_khz: u32,
    /// Layer usage the head can offer at any supported raster.
    pub usage: UsageBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalerCaps {
    /// Largest input/output ratio, in 1/1000.
    pub max_h_downscale_x1k: u32,
    pub max_v_downscale_x1k: u32,
    pub max_h_taps: ScalerTaps,
    pub max_v_taps: ScalerTaps,
}

impl Default for ScalerCaps {
    fn default() -> Self {
        Self {
            max_h_downscale_x1k: 4000,
            max_v_downscale_x1k: 4000,
            max_h_taps: ScalerTaps::Taps5,
            max_v_taps: ScalerTaps::Taps5,
        }
    }
}

/// Extra vertical blanking inserted for 3D Vision, keeping the refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StereoPatch {
    pub extra_v_blank_lines: u16,
}

/// Table-driven display engine model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleDispHal {
    pub heads: Vec<HeadCaps>,
    pub scaler: ScalerCaps,
    pub stereo_patch: Option<StereoPatch>,
}

impl SimpleDispHal {
    pub fn new(heads: Vec<HeadCaps>) -> Self {
        Self {
            heads,
            ..Self::default()
        }
    }

    pub fn with_scaler(mut self, scaler: ScalerCaps) -> Self {
        self.scaler = scaler;
        self
    }

    pub fn with_stereo_patch(mut self, patch: StereoPatch) -> Self {
        self.stereo_patch = Some(patch);
        self
    }

    fn protocol(&self, dev: &Device, dpy: &Dpy, timings: &HwModeTimings, color: &DpyColor) -> Protocol {
        match dpy.connector.kind {
            ConnectorKind::DisplayPort => Protocol::DpA,
            ConnectorKind::Analog => Protocol::Crt,
            ConnectorKind::Tmds => {
                let single_link = dpy.max_single_link_pixel_clock_khz;
                if dpy_is_hdmi(dpy)
                    && dpy_supports_frl(dev, dpy)
                    && hdmi_effective_pixel_clock_khz(timings, color) > single_link
                {
                    Protocol::HdmiFrl
                } else if timings.pixel_clock_khz > single_link {
                    Protocol::DualTmds
                } else {
                    Protocol::SingleTmdsA
                }
            }
        }
    }
}

/// Bits on the wire per pixel for `color`.
fn bits_per_pixel(color: &DpyColor) -> u64 {
    let bpc = u64::from(color.bpc.bits());
    match color.format {
        ColorFormat::Rgb | ColorFormat::YCbCr444 => bpc * 3,
        ColorFormat::YCbCr422 => bpc * 2,
        ColorFormat::YCbCr420 => bpc * 3 / 2,
    }
}

fn pick_taps(input: u16, output: u16, max_downscale_x1k: u32, max_taps: ScalerTaps) -> Option<ScalerTaps> {
    if output == 0 || input == 0 {
        return None;
    }
    if input <= output {
        return Some(max_taps);
    }
    let factor = (u32::from(input) * 1000).div_ceil(u32::from(output));
    if factor > max_downscale_x1k {
        return None;
    }
    // Five-tap filtering only holds up to a 2:1 reduction.
    if factor > 2000 {
        Some(max_taps.min(ScalerTaps::Taps2))
    } else {
        Some(max_taps)
    }
}

impl DispHal for SimpleDispHal {
    fn construct_hw_mode_timings(
        &self,
        dev: &Device,
        dpy: &Dpy,
        mode: &KmsMode,
        viewport_in: Option<&ViewPortSize>,
        viewport_out: Option<&ViewPortRect>,
        color: &DpyColor,
        _params: &ModeValidationParams,
        info: &mut InfoString,
    ) -> Option<HwModeTimings> {
        let t = &mode.timings;
        if t.h_total == 0 || t.v_total == 0 || t.pixel_clock_hz == 0 {
            info.log(format_args!("Mode has an empty raster"));
            return None;
        }

        // Software 4:2:0 scans out two pixels per clock.
        let sw420 = t.yuv420_mode == Yuv420Mode::Sw;
        let h = |v: u16| if sw420 { v / 2 } else { v };

        let (h_visible, h_sync_start, h_sync_end, h_total) =
            (h(t.h_visible), h(t.h_sync_start), h(t.h_sync_end), h(t.h_total));
        let pixel_clock_khz = if sw420 {
            t.pixel_clock_hz / 2000
        } else {
            t.pixel_clock_hz / 1000
        };

        let raster_sync_end = Point {
            x: h_sync_end.saturating_sub(h_sync_start).saturating_sub(1),
            y: t.v_sync_end.saturating_sub(t.v_sync_start).saturating_sub(1),
        };
        let raster_blank_end = Point {
            x: raster_sync_end
                .x
                .saturating_add(h_total.saturating_sub(h_sync_end)),
            y: raster_sync_end
                .y
                .saturating_add(t.v_total.saturating_sub(t.v_sync_end)),
        };
        let raster_blank_start = Point {
            x: raster_blank_end.x.saturating_add(h_visible),
            y: raster_blank_end.y.saturating_add(t.v_visible),
        };

        let input = viewport_in.copied().unwrap_or(ViewPortSize {
            width: h_visible,
            height: t.v_visible,
        });
        let output = viewport_out.copied().unwrap_or(ViewPortRect {
            x: 0,
            y: 0,
            width: h_visible,
            height: t.v_visible,
        });
        if u32::from(output.x) + u32::from(output.width) > u32::from(h_visible)
            || u32::from(output.y) + u32::from(output.height) > u32::from(t.v_visible)
        {
            info.log(format_args!(
                "ViewPortOut ({}x{}+{}+{}) exceeds the visible raster ({}x{})",
                output.width, output.height, output.x, output.y, h_visible, t.v_visible
            ));
            return None;
        }

        let mut timings = HwModeTimings {
            raster_size: Point {
                x: h_total,
                y: t.v_total,
            },
            raster_sync_end,
            raster_blank_end,
            raster_blank_start,
            pixel_clock_khz,
            interlaced: t.interlaced,
            double_scan: t.double_scan,
            h_sync_positive: t.h_sync_pos,
            v_sync_positive: t.v_sync_pos,
            hdmi3d: t.hdmi3d,
            yuv420_mode: t.yuv420_mode,
            protocol: Protocol::default(),
            viewport: ViewPort {
                input,
                output,
                ..ViewPort::default()
            },
        };
        timings.protocol = self.protocol(dev, dpy, &timings, color);
        Some(timings)
    }

    fn use_2heads_1or(
        &self,
        _dpy: &Dpy,
        timings: &HwModeTimings,
        params: &ModeValidationParams,
    ) -> bool {
        if params.has(ModeValidationOverrides::MAX_ONE_HARDWARE_HEAD) || self.heads.len() < 2 {
            return false;
        }
        self.heads
            .first()
            .is_some_and(|head| timings.pixel_clock_khz > head.max_pixel_clock_khz)
    }

    fn validate_dp_mode(
        &self,
        dpy: &Dpy,
        timings: &HwModeTimings,
        color: &DpyColor,
        _dual_head: bool,
        dsc: &mut DscInfo,
        params: &ModeValidationParams,
    ) -> bool {
        *dsc = DscInfo::default();
        if !dpy.connector.is_dp() || params.has(ModeValidationOverrides::NO_DISPLAYPORT_BANDWIDTH_CHECK)
        {
            return true;
        }
        let Some(link) = dpy.connector.dp_link else {
            tracing::debug!(dpy = %dpy.name, "no DisplayPort link capabilities");
            return false;
        };
        if color.bpc == Bpc::Unknown {
            return false;
        }

        // 8b/10b channel coding.
        let capacity_kbps = u64::from(link.lane_count) * u64::from(link.lane_rate_mbps) * 1000 * 8 / 10;
        let payload_kbps = u64::from(timings.pixel_clock_khz) * bits_per_pixel(color);
        if payload_kbps > capacity_kbps {
            tracing::debug!(
                dpy = %dpy.name,
                payload_kbps,
                capacity_kbps,
                "DisplayPort link bandwidth exceeded"
            );
            return false;
        }
        true
    }

    fn validate_viewport(&self, timings: &mut HwModeTimings, info: &mut InfoString) -> bool {
        let viewport = &mut timings.viewport;
        let h_taps = pick_taps(
            viewport.input.width,
            viewport.output.width,
            self.scaler.max_h_downscale_x1k,
            self.scaler.max_h_taps,
        );
        let v_taps = pick_taps(
            viewport.input.height,
            viewport.output.height,
            self.scaler.max_v_downscale_x1k,
            self.scaler.max_v_taps,
        );
        match (h_taps, v_taps) {
            (Some(h_taps), Some(v_taps)) => {
                viewport.h_taps = h_taps;
                viewport.v_taps = v_taps;
                true
            }
            _ => {
                info.log(format_args!(
                    "ViewPortIn ({}x{}) cannot be scaled to ViewPortOut ({}x{})",
                    viewport.input.width,
                    viewport.input.height,
                    viewport.output.width,
                    viewport.output.height
                ));
                false
            }
        }
    }

    fn imp_check(
        &self,
        _dpy: &Dpy,
        timings: &HwModeTimings,
        _dsc_enabled: bool,
        dual_head: bool,
        _color: &DpyColor,
        params: &ModeValidationParams,
        out: &mut [HwModeTimings],
        info: &mut InfoString,
    ) -> Option<usize> {
        let num_heads = if dual_head { 2 } else { 1 };
        if num_heads > self.heads.len() || num_heads > out.len() {
            info.log(format_args!(
                "Mode requires {num_heads} hardware heads; {} available",
                self.heads.len().min(out.len())
            ));
            return None;
        }

        let per_head_khz = timings.pixel_clock_khz / num_heads as u32;
        let tile_width = timings.viewport.output.width / num_heads as u16;

        for (index, (head, slot)) in self.heads.iter().zip(out.iter_mut()).take(num_heads).enumerate() {
            if !params.has(ModeValidationOverrides::NO_EXTENDED_GPU_CAPABILITIES_CHECK)
                && per_head_khz > head.max_pixel_clock_khz
            {
                info.log(format_args!(
                    "Head {index} cannot drive a {} MHz pixel clock (max {} MHz)",
                    nvkms_timing::MhzPoint1(per_head_khz),
                    nvkms_timing::MhzPoint1(head.max_pixel_clock_khz)
                ));
                return None;
            }

            *slot = *timings;
            slot.pixel_clock_khz = per_head_khz;
            if dual_head {
                slot.viewport.output.width = tile_width;
                slot.viewport.output.x = timings
                    .viewport
                    .output
                    .x
                    .saturating_add(tile_width.saturating_mul(index as u16));
            }
            slot.viewport.possible_usage = head.usage;
        }

        Some(num_heads)
    }

    fn patch_3d_vision_timings(
        &self,
        dpy: &Dpy,
        timing: &mut EdidTiming,
        info: &mut InfoString,
    ) -> bool {
        let Some(patch) = self.stereo_patch else {
            return false;
        };
        if !dpy.stereo_3d_vision.supported || timing.v_total == 0 {
            return false;
        }

        let old_total = timing.v_total;
        let new_total = old_total.saturating_add(patch.extra_v_blank_lines);
        let pclk = u64::from(timing.pclk_10khz) * u64::from(new_total) / u64::from(old_total);
        timing.pclk_10khz = u32::try_from(pclk).unwrap_or(u32::MAX);
        timing.v_total = new_total;

        info.log(format_args!(
            "Patched {} for 3D Vision Stereo: VTotal {old_total} -> {new_total}",
            nvkms_timing::build_mode_name(timing.h_visible, timing.v_visible)
        ));
        true
    }
}
