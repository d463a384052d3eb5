//! Raw timing checks against GPU, EDID and sync-range limits.

use nvkms_timing::{
    frequency_to_string, percentage, ranges_to_string, EdidVersion, MhzPoint1, MhzPoint2,
    ModeTimings, Yuv420Mode,
};

use crate::device::Device;
use crate::dpy::Dpy;
use crate::error::ModeRejection;
use crate::hdmi::dpy_supports_hdmi3d;
use crate::hw::HwModeTimings;
use crate::info_string::InfoString;
use crate::mode::{KmsMode, ModeSource, ValidateModeFlags};
use crate::params::{
    FrequencyRangeSource, FrequencyRanges, ModeValidationOverrides as Ov, ModeValidationParams,
    StereoMode, ValidSyncs,
};

/// 3D Vision emitters tolerate a pixel clock this far above the limit.
const STEREO_PCLK_TOLERANCE_HZ: u64 = 5_000_000;

/// Writes the rejection line and hands the reason back.
pub(crate) fn reject(info: &mut InfoString, reason: ModeRejection) -> ModeRejection {
    info.log(format_args!("Mode is rejected: {reason}."));
    reason
}

/// Header written before any check runs.
pub fn log_mode_validation_begin(info: &mut InfoString, timings: &ModeTimings) {
    info.log(format_args!(
        "{} x {} @ {} Hz{}",
        timings.h_visible,
        timings.v_visible,
        timings.rr_x1k / 1000,
        if timings.hdmi3d { " (HDMI 3D)" } else { "" }
    ));
    log_mode_timings(info, timings);
}

pub fn log_mode_timings(info: &mut InfoString, timings: &ModeTimings) {
    let mut pclk_khz = timings.pixel_clock_hz / 1000;
    if timings.hdmi3d {
        pclk_khz /= 2;
    }

    info.log(format_args!(
        "  Pixel Clock      : {} MHz{}",
        MhzPoint2(pclk_khz),
        if timings.hdmi3d { " (HDMI 3D)" } else { "" }
    ));
    info.log(format_args!(
        "  HRes, HSyncStart : {:4}, {:4}",
        timings.h_visible, timings.h_sync_start
    ));
    info.log(format_args!(
        "  HSyncEnd, HTotal : {:4}, {:4}",
        timings.h_sync_end, timings.h_total
    ));
    info.log(format_args!(
        "  VRes, VSyncStart : {:4}, {:4}",
        timings.v_visible, timings.v_sync_start
    ));
    info.log(format_args!(
        "  VSyncEnd, VTotal : {:4}, {:4}",
        timings.v_sync_end, timings.v_total
    ));
    info.log(format_args!(
        "  Sync Polarity    : {}{}{}{}",
        if timings.h_sync_pos { "+H " } else { "" },
        if timings.h_sync_neg { "-H " } else { "" },
        if timings.v_sync_pos { "+V " } else { "" },
        if timings.v_sync_neg { "-V " } else { "" },
    ));

    let extra = match (timings.interlaced, timings.double_scan) {
        (true, true) => Some("Interlace DoubleScan"),
        (true, false) => Some("Interlace"),
        (false, true) => Some("DoubleScan"),
        (false, false) => None,
    };
    if let Some(extra) = extra {
        info.log(format_args!("  Extra            : {extra}"));
    }
}

fn join_heads(heads: &[HwModeTimings], f: impl Fn(&HwModeTimings) -> String) -> String {
    heads.iter().map(f).collect::<Vec<_>>().join(", ")
}

/// Per-head viewport and scaler taps of a validated mode.
pub fn log_viewport(info: &mut InfoString, heads: &[HwModeTimings]) {
    debug_assert!(heads.len() <= crate::hw::MAX_HEADS_PER_DISP);

    info.log(format_args!(
        "DualHead Mode: {}",
        if heads.len() > 1 { "Yes" } else { "No" }
    ));
    info.log(format_args!(
        "Viewport                 {}",
        join_heads(heads, |t| {
            let out = &t.viewport.output;
            format!("{}x{}+{}+{}", out.width, out.height, out.x, out.y)
        })
    ));
    info.log(format_args!(
        "  Horizontal Taps        {}",
        join_heads(heads, |t| t.viewport.h_taps.count().to_string())
    ));
    info.log(format_args!(
        "  Vertical Taps          {}",
        join_heads(heads, |t| t.viewport.v_taps.count().to_string())
    ));
}

fn hdmi3d_note(hdmi3d: bool) -> &'static str {
    if hdmi3d {
        ", doubled for HDMI 3D"
    } else {
        ""
    }
}

fn in_any_range(value: u32, ranges: &FrequencyRanges) -> bool {
    ranges
        .ranges
        .iter()
        .any(|r| value > percentage(r.low, 99) && value < percentage(r.high, 101))
}

/// The display accepts timings outside its EDID list.
fn is_continuous_frequency(dpy: &Dpy) -> bool {
    let edid = &dpy.parsed_edid;
    if !edid.valid {
        return true;
    }
    let version = edid.info.version;
    if version == EdidVersion::V1_3 {
        edid.info.features.support_gtf
    } else if version >= EdidVersion::V1_4 {
        edid.info.features.continuous_frequency
    } else {
        true
    }
}

/// Checks `kms_mode` against everything that does not need hardware timings.
///
/// Checks run in a fixed order and stop at the first failure, which is logged to `info` as
/// `Mode is rejected: <reason>.` Limits an EDID-sourced mode exceeds only because its own EDID
/// says so are logged and waived unless `OBEY_EDID_CONTRADICTIONS` is set.
#[allow(clippy::too_many_arguments)]
pub fn validate_mode_timings(
    dev: &Device,
    dpy: &Dpy,
    kms_mode: &KmsMode,
    flags: &ValidateModeFlags,
    params: &ModeValidationParams,
    valid_syncs: &ValidSyncs,
    info: &mut InfoString,
) -> Result<(), ModeRejection> {
    let t = &kms_mode.timings;
    let stereo_3d_vision = params.stereo_mode.is_3d_vision();
    let needs_stereo_patch = stereo_3d_vision && dpy.stereo_3d_vision.requires_modetiming_patching;
    let from_edid = flags.source == ModeSource::Edid;
    let obey_contradictions = params.has(Ov::OBEY_EDID_CONTRADICTIONS);
    let mode_name = if kms_mode.name.is_empty() {
        t.name()
    } else {
        kms_mode.name.clone()
    };

    if t.interlaced && !dev.caps().supports_interlaced {
        return Err(reject(info, ModeRejection::InterlacedUnsupported));
    }

    if !from_edid && !params.has(Ov::ALLOW_NON_EDID_MODES) {
        if !is_continuous_frequency(dpy) {
            return Err(reject(
                info,
                ModeRejection::NonContinuousFrequency {
                    dpy: dpy.name.clone(),
                },
            ));
        }
        // Digital sinks only get EDID modes by default.
        if dpy.parsed_edid.valid && dpy.parsed_edid.info.is_digital {
            return Err(reject(
                info,
                ModeRejection::NonEdidMode {
                    dpy: dpy.name.clone(),
                },
            ));
        }
    }

    if !params.has(Ov::NO_TOTAL_SIZE_CHECK) {
        let geometry = if t.h_visible > t.h_sync_start {
            Some(ModeRejection::HVisibleExceedsHSyncStart {
                visible: t.h_visible,
                sync_start: t.h_sync_start,
            })
        } else if t.h_sync_start > t.h_sync_end {
            Some(ModeRejection::HSyncStartExceedsHSyncEnd {
                sync_start: t.h_sync_start,
                sync_end: t.h_sync_end,
            })
        } else if t.h_sync_end > t.h_total {
            Some(ModeRejection::HSyncEndExceedsHTotal {
                sync_end: t.h_sync_end,
                total: t.h_total,
            })
        } else if t.v_visible > t.v_sync_start {
            Some(ModeRejection::VVisibleExceedsVSyncStart {
                visible: t.v_visible,
                sync_start: t.v_sync_start,
            })
        } else if t.v_sync_start > t.v_sync_end {
            Some(ModeRejection::VSyncStartExceedsVSyncEnd {
                sync_start: t.v_sync_start,
                sync_end: t.v_sync_end,
            })
        } else if t.v_sync_end > t.v_total {
            Some(ModeRejection::VSyncEndExceedsVTotal {
                sync_end: t.v_sync_end,
                total: t.v_total,
            })
        } else {
            None
        };
        if let Some(reason) = geometry {
            return Err(reject(info, reason));
        }
    }

    // Any 4:2:0 mode carries half the pixels per clock.
    let real_pclk_hz = if t.yuv420_mode != Yuv420Mode::None {
        u64::from(t.pixel_clock_hz / 2)
    } else {
        u64::from(t.pixel_clock_hz)
    };
    let real_pclk_khz = u32::try_from(real_pclk_hz / 1000).unwrap_or(u32::MAX);
    let shown_pclk_khz = if t.hdmi3d {
        real_pclk_khz / 2
    } else {
        real_pclk_khz
    };

    if !params.has(Ov::NO_MAX_PCLK_CHECK) {
        let max_khz = dpy.max_pixel_clock_khz;
        let max_hz = u64::from(max_khz) * 1000;
        if real_pclk_hz > max_hz {
            if needs_stereo_patch && real_pclk_hz - max_hz < STEREO_PCLK_TOLERANCE_HZ {
                debug_assert!(!t.hdmi3d);
                info.log(format_args!(
                    "PixelClock ({} MHz) is slightly higher than Display Device maximum ({} MHz), but is within tolerance for 3D Vision Stereo.",
                    MhzPoint1(real_pclk_khz),
                    MhzPoint1(max_khz)
                ));
            } else {
                return Err(reject(
                    info,
                    ModeRejection::PixelClockTooHigh {
                        pclk_khz: shown_pclk_khz,
                        hdmi3d: t.hdmi3d,
                        max_khz,
                    },
                ));
            }
        }
    }

    let edid = &dpy.parsed_edid;
    if !params.has(Ov::NO_EDID_MAX_PCLK_CHECK)
        && edid.valid
        && edid.limits.max_pclk_10khz != 0
    {
        let max_khz = edid.limits.max_pclk_10khz.saturating_mul(10);
        let max_hz = u64::from(edid.limits.max_pclk_10khz) * 10_000;
        if real_pclk_hz > max_hz {
            if needs_stereo_patch && real_pclk_hz - max_hz < STEREO_PCLK_TOLERANCE_HZ {
                debug_assert!(!t.hdmi3d);
                info.log(format_args!(
                    "PixelClock ({} MHz) is slightly higher than EDID specified maximum ({} MHz), but is within tolerance for 3D Vision Stereo.",
                    MhzPoint1(real_pclk_khz),
                    MhzPoint1(max_khz)
                ));
            } else if from_edid && !obey_contradictions {
                info.log(format_args!(
                    "The EDID for {} contradicts itself: mode \"{mode_name}\" is specified in the EDID; however, the EDID's reported maximum PixelClock ({} MHz) would exclude this mode's PixelClock ({} MHz{}); ignoring EDID maximum PixelClock check for mode \"{mode_name}\".",
                    dpy.name,
                    MhzPoint1(max_khz),
                    MhzPoint1(shown_pclk_khz),
                    hdmi3d_note(t.hdmi3d)
                ));
            } else {
                return Err(reject(
                    info,
                    ModeRejection::EdidPixelClockTooHigh {
                        pclk_khz: shown_pclk_khz,
                        hdmi3d: t.hdmi3d,
                        max_khz,
                    },
                ));
            }
        }
    }

    if !params.has(Ov::NO_MAX_SIZE_CHECK) {
        let caps = dev.caps();
        // Software 4:2:0 scans out half the width; the log still shows the full width.
        let real_h_total = if t.yuv420_mode == Yuv420Mode::Sw {
            t.h_total / 2
        } else {
            t.h_total
        };
        if real_h_total > caps.max_raster_width || t.v_total > caps.max_raster_height {
            return Err(reject(
                info,
                ModeRejection::TotalSizeTooLarge {
                    h_total: t.h_total,
                    v_total: t.v_total,
                    h_visible: t.h_visible,
                    v_visible: t.v_visible,
                    max_width: caps.max_raster_width,
                    max_height: caps.max_raster_height,
                },
            ));
        }
    }

    let horiz = &valid_syncs.horiz_sync_hz;
    if !params.has(Ov::NO_HORIZ_SYNC_CHECK) && !horiz.ranges.is_empty() {
        let hsync = t.pixel_clock_hz.checked_div(u32::from(t.h_total)).unwrap_or(0);
        if !in_any_range(hsync, horiz) {
            let ranges = ranges_to_string(&horiz.ranges);
            let hsync = frequency_to_string(hsync);
            if from_edid && horiz.source == FrequencyRangeSource::Edid && !obey_contradictions {
                info.log(format_args!(
                    "The EDID for {} contradicts itself: mode \"{mode_name}\" is specified in the EDID; however, the EDID's valid HorizSync range ({ranges} kHz) would exclude this mode's HorizSync ({hsync} kHz); ignoring HorizSync check for mode \"{mode_name}\".",
                    dpy.name
                ));
            } else {
                return Err(reject(
                    info,
                    ModeRejection::HorizSyncOutOfRange { hsync, ranges },
                ));
            }
        }
    }

    let vert = &valid_syncs.vert_refresh_hz1k;
    if !params.has(Ov::NO_VERT_REFRESH_CHECK) && !vert.ranges.is_empty() {
        // Field rate for interlaced, frame rate for doublescan, doubled for HDMI 3D.
        let vrefresh = t.rr_x1k;
        if !in_any_range(vrefresh, vert) {
            let shown = if t.hdmi3d { vrefresh / 2 } else { vrefresh };
            let ranges = ranges_to_string(&vert.ranges);
            let vrefresh = frequency_to_string(shown);
            if from_edid && vert.source == FrequencyRangeSource::Edid && !obey_contradictions {
                info.log(format_args!(
                    "The EDID for {} contradicts itself: mode \"{mode_name}\" is specified in the EDID; however, the EDID's valid VertRefresh range ({ranges} Hz) would exclude this mode's VertRefresh ({vrefresh} Hz{}); ignoring VertRefresh check for mode \"{mode_name}\".",
                    dpy.name,
                    hdmi3d_note(t.hdmi3d)
                ));
            } else {
                return Err(reject(
                    info,
                    ModeRejection::VertRefreshOutOfRange {
                        vrefresh,
                        hdmi3d: t.hdmi3d,
                        ranges,
                    },
                ));
            }
        }
    }

    if !params.has(Ov::ALLOW_NON_3DVISION_MODES) && needs_stereo_patch && !flags.patched_stereo_timings
    {
        return Err(reject(info, ModeRejection::Not3DVisionCompatible));
    }

    if !params.has(Ov::ALLOW_NON_HDMI3D_MODES)
        && params.stereo_mode == StereoMode::Hdmi3D
        && dpy_supports_hdmi3d(dev, dpy)
        && !t.hdmi3d
    {
        return Err(reject(info, ModeRejection::NotHdmi3DCompatible));
    }

    if t.hdmi3d && t.interlaced {
        return Err(reject(info, ModeRejection::InterlacedHdmi3D));
    }

    if t.interlaced && dpy.connector.is_dp() && !params.has(Ov::ALLOW_DP_INTERLACED) {
        return Err(reject(info, ModeRejection::InterlacedOverDisplayPort));
    }

    if t.interlaced && params.has(Ov::NO_INTERLACED_MODES) {
        return Err(reject(info, ModeRejection::InterlacedNotAllowed));
    }

    if t.interlaced && params.stereo_mode != StereoMode::Disabled {
        return Err(reject(info, ModeRejection::InterlacedWithStereo));
    }

    Ok(())
}
