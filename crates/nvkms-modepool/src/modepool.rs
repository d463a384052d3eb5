//! Mode pool entry points: full validation of one mode, index-based enumeration of the EDID
//! and VESA catalogs, and modeset-time revalidation.

use nvkms_timing::{TimingType, Yuv420Mode, VESA_MODES};

use crate::color::{default_dpy_color, DpyColor};
use crate::decisions::{get_hdmi3d_value, get_yuv420_value};
use crate::device::Device;
use crate::dpy::Dpy;
use crate::error::ModeRejection;
use crate::frl::hdmi_frl_query_config;
use crate::hdmi::{dpy_is_hdmi, VideoInfoFrameCtrl};
use crate::hw::{HwModeTimings, ViewPortRect, ViewPortSize};
use crate::info_string::InfoString;
use crate::metadata::construct_mode_timings_metadata;
use crate::mode::{KmsMode, ModeSource, ValidateModeFlags};
use crate::params::{ModeValidationParams, ValidSyncs};
use crate::prealloc::ValidateModeScratch;
use crate::sync::resolve_valid_syncs;
use crate::usage::UsageBounds;
use crate::validate::{log_mode_validation_begin, log_viewport, reject, validate_mode_timings};

/// Result of [`validate_mode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeValidation {
    /// The sync windows the mode was checked against.
    pub valid_syncs: ValidSyncs,
    /// Usage the mode leaves available across every head it occupies.
    pub outcome: Result<UsageBounds, ModeRejection>,
}

impl ModeValidation {
    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Validates one mode end to end: timing checks, color defaulting, hardware timing synthesis,
/// link bandwidth, viewport taps and IMP.
///
/// Diagnostics go to `info`; a rejection is logged there as well as returned.
pub fn validate_mode(
    dev: &Device,
    dpy: &Dpy,
    kms_mode: &KmsMode,
    flags: &ValidateModeFlags,
    params: &ModeValidationParams,
    info: &mut InfoString,
) -> ModeValidation {
    let valid_syncs = resolve_valid_syncs(dpy, &params.valid_syncs);
    let outcome = run_validate_mode(dev, dpy, kms_mode, flags, params, &valid_syncs, info);
    if let Err(reason) = &outcome {
        tracing::debug!(dpy = %dpy.name, mode = %kms_mode.name, %reason, "mode rejected");
    }
    ModeValidation {
        valid_syncs,
        outcome,
    }
}

fn run_validate_mode(
    dev: &Device,
    dpy: &Dpy,
    kms_mode: &KmsMode,
    flags: &ValidateModeFlags,
    params: &ModeValidationParams,
    valid_syncs: &ValidSyncs,
    info: &mut InfoString,
) -> Result<UsageBounds, ModeRejection> {
    let hal = dev.hal();
    let ValidateModeScratch {
        mut hw_timings,
        mut frl_config,
        mut dsc_info,
        mut imp_out,
    } = dev
        .prealloc()
        .validate_mode_scratch()
        .map_err(|err| reject(info, err.into()))?;

    log_mode_validation_begin(info, &kms_mode.timings);

    validate_mode_timings(dev, dpy, kms_mode, flags, params, valid_syncs, info)?;

    let mut color = if kms_mode.timings.yuv420_mode != Yuv420Mode::None {
        DpyColor::YUV420
    } else {
        default_dpy_color(&dpy.output_color_formats)
            .ok_or_else(|| reject(info, ModeRejection::NoDefaultColor))?
    };
    tracing::trace!(?color, "default color");

    *hw_timings = hal
        .construct_hw_mode_timings(dev, dpy, kms_mode, None, None, &color, params, info)
        .ok_or_else(|| reject(info, ModeRejection::HwTimingsConstruction))?;

    let b2h1or = hal.use_2heads_1or(dpy, &hw_timings, params);

    if dpy_is_hdmi(dpy) {
        if !hdmi_frl_query_config(
            dev,
            dpy,
            &kms_mode.timings,
            &hw_timings,
            &mut color,
            b2h1or,
            params,
            &mut frl_config,
            &mut dsc_info,
        ) {
            return Err(reject(info, ModeRejection::HdmiFrlConfig));
        }
        tracing::trace!(frl_rate = ?frl_config.frl_rate, bpc = ?color.bpc, "FRL configuration");
    } else if !hal.validate_dp_mode(dpy, &hw_timings, &color, b2h1or, &mut dsc_info, params) {
        return Err(reject(info, ModeRejection::DpBandwidth));
    }

    if !hal.validate_viewport(&mut hw_timings, info) {
        return Err(reject(info, ModeRejection::ViewPort));
    }

    let num_heads = hal
        .imp_check(
            dpy,
            &hw_timings,
            dsc_info.is_enabled(),
            b2h1or,
            &color,
            params,
            &mut imp_out[..],
            info,
        )
        .filter(|&n| n > 0 && n <= imp_out.len())
        .ok_or_else(|| reject(info, ModeRejection::ImpCheck))?;

    let heads: &[HwModeTimings] = &imp_out[..num_heads];
    log_viewport(info, heads);

    let usage = heads
        .iter()
        .skip(1)
        .fold(heads[0].viewport.possible_usage, |acc, head| {
            acc.intersect(&head.viewport.possible_usage)
        });
    Ok(usage)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateModeIndexRequest {
    pub params: ModeValidationParams,
    /// Position in the EDID timings followed by the VESA table.
    pub mode_index: u32,
    /// Client buffer size for diagnostics, terminator included.
    pub info_string_size: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateModeIndexReply {
    /// `mode_index` is past the last mode; nothing else is filled.
    pub end: bool,
    pub valid: bool,
    /// Valid, and would also validate as frame-packed HDMI 3D.
    pub hdmi3d_available: bool,
    /// The EDID marks this first detailed timing as the native mode.
    pub preferred_mode: bool,
    pub mode: KmsMode,
    pub source: ModeSource,
    /// CEA-861 format name, when the EDID entry has one.
    pub description: String,
    pub valid_syncs: ValidSyncs,
    pub mode_usage: UsageBounds,
    pub rejection: Option<ModeRejection>,
    pub info_string: String,
    pub info_string_len_written: usize,
}

impl ValidateModeIndexReply {
    fn record(&mut self, result: ModeValidation) {
        self.valid = result.is_valid();
        self.valid_syncs = result.valid_syncs;
        match result.outcome {
            Ok(usage) => self.mode_usage = usage,
            Err(reason) => self.rejection = Some(reason),
        }
    }
}

/// Validates the `requested`-th usable EDID timing, advancing `current` past every usable
/// timing when the index lies beyond them.
fn validate_mode_index_edid(
    dev: &Device,
    dpy: &Dpy,
    params: &ModeValidationParams,
    reply: &mut ValidateModeIndexReply,
    info: &mut InfoString,
    requested: u32,
    current: &mut u32,
) -> bool {
    if !dpy.parsed_edid.valid {
        return false;
    }

    let mut usable = dpy
        .parsed_edid
        .info
        .timings
        .iter()
        .filter_map(|timing| timing.status.map(|status| (timing, status)));

    let Some(offset) = requested.checked_sub(*current) else {
        return false;
    };
    let Some((edid_timing, status)) = usable.nth(offset as usize) else {
        let count = dpy
            .parsed_edid
            .info
            .timings
            .iter()
            .filter(|t| t.status.is_some())
            .count();
        *current = current.saturating_add(count as u32);
        return false;
    };
    *current = requested;

    let mut flags = ValidateModeFlags {
        source: ModeSource::Edid,
        ..ValidateModeFlags::default()
    };

    let mut timing = edid_timing.clone();
    if params.stereo_mode.is_3d_vision()
        && dpy.stereo_3d_vision.requires_modetiming_patching
        && dev.hal().patch_3d_vision_timings(dpy, &mut timing, info)
    {
        flags.patched_stereo_timings = true;
    }

    let description = (status.kind == TimingType::Edid861St
        && status.cea_format > 0
        && !timing.name.is_empty())
    .then(|| timing.name.clone());

    let mut kms_mode = KmsMode::new(timing.to_mode_timings());
    let hdmi3d = get_hdmi3d_value(dev, dpy, params, &timing);
    reply.hdmi3d_available = hdmi3d.available;
    kms_mode.timings = kms_mode.timings.with_hdmi3d(hdmi3d.hdmi3d);
    kms_mode.timings.yuv420_mode = get_yuv420_value(dev, dpy, params, &timing);

    reply.record(validate_mode(dev, dpy, &kms_mode, &flags, params, info));

    // Report whether the mode would also work frame packed, without touching the result.
    if reply.valid && reply.hdmi3d_available {
        let stereo = KmsMode {
            timings: kms_mode.timings.with_hdmi3d(true),
            name: kms_mode.name.clone(),
        };
        reply.hdmi3d_available = validate_mode(dev, dpy, &stereo, &flags, params, info).is_valid();
    }

    if status.kind == TimingType::EdidDtd
        && dpy.parsed_edid.info.features.preferred_timing_is_native
        && status.seq == 1
    {
        reply.preferred_mode = true;
    }

    // Hand back the unpatched EDID timing; modeset repeats the patching.
    if flags.patched_stereo_timings {
        let yuv420_mode = kms_mode.timings.yuv420_mode;
        let hdmi3d = kms_mode.timings.hdmi3d;
        kms_mode.timings = edid_timing.to_mode_timings();
        kms_mode.timings.yuv420_mode = yuv420_mode;
        kms_mode.timings = kms_mode.timings.with_hdmi3d(hdmi3d);
    }

    reply.mode = KmsMode::new(kms_mode.timings);
    reply.source = ModeSource::Edid;
    reply.description = description.unwrap_or_default();
    true
}

fn validate_mode_index_vesa(
    dev: &Device,
    dpy: &Dpy,
    params: &ModeValidationParams,
    reply: &mut ValidateModeIndexReply,
    info: &mut InfoString,
    requested: u32,
    current: &mut u32,
) -> bool {
    let Some(offset) = requested.checked_sub(*current) else {
        return false;
    };
    let Some(timings) = VESA_MODES.get(offset as usize) else {
        *current = current.saturating_add(VESA_MODES.len() as u32);
        return false;
    };
    *current = requested;

    let kms_mode = KmsMode::new(*timings);
    let flags = ValidateModeFlags {
        source: ModeSource::Vesa,
        ..ValidateModeFlags::default()
    };
    reply.record(validate_mode(dev, dpy, &kms_mode, &flags, params, info));
    reply.mode = kms_mode;
    reply.source = ModeSource::Vesa;
    true
}

/// Validates the mode at `request.mode_index`, counting usable EDID timings first and then the
/// VESA table. Past the last mode the reply has `end` set.
pub fn validate_mode_index(
    dev: &Device,
    dpy: &Dpy,
    request: &ValidateModeIndexRequest,
) -> ValidateModeIndexReply {
    let mut reply = ValidateModeIndexReply::default();
    let mut info = InfoString::new(request.info_string_size);
    let mut current = 0;
    let params = &request.params;
    let requested = request.mode_index;

    let found = validate_mode_index_edid(
        dev,
        dpy,
        params,
        &mut reply,
        &mut info,
        requested,
        &mut current,
    ) || validate_mode_index_vesa(
        dev,
        dpy,
        params,
        &mut reply,
        &mut info,
        requested,
        &mut current,
    );

    if !found {
        reply.end = true;
        return reply;
    }

    if request.info_string_size > 0 {
        reply.info_string_len_written = info.len_written();
    }
    reply.info_string = info.into_string();
    reply
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateModeRequest {
    pub params: ModeValidationParams,
    /// Only the timings are used; the name is rebuilt.
    pub mode: KmsMode,
    pub info_string_size: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateModeReply {
    pub valid: bool,
    pub valid_syncs: ValidSyncs,
    pub mode_usage: UsageBounds,
    pub rejection: Option<ModeRejection>,
    pub info_string: String,
    pub info_string_len_written: usize,
}

/// Validates a client-supplied mode after classifying it against the EDID and VESA catalogs.
pub fn validate_kms_mode(dev: &Device, dpy: &Dpy, request: &ValidateModeRequest) -> ValidateModeReply {
    let mut reply = ValidateModeReply::default();
    let client = KmsMode {
        timings: request.mode.timings,
        name: String::new(),
    };

    let metadata = match construct_mode_timings_metadata(dev, dpy, &request.params, &client) {
        Ok(metadata) => metadata,
        Err(reason) => {
            reply.rejection = Some(reason);
            return reply;
        }
    };

    let mut info = InfoString::new(request.info_string_size);
    let result = validate_mode(
        dev,
        dpy,
        &metadata.kms_mode,
        &metadata.flags,
        &request.params,
        &mut info,
    );
    reply.valid = result.is_valid();
    reply.valid_syncs = result.valid_syncs;
    match result.outcome {
        Ok(usage) => reply.mode_usage = usage,
        Err(reason) => reply.rejection = Some(reason),
    }

    if !info.is_empty() {
        reply.info_string_len_written = info.len_written();
    }
    reply.info_string = info.into_string();
    reply
}

/// Hardware state for a mode about to be programmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModesetTimings {
    pub hw_timings: HwModeTimings,
    pub info_frame_ctrl: VideoInfoFrameCtrl,
}

/// Revalidates `kms_mode` at modeset time and builds its hardware timings for the requested
/// viewports and color.
///
/// The timing checks run again on the client's unpatched mode with diagnostics discarded.
#[allow(clippy::too_many_arguments)]
pub fn validate_mode_for_modeset(
    dev: &Device,
    dpy: &Dpy,
    params: &ModeValidationParams,
    kms_mode: &KmsMode,
    viewport_in: Option<&ViewPortSize>,
    viewport_out: Option<&ViewPortRect>,
    color: &DpyColor,
) -> Result<ModesetTimings, ModeRejection> {
    let metadata = construct_mode_timings_metadata(dev, dpy, params, kms_mode)?;
    let mut discard = InfoString::discard();

    let valid_syncs = resolve_valid_syncs(dpy, &params.valid_syncs);
    validate_mode_timings(
        dev,
        dpy,
        kms_mode,
        &metadata.flags,
        params,
        &valid_syncs,
        &mut discard,
    )?;

    let hw_timings = dev
        .hal()
        .construct_hw_mode_timings(
            dev,
            dpy,
            &metadata.kms_mode,
            viewport_in,
            viewport_out,
            color,
            params,
            &mut discard,
        )
        .ok_or(ModeRejection::HwTimingsConstruction)?;

    Ok(ModesetTimings {
        hw_timings,
        info_frame_ctrl: metadata.info_frame_ctrl,
    })
}
