//! Display mode validation for nvkms.
//!
//! A candidate mode comes from a dpy's EDID, the VESA table or the client. It is checked in a
//! fixed pipeline:
//!
//! 1. [`validate_mode_timings`]: geometry, pixel clock, raster size and sync-range checks,
//! 2. color defaulting,
//! 3. hardware timing synthesis through [`DispHal`],
//! 4. link negotiation: HDMI FRL (with bpc downgrade) or DisplayPort bandwidth,
//! 5. scaler taps and IMP, and
//! 6. intersection of the usage bounds of every hardware head the mode occupies.
//!
//! Every stage appends to a caller-bounded [`InfoString`]; the first failure becomes a
//! [`ModeRejection`]. Hardware and the HDMI link library are reached only through the
//! [`DispHal`] and [`HdmiLib`] traits, selected once per [`Device`].
#![forbid(unsafe_code)]

pub mod color;
pub mod decisions;
pub mod device;
pub mod dpy;
pub mod error;
pub mod frl;
pub mod hal;
pub mod hdmi;
pub mod hw;
pub mod info_string;
pub mod metadata;
pub mod mode;
pub mod modepool;
pub mod params;
pub mod prealloc;
pub mod sync;
pub mod usage;
pub mod validate;

pub use color::{Bpc, BpcRange, ColorFormat, ColorRange, Colorimetry, DpyColor, OutputColorFormatInfo};
pub use decisions::{dp_yuv420_required, get_hdmi3d_value, get_yuv420_value, Hdmi3dValue};
pub use device::{DevCaps, Device, DisplayClass};
pub use dpy::{Connector, ConnectorKind, DpLinkCaps, Dpy, Stereo3DVision};
pub use error::{HdmiLibError, ModeRejection, PreallocError};
pub use frl::{
    hdmi_frl_assess_link, hdmi_frl_clear_config, hdmi_frl_query_config, hdmi_frl_set_config,
    Deadline, FrlConfig, FrlLinkTraining, FrlRate, HdmiLib, HdmiLinkCaps, NullHdmiLib,
};
pub use hal::{DispHal, HeadCaps, ScalerCaps, SimpleDispHal, StereoPatch};
pub use hdmi::{dpy_is_hdmi, VideoInfoFrameCtrl};
pub use hw::{HwModeTimings, ViewPortRect, ViewPortSize, MAX_HEADS_PER_DISP};
pub use info_string::InfoString;
pub use metadata::{construct_mode_timings_metadata, find_edid_timing, ModeMetadata};
pub use mode::{KmsMode, ModeSource, ValidateModeFlags};
pub use modepool::{
    validate_kms_mode, validate_mode, validate_mode_for_modeset, validate_mode_index,
    ModeValidation, ModesetTimings, ValidateModeIndexReply, ValidateModeIndexRequest,
    ValidateModeReply, ValidateModeRequest,
};
pub use params::{
    DscMode, FrequencyRangeSource, FrequencyRanges, ModeValidationOverrides,
    ModeValidationParams, ModesetConfig, StereoMode, ValidSyncs,
};
pub use prealloc::Prealloc;
pub use sync::resolve_valid_syncs;
pub use usage::{LayerUsageBounds, SurfaceMemoryFormats, UsageBounds};
pub use validate::validate_mode_timings;
