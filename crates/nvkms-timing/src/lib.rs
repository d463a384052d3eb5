//! Display timing vocabulary shared by the nvkms mode pool.
//!
//! This crate intentionally contains no validation policy. It provides:
//! - [`ModeTimings`]: one candidate raster timing in the client-facing layout,
//! - [`VESA_MODES`]: the static catalog of VESA/industry standard timings used as a
//!   fallback mode source,
//! - frequency formatting helpers used by the diagnostic log, and
//! - the *parsed* EDID data model ([`ParsedEdid`]) consumed by mode validation. Byte-level
//!   EDID/CEA-861 parsing lives elsewhere; this crate only describes its result.
#![forbid(unsafe_code)]

pub mod edid;
pub mod freq;
pub mod timings;
pub mod vesa;

pub use edid::{
    CeaExtension, ColorDepths, EdidFeatures, EdidInfo, EdidRangeLimits, EdidTiming, EdidVersion,
    Hdmi3dDetails, Hdmi3dStructure, HdmiForumInfo, ParsedEdid, TimingStatus, TimingType, Vsdb,
    CEA861_REV_ORIGINAL, HDMI_LLC_IEEE_ID,
};
pub use freq::{
    frequency_to_string, percentage, ranges_to_string, FrequencyRange, MhzPoint1, MhzPoint2,
};
pub use timings::{build_mode_name, ModeTimings, SizeMm, Yuv420Mode, MAX_MODE_NAME_LEN};
pub use vesa::VESA_MODES;
