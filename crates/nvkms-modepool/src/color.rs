//! Output color attributes: defaulting from sink capabilities and bpc downgrade.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorFormat {
    #[default]
    Rgb,
    YCbCr422,
    YCbCr444,
    YCbCr420,
}

/// Bits per component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bpc {
    #[default]
    Unknown,
    Six,
    Eight,
    Ten,
}

impl Bpc {
    pub fn bits(self) -> u32 {
        match self {
            Bpc::Unknown => 0,
            Bpc::Six => 6,
            Bpc::Eight => 8,
            Bpc::Ten => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorRange {
    #[default]
    Full,
    Limited,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Colorimetry {
    #[default]
    Default,
    Bt2100,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DpyColor {
    pub format: ColorFormat,
    pub bpc: Bpc,
    pub range: ColorRange,
    pub colorimetry: Colorimetry,
}

impl DpyColor {
    /// Attributes forced on any YUV 4:2:0 mode.
    pub const YUV420: DpyColor = DpyColor {
        format: ColorFormat::YCbCr420,
        bpc: Bpc::Eight,
        range: ColorRange::Limited,
        colorimetry: Colorimetry::Default,
    };
}

/// Supported bpc span for one pixel encoding. `max_bpc == Bpc::Unknown` means unsupported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BpcRange {
    pub min_bpc: Bpc,
    pub max_bpc: Bpc,
}

impl BpcRange {
    pub const fn new(min_bpc: Bpc, max_bpc: Bpc) -> Self {
        Self { min_bpc, max_bpc }
    }

    pub fn is_supported(&self) -> bool {
        self.max_bpc != Bpc::Unknown
    }
}

/// What the connector and sink can carry, per pixel encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputColorFormatInfo {
    pub rgb444: BpcRange,
    pub yuv444: BpcRange,
    pub yuv422: BpcRange,
}

impl OutputColorFormatInfo {
    fn range_for(&self, format: ColorFormat) -> Option<&BpcRange> {
        match format {
            ColorFormat::Rgb => Some(&self.rgb444),
            ColorFormat::YCbCr444 => Some(&self.yuv444),
            ColorFormat::YCbCr422 => Some(&self.yuv422),
            ColorFormat::YCbCr420 => None,
        }
    }
}

/// Picks RGB at its deepest supported bpc, falling back to YCbCr 4:4:4 and then 4:2:2.
pub fn default_dpy_color(formats: &OutputColorFormatInfo) -> Option<DpyColor> {
    let (format, range, bpc_range) = if formats.rgb444.is_supported() {
        (ColorFormat::Rgb, ColorRange::Full, formats.rgb444)
    } else if formats.yuv444.is_supported() {
        (ColorFormat::YCbCr444, ColorRange::Limited, formats.yuv444)
    } else if formats.yuv422.is_supported() {
        (ColorFormat::YCbCr422, ColorRange::Limited, formats.yuv422)
    } else {
        return None;
    };

    Some(DpyColor {
        format,
        bpc: bpc_range.max_bpc,
        range,
        colorimetry: Colorimetry::Default,
    })
}

/// Lowers `color.bpc` by one step if the sink allows it, returning whether it changed.
///
/// 10 bpc drops to 8 unless the encoding is YCbCr 4:2:0 (fixed at 8) or the encoding's floor
/// is above 8. 8 bpc drops to 6 only for RGB sinks that accept 6, which also forces full range.
pub fn downgrade_color_bpc(formats: &OutputColorFormatInfo, color: &mut DpyColor) -> bool {
    match color.bpc {
        Bpc::Ten => {
            let Some(range) = formats.range_for(color.format) else {
                return false;
            };
            if range.min_bpc > Bpc::Eight {
                return false;
            }
            color.bpc = Bpc::Eight;
            true
        }
        Bpc::Eight => {
            if color.format != ColorFormat::Rgb
                || formats.rgb444.min_bpc == Bpc::Unknown
                || formats.rgb444.min_bpc > Bpc::Six
            {
                return false;
            }
            color.bpc = Bpc::Six;
            color.range = ColorRange::Full;
            true
        }
        Bpc::Six | Bpc::Unknown => false,
    }
}

/// Ordered candidate colors for FRL negotiation: `start`, then each successful downgrade that
/// keeps at least 8 bpc.
pub fn frl_color_candidates(formats: &OutputColorFormatInfo, start: DpyColor) -> Vec<DpyColor> {
    let mut candidates = vec![start];
    let mut color = start;
    while downgrade_color_bpc(formats, &mut color) && color.bpc >= Bpc::Eight {
        candidates.push(color);
    }
    candidates
}
