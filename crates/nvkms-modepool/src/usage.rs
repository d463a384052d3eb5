use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Layers per head.
pub const MAX_LAYERS_PER_HEAD: usize = 8;

bitflags! {
    /// Surface memory formats a layer can scan out.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SurfaceMemoryFormats: u64 {
        const I8 = 1 << 0;
        const A1R5G5B5 = 1 << 1;
        const X1R5G5B5 = 1 << 2;
        const R5G6B5 = 1 << 3;
        const A8R8G8B8 = 1 << 4;
        const X8R8G8B8 = 1 << 5;
        const A2B10G10R10 = 1 << 6;
        const X2B10G10R10 = 1 << 7;
        const A8B8G8R8 = 1 << 8;
        const X8B8G8R8 = 1 << 9;
        const RF16GF16BF16AF16 = 1 << 10;
        const R16G16B16A16 = 1 << 11;
        const RF32GF32BF32AF32 = 1 << 12;
        const Y8_U8__Y8_V8_N422 = 1 << 13;
        const U8_Y8__V8_Y8_N422 = 1 << 14;
        const Y8___U8V8_N444 = 1 << 15;
        const Y8___V8U8_N444 = 1 << 16;
        const Y8___U8V8_N422 = 1 << 17;
        const Y8___V8U8_N422 = 1 << 18;
        const Y8___U8V8_N420 = 1 << 19;
        const Y8___V8U8_N420 = 1 << 20;
        const Y10___U10V10_N444 = 1 << 21;
        const Y10___V10U10_N444 = 1 << 22;
        const Y10___U10V10_N422 = 1 << 23;
        const Y10___V10U10_N422 = 1 << 24;
        const Y10___U10V10_N420 = 1 << 25;
        const Y10___V10U10_N420 = 1 << 26;
        const Y12___U12V12_N444 = 1 << 27;
        const Y12___V12U12_N444 = 1 << 28;
        const Y12___U12V12_N422 = 1 << 29;
        const Y12___V12U12_N422 = 1 << 30;
        const Y12___U12V12_N420 = 1 << 31;
        const Y12___V12U12_N420 = 1 << 32;
        const Y8___U8___V8_N444 = 1 << 33;
        const Y8___U8___V8_N420 = 1 << 34;
    }
}

/// Scaler limits for one layer. Downscale factors are 1/1024 fixed point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScalingUsageBounds {
    pub max_v_downscale_factor: u16,
    pub max_h_downscale_factor: u16,
    pub v_taps: u8,
    pub v_upscaling_allowed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerUsageBounds {
    pub usable: bool,
    pub supported_surface_memory_formats: SurfaceMemoryFormats,
    pub scaling: ScalingUsageBounds,
}

/// What a head can be asked to do while driving a given mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageBounds {
    pub layers: [LayerUsageBounds; MAX_LAYERS_PER_HEAD],
}

impl UsageBounds {
    /// The envelope permitted by both `self` and `other`.
    pub fn intersect(&self, other: &UsageBounds) -> UsageBounds {
        let mut out = UsageBounds::default();
        for ((dst, a), b) in out.layers.iter_mut().zip(&self.layers).zip(&other.layers) {
            dst.usable = a.usable && b.usable;
            dst.supported_surface_memory_formats =
                a.supported_surface_memory_formats & b.supported_surface_memory_formats;
            dst.scaling = ScalingUsageBounds {
                max_v_downscale_factor: a
                    .scaling
                    .max_v_downscale_factor
                    .min(b.scaling.max_v_downscale_factor),
                max_h_downscale_factor: a
                    .scaling
                    .max_h_downscale_factor
                    .min(b.scaling.max_h_downscale_factor),
                v_taps: a.scaling.v_taps.min(b.scaling.v_taps),
                v_upscaling_allowed: a.scaling.v_upscaling_allowed && b.scaling.v_upscaling_allowed,
            };
        }
        out
    }
}
