//! Static catalog of VESA and industry standard modes.
//!
//! Order matters: mode enumeration walks this table after the EDID timings, and clients refer
//! to entries by their position in that combined sequence.

use crate::timings::{ModeTimings, SizeMm, Yuv420Mode};

#[derive(Clone, Copy)]
enum Pol {
    Pos,
    Neg,
}

use Pol::{Neg, Pos};

#[allow(clippy::too_many_arguments)]
const fn vesa(
    rr_x1k: u32,
    pixel_clock_hz: u32,
    h: [u16; 4],
    v: [u16; 4],
    interlaced: bool,
    h_pol: Pol,
    v_pol: Pol,
) -> ModeTimings {
    ModeTimings {
        rr_x1k,
        pixel_clock_hz,
        h_visible: h[0],
        h_sync_start: h[1],
        h_sync_end: h[2],
        h_total: h[3],
        h_skew: 0,
        v_visible: v[0],
        v_sync_start: v[1],
        v_sync_end: v[2],
        v_total: v[3],
        size_mm: SizeMm { w: 0, h: 0 },
        interlaced,
        double_scan: false,
        h_sync_pos: matches!(h_pol, Pos),
        h_sync_neg: matches!(h_pol, Neg),
        v_sync_pos: matches!(v_pol, Pos),
        v_sync_neg: matches!(v_pol, Neg),
        hdmi3d: false,
        yuv420_mode: Yuv420Mode::None,
    }
}

const UXGA_H: [u16; 4] = [1600, 1664, 1856, 2160];
const UXGA_V: [u16; 4] = [1200, 1201, 1204, 1250];

pub const VESA_MODES: [ModeTimings; 34] = [
    // 640x350 @ 85Hz
    vesa(85_080, 31_500_000, [640, 672, 736, 832], [350, 382, 385, 445], false, Pos, Neg),
    // 640x400 @ 85Hz
    vesa(85_080, 31_500_000, [640, 672, 736, 832], [400, 401, 404, 445], false, Neg, Pos),
    // 720x400 @ 85Hz
    vesa(85_039, 35_500_000, [720, 756, 828, 936], [400, 401, 404, 446], false, Neg, Pos),
    // 640x480 @ 60Hz
    vesa(59_940, 25_175_000, [640, 656, 752, 800], [480, 490, 492, 525], false, Neg, Neg),
    // 640x480 @ 72Hz
    vesa(72_809, 31_500_000, [640, 664, 704, 832], [480, 489, 492, 520], false, Neg, Neg),
    // 640x480 @ 75Hz
    vesa(75_000, 31_500_000, [640, 656, 720, 840], [480, 481, 484, 500], false, Neg, Neg),
    // 640x480 @ 85Hz
    vesa(85_008, 36_000_000, [640, 696, 752, 832], [480, 481, 484, 509], false, Neg, Neg),
    // 800x600 @ 56Hz
    vesa(56_250, 36_000_000, [800, 824, 896, 1024], [600, 601, 603, 625], false, Pos, Pos),
    // 800x600 @ 60Hz
    vesa(60_317, 40_000_000, [800, 840, 968, 1056], [600, 601, 605, 628], false, Pos, Pos),
    // 800x600 @ 72Hz
    vesa(72_188, 50_000_000, [800, 856, 976, 1040], [600, 637, 643, 666], false, Pos, Pos),
    // 800x600 @ 75Hz
    vesa(75_000, 49_500_000, [800, 816, 896, 1056], [600, 601, 604, 625], false, Pos, Pos),
    // 800x600 @ 85Hz
    vesa(85_137, 56_300_000, [800, 832, 896, 1048], [600, 601, 604, 631], false, Pos, Pos),
    // 1024x768i @ 87Hz
    vesa(86_958, 44_900_000, [1024, 1032, 1208, 1264], [768, 768, 776, 817], true, Pos, Pos),
    // 1024x768 @ 60Hz
    vesa(60_004, 65_000_000, [1024, 1048, 1184, 1344], [768, 771, 777, 806], false, Neg, Neg),
    // 1024x768 @ 70Hz
    vesa(70_069, 75_000_000, [1024, 1048, 1184, 1328], [768, 771, 777, 806], false, Neg, Neg),
    // 1024x768 @ 75Hz
    vesa(75_029, 78_750_000, [1024, 1040, 1136, 1312], [768, 769, 772, 800], false, Pos, Pos),
    // 1024x768 @ 85Hz
    vesa(84_997, 94_500_000, [1024, 1072, 1168, 1376], [768, 769, 772, 808], false, Pos, Pos),
    // 1152x864 @ 75Hz
    vesa(75_000, 108_000_000, [1152, 1216, 1344, 1600], [864, 865, 868, 900], false, Pos, Pos),
    // 1280x960 @ 60Hz
    vesa(60_000, 108_000_000, [1280, 1376, 1488, 1800], [960, 961, 964, 1000], false, Pos, Pos),
    // 1280x960 @ 85Hz
    vesa(85_002, 148_500_000, [1280, 1344, 1504, 1728], [960, 961, 964, 1011], false, Pos, Pos),
    // 1280x1024 @ 60Hz
    vesa(60_020, 108_000_000, [1280, 1328, 1440, 1688], [1024, 1025, 1028, 1066], false, Pos, Pos),
    // 1280x1024 @ 75Hz
    vesa(75_025, 135_000_000, [1280, 1296, 1440, 1688], [1024, 1025, 1028, 1066], false, Pos, Pos),
    // 1280x1024 @ 85Hz
    vesa(85_024, 157_500_000, [1280, 1344, 1504, 1728], [1024, 1025, 1028, 1072], false, Pos, Pos),
    // 1600x1200 @ 60Hz
    vesa(60_000, 162_000_000, UXGA_H, UXGA_V, false, Pos, Pos),
    // 1600x1200 @ 65Hz
    vesa(65_000, 175_500_000, UXGA_H, UXGA_V, false, Pos, Pos),
    // 1600x1200 @ 70Hz
    vesa(70_000, 189_000_000, UXGA_H, UXGA_V, false, Pos, Pos),
    // 1600x1200 @ 75Hz
    vesa(75_000, 202_500_000, UXGA_H, UXGA_V, false, Pos, Pos),
    // 1600x1200 @ 85Hz
    vesa(85_000, 229_500_000, UXGA_H, UXGA_V, false, Pos, Pos),
    // 1792x1344 @ 60Hz
    vesa(60_014, 204_800_000, [1792, 1920, 2120, 2448], [1344, 1345, 1348, 1394], false, Neg, Pos),
    // 1792x1344 @ 75Hz
    vesa(74_997, 261_000_000, [1792, 1888, 2104, 2456], [1344, 1345, 1348, 1417], false, Neg, Pos),
    // 1856x1392 @ 60Hz
    vesa(60_009, 218_300_000, [1856, 1952, 2176, 2528], [1392, 1393, 1396, 1439], false, Neg, Pos),
    // 1856x1392 @ 75Hz
    vesa(75_000, 288_000_000, [1856, 1984, 2208, 2560], [1392, 1393, 1396, 1500], false, Neg, Pos),
    // 1920x1440 @ 60Hz
    vesa(60_000, 234_000_000, [1920, 2048, 2256, 2600], [1440, 1441, 1444, 1500], false, Neg, Pos),
    // 1920x1440 @ 75Hz
    vesa(75_000, 297_000_000, [1920, 2064, 2288, 2640], [1440, 1441, 1444, 1500], false, Neg, Pos),
];
