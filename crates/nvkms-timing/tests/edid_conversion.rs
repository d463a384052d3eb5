use nvkms_timing::{EdidTiming, ModeTimings, SizeMm};
use pretty_assertions::assert_eq;

fn cea_1080p60() -> EdidTiming {
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
        size_mm: SizeMm { w: 527, h: 296 },
        ..EdidTiming::default()
    }
}

#[test]
fn progressive_conversion() {
    assert_eq!(
        cea_1080p60().to_mode_timings(),
        ModeTimings {
            rr_x1k: 60_000,
            pixel_clock_hz: 148_500_000,
            h_visible: 1920,
            h_sync_start: 2008,
            h_sync_end: 2052,
            h_total: 2200,
            v_visible: 1080,
            v_sync_start: 1084,
            v_sync_end: 1089,
            v_total: 1125,
            size_mm: SizeMm { w: 527, h: 296 },
            h_sync_pos: true,
            v_sync_pos: true,
            ..ModeTimings::default()
        }
    );
}

#[test]
fn negative_polarity_flags() {
    let timing = EdidTiming {
        h_sync_negative: true,
        ..cea_1080p60()
    };
    let mode = timing.to_mode_timings();
    assert!(mode.h_sync_neg && !mode.h_sync_pos);
    assert!(mode.v_sync_pos && !mode.v_sync_neg);
}

#[test]
fn interlaced_fields_become_frames() {
    let timing = EdidTiming {
        v_visible: 540,
        v_front_porch: 2,
        v_sync_width: 5,
        v_total: 562,
        interlaced: true,
        ..cea_1080p60()
    };
    let mode = timing.to_mode_timings();
    assert!(mode.interlaced);
    assert_eq!(
        (mode.v_visible, mode.v_sync_start, mode.v_sync_end, mode.v_total),
        (1080, 1084, 1094, 1125)
    );
}
