#![allow(dead_code)]

use std::sync::Once;

use nvkms_modepool::{
    Bpc, BpcRange, Connector, ConnectorKind, Device, DisplayClass, Dpy, HeadCaps, LayerUsageBounds,
    ModesetConfig, NullHdmiLib, OutputColorFormatInfo, SimpleDispHal, SurfaceMemoryFormats,
    UsageBounds,
};
use nvkms_timing::{
    CeaExtension, ColorDepths, EdidInfo, EdidRangeLimits, EdidTiming, EdidVersion, Hdmi3dDetails,
    Hdmi3dStructure, ParsedEdid, TimingStatus, TimingType, Vsdb, HDMI_LLC_IEEE_ID,
};

static TRACING: Once = Once::new();

/// Routes engine logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn heads(count: usize, max_pixel_clock_khz: u32) -> Vec<HeadCaps> {
    let mut usage = UsageBounds::default();
    usage.layers[0] = LayerUsageBounds {
        usable: true,
        supported_surface_memory_formats: SurfaceMemoryFormats::A8R8G8B8
            | SurfaceMemoryFormats::X8R8G8B8,
        ..LayerUsageBounds::default()
    };
    vec![
        HeadCaps {
            max_pixel_clock_khz,
            usage,
        };
        count
    ]
}

/// Single-head Evo device with a 400 MHz head.
pub fn evo_device() -> Device {
    Device::new(
        DisplayClass::Evo94,
        ModesetConfig::default(),
        Box::new(SimpleDispHal::new(heads(1, 400_000))),
        Box::new(NullHdmiLib),
    )
}

fn rgb8() -> OutputColorFormatInfo {
    OutputColorFormatInfo {
        rgb444: BpcRange::new(Bpc::Eight, Bpc::Eight),
        ..OutputColorFormatInfo::default()
    }
}

/// VGA monitor with no EDID.
pub fn crt(max_pixel_clock_khz: u32) -> Dpy {
    Dpy {
        max_pixel_clock_khz,
        max_single_link_pixel_clock_khz: max_pixel_clock_khz,
        output_color_formats: rgb8(),
        ..Dpy::new("CRT-0", Connector::new(ConnectorKind::Analog))
    }
}

fn cea_timing(
    vic: u8,
    h: [u16; 4],
    v: [u16; 4],
    pclk_10khz: u32,
    name: &str,
) -> EdidTiming {
    EdidTiming {
        h_visible: h[0],
        h_front_porch: h[1],
        h_sync_width: h[2],
        h_total: h[3],
        v_visible: v[0],
        v_front_porch: v[1],
        v_sync_width: v[2],
        v_total: v[3],
        pclk_10khz,
        rr_x1k: 60_000,
        rgb444: ColorDepths::BPC_8,
        status: Some(TimingStatus {
            kind: TimingType::Edid861St,
            seq: vic,
            cea_format: vic,
        }),
        name: name.to_owned(),
        ..EdidTiming::default()
    }
}

/// HDMI TV listing 1080p60 (VIC 16) and 720p60 (VIC 4). Its HDMI 3D map only carries
/// side-by-side for 720p.
pub fn hdmi_tv() -> Dpy {
    let timings = vec![
        cea_timing(16, [1920, 88, 44, 2200], [1080, 4, 5, 1125], 14_850, "1920x1080p60 16:9"),
        cea_timing(4, [1280, 110, 40, 1650], [720, 5, 5, 750], 7_425, "1280x720p60 16:9"),
    ];
    let edid = ParsedEdid {
        valid: true,
        info: EdidInfo {
            version: EdidVersion::V1_4,
            is_digital: true,
            timings,
            cea_extensions: vec![CeaExtension {
                revision: 3,
                vsdbs: vec![Vsdb {
                    ieee_id: HDMI_LLC_IEEE_ID,
                    ..Vsdb::default()
                }],
            }],
            hdmi_3d_supported: true,
            hdmi_3d_support: vec![Hdmi3dDetails {
                vic: 4,
                structures: Hdmi3dStructure::SIDE_BY_SIDE_HALF,
            }],
            ..EdidInfo::default()
        },
        limits: EdidRangeLimits {
            min_h_rate_hz: 15_000,
            max_h_rate_hz: 100_000,
            min_v_rate_hzx1k: 23_000,
            max_v_rate_hzx1k: 122_000,
            max_pclk_10khz: 0,
        },
    };
    Dpy {
        parsed_edid: edid,
        max_pixel_clock_khz: 600_000,
        max_single_link_pixel_clock_khz: 600_000,
        hdmi_capable: true,
        output_color_formats: rgb8(),
        ..Dpy::new("HDMI-0", Connector::new(ConnectorKind::Tmds))
    }
}
