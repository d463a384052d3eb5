use crate::frl::HdmiLib;
use crate::hal::DispHal;
use crate::params::ModesetConfig;
use crate::prealloc::Prealloc;

/// Display engine generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayClass {
    /// Kepler/Maxwell/Pascal EVO display.
    Evo94,
    /// Volta NVDisplay.
    NvDisplayC3,
    /// Turing NVDisplay.
    NvDisplayC5,
    /// Ampere NVDisplay: HDMI 2.1 FRL, native YUV 4:2:0.
    NvDisplayC6,
    /// Ada/Hopper NVDisplay: interlaced scanout dropped.
    NvDisplayC7,
}

/// Capability set of one display engine, resolved once when the device is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DevCaps {
    pub supports_interlaced: bool,
    pub max_raster_width: u16,
    pub max_raster_height: u16,
    pub supports_dp13: bool,
    pub supports_hdmi20: bool,
    pub supports_hdmi_yuv420_hw: bool,
    pub supports_hdmi_frl: bool,
    pub supports_hdmi_10bpc: bool,
    pub supports_hdmi_3d: bool,
}

impl DevCaps {
    pub fn for_class(class: DisplayClass) -> DevCaps {
        let evo = DevCaps {
            supports_interlaced: true,
            max_raster_width: 8192,
            max_raster_height: 8192,
            supports_dp13: false,
            supports_hdmi20: false,
            supports_hdmi_yuv420_hw: false,
            supports_hdmi_frl: false,
            supports_hdmi_10bpc: false,
            supports_hdmi_3d: true,
        };
        let volta = DevCaps {
            max_raster_width: 0x7fff,
            max_raster_height: 0x7fff,
            supports_dp13: true,
            supports_hdmi20: true,
            ..evo
        };
        let turing = DevCaps {
            supports_hdmi_10bpc: true,
            ..volta
        };
        let ampere = DevCaps {
            supports_hdmi_yuv420_hw: true,
            supports_hdmi_frl: true,
            ..turing
        };

        match class {
            DisplayClass::Evo94 => evo,
            DisplayClass::NvDisplayC3 => volta,
            DisplayClass::NvDisplayC5 => turing,
            DisplayClass::NvDisplayC6 => ampere,
            DisplayClass::NvDisplayC7 => DevCaps {
                supports_interlaced: false,
                ..ampere
            },
        }
    }
}

/// One GPU's display engine: fixed capabilities, hardware collaborators and scratch storage.
pub struct Device {
    caps: DevCaps,
    config: ModesetConfig,
    hal: Box<dyn DispHal>,
    hdmi_lib: Box<dyn HdmiLib>,
    prealloc: Prealloc,
}

impl Device {
    pub fn new(
        class: DisplayClass,
        config: ModesetConfig,
        hal: Box<dyn DispHal>,
        hdmi_lib: Box<dyn HdmiLib>,
    ) -> Self {
        Self::with_caps(DevCaps::for_class(class), config, hal, hdmi_lib)
    }

    pub fn with_caps(
        caps: DevCaps,
        config: ModesetConfig,
        hal: Box<dyn DispHal>,
        hdmi_lib: Box<dyn HdmiLib>,
    ) -> Self {
        Self {
            caps,
            config,
            hal,
            hdmi_lib,
            prealloc: Prealloc::default(),
        }
    }

    pub fn caps(&self) -> &DevCaps {
        &self.caps
    }

    pub fn config(&self) -> &ModesetConfig {
        &self.config
    }

    pub fn hal(&self) -> &dyn DispHal {
        self.hal.as_ref()
    }

    pub fn hdmi_lib(&self) -> &dyn HdmiLib {
        self.hdmi_lib.as_ref()
    }

    pub fn prealloc(&self) -> &Prealloc {
        &self.prealloc
    }
}

impl core::fmt::Debug for Device {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("caps", &self.caps)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
