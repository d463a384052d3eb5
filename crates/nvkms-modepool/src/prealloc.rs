//! Per-device scratch buffers for mode validation.
//!
//! Each buffer kind is a single slot. Acquiring hands out a guard over a zeroed buffer and
//! the slot is released when the guard drops, on every exit path. Callers serialize
//! validation externally; a second concurrent acquisition of the same kind is reported as
//! [`PreallocError::InUse`] rather than handing out aliased storage.

use core::cell::{RefCell, RefMut};

use crate::error::PreallocError;
use crate::frl::FrlConfig;
use crate::hw::{DscInfo, HwModeTimings, MAX_HEADS_PER_DISP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreallocKind {
    HwModeTimings,
    HdmiFrlConfig,
    DscInfo,
    ImpOutHwModeTimings,
}

#[derive(Debug, Default)]
pub struct Prealloc {
    hw_timings: RefCell<HwModeTimings>,
    frl_config: RefCell<FrlConfig>,
    dsc_info: RefCell<DscInfo>,
    imp_out: RefCell<[HwModeTimings; MAX_HEADS_PER_DISP]>,
}

/// The working set held for one `ValidateMode` pass.
pub struct ValidateModeScratch<'a> {
    pub hw_timings: RefMut<'a, HwModeTimings>,
    pub frl_config: RefMut<'a, FrlConfig>,
    pub dsc_info: RefMut<'a, DscInfo>,
    pub imp_out: RefMut<'a, [HwModeTimings; MAX_HEADS_PER_DISP]>,
}

fn acquire<T: Default>(
    slot: &RefCell<T>,
    kind: PreallocKind,
) -> Result<RefMut<'_, T>, PreallocError> {
    let mut buffer = slot
        .try_borrow_mut()
        .map_err(|_| PreallocError::InUse(kind))?;
    *buffer = T::default();
    Ok(buffer)
}

impl Prealloc {
    pub fn hw_mode_timings(&self) -> Result<RefMut<'_, HwModeTimings>, PreallocError> {
        acquire(&self.hw_timings, PreallocKind::HwModeTimings)
    }

    pub fn frl_config(&self) -> Result<RefMut<'_, FrlConfig>, PreallocError> {
        acquire(&self.frl_config, PreallocKind::HdmiFrlConfig)
    }

    pub fn dsc_info(&self) -> Result<RefMut<'_, DscInfo>, PreallocError> {
        acquire(&self.dsc_info, PreallocKind::DscInfo)
    }

    pub fn imp_out(
        &self,
    ) -> Result<RefMut<'_, [HwModeTimings; MAX_HEADS_PER_DISP]>, PreallocError> {
        acquire(&self.imp_out, PreallocKind::ImpOutHwModeTimings)
    }

    /// Acquires all four buffers; anything already taken is released again on failure.
    pub fn validate_mode_scratch(&self) -> Result<ValidateModeScratch<'_>, PreallocError> {
        Ok(ValidateModeScratch {
            hw_timings: self.hw_mode_timings()?,
            frl_config: self.frl_config()?,
            dsc_info: self.dsc_info()?,
            imp_out: self.imp_out()?,
        })
    }

    pub fn is_idle(&self) -> bool {
        self.hw_timings.try_borrow_mut().is_ok()
            && self.frl_config.try_borrow_mut().is_ok()
            && self.dsc_info.try_borrow_mut().is_ok()
            && self.imp_out.try_borrow_mut().is_ok()
    }
}
