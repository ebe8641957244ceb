//! I/O Trap Hardware Access
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use crate::{
    config::IoTrapConfig,
    register::{IoTrapRegister, TrappedCycle, R_PSTH_PCR_TRCR, R_PSTH_PCR_TRPREG0, R_PSTH_PCR_TRSR, R_PSTH_PCR_TWDR},
};

/// Access to the I/O trap registers.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait IoTrapHardware {
    fn read_trap_register(&self, index: usize) -> IoTrapRegister;

    fn write_trap_register(&self, index: usize, value: IoTrapRegister);

    /// Returns the trap status bits, one per register.
    fn trap_status(&self) -> u32;

    /// Clears the status bits set in `mask`.
    fn clear_trap_status(&self, mask: u32);

    fn trapped_cycle(&self) -> TrappedCycle;

    fn trapped_data(&self) -> u32;
}

/// I/O trap registers in the PSTH private configuration space.
#[derive(Debug)]
pub struct PchIoTrapMmio {
    base: u64,
}

impl PchIoTrapMmio {
    /// # Safety
    ///
    /// The PSTH private configuration space described by `config` must be mapped and must not be accessed
    /// elsewhere while the returned instance is in use.
    pub const unsafe fn new(config: &IoTrapConfig) -> Self {
        Self { base: config.psth_base() }
    }

    fn read32(&self, offset: u64) -> u32 {
        // SAFETY: the caller of `new` guarantees that the PCR space is mapped.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    fn write32(&self, offset: u64, value: u32) {
        // SAFETY: the caller of `new` guarantees that the PCR space is mapped.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }

    fn trap_register_offset(index: usize) -> u64 {
        R_PSTH_PCR_TRPREG0 + 8 * index as u64
    }
}

impl IoTrapHardware for PchIoTrapMmio {
    fn read_trap_register(&self, index: usize) -> IoTrapRegister {
        let offset = Self::trap_register_offset(index);
        let low = self.read32(offset) as u64;
        let high = self.read32(offset + 4) as u64;
        IoTrapRegister::from((high << 32) | low)
    }

    fn write_trap_register(&self, index: usize, value: IoTrapRegister) {
        let offset = Self::trap_register_offset(index);
        let value: u64 = value.into();
        // PCR registers only take dword accesses; the enable bit sits in the low dword and goes last.
        self.write32(offset + 4, (value >> 32) as u32);
        self.write32(offset, value as u32);
        log::trace!(target: "io_trap", "TRPREG{index} = {value:#018x}");
    }

    fn trap_status(&self) -> u32 {
        self.read32(R_PSTH_PCR_TRSR)
    }

    fn clear_trap_status(&self, mask: u32) {
        self.write32(R_PSTH_PCR_TRSR, mask);
    }

    fn trapped_cycle(&self) -> TrappedCycle {
        TrappedCycle::from(self.read32(R_PSTH_PCR_TRCR))
    }

    fn trapped_data(&self) -> u32 {
        self.read32(R_PSTH_PCR_TWDR)
    }
}
