//! I/O Trap Configuration
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Location of the PSTH private configuration registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoTrapConfig {
    /// Base of the PCH private configuration register space.
    pub pcr_base: u64,
    /// Sideband port ID of the PSTH.
    pub psth_pid: u8,
}

impl IoTrapConfig {
    /// Base address of the PSTH private configuration registers.
    pub const fn psth_base(&self) -> u64 {
        self.pcr_base + ((self.psth_pid as u64) << 16)
    }
}

impl Default for IoTrapConfig {
    fn default() -> Self {
        IoTrapConfig { pcr_base: 0xFD00_0000, psth_pid: 0x89 }
    }
}
