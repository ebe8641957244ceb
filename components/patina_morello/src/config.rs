//! Morello Memory Layout Configuration
//!
//! Build-time configuration of the system memory and PCIe/CCIX windows. Defaults describe the Morello SoC.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use patina_platform_sdk::base::SIZE_1MB;

/// A PCI host bridge configuration window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciHostBridgeConfig {
    /// Base of the ECAM configuration space.
    pub ecam_base: u64,
    pub bus_min: u8,
    pub bus_max: u8,
    pub mmio32_base: u32,
    pub mmio32_size: u32,
    /// Size of the IO window, mapped directly after the MMIO32 window.
    pub io_size: u32,
    pub mmio64_base: u64,
    pub mmio64_size: u64,
}

impl PciHostBridgeConfig {
    /// Length of the ECAM region covering `bus_min..=bus_max`.
    pub const fn ecam_size(&self) -> u64 {
        (self.bus_max.saturating_sub(self.bus_min) as u64 + 1) * SIZE_1MB
    }

    /// Length of the MMIO32 region including the trailing IO window.
    pub const fn mmio32_region_size(&self) -> u64 {
        self.mmio32_size as u64 + self.io_size as u64
    }
}

/// Morello memory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorelloMemoryConfig {
    pub system_memory_base: u64,
    pub system_memory_size: u64,
    /// Base of the second DRAM block, holding local DDR beyond the first 2 GiB.
    pub dram_block2_base: u64,
    pub pcie: PciHostBridgeConfig,
    pub ccix: PciHostBridgeConfig,
    /// Mali display processor register window (FVP).
    pub mali_dxx_base: u32,
    pub mali_dxx_size: u32,
    /// GOP framebuffer carve-out (FVP). A size of zero disables it.
    pub gop_buffer_base: u64,
    pub gop_buffer_size: u32,
}

impl Default for MorelloMemoryConfig {
    fn default() -> Self {
        MorelloMemoryConfig {
            system_memory_base: 0x8000_0000,
            system_memory_size: 0x7F00_0000,
            dram_block2_base: 0x80_8000_0000,
            pcie: PciHostBridgeConfig {
                ecam_base: 0x28_C000_0000,
                bus_min: 0,
                bus_max: 255,
                mmio32_base: 0x6000_0000,
                mmio32_size: 0x0FFF_0000,
                io_size: 0x1_0000,
                mmio64_base: 0x9_0000_0000,
                mmio64_size: 0x1F_0000_0000,
            },
            ccix: PciHostBridgeConfig {
                ecam_base: 0x2C_C000_0000,
                bus_min: 0,
                bus_max: 255,
                mmio32_base: 0x7000_0000,
                mmio32_size: 0x0FFF_0000,
                io_size: 0x1_0000,
                mmio64_base: 0x30_0000_0000,
                mmio64_size: 0x10_0000_0000,
            },
            mali_dxx_base: 0x2CC0_0000,
            mali_dxx_size: 0x2_0000,
            gop_buffer_base: 0xFF00_0000,
            gop_buffer_size: 0x80_0000,
        }
    }
}
