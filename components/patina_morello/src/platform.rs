//! Morello Platform Memory Map Constants
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use patina_platform_sdk::base::{SIZE_128KB, SIZE_1MB, SIZE_256KB, SIZE_2GB, SIZE_512KB, SIZE_64KB, SIZE_64MB};

/// Size of the first DRAM block. Local DDR beyond this size is mapped at the DRAM block 2 base.
pub const MORELLO_DRAM_BLOCK1_SIZE: u64 = SIZE_2GB;

// SubSystem Peripherals - UART0
pub const MORELLO_UART0_BASE: u64 = 0x2A40_0000;
pub const MORELLO_UART0_SZ: u64 = SIZE_64KB;

// SubSystem Peripherals - REFCLK CNTRead
pub const MORELLO_REFCLK_CNT_BASE: u64 = 0x2A43_0000;
pub const MORELLO_REFCLK_CNT_SZ: u64 = SIZE_64KB;

// SubSystem Peripherals - Generic Watchdog
pub const MORELLO_GENERIC_WDOG_BASE: u64 = 0x2A44_0000;
pub const MORELLO_GENERIC_WDOG_SZ: u64 = SIZE_128KB;

// SubSystem Peripherals - AP_REFCLK CNTCTL
pub const MORELLO_AP_REFCLK_CNT_BASE: u64 = 0x2A81_0000;
pub const MORELLO_AP_REFCLK_CNT_SZ: u64 = SIZE_64KB;

// SubSystem Peripherals - AP_REFCLK_NS CNTCTL
pub const MORELLO_AP_REFCLK_NS_CNT_BASE: u64 = 0x2A82_0000;
pub const MORELLO_AP_REFCLK_NS_CNT_SZ: u64 = SIZE_64KB;

// SubSystem Peripherals - GIC(600)
pub const MORELLO_GIC_BASE: u64 = 0x3000_0000;
pub const MORELLO_GIC_SZ: u64 = SIZE_256KB;
pub const MORELLO_GICITS_BASE: u64 = 0x3004_0000;
pub const MORELLO_GICITS_SZ: u64 = SIZE_512KB;
pub const MORELLO_GICR_BASE: u64 = 0x300C_0000;
pub const MORELLO_GICR_SZ: u64 = SIZE_1MB;

// SubSystem Peripherals - SMMU
pub const MORELLO_SMMU_BASE: u64 = 0x4F00_0000;
pub const MORELLO_SMMU_SZ: u64 = 0xE0_0000;

// SubSystem non-secure SRAM
pub const MORELLO_NON_SECURE_SRAM_BASE: u64 = 0x0600_0000;
pub const MORELLO_NON_SECURE_SRAM_SZ: u64 = SIZE_64KB;

// AXI Expansion peripherals
pub const MORELLO_EXP_PERIPH_BASE: u64 = 0x1C00_0000;
pub const MORELLO_EXP_PERIPH_SZ: u64 = 0x130_0000;

// AP QSPI flash device
pub const MORELLO_AP_QSPI_AHB_BASE: u64 = 0x1800_0000;
pub const MORELLO_AP_QSPI_AHB_SZ: u64 = SIZE_64MB;
