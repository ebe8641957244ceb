//! I/O Trap Register Layouts
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use bitfield_struct::bitfield;

use crate::protocol::IoTrapType;

/// PSTH offset of I/O trap register 0. Register `n` lives at `R_PSTH_PCR_TRPREG0 + 8 * n`.
pub const R_PSTH_PCR_TRPREG0: u64 = 0x1E80;
/// Trap status register; bit `n` is set when register `n` trapped a cycle. Write 1 to clear.
pub const R_PSTH_PCR_TRSR: u64 = 0x1E00;
/// Trapped cycle register.
pub const R_PSTH_PCR_TRCR: u64 = 0x1E10;
/// Trapped write data register.
pub const R_PSTH_PCR_TWDR: u64 = 0x1E18;

/// Mask of the status bits in [`R_PSTH_PCR_TRSR`].
pub const TRSR_CTSS_MASK: u32 = 0xF;

/// An I/O trap register.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct IoTrapRegister {
    /// Trap and SMI enable.
    pub trse: bool,
    #[bits(1)]
    pub reserved_0: u8,
    /// I/O address bits 15:2.
    #[bits(14)]
    pub addr: u16,
    #[bits(2)]
    pub reserved_1: u8,
    /// Address mask for bits 7:2. A set bit ignores that address bit.
    #[bits(6)]
    pub adma: u8,
    #[bits(8)]
    pub reserved_2: u8,
    /// Byte enables to match.
    #[bits(4)]
    pub byte_en: u8,
    /// Byte enables to ignore.
    #[bits(4)]
    pub byte_en_mask: u8,
    #[bits(8)]
    pub reserved_3: u8,
    /// Cycle direction to match: set for reads.
    pub rwio: bool,
    /// Ignore the cycle direction.
    pub rwm: bool,
    #[bits(14)]
    pub reserved_4: u16,
}

impl IoTrapRegister {
    /// An enabled trap on `address..address + length`. `length` is a power of two between 4 and 0x100.
    pub fn for_range(address: u16, length: u16, trap_type: IoTrapType) -> Self {
        let register = Self::new()
            .with_trse(true)
            .with_addr(address >> 2)
            .with_adma(((length.saturating_sub(1) >> 2) & 0x3F) as u8)
            .with_byte_en_mask(0xF);

        match trap_type {
            IoTrapType::Write => register.with_rwio(false).with_rwm(false),
            IoTrapType::Read => register.with_rwio(true).with_rwm(false),
            IoTrapType::ReadWrite => register.with_rwm(true),
        }
    }

    /// Base I/O address of the trapped range.
    pub fn address(&self) -> u16 {
        self.addr() << 2
    }

    /// Length of the trapped range.
    pub fn length(&self) -> u16 {
        ((self.adma() as u16) << 2) + 4
    }
}

/// The trapped cycle register.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct TrappedCycle {
    #[bits(2)]
    pub reserved_0: u8,
    /// Trapped I/O address bits 15:2.
    #[bits(14)]
    pub ioa: u16,
    /// Active high byte enables of the cycle.
    #[bits(4)]
    pub ahbe: u8,
    #[bits(4)]
    pub reserved_1: u8,
    /// Set for a read cycle.
    pub rw: bool,
    #[bits(7)]
    pub reserved_2: u8,
}

impl TrappedCycle {
    /// Address of the first enabled byte of the cycle.
    pub fn address(&self) -> u16 {
        let offset = if self.ahbe() == 0 { 0 } else { self.ahbe().trailing_zeros() as u16 };
        (self.ioa() << 2) + offset
    }

    pub fn is_write(&self) -> bool {
        !self.rw()
    }
}
