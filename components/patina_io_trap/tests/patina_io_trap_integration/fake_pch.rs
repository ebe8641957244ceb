//! Simulated PSTH trap logic and I/O space.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use std::sync::{Mutex, Once};

use patina_io_trap::{
    hardware::IoTrapHardware,
    protocol::IoSpaceAllocator,
    register::{IoTrapRegister, TrappedCycle},
    IO_TRAP_HANDLER_NUM,
};
use patina_platform_sdk::error::{EfiError, Result};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        if std::env::var("RUST_LOG").is_err() {
            builder.filter_level(log::LevelFilter::Off);
        }
        let _ = builder.is_test(true).try_init();
    });
}

#[derive(Default)]
struct PchState {
    registers: [u64; IO_TRAP_HANDLER_NUM],
    status: u32,
    cycle: u32,
    data: u32,
}

/// Trap registers that latch status for matching I/O cycles.
#[derive(Default)]
pub struct FakePch {
    state: Mutex<PchState>,
}

impl FakePch {
    /// Performs a byte I/O cycle. Returns true if any register trapped it.
    pub fn io_cycle(&self, address: u16, is_write: bool, data: u8) -> bool {
        let byte_enable = 1u8 << (address & 3);
        let mut state = self.state.lock().unwrap();

        let hits = state.registers.iter().enumerate().fold(0u32, |hits, (index, value)| {
            let register = IoTrapRegister::from(*value);
            if Self::traps(register, address, is_write, byte_enable) { hits | (1 << index) } else { hits }
        });
        if hits == 0 {
            return false;
        }

        state.status |= hits;
        state.cycle = TrappedCycle::new().with_ioa(address >> 2).with_ahbe(byte_enable).with_rw(!is_write).into();
        state.data = if is_write { (data as u32) << (8 * (address & 3)) } else { 0 };
        true
    }

    fn traps(register: IoTrapRegister, address: u16, is_write: bool, byte_enable: u8) -> bool {
        let ignored = ((register.adma() as u16) << 2) | 3;
        register.trse()
            && (address ^ register.address()) & !ignored == 0
            && (register.rwm() || register.rwio() != is_write)
            && (byte_enable ^ register.byte_en()) & !register.byte_en_mask() & 0xF == 0
    }

    pub fn register(&self, index: usize) -> IoTrapRegister {
        IoTrapRegister::from(self.state.lock().unwrap().registers[index])
    }

    pub fn pending_status(&self) -> u32 {
        self.state.lock().unwrap().status
    }
}

impl IoTrapHardware for FakePch {
    fn read_trap_register(&self, index: usize) -> IoTrapRegister {
        self.register(index)
    }

    fn write_trap_register(&self, index: usize, value: IoTrapRegister) {
        self.state.lock().unwrap().registers[index] = value.into();
    }

    fn trap_status(&self) -> u32 {
        self.state.lock().unwrap().status
    }

    fn clear_trap_status(&self, mask: u32) {
        self.state.lock().unwrap().status &= !mask;
    }

    fn trapped_cycle(&self) -> TrappedCycle {
        TrappedCycle::from(self.state.lock().unwrap().cycle)
    }

    fn trapped_data(&self) -> u32 {
        self.state.lock().unwrap().data
    }
}

/// Hands out aligned I/O windows from a fixed range.
pub struct FakeIoSpace {
    start: u16,
    end: u16,
    allocated: Mutex<Vec<(u16, u16)>>,
}

impl FakeIoSpace {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end, allocated: Mutex::new(Vec::new()) }
    }
}

impl IoSpaceAllocator for FakeIoSpace {
    fn allocate_io(&self, length: u16, alignment: u16) -> Result<u16> {
        let mut allocated = self.allocated.lock().unwrap();
        let mut base = self.start.next_multiple_of(alignment) as u32;
        while base + length as u32 <= self.end as u32 {
            let end = base + length as u32;
            if !allocated.iter().any(|(b, l)| (*b as u32) < end && base < *b as u32 + *l as u32) {
                allocated.push((base as u16, length));
                return Ok(base as u16);
            }
            base += alignment as u32;
        }
        Err(EfiError::OutOfResources)
    }

    fn free_io(&self, base: u16, length: u16) -> Result<()> {
        let mut allocated = self.allocated.lock().unwrap();
        let index = allocated.iter().position(|entry| *entry == (base, length)).ok_or(EfiError::NotFound)?;
        allocated.remove(index);
        Ok(())
    }
}
