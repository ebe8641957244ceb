//! I/O Trap Dispatcher
//!
//! Manages the [`IO_TRAP_HANDLER_NUM`] trap registers. A register is either dedicated to one caller supplied range
//! or "merged": backed by a [`IO_TRAP_MERGED_LENGTH`] byte window allocated from the I/O space and shared by every
//! callback that registered without an address.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::vec::Vec;

use patina_platform_sdk::error::{EfiError, Result};

use crate::{
    hardware::IoTrapHardware,
    protocol::{
        DispatchHandle, IoSpaceAllocator, IoTrapCallback, IoTrapContext, IoTrapExCallback, IoTrapExDispatch,
        IoTrapExRegisterContext, IoTrapRegisterContext, IoTrapType, PchSmmIoTrapControl, SmmIoTrapDispatch2,
        IO_TRAP_INSTANCE_SIGNATURE,
    },
    register::{IoTrapRegister, TRSR_CTSS_MASK},
    IO_TRAP_HANDLER_NUM,
};

/// Size of the I/O window backing a merged trap register.
pub const IO_TRAP_MERGED_LENGTH: u16 = 0x100;
/// Largest range a single registration may trap.
pub const IO_TRAP_MAX_LENGTH: u16 = 0x100;
const IO_TRAP_MIN_LENGTH: u16 = 4;

#[derive(Clone)]
enum RecordCallback {
    IoTrap(IoTrapCallback),
    IoTrapEx(IoTrapExCallback),
}

struct IoTrapRecord {
    handle: DispatchHandle,
    /// The context as registered, with the assigned address.
    context: IoTrapExRegisterContext,
    /// Length of the trapped range, rounded up to a power of two.
    length: u16,
    callback: RecordCallback,
}

impl IoTrapRecord {
    fn matches(&self, address: u16, is_write: bool) -> bool {
        let start = self.context.address as u32;
        (start..start + self.length as u32).contains(&(address as u32)) && self.context.trap_type.accepts(is_write)
    }
}

#[derive(Default)]
struct TrapEntry {
    records: Vec<IoTrapRecord>,
    in_use: bool,
    /// Base and length of the range programmed into the register.
    base: u16,
    length: u16,
    /// Bytes of the merged window handed out so far.
    used_length: u16,
    /// Only one callback may use the register.
    merge_disable: bool,
    /// The caller reserved the range in ACPI; otherwise the dispatcher allocated it.
    reserved_acpi_io_resource: bool,
}

impl TrapEntry {
    fn overlaps(&self, address: u16, length: u16) -> bool {
        let (start, end) = (address as u32, address as u32 + length as u32);
        self.in_use && (start < self.base as u32 + self.length as u32) && (self.base as u32) < end
    }

    /// Offset of the next `length` aligned chunk of the merged window, if it fits.
    fn next_merged_offset(&self, length: u16) -> Option<u16> {
        if !self.in_use || self.merge_disable {
            return None;
        }
        let offset = self.used_length.checked_add(length - 1)? & !(length - 1);
        (offset as u32 + length as u32 <= IO_TRAP_MERGED_LENGTH as u32).then_some(offset)
    }
}

struct DispatcherState {
    entries: [TrapEntry; IO_TRAP_HANDLER_NUM],
    next_serial: u32,
    ready_to_lock: bool,
}

impl DispatcherState {
    fn find_record(&self, handle: DispatchHandle) -> Option<(usize, usize)> {
        self.entries.iter().enumerate().find_map(|(entry_index, entry)| {
            entry.records.iter().position(|record| record.handle == handle).map(|index| (entry_index, index))
        })
    }

    /// Finds the register of a pausable trap.
    fn control_register(&self, handle: DispatchHandle) -> Result<usize> {
        let (entry_index, _) = self.find_record(handle).ok_or(EfiError::InvalidParameter)?;
        let entry = &self.entries[entry_index];
        if !entry.merge_disable || entry.base == 0 {
            return Err(EfiError::InvalidParameter);
        }
        Ok(entry_index)
    }
}

/// The PCH I/O trap dispatcher.
pub struct IoTrapDispatcher<H: IoTrapHardware, A: IoSpaceAllocator> {
    hardware: H,
    allocator: A,
    state: spin::Mutex<DispatcherState>,
}

impl<H: IoTrapHardware, A: IoSpaceAllocator> IoTrapDispatcher<H, A> {
    pub fn new(hardware: H, allocator: A) -> Self {
        log::info!(target: "io_trap", "I/O trap dispatcher {:#010x} installed.", IO_TRAP_INSTANCE_SIGNATURE);
        Self {
            hardware,
            allocator,
            state: spin::Mutex::new(DispatcherState {
                entries: core::array::from_fn(|_| TrapEntry::default()),
                next_serial: 1,
                ready_to_lock: false,
            }),
        }
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// Denies every later registration change.
    pub fn smm_ready_to_lock(&self) {
        self.state.lock().ready_to_lock = true;
    }

    /// Number of trap registers in use.
    pub fn registers_in_use(&self) -> usize {
        self.state.lock().entries.iter().filter(|entry| entry.in_use).count()
    }

    fn register_record(
        &self,
        callback: RecordCallback,
        mut context: IoTrapExRegisterContext,
        dedicated_only: bool,
    ) -> Result<(DispatchHandle, u16)> {
        let mut state = self.state.lock();
        if state.ready_to_lock {
            log::error!(target: "io_trap", "Register is not allowed after SMM ready to lock.");
            return Err(EfiError::AccessDenied);
        }

        if (context.address == 0 && context.length == 0) || context.length > IO_TRAP_MAX_LENGTH {
            log::error!(target: "io_trap", "Invalid I/O trap range {:#x}/{:#x}", context.address, context.length);
            return Err(EfiError::InvalidParameter);
        }
        let length = context.length.max(IO_TRAP_MIN_LENGTH).next_power_of_two();

        let address = if context.address == 0 {
            if dedicated_only {
                log::error!(target: "io_trap", "A dedicated I/O trap needs an address.");
                return Err(EfiError::InvalidParameter);
            }
            self.claim_merged_range(&mut state, length)?
        } else {
            self.claim_dedicated_register(&mut state, &context, length)?;
            context.address
        };
        context.address = address;

        let handle = DispatchHandle::new(state.next_serial);
        state.next_serial = state.next_serial.wrapping_add(1);

        let entry_index = state
            .entries
            .iter()
            .position(|entry| entry.overlaps(address, length))
            .ok_or(EfiError::OutOfResources)?;
        state.entries[entry_index].records.push(IoTrapRecord { handle, context, length, callback });

        log::info!(
            target: "io_trap",
            "I/O trap {:?} registered at {address:#06x}/{length:#x} on register {entry_index}",
            context.trap_type
        );
        Ok((handle, address))
    }

    fn claim_merged_range(&self, state: &mut DispatcherState, length: u16) -> Result<u16> {
        if let Some((entry, offset)) =
            state.entries.iter_mut().find_map(|entry| entry.next_merged_offset(length).map(|offset| (entry, offset)))
        {
            entry.used_length = offset + length;
            return Ok(entry.base + offset);
        }

        let (index, entry) = state.entries.iter_mut().enumerate().find(|(_, entry)| !entry.in_use).ok_or_else(|| {
            log::error!(target: "io_trap", "No I/O trap register left for a merged range.");
            EfiError::OutOfResources
        })?;

        let base = self.allocator.allocate_io(IO_TRAP_MERGED_LENGTH, IO_TRAP_MERGED_LENGTH).map_err(|err| {
            log::error!(target: "io_trap", "Failed to allocate the merged I/O trap window: {err:?}");
            EfiError::OutOfResources
        })?;

        self.hardware.write_trap_register(
            index,
            IoTrapRegister::for_range(base, IO_TRAP_MERGED_LENGTH, IoTrapType::ReadWrite),
        );
        *entry = TrapEntry {
            records: Vec::new(),
            in_use: true,
            base,
            length: IO_TRAP_MERGED_LENGTH,
            used_length: length,
            merge_disable: false,
            reserved_acpi_io_resource: false,
        };
        Ok(base)
    }

    fn claim_dedicated_register(
        &self,
        state: &mut DispatcherState,
        context: &IoTrapExRegisterContext,
        length: u16,
    ) -> Result<()> {
        if context.address % length != 0 || context.address as u32 + length as u32 > u16::MAX as u32 + 1 {
            log::error!(target: "io_trap", "I/O trap address {:#x} is not aligned to {length:#x}", context.address);
            return Err(EfiError::InvalidParameter);
        }

        if state.entries.iter().any(|entry| entry.overlaps(context.address, length)) {
            log::error!(target: "io_trap", "I/O trap range {:#x}/{length:#x} is already in use", context.address);
            return Err(EfiError::InvalidParameter);
        }

        let (index, entry) = state.entries.iter_mut().enumerate().find(|(_, entry)| !entry.in_use).ok_or_else(|| {
            log::error!(target: "io_trap", "No I/O trap register left for {:#x}", context.address);
            EfiError::OutOfResources
        })?;

        let register = IoTrapRegister::for_range(context.address, length, context.trap_type)
            .with_byte_en(context.byte_enable & 0xF)
            .with_byte_en_mask(context.byte_enable_mask & 0xF);
        self.hardware.write_trap_register(index, register);

        *entry = TrapEntry {
            records: Vec::new(),
            in_use: true,
            base: context.address,
            length,
            used_length: length,
            merge_disable: true,
            reserved_acpi_io_resource: true,
        };
        Ok(())
    }

    fn unregister_record(&self, handle: DispatchHandle, expect_ex: bool) -> Result<()> {
        let mut state = self.state.lock();
        if state.ready_to_lock {
            log::error!(target: "io_trap", "Unregister is not allowed after SMM ready to lock.");
            return Err(EfiError::AccessDenied);
        }
        if !handle.has_record_signature() {
            return Err(EfiError::InvalidParameter);
        }

        let (entry_index, record_index) = state.find_record(handle).ok_or(EfiError::InvalidParameter)?;
        let entry = &mut state.entries[entry_index];
        if matches!(entry.records[record_index].callback, RecordCallback::IoTrapEx(_)) != expect_ex {
            return Err(EfiError::InvalidParameter);
        }
        entry.records.remove(record_index);
        log::info!(target: "io_trap", "I/O trap {handle:?} unregistered from register {entry_index}");

        if !entry.records.is_empty() {
            return Ok(());
        }

        self.hardware.write_trap_register(entry_index, IoTrapRegister::new());
        let released = core::mem::take(entry);
        // The trap is gone either way. A window the allocator refuses back is only leaked.
        if !released.reserved_acpi_io_resource {
            if let Err(err) = self.allocator.free_io(released.base, released.length) {
                log::error!(target: "io_trap", "Failed to free I/O window {:#x}: {err:?}", released.base);
            }
        }
        Ok(())
    }

    /// Flips the enable bit of a dedicated register. The state lock is held across the read/modify/write.
    fn set_trap_enable(&self, handle: DispatchHandle, enable: bool) -> Result<()> {
        let state = self.state.lock();
        let index = state.control_register(handle)?;
        let register = self.hardware.read_trap_register(index);
        if register.trse() == enable {
            log::warn!(target: "io_trap", "I/O trap {handle:?} already {}", if enable { "running" } else { "paused" });
            return Err(EfiError::AccessDenied);
        }
        self.hardware.write_trap_register(index, register.with_trse(enable));
        Ok(())
    }

    /// Handles an I/O trap SMI, returning the number of callbacks invoked.
    ///
    /// No lock is held while a callback runs, so callbacks may unregister themselves.
    pub fn dispatch(&self) -> usize {
        let status = self.hardware.trap_status() & TRSR_CTSS_MASK;
        if status == 0 {
            return 0;
        }

        let cycle = self.hardware.trapped_cycle();
        let address = cycle.address();
        let is_write = cycle.is_write();
        let context = IoTrapContext { write_data: if is_write { self.hardware.trapped_data() } else { 0 } };
        log::trace!(target: "io_trap", "I/O trap SMI: status {status:#x}, address {address:#06x}, write {is_write}");

        let mut invoked = 0;
        for index in (0..IO_TRAP_HANDLER_NUM).filter(|index| status & (1 << index) != 0) {
            let pending: Vec<(DispatchHandle, IoTrapExRegisterContext, RecordCallback)> = self.state.lock().entries
                [index]
                .records
                .iter()
                .filter(|record| record.matches(address, is_write))
                .map(|record| (record.handle, record.context, record.callback.clone()))
                .collect();

            for (handle, register_context, callback) in pending {
                match callback {
                    RecordCallback::IoTrap(callback) => callback(handle, &context),
                    RecordCallback::IoTrapEx(callback) => callback(&register_context),
                }
                invoked += 1;
            }
        }

        self.hardware.clear_trap_status(status);
        invoked
    }
}

impl<H: IoTrapHardware, A: IoSpaceAllocator> SmmIoTrapDispatch2 for IoTrapDispatcher<H, A> {
    fn register(&self, callback: IoTrapCallback, context: &mut IoTrapRegisterContext) -> Result<DispatchHandle> {
        let (handle, address) = self.register_record(RecordCallback::IoTrap(callback), (*context).into(), false)?;
        context.address = address;
        Ok(handle)
    }

    fn unregister(&self, handle: DispatchHandle) -> Result<()> {
        self.unregister_record(handle, false)
    }
}

impl<H: IoTrapHardware, A: IoSpaceAllocator> IoTrapExDispatch for IoTrapDispatcher<H, A> {
    fn register_ex(&self, callback: IoTrapExCallback, context: IoTrapExRegisterContext) -> Result<DispatchHandle> {
        self.register_record(RecordCallback::IoTrapEx(callback), context, true).map(|(handle, _)| handle)
    }

    fn unregister_ex(&self, handle: DispatchHandle) -> Result<()> {
        self.unregister_record(handle, true)
    }
}

impl<H: IoTrapHardware, A: IoSpaceAllocator> PchSmmIoTrapControl for IoTrapDispatcher<H, A> {
    fn pause(&self, handle: DispatchHandle) -> Result<()> {
        self.set_trap_enable(handle, false)
    }

    fn resume(&self, handle: DispatchHandle) -> Result<()> {
        self.set_trap_enable(handle, true)
    }
}
