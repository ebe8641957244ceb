//! I/O Trap Protocols
//!
//! Registration contexts, callbacks and the interfaces the dispatcher produces for SMM drivers.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::sync::Arc;

#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use patina_platform_sdk::error::Result;

/// Signature of the dispatcher instance, 'IOTP'.
pub const IO_TRAP_INSTANCE_SIGNATURE: u32 = u32::from_le_bytes(*b"IOTP");
/// Signature of a callback record, 'ITRC'.
pub const IO_TRAP_RECORD_SIGNATURE: u32 = u32::from_le_bytes(*b"ITRC");

/// Direction of the I/O cycles to trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoTrapType {
    Write,
    Read,
    ReadWrite,
}

impl IoTrapType {
    /// Returns true if a cycle in the given direction should be handled.
    pub const fn accepts(self, is_write: bool) -> bool {
        match self {
            Self::Write => is_write,
            Self::Read => !is_write,
            Self::ReadWrite => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoTrapRegisterContext {
    /// I/O address to trap. Zero lets the dispatcher assign one.
    pub address: u16,
    pub length: u16,
    pub trap_type: IoTrapType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoTrapExRegisterContext {
    pub address: u16,
    pub length: u16,
    pub trap_type: IoTrapType,
    /// Byte enables to match.
    pub byte_enable: u8,
    /// Byte enables to ignore.
    pub byte_enable_mask: u8,
}

impl From<IoTrapRegisterContext> for IoTrapExRegisterContext {
    fn from(context: IoTrapRegisterContext) -> Self {
        Self {
            address: context.address,
            length: context.length,
            trap_type: context.trap_type,
            byte_enable: 0,
            byte_enable_mask: 0xF,
        }
    }
}

/// Context handed to an I/O trap callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoTrapContext {
    /// Data written by the trapped cycle. Zero for reads.
    pub write_data: u32,
}

/// Identifies a registered callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DispatchHandle(u64);

impl DispatchHandle {
    pub(crate) const fn new(serial: u32) -> Self {
        Self(((IO_TRAP_RECORD_SIGNATURE as u64) << 32) | serial as u64)
    }

    /// Returns false for handles this dispatcher could not have produced.
    pub const fn has_record_signature(self) -> bool {
        (self.0 >> 32) as u32 == IO_TRAP_RECORD_SIGNATURE
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }
}

pub type IoTrapCallback = Arc<dyn Fn(DispatchHandle, &IoTrapContext) + Send + Sync>;
pub type IoTrapExCallback = Arc<dyn Fn(&IoTrapExRegisterContext) + Send + Sync>;

/// The SMM I/O trap dispatch protocol.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait SmmIoTrapDispatch2 {
    /// Registers `callback` for the range in `context`.
    ///
    /// A zero address is replaced with the address the dispatcher assigned.
    fn register(&self, callback: IoTrapCallback, context: &mut IoTrapRegisterContext) -> Result<DispatchHandle>;

    fn unregister(&self, handle: DispatchHandle) -> Result<()>;
}

/// The I/O trap extension dispatch protocol, trapping on byte enables as well as address.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait IoTrapExDispatch {
    fn register_ex(&self, callback: IoTrapExCallback, context: IoTrapExRegisterContext) -> Result<DispatchHandle>;

    fn unregister_ex(&self, handle: DispatchHandle) -> Result<()>;
}

/// Runtime control of dedicated I/O traps.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait PchSmmIoTrapControl {
    /// Disables the SMI of the trap. Fails with `AccessDenied` if it is already paused.
    fn pause(&self, handle: DispatchHandle) -> Result<()>;

    /// Enables the SMI of the trap. Fails with `AccessDenied` if it is already running.
    fn resume(&self, handle: DispatchHandle) -> Result<()>;
}

/// Allocator for I/O space.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait IoSpaceAllocator {
    /// Allocates `length` bytes of I/O space aligned to `alignment`, returning the base.
    fn allocate_io(&self, length: u16, alignment: u16) -> Result<u16>;

    fn free_io(&self, base: u16, length: u16) -> Result<()>;
}
