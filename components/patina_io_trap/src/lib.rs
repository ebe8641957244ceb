//! PCH SMM I/O Trap Dispatcher
//!
//! The PCH provides four I/O trap registers. Each one raises an SMI when software touches an I/O range, and the
//! dispatcher in this crate shares those registers between SMM drivers:
//!
//! - [`protocol::SmmIoTrapDispatch2`] registers callbacks for an I/O range. A zero address lets the dispatcher pick
//!   the range from a 0x100 byte window that several callbacks share.
//! - [`protocol::IoTrapExDispatch`] registers callbacks that also filter on byte enables.
//! - [`protocol::PchSmmIoTrapControl`] pauses and resumes dedicated traps at runtime.
//!
//! [`dispatcher::IoTrapDispatcher::dispatch`] is the root I/O trap SMI handler. The registers are reached through
//! the [`hardware::IoTrapHardware`] trait, implemented for the PSTH private configuration registers by
//! [`hardware::PchIoTrapMmio`].
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(all(not(feature = "std"), not(test), not(feature = "mockall")), no_std)]

extern crate alloc;

pub mod config;
pub mod dispatcher;
pub mod hardware;
pub mod protocol;
pub mod register;

/// Number of I/O trap registers in the PCH.
pub const IO_TRAP_HANDLER_NUM: usize = 4;
