//! Standalone MM Variable Write Library
//!
//! Phase specific access to the UEFI variable write services from Standalone MM. The library locates the SMM
//! variable protocol when it is constructed and tracks whether the system has left boot services, after which only
//! runtime accessible variables may be written.
//!
//! ```rust,ignore
//! use patina_mm_variable::{protocol::VariableAttributes, MmVariableWriteLib};
//!
//! static VARIABLE_WRITE_LIB: MmVariableWriteLib = MmVariableWriteLib::new();
//!
//! fn entry(mm: &dyn patina_mm_variable::protocol::MmServices) -> patina_platform_sdk::error::Result<()> {
//!     VARIABLE_WRITE_LIB.constructor(mm)?;
//!     VARIABLE_WRITE_LIB.set_variable(
//!         &NAME,
//!         &VENDOR_GUID,
//!         VariableAttributes::NON_VOLATILE | VariableAttributes::BOOTSERVICE_ACCESS,
//!         &[1],
//!     )
//! }
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(all(not(feature = "std"), not(test), not(feature = "mockall")), no_std)]

extern crate alloc;

pub mod protocol;
pub mod variable_write;

pub use variable_write::MmVariableWriteLib;
