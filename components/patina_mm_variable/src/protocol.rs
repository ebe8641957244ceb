//! MM Variable Protocols
//!
//! The MM services and protocols the variable write library consumes.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::boxed::Box;

#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use patina_platform_sdk::error::Result;
use r_efi::efi;

/// gEfiSmmVariableProtocolGuid
pub const SMM_VARIABLE_PROTOCOL_GUID: efi::Guid =
    efi::Guid::from_fields(0xed32d533, 0x99e6, 0x4209, 0x9c, 0xc0, &[0x2d, 0x72, 0xcd, 0xd9, 0x98, 0xa7]);

/// gEdkiiSmmExitBootServicesProtocolGuid
pub const EDKII_SMM_EXIT_BOOT_SERVICES_PROTOCOL_GUID: efi::Guid =
    efi::Guid::from_fields(0x296eb418, 0xc4c8, 0x4e05, 0xab, 0x59, &[0x39, 0xe8, 0xaf, 0x56, 0xf0, 0x0a]);

bitflags::bitflags! {
    /// UEFI variable attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VariableAttributes: u32 {
        const NON_VOLATILE = 0x0000_0001;
        const BOOTSERVICE_ACCESS = 0x0000_0002;
        const RUNTIME_ACCESS = 0x0000_0004;
        const HARDWARE_ERROR_RECORD = 0x0000_0008;
        const AUTHENTICATED_WRITE_ACCESS = 0x0000_0010;
        const TIME_BASED_AUTHENTICATED_WRITE_ACCESS = 0x0000_0020;
        const APPEND_WRITE = 0x0000_0040;
    }
}

/// Storage information returned by `QueryVariableInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VariableStorageInfo {
    pub maximum_variable_storage_size: u64,
    pub remaining_variable_storage_size: u64,
    pub maximum_variable_size: u64,
}

/// The SMM variable protocol.
///
/// Variable names are UCS-2 strings including the null terminator.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait SmmVariable {
    /// Reads a variable into `data`, returning its attributes and size.
    fn get_variable(&self, name: &[u16], vendor_guid: &efi::Guid, data: &mut [u8])
        -> Result<(VariableAttributes, usize)>;

    /// Writes a variable. Empty `data` deletes it.
    fn set_variable(
        &self,
        name: &[u16],
        vendor_guid: &efi::Guid,
        attributes: VariableAttributes,
        data: &[u8],
    ) -> Result<()>;

    fn query_variable_info(&self, attributes: VariableAttributes) -> Result<VariableStorageInfo>;
}

/// A protocol notification callback. It receives the protocol GUID and the handle the protocol was installed on.
pub type ProtocolNotify = Box<dyn Fn(&efi::Guid, efi::Handle) -> Result<()> + Send + Sync>;

/// The MM services table.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait MmServices {
    /// Locates the SMM variable protocol ([`SMM_VARIABLE_PROTOCOL_GUID`]).
    fn locate_smm_variable(&self) -> Result<&'static (dyn SmmVariable + Sync)>;

    /// Registers `notify` to run when `protocol` is installed.
    fn register_protocol_notify(&self, protocol: &efi::Guid, notify: ProtocolNotify) -> Result<()>;
}
