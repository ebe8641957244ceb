//! MM Variable Write Library
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::boxed::Box;
use core::sync::atomic::{AtomicBool, Ordering};

use patina_platform_sdk::error::{EfiError, Result};
use r_efi::efi;

use crate::protocol::{
    MmServices, SmmVariable, VariableAttributes, VariableStorageInfo, EDKII_SMM_EXIT_BOOT_SERVICES_PROTOCOL_GUID,
};

/// Variable write services for Standalone MM drivers.
///
/// The library is meant to live in a `static` and is usable once [`constructor`](Self::constructor) has run.
pub struct MmVariableWriteLib {
    smm_variable: spin::Once<&'static (dyn SmmVariable + Sync)>,
    at_runtime: AtomicBool,
}

impl Default for MmVariableWriteLib {
    fn default() -> Self {
        Self::new()
    }
}

impl MmVariableWriteLib {
    pub const fn new() -> Self {
        Self { smm_variable: spin::Once::new(), at_runtime: AtomicBool::new(false) }
    }

    /// Locates the SMM variable protocol and registers for the exit boot services notification.
    ///
    /// A protocol that cannot be located is reported without registering the notification.
    pub fn constructor(&'static self, mm: &dyn MmServices) -> Result<()> {
        let smm_variable = mm.locate_smm_variable().inspect_err(|err| {
            log::error!(target: "mm_variable", "Failed to locate the SMM variable protocol: {err:?}");
        })?;
        self.smm_variable.call_once(|| smm_variable);

        mm.register_protocol_notify(
            &EDKII_SMM_EXIT_BOOT_SERVICES_PROTOCOL_GUID,
            Box::new(move |protocol: &efi::Guid, handle: efi::Handle| {
                self.exit_boot_services_callback(protocol, handle)
            }),
        )
        .inspect_err(|err| {
            log::error!(target: "mm_variable", "Failed to register the exit boot services notify: {err:?}");
        })
    }

    fn exit_boot_services_callback(&self, _protocol: &efi::Guid, _handle: efi::Handle) -> Result<()> {
        log::info!(target: "mm_variable", "Exit boot services, only runtime variables may be written.");
        self.at_runtime.store(true, Ordering::Release);
        Ok(())
    }

    /// Returns true once boot services have been exited.
    pub fn efi_at_runtime(&self) -> bool {
        self.at_runtime.load(Ordering::Acquire)
    }

    fn smm_variable(&self) -> Result<&'static (dyn SmmVariable + Sync)> {
        self.smm_variable.get().copied().ok_or_else(|| {
            log::error!(target: "mm_variable", "The SMM variable protocol has not been located.");
            EfiError::NotReady
        })
    }

    /// Sets a UEFI variable.
    ///
    /// At runtime only variables with [`VariableAttributes::RUNTIME_ACCESS`] may be written.
    pub fn set_variable(
        &self,
        name: &[u16],
        vendor_guid: &efi::Guid,
        attributes: VariableAttributes,
        data: &[u8],
    ) -> Result<()> {
        let smm_variable = self.smm_variable()?;

        if self.efi_at_runtime() && !attributes.contains(VariableAttributes::RUNTIME_ACCESS) {
            log::warn!(target: "mm_variable", "Variable without runtime access written at runtime: {attributes:?}");
            return Err(EfiError::InvalidParameter);
        }

        smm_variable.set_variable(name, vendor_guid, attributes, data)
    }

    /// Returns the variable storage information for variables with `attributes`.
    pub fn query_variable_info(&self, attributes: VariableAttributes) -> Result<VariableStorageInfo> {
        self.smm_variable()?.query_variable_info(attributes)
    }

    /// Variable locking is not available through this library.
    pub fn is_variable_request_to_lock_supported(&self) -> bool {
        false
    }

    pub fn variable_request_to_lock(&self, _name: &[u16], _vendor_guid: &efi::Guid) -> Result<()> {
        Err(EfiError::Unsupported)
    }
}
