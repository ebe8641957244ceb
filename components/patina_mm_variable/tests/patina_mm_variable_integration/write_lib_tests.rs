//! Variable write library tests across the exit boot services transition.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use patina_mm_variable::{
    protocol::{SmmVariable, VariableAttributes, EDKII_SMM_EXIT_BOOT_SERVICES_PROTOCOL_GUID},
    MmVariableWriteLib,
};
use patina_platform_sdk::error::EfiError;
use r_efi::efi;

use super::variable_store::{init_logger, FakeMmServices, InMemoryVariableStore};

const VENDOR_GUID: efi::Guid =
    efi::Guid::from_fields(0x8be4df61, 0x93ca, 0x11d2, 0xaa, 0x0d, &[0x00, 0xe0, 0x98, 0x03, 0x2b, 0x8c]);

fn name(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(core::iter::once(0)).collect()
}

fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

#[test]
fn test_boot_to_runtime_transition() {
    init_logger();
    let store = leak(InMemoryVariableStore::new(0x100));
    let mm = FakeMmServices::new(Some(store));
    let lib = leak(MmVariableWriteLib::new());

    lib.constructor(&mm).unwrap();
    assert_eq!(mm.notify_count(), 1);

    let boot_only = VariableAttributes::NON_VOLATILE | VariableAttributes::BOOTSERVICE_ACCESS;
    let runtime = boot_only | VariableAttributes::RUNTIME_ACCESS;

    lib.set_variable(&name("BootOnly"), &VENDOR_GUID, boot_only, &[1, 2, 3]).unwrap();
    assert!(store.contains(&name("BootOnly"), &VENDOR_GUID));

    assert_eq!(mm.install_protocol(&EDKII_SMM_EXIT_BOOT_SERVICES_PROTOCOL_GUID), 1);
    assert!(lib.efi_at_runtime());

    assert_eq!(
        lib.set_variable(&name("BootOnly2"), &VENDOR_GUID, boot_only, &[4]),
        Err(EfiError::InvalidParameter)
    );
    assert!(!store.contains(&name("BootOnly2"), &VENDOR_GUID));

    lib.set_variable(&name("Runtime"), &VENDOR_GUID, runtime, &[5, 6]).unwrap();
    let mut buffer = [0u8; 8];
    assert_eq!(store.get_variable(&name("Runtime"), &VENDOR_GUID, &mut buffer), Ok((runtime, 2)));
    assert_eq!(&buffer[..2], &[5, 6]);
}

#[test]
fn test_other_protocols_do_not_switch_to_runtime() {
    init_logger();
    let store = leak(InMemoryVariableStore::new(0x100));
    let mm = FakeMmServices::new(Some(store));
    let lib = leak(MmVariableWriteLib::new());
    lib.constructor(&mm).unwrap();

    assert_eq!(mm.install_protocol(&VENDOR_GUID), 0);
    assert!(!lib.efi_at_runtime());
}

#[test]
fn test_store_errors_pass_through() {
    init_logger();
    let store = leak(InMemoryVariableStore::new(4));
    let mm = FakeMmServices::new(Some(store));
    let lib = leak(MmVariableWriteLib::new());
    lib.constructor(&mm).unwrap();

    let attributes = VariableAttributes::NON_VOLATILE | VariableAttributes::BOOTSERVICE_ACCESS;
    assert_eq!(
        lib.set_variable(&name("TooBig"), &VENDOR_GUID, attributes, &[0; 5]),
        Err(EfiError::OutOfResources)
    );
    assert_eq!(lib.set_variable(&name("Missing"), &VENDOR_GUID, attributes, &[]), Err(EfiError::NotFound));

    lib.set_variable(&name("Small"), &VENDOR_GUID, attributes, &[1, 2, 3]).unwrap();
    let info = lib.query_variable_info(attributes).unwrap();
    assert_eq!(info.maximum_variable_storage_size, 4);
    assert_eq!(info.remaining_variable_storage_size, 1);

    lib.set_variable(&name("Small"), &VENDOR_GUID, attributes, &[]).unwrap();
    assert_eq!(lib.query_variable_info(attributes).unwrap().remaining_variable_storage_size, 4);
}

#[test]
fn test_missing_protocol_leaves_library_not_ready() {
    init_logger();
    let mm = FakeMmServices::new(None);
    let lib = leak(MmVariableWriteLib::new());

    assert_eq!(lib.constructor(&mm), Err(EfiError::NotFound));
    assert_eq!(mm.notify_count(), 0);
    assert_eq!(
        lib.set_variable(&name("Var"), &VENDOR_GUID, VariableAttributes::RUNTIME_ACCESS, &[1]),
        Err(EfiError::NotReady)
    );
}
