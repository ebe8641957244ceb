//! Chassis command tests against the simulated BMC.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use patina_ipmi::{chassis::*, completion_code::CompletionCode, transport::IPMI_NETFN_CHASSIS};
use patina_platform_sdk::error::EfiError;

use super::simulated_bmc::{init_logger, SimulatedBmc};

#[test]
fn test_power_cycle_sequence() {
    init_logger();
    let bmc = SimulatedBmc::new();

    let code = bmc.chassis_control(&ChassisControlRequest::new(ChassisControl::PowerDown)).unwrap();
    assert!(code.is_success());
    assert!(!bmc.powered_on());
    assert!(!bmc.get_chassis_status().unwrap().power_is_on());

    let code = bmc.chassis_control(&ChassisControlRequest::new(ChassisControl::PowerUp)).unwrap();
    assert!(code.is_success());
    assert!(bmc.get_chassis_status().unwrap().power_is_on());

    assert_eq!(
        bmc.commands(),
        vec![
            (IPMI_NETFN_CHASSIS, IPMI_CHASSIS_CONTROL),
            (IPMI_NETFN_CHASSIS, IPMI_CHASSIS_GET_STATUS),
            (IPMI_NETFN_CHASSIS, IPMI_CHASSIS_CONTROL),
            (IPMI_NETFN_CHASSIS, IPMI_CHASSIS_GET_STATUS),
        ]
    );
}

#[test]
fn test_invalid_chassis_control_reports_completion_code() {
    init_logger();
    let bmc = SimulatedBmc::new();
    let code = bmc.chassis_control(&ChassisControlRequest { chassis_control: 0x7F }).unwrap();
    assert_eq!(code, CompletionCode::INVALID_DATA_FIELD_IN_REQUEST);
}

#[test]
fn test_power_restore_policy_round_trip_through_status() {
    init_logger();
    let bmc = SimulatedBmc::new();

    let response =
        bmc.set_power_restore_policy(&SetPowerRestorePolicyRequest::new(PowerRestorePolicy::Previous)).unwrap();
    assert!(response.completion_code().is_success());
    assert_eq!(response.power_restore_policy_support, 0x07);

    let status = bmc.get_chassis_status().unwrap();
    assert_eq!(status.power_restore_policy(), PowerRestorePolicy::Previous as u8);

    // Querying with NoChange leaves the policy alone.
    bmc.set_power_restore_policy(&SetPowerRestorePolicyRequest::new(PowerRestorePolicy::NoChange)).unwrap();
    assert_eq!(bmc.get_chassis_status().unwrap().power_restore_policy(), PowerRestorePolicy::Previous as u8);
}

#[test]
fn test_boot_options_set_then_get() {
    init_logger();
    let bmc = SimulatedBmc::new();

    let boot_flags = [0x80, 0x04, 0x00, 0x00, 0x00];
    let response = bmc.set_system_boot_options(0x05, &boot_flags).unwrap();
    assert!(response.completion_code().is_success());

    let mut data = [0u8; 5];
    let request = GetBootOptionsRequest { parameter_selector: 0x05, set_selector: 0, block_selector: 0 };
    let (header, received) = bmc.get_system_boot_options(&request, &mut data).unwrap();
    assert!(header.completion_code().is_success());
    assert_eq!(header.parameter_valid & 0x7F, 0x05);
    assert_eq!(received, 5);
    assert_eq!(data, boot_flags);
}

#[test]
fn test_get_unknown_boot_option_returns_completion_code_only() {
    init_logger();
    let bmc = SimulatedBmc::new();

    let mut data = [0xAAu8; 4];
    let request = GetBootOptionsRequest { parameter_selector: 0x10, ..Default::default() };
    let (header, received) = bmc.get_system_boot_options(&request, &mut data).unwrap();
    assert_eq!(header.completion_code(), CompletionCode::REQUEST_PARAMETER_NOT_SUPPORTED);
    assert_eq!(received, 0);
    assert_eq!(data, [0xAA; 4]);
}

#[test]
fn test_capabilities() {
    init_logger();
    let bmc = SimulatedBmc::new();
    let capabilities = bmc.get_chassis_capabilities().unwrap();
    assert!(capabilities.completion_code().is_success());
    assert_eq!(capabilities.capabilities_flags, 0x0F);
    assert_eq!(capabilities.chassis_bridge_device_address, 0x20);
}

#[test]
fn test_unresponsive_bmc_surfaces_transport_error() {
    init_logger();
    let mut bmc = SimulatedBmc::new();
    bmc.responding = false;
    assert_eq!(bmc.get_chassis_status(), Err(EfiError::Timeout));
    assert_eq!(bmc.set_system_boot_options(0x05, &[]), Err(EfiError::Timeout));
}
