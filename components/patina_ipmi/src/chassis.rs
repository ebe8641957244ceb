//! IPMI NetFn Chassis commands.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::vec;
use core::mem::size_of;

use patina_platform_sdk::error::Result;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{
    completion_code::CompletionCode,
    transport::{IpmiTransport, IPMI_NETFN_CHASSIS},
};

pub const IPMI_CHASSIS_GET_CAPABILITIES: u8 = 0x00;
pub const IPMI_CHASSIS_GET_STATUS: u8 = 0x01;
pub const IPMI_CHASSIS_CONTROL: u8 = 0x02;
pub const IPMI_CHASSIS_SET_POWER_RESTORE_POLICY: u8 = 0x06;
pub const IPMI_CHASSIS_SET_SYSTEM_BOOT_OPTIONS: u8 = 0x08;
pub const IPMI_CHASSIS_GET_SYSTEM_BOOT_OPTIONS: u8 = 0x09;

/// Chassis Control request values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChassisControl {
    PowerDown = 0x00,
    PowerUp = 0x01,
    PowerCycle = 0x02,
    HardReset = 0x03,
    PulseDiagnosticInterrupt = 0x04,
    SoftShutdown = 0x05,
}

/// Power Restore Policy values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerRestorePolicy {
    /// Chassis stays powered off after AC is restored.
    AlwaysOff = 0x00,
    /// Power is restored to the state it was in when AC was lost.
    Previous = 0x01,
    /// Chassis always powers up after AC is restored.
    AlwaysOn = 0x02,
    /// Only query the supported policies.
    NoChange = 0x03,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct GetChassisCapabilitiesResponse {
    pub completion_code: u8,
    pub capabilities_flags: u8,
    pub chassis_fru_info_device_address: u8,
    pub chassis_sdr_device_address: u8,
    pub chassis_sel_device_address: u8,
    pub chassis_system_management_device_address: u8,
    pub chassis_bridge_device_address: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct GetChassisStatusResponse {
    pub completion_code: u8,
    pub current_power_state: u8,
    pub last_power_event: u8,
    pub misc_chassis_state: u8,
    pub front_panel_button_capabilities: u8,
}

impl GetChassisStatusResponse {
    /// Bit 0 of the current power state.
    pub const fn power_is_on(&self) -> bool {
        self.current_power_state & 0x01 != 0
    }

    /// Bits 6:5 of the current power state.
    pub const fn power_restore_policy(&self) -> u8 {
        (self.current_power_state >> 5) & 0x03
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ChassisControlRequest {
    pub chassis_control: u8,
}

impl ChassisControlRequest {
    pub const fn new(control: ChassisControl) -> Self {
        Self { chassis_control: control as u8 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct SetPowerRestorePolicyRequest {
    pub power_restore_policy: u8,
}

impl SetPowerRestorePolicyRequest {
    pub const fn new(policy: PowerRestorePolicy) -> Self {
        Self { power_restore_policy: policy as u8 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct SetPowerRestorePolicyResponse {
    pub completion_code: u8,
    /// Bit mask of the policies the chassis supports, bit n set for policy n.
    pub power_restore_policy_support: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct SetBootOptionsResponse {
    pub completion_code: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct GetBootOptionsRequest {
    /// Bits 6:0 select the parameter.
    pub parameter_selector: u8,
    pub set_selector: u8,
    pub block_selector: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct GetBootOptionsResponseHeader {
    pub completion_code: u8,
    pub parameter_version: u8,
    /// Bit 7 set marks the parameter invalid or locked. Bits 6:0 echo the selector.
    pub parameter_valid: u8,
}

macro_rules! impl_completion_code {
    ($($response:ty),+ $(,)?) => {
        $(
            impl $response {
                pub const fn completion_code(&self) -> CompletionCode {
                    CompletionCode(self.completion_code)
                }
            }
        )+
    };
}

impl_completion_code!(
    GetChassisCapabilitiesResponse,
    GetChassisStatusResponse,
    SetPowerRestorePolicyResponse,
    SetBootOptionsResponse,
    GetBootOptionsResponseHeader,
);

/// The Chassis commands, available on every [`IpmiTransport`].
pub trait IpmiChassis {
    /// Returns which chassis management functions are present and the addresses used to reach them.
    fn get_chassis_capabilities(&self) -> Result<GetChassisCapabilitiesResponse>;

    /// Returns the high-level status of the chassis and main power subsystem.
    fn get_chassis_status(&self) -> Result<GetChassisStatusResponse>;

    /// Powers the chassis up or down, or resets it. Returns the completion code.
    fn chassis_control(&self, request: &ChassisControlRequest) -> Result<CompletionCode>;

    /// Configures the power restore policy.
    fn set_power_restore_policy(&self, request: &SetPowerRestorePolicyRequest) -> Result<SetPowerRestorePolicyResponse>;

    /// Sets a boot option parameter that directs the boot following the next power up or reset.
    ///
    /// `parameter_selector` is the first request byte (bit 7 marks the parameter invalid). `parameter_data` follows it.
    fn set_system_boot_options(&self, parameter_selector: u8, parameter_data: &[u8]) -> Result<SetBootOptionsResponse>;

    /// Reads a boot option parameter previously set with [`set_system_boot_options`](Self::set_system_boot_options).
    ///
    /// The parameter data is copied into `parameter_data`. Returns the response header and the number of parameter
    /// bytes received.
    fn get_system_boot_options(
        &self,
        request: &GetBootOptionsRequest,
        parameter_data: &mut [u8],
    ) -> Result<(GetBootOptionsResponseHeader, usize)>;
}

impl<T: IpmiTransport + ?Sized> IpmiChassis for T {
    fn get_chassis_capabilities(&self) -> Result<GetChassisCapabilitiesResponse> {
        submit_fixed(self, IPMI_CHASSIS_GET_CAPABILITIES, &[])
    }

    fn get_chassis_status(&self) -> Result<GetChassisStatusResponse> {
        submit_fixed(self, IPMI_CHASSIS_GET_STATUS, &[])
    }

    fn chassis_control(&self, request: &ChassisControlRequest) -> Result<CompletionCode> {
        let mut completion_code = 0u8;
        let written = self.submit_command(
            IPMI_NETFN_CHASSIS,
            IPMI_CHASSIS_CONTROL,
            request.as_bytes(),
            core::slice::from_mut(&mut completion_code),
        )?;
        check_length(IPMI_CHASSIS_CONTROL, written, 1);
        Ok(CompletionCode(completion_code))
    }

    fn set_power_restore_policy(
        &self,
        request: &SetPowerRestorePolicyRequest,
    ) -> Result<SetPowerRestorePolicyResponse> {
        submit_fixed(self, IPMI_CHASSIS_SET_POWER_RESTORE_POLICY, request.as_bytes())
    }

    fn set_system_boot_options(&self, parameter_selector: u8, parameter_data: &[u8]) -> Result<SetBootOptionsResponse> {
        let mut request = vec![0u8; 1 + parameter_data.len()];
        request[0] = parameter_selector;
        request[1..].copy_from_slice(parameter_data);
        submit_fixed(self, IPMI_CHASSIS_SET_SYSTEM_BOOT_OPTIONS, &request)
    }

    fn get_system_boot_options(
        &self,
        request: &GetBootOptionsRequest,
        parameter_data: &mut [u8],
    ) -> Result<(GetBootOptionsResponseHeader, usize)> {
        let header_size = size_of::<GetBootOptionsResponseHeader>();
        let mut response = vec![0u8; header_size + parameter_data.len()];
        let written = self.submit_command(
            IPMI_NETFN_CHASSIS,
            IPMI_CHASSIS_GET_SYSTEM_BOOT_OPTIONS,
            request.as_bytes(),
            &mut response,
        )?;
        check_length(IPMI_CHASSIS_GET_SYSTEM_BOOT_OPTIONS, written, header_size);

        let (header, data) = response.split_at(header_size);
        let header = GetBootOptionsResponseHeader::read_from_bytes(header).unwrap_or_default();
        let received = written.saturating_sub(header_size).min(parameter_data.len());
        parameter_data[..received].copy_from_slice(&data[..received]);
        Ok((header, received))
    }
}

fn submit_fixed<T, R>(transport: &T, command: u8, request: &[u8]) -> Result<R>
where
    T: IpmiTransport + ?Sized,
    R: FromBytes + IntoBytes + Immutable + KnownLayout,
{
    let mut response = R::new_zeroed();
    let written = transport.submit_command(IPMI_NETFN_CHASSIS, command, request, response.as_mut_bytes())?;
    check_length(command, written, size_of::<R>());
    Ok(response)
}

fn check_length(command: u8, written: usize, expected: usize) {
    if written < expected {
        log::warn!(
            target: "ipmi",
            "Chassis command {command:#04x} returned {written} bytes, expected at least {expected}."
        );
    }
}
