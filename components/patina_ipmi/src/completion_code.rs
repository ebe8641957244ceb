//! IPMI completion codes.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::fmt;

/// The first byte of every IPMI response.
///
/// Values outside the generic range (0x01-0x7E command specific, 0x80-0xBE OEM) are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionCode(pub u8);

impl CompletionCode {
    pub const NORMAL: Self = Self(0x00);
    pub const NODE_BUSY: Self = Self(0xC0);
    pub const INVALID_COMMAND: Self = Self(0xC1);
    pub const INVALID_COMMAND_FOR_LUN: Self = Self(0xC2);
    pub const TIMEOUT: Self = Self(0xC3);
    pub const OUT_OF_SPACE: Self = Self(0xC4);
    pub const RESERVATION_CANCELLED: Self = Self(0xC5);
    pub const REQUEST_DATA_TRUNCATED: Self = Self(0xC6);
    pub const REQUEST_DATA_LENGTH_INVALID: Self = Self(0xC7);
    pub const REQUEST_DATA_FIELD_LENGTH_LIMIT_EXCEEDED: Self = Self(0xC8);
    pub const PARAMETER_OUT_OF_RANGE: Self = Self(0xC9);
    pub const CANNOT_RETURN_NUMBER_OF_REQUESTED_DATA_BYTES: Self = Self(0xCA);
    pub const REQUESTED_DATA_NOT_PRESENT: Self = Self(0xCB);
    pub const INVALID_DATA_FIELD_IN_REQUEST: Self = Self(0xCC);
    pub const COMMAND_ILLEGAL_FOR_SENSOR_OR_RECORD_TYPE: Self = Self(0xCD);
    pub const COMMAND_RESPONSE_COULD_NOT_BE_PROVIDED: Self = Self(0xCE);
    pub const CANNOT_EXECUTE_DUPLICATED_REQUEST: Self = Self(0xCF);
    pub const SDR_REPOSITORY_IN_UPDATE_MODE: Self = Self(0xD0);
    pub const DEVICE_IN_FIRMWARE_UPDATE_MODE: Self = Self(0xD1);
    pub const BMC_INITIALIZATION_IN_PROGRESS: Self = Self(0xD2);
    pub const DESTINATION_UNAVAILABLE: Self = Self(0xD3);
    pub const INSUFFICIENT_PRIVILEGE_LEVEL: Self = Self(0xD4);
    pub const REQUEST_PARAMETER_NOT_SUPPORTED: Self = Self(0xD5);
    pub const SUB_FUNCTION_DISABLED: Self = Self(0xD6);
    pub const UNSPECIFIED_ERROR: Self = Self(0xFF);

    pub const fn is_success(self) -> bool {
        self.0 == Self::NORMAL.0
    }

    /// Returns a human readable description of the standard completion codes.
    pub const fn description(self) -> Option<&'static str> {
        Some(match self.0 {
            0x00 => "Command completed normally",
            0xC0 => "Node busy",
            0xC1 => "Invalid command",
            0xC2 => "Command invalid for given LUN",
            0xC3 => "Timeout while processing command",
            0xC4 => "Out of space",
            0xC5 => "Reservation canceled or invalid reservation ID",
            0xC6 => "Request data truncated",
            0xC7 => "Request data length invalid",
            0xC8 => "Request data field length limit exceeded",
            0xC9 => "Parameter out of range",
            0xCA => "Cannot return number of requested data bytes",
            0xCB => "Requested sensor, data, or record not present",
            0xCC => "Invalid data field in request",
            0xCD => "Command illegal for specified sensor or record type",
            0xCE => "Command response could not be provided",
            0xCF => "Cannot execute duplicated request",
            0xD0 => "SDR repository in update mode",
            0xD1 => "Device in firmware update mode",
            0xD2 => "BMC initialization in progress",
            0xD3 => "Destination unavailable",
            0xD4 => "Insufficient privilege level",
            0xD5 => "Request parameter not supported",
            0xD6 => "Sub-function disabled",
            0xFF => "Unspecified error",
            _ => return None,
        })
    }
}

impl From<u8> for CompletionCode {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for CompletionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description() {
            Some(description) => write!(f, "{:#04x} ({description})", self.0),
            None => write!(f, "{:#04x}", self.0),
        }
    }
}
