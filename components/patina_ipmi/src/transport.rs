//! IPMI transport interface.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use patina_platform_sdk::error::Result;

/// Network function code of the Chassis commands.
pub const IPMI_NETFN_CHASSIS: u8 = 0x00;

/// Submits raw IPMI commands to the baseboard management controller.
///
/// Implementations are provided by the platform (KCS, SSIF, BT, ...).
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait IpmiTransport {
    /// Sends `request` as command `command` of network function `net_fn` and copies the response into `response`.
    ///
    /// `response[0]` receives the IPMI completion code. Returns the number of response bytes written, which never
    /// exceeds `response.len()`.
    fn submit_command(&self, net_fn: u8, command: u8, request: &[u8], response: &mut [u8]) -> Result<usize>;
}
