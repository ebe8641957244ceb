//! IPMI Command Library
//!
//! Wrappers for the IPMI Chassis network function commands. Each wrapper marshals a fixed request structure,
//! submits it through an [`IpmiTransport`](transport::IpmiTransport), and returns the fixed response structure.
//!
//! The IPMI completion code is part of every response and is handed back to the caller untouched. Only a failure of
//! the transport itself is reported as an error.
//!
//! ## Example
//!
//! ```rust
//! use patina_ipmi::{chassis::IpmiChassis, completion_code::CompletionCode, transport::IpmiTransport};
//! use patina_platform_sdk::error::Result;
//!
//! struct LoopbackBmc;
//!
//! impl IpmiTransport for LoopbackBmc {
//!     fn submit_command(&self, _net_fn: u8, _command: u8, _request: &[u8], response: &mut [u8]) -> Result<usize> {
//!         response.fill(0);
//!         Ok(response.len())
//!     }
//! }
//!
//! let status = LoopbackBmc.get_chassis_status().unwrap();
//! assert_eq!(status.completion_code(), CompletionCode::NORMAL);
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

pub mod chassis;
pub mod completion_code;
pub mod transport;
