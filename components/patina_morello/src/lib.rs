//! Arm Morello Platform Support
//!
//! Platform code for the Arm Morello System Development Platform (SoC) and its Fixed Virtual Platform (FVP) model.
//!
//! - [`platform`]: peripheral base addresses and sizes.
//! - [`config`]: build-time memory layout configuration ([`MorelloMemoryConfig`](config::MorelloMemoryConfig)).
//! - [`platform_info`]: platform information handed over by the trusted firmware.
//! - [`memory_map`]: the virtual memory map given to the MMU initialization code, one per board variant.
//! - [`config_manager`]: the object repositories that the dynamic ACPI table generators query.
//! - [`i2c`]: the Cadence I2C controller install data and the HDMI I2C bus.
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
pub mod config_manager;
pub mod i2c;
pub mod memory_map;
pub mod platform;
pub mod platform_info;
