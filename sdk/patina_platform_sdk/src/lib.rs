//! Patina Platform SDK
//!
//! Common definitions shared by the platform components in this workspace:
//!
//! - [`error`]: EFI status codes expressed as a Rust error enum.
//! - [`base`]: size constants.
//! - [`hob`]: production of Hand-Off Blocks (HOBs) by pre-DXE platform code.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(all(not(feature = "std"), not(test), not(feature = "mockall")), no_std)]

pub mod base;
pub mod error;
pub mod hob;
