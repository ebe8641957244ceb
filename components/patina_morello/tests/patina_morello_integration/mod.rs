//! Patina Morello Integration Tests
//!
//! Builds the SoC and FVP memory maps from fake firmware sources and walks the IORT object graph of the
//! Configuration Manager.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

mod fakes;
mod memory_map_tests;
