//! Patina IPMI Integration Tests
//!
//! Runs the Chassis command wrappers against a simulated BMC.
//!
//! Set `RUST_LOG` (for example `RUST_LOG=debug`) to see the log output of a test run.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

mod chassis_tests;
