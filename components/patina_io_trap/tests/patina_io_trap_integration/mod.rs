//! Patina I/O Trap Integration Tests
//!
//! Runs the dispatcher against a simulated PSTH that raises trap status from I/O cycles, the way the PCH does.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

mod dispatcher_tests;
mod fake_pch;
