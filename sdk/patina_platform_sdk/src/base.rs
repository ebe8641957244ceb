//! Base Definitions
//!
//! Size constants used when describing platform memory and IO ranges.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

/// 64KB, 65536 bytes, 0x10000, 2^16
pub const SIZE_64KB: u64 = 0x10000;

/// 128KB, 0x20000, 2^17
pub const SIZE_128KB: u64 = 0x20000;

/// 256KB, 0x40000, 2^18
pub const SIZE_256KB: u64 = 0x40000;

/// 512KB, 0x80000, 2^19
pub const SIZE_512KB: u64 = 0x80000;

/// 1MB, 0x100000, 2^20
pub const SIZE_1MB: u64 = 0x100000;

/// 64MB, 0x4000000, 2^26
pub const SIZE_64MB: u64 = 0x4000000;

/// 2GB, 0x80000000, 2^31
pub const SIZE_2GB: u64 = 0x80000000;
