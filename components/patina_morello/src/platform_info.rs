//! Morello Platform Information
//!
//! The trusted firmware describes the board through the NT_FW_CONFIG device tree (SoC) or a platform info PPI (FVP).
//! On the SoC the parsed [`PlatInfoSoc`] is published as a GUID HOB for later phases.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use patina_platform_sdk::error::{EfiError, Result};
use r_efi::efi;
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Name of the GUID HOB carrying [`PlatInfoSoc`].
pub const MORELLO_PLATFORM_INFO_HOB_GUID: efi::Guid =
    efi::Guid::from_fields(0x3ed4e4a6, 0x0cbe, 0x4b8c, 0x9d, 0x3a, &[0x6f, 0x21, 0x77, 0x5b, 0x0e, 0x4c]);

const PLATFORM_INFO_NODE: &str = "/platform-info";

/// Morello SoC platform information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct PlatInfoSoc {
    /// Local DDR memory size in bytes.
    pub local_ddr_size: u64,
    /// Remote DDR memory size in bytes.
    pub remote_ddr_size: u64,
    /// Number of remote chips in C2C mode.
    pub remote_chip_count: u8,
    /// 0 - Single Chip, 1 - Chip to Chip (C2C)
    pub mode: u8,
    _reserved: [u8; 2],
    /// SCC configuration register.
    pub scc_config: u32,
}

/// Morello FVP platform information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct PlatInfoFvp {
    /// Local DDR memory size in bytes.
    pub local_ddr_size: u64,
}

/// Locates the NT_FW_CONFIG device tree handed over by the trusted firmware.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait NtFwConfigSource {
    fn locate_nt_fw_config(&self) -> Result<&'static [u8]>;
}

/// Locates the platform information published by the FVP model.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait FvpPlatformInfoSource {
    fn locate_platform_info(&self) -> Result<PlatInfoFvp>;
}

impl PlatInfoSoc {
    pub const fn new(
        local_ddr_size: u64,
        remote_ddr_size: u64,
        remote_chip_count: u8,
        mode: u8,
        scc_config: u32,
    ) -> Self {
        Self { local_ddr_size, remote_ddr_size, remote_chip_count, mode, _reserved: [0; 2], scc_config }
    }

    /// Parses the `platform-info` node of an NT_FW_CONFIG device tree blob.
    pub fn from_nt_fw_config(dtb: &[u8]) -> Result<Self> {
        let fdt = fdt::Fdt::new(dtb).map_err(|err| {
            log::error!(target: "platform_info", "Invalid DTB passed: {err:?}");
            EfiError::InvalidParameter
        })?;

        let node = fdt.find_node(PLATFORM_INFO_NODE).ok_or_else(|| {
            log::error!(target: "platform_info", "Invalid DTB: platform-info node not found");
            EfiError::InvalidParameter
        })?;

        let info = Self::new(
            read_be_u64(required_property(node, "local-ddr-size")?, "local-ddr-size")?,
            read_be_u64(required_property(node, "remote-ddr-size")?, "remote-ddr-size")?,
            read_be_u32(required_property(node, "remote-chip-count")?, "remote-chip-count")? as u8,
            read_be_u32(required_property(node, "multichip-mode")?, "multichip-mode")? as u8,
            read_be_u32(required_property(node, "scc-config")?, "scc-config")?,
        );
        log::debug!(target: "platform_info", "Platform info: {info:x?}");
        Ok(info)
    }

    /// Locates the NT_FW_CONFIG device tree and parses it.
    pub fn locate(source: &dyn NtFwConfigSource) -> Result<Self> {
        let dtb = source.locate_nt_fw_config().map_err(|err| {
            log::error!(target: "platform_info", "Locating NT_FW_CONFIG failed with error {err:?}");
            EfiError::InvalidParameter
        })?;
        Self::from_nt_fw_config(dtb)
    }
}

fn required_property<'a>(node: fdt::node::FdtNode<'_, 'a>, name: &str) -> Result<&'a [u8]> {
    node.property(name).map(|property| property.value).ok_or_else(|| {
        log::error!(target: "platform_info", "{name} property not found");
        EfiError::InvalidParameter
    })
}

fn read_be_u64(value: &[u8], name: &str) -> Result<u64> {
    match value.get(..8) {
        Some(bytes) => Ok(u64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ])),
        None => {
            log::error!(target: "platform_info", "{name} property is {} bytes, expected 8", value.len());
            Err(EfiError::InvalidParameter)
        }
    }
}

fn read_be_u32(value: &[u8], name: &str) -> Result<u32> {
    match value.get(..4) {
        Some(bytes) => Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        None => {
            log::error!(target: "platform_info", "{name} property is {} bytes, expected 4", value.len());
            Err(EfiError::InvalidParameter)
        }
    }
}
