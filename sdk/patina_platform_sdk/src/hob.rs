//! Hand-Off Block (HOB) production.
//!
//! Pre-DXE platform code reports resources and platform data to later phases by appending HOBs to the HOB list.
//! The HOB layouts are the PI definitions from [`mu_pi::hob`]. [`HobProducer`] is the seam platform code builds
//! HOBs through, the PEI `BuildResourceDescriptorHob` and `BuildGuidDataHob` services.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::mem::size_of;

#[cfg(any(test, feature = "mockall"))]
use mockall::automock;
use mu_pi::hob::{self, header, GuidHob, ResourceDescriptor};
use r_efi::efi;

use crate::error::{EfiError, Result};

/// Interface for building HOBs.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait HobProducer {
    /// Appends a resource descriptor HOB.
    fn build_resource_descriptor(&mut self, descriptor: ResourceDescriptor) -> Result<()>;

    /// Appends a GUID extension HOB. `hob` is the header built by [`guid_hob`], followed by a copy of `data`.
    fn build_guid_hob(&mut self, hob: GuidHob, data: &[u8]) -> Result<()>;
}

/// Returns a resource descriptor HOB with its header filled in.
pub const fn resource_descriptor(
    owner: efi::Guid,
    resource_type: u32,
    resource_attribute: u32,
    physical_start: u64,
    resource_length: u64,
) -> ResourceDescriptor {
    ResourceDescriptor {
        header: header::Hob {
            r#type: hob::RESOURCE_DESCRIPTOR,
            length: size_of::<ResourceDescriptor>() as u16,
            reserved: 0,
        },
        owner,
        resource_type,
        resource_attribute,
        physical_start,
        resource_length,
    }
}

/// Returns the header of a GUID extension HOB named `name` carrying `data_len` bytes.
///
/// The HOB length covers the header and the data, rounded up to 8 bytes. Data that does not fit the 16-bit HOB
/// length is `BadBufferSize`.
pub fn guid_hob(name: efi::Guid, data_len: usize) -> Result<GuidHob> {
    let length = size_of::<GuidHob>()
        .checked_add(data_len)
        .map(|length| length.next_multiple_of(8))
        .and_then(|length| u16::try_from(length).ok())
        .ok_or_else(|| {
            log::error!(target: "hob", "GUID HOB data of {data_len} bytes does not fit in a HOB.");
            EfiError::BadBufferSize
        })?;
    Ok(GuidHob { header: header::Hob { r#type: hob::GUID_EXTENSION, length, reserved: 0 }, name })
}
