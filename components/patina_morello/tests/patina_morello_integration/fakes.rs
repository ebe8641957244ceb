//! Fake firmware sources for the Morello integration tests.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use std::sync::Once;

use mu_pi::hob::{GuidHob, ResourceDescriptor};
use patina_morello::platform_info::{FvpPlatformInfoSource, NtFwConfigSource, PlatInfoFvp};
use patina_platform_sdk::{
    error::{EfiError, Result},
    hob::HobProducer,
};
use r_efi::efi;

static INIT: Once = Once::new();

/// Initializes logging once for the test binary. Output is off unless `RUST_LOG` is set.
pub fn init_logger() {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        if std::env::var("RUST_LOG").is_err() {
            builder.filter_level(log::LevelFilter::Off);
        }
        let _ = builder.is_test(true).try_init();
    });
}

/// An NT_FW_CONFIG device tree handed over by the trusted firmware.
pub struct FakeNtFwConfig(Option<&'static [u8]>);

impl FakeNtFwConfig {
    /// A device tree describing a C2C board with `local_ddr_size` bytes of local DDR.
    pub fn with_local_ddr(local_ddr_size: u64) -> Self {
        let properties = [
            ("local-ddr-size", local_ddr_size.to_be_bytes().to_vec()),
            ("remote-ddr-size", 0x4_0000_0000u64.to_be_bytes().to_vec()),
            ("remote-chip-count", 1u32.to_be_bytes().to_vec()),
            ("multichip-mode", 1u32.to_be_bytes().to_vec()),
            ("scc-config", 0x5u32.to_be_bytes().to_vec()),
        ];
        Self(Some(build_dtb(&properties).leak()))
    }

    pub fn missing() -> Self {
        Self(None)
    }
}

impl NtFwConfigSource for FakeNtFwConfig {
    fn locate_nt_fw_config(&self) -> Result<&'static [u8]> {
        self.0.ok_or(EfiError::NotFound)
    }
}

pub struct FakeFvpPlatformInfo(pub u64);

impl FvpPlatformInfoSource for FakeFvpPlatformInfo {
    fn locate_platform_info(&self) -> Result<PlatInfoFvp> {
        Ok(PlatInfoFvp { local_ddr_size: self.0 })
    }
}

/// A HOB list as the PEI core would hold it, in production order.
#[derive(Default)]
pub struct RecordedHobs {
    pub resources: Vec<ResourceDescriptor>,
    pub guid_hobs: Vec<(GuidHob, Vec<u8>)>,
}

impl RecordedHobs {
    pub fn guid_data(&self, name: &efi::Guid) -> Option<&[u8]> {
        self.guid_hobs.iter().find(|(hob, _)| hob.name == *name).map(|(_, data)| data.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.guid_hobs.is_empty()
    }
}

impl HobProducer for RecordedHobs {
    fn build_resource_descriptor(&mut self, descriptor: ResourceDescriptor) -> Result<()> {
        self.resources.push(descriptor);
        Ok(())
    }

    fn build_guid_hob(&mut self, hob: GuidHob, data: &[u8]) -> Result<()> {
        if hob.header.length as usize != (std::mem::size_of::<GuidHob>() + data.len()).next_multiple_of(8) {
            return Err(EfiError::BadBufferSize);
        }
        self.guid_hobs.push((hob, data.to_vec()));
        Ok(())
    }
}

/// Builds a flattened device tree with a `/platform-info` node.
fn build_dtb(properties: &[(&str, Vec<u8>)]) -> Vec<u8> {
    fn pad(buffer: &mut Vec<u8>) {
        while buffer.len() % 4 != 0 {
            buffer.push(0);
        }
    }

    let mut strings = Vec::new();
    let mut structure = Vec::new();
    structure.extend_from_slice(&1u32.to_be_bytes());
    structure.extend_from_slice(&[0; 4]);
    structure.extend_from_slice(&1u32.to_be_bytes());
    structure.extend_from_slice(b"platform-info\0");
    pad(&mut structure);
    for (name, value) in properties {
        structure.extend_from_slice(&3u32.to_be_bytes());
        structure.extend_from_slice(&(value.len() as u32).to_be_bytes());
        structure.extend_from_slice(&(strings.len() as u32).to_be_bytes());
        structure.extend_from_slice(value);
        pad(&mut structure);
        strings.extend_from_slice(name.as_bytes());
        strings.push(0);
    }
    for token in [2u32, 2, 9] {
        structure.extend_from_slice(&token.to_be_bytes());
    }

    let off_dt_struct = 40 + 16;
    let off_dt_strings = off_dt_struct + structure.len();
    let header = [
        0xd00d_feed,
        (off_dt_strings + strings.len()) as u32,
        off_dt_struct as u32,
        off_dt_strings as u32,
        40,
        17,
        16,
        0,
        strings.len() as u32,
        structure.len() as u32,
    ];

    let mut dtb: Vec<u8> = header.iter().flat_map(|field: &u32| field.to_be_bytes()).collect();
    dtb.extend_from_slice(&[0; 16]);
    dtb.extend_from_slice(&structure);
    dtb.extend_from_slice(&strings);
    dtb
}
