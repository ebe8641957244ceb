//! Virtual memory map tests for both board variants.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use patina_morello::{
    config::MorelloMemoryConfig,
    memory_map::{fvp_virtual_memory_map, soc_virtual_memory_map, ArmMemoryRegionAttributes},
    platform_info::{PlatInfoSoc, MORELLO_PLATFORM_INFO_HOB_GUID},
};
use mu_pi::hob;
use patina_platform_sdk::error::EfiError;
use zerocopy::FromBytes;

use super::fakes::{init_logger, FakeFvpPlatformInfo, FakeNtFwConfig, RecordedHobs};

const GIB: u64 = 1 << 30;

#[test]
fn test_soc_boot_with_16_gib_publishes_platform_info_and_dram_block2() {
    init_logger();
    let config = MorelloMemoryConfig::default();
    let mut hobs = RecordedHobs::default();

    let map = soc_virtual_memory_map(&config, &FakeNtFwConfig::with_local_ddr(16 * GIB), &mut hobs).unwrap();

    let info = PlatInfoSoc::read_from_bytes(hobs.guid_data(&MORELLO_PLATFORM_INFO_HOB_GUID).unwrap()).unwrap();
    assert_eq!(info, PlatInfoSoc::new(16 * GIB, 16 * GIB, 1, 1, 0x5));

    assert_eq!(hobs.resources.len(), 1);
    let dram = &hobs.resources[0];
    assert_eq!(dram.resource_type, hob::EFI_RESOURCE_SYSTEM_MEMORY);
    assert_eq!(dram.physical_start, config.dram_block2_base);
    assert_eq!(dram.resource_length, 14 * GIB);
    assert_eq!(dram.header.length as usize, core::mem::size_of::<hob::ResourceDescriptor>());

    let secondary = map.find("DDR Secondary").unwrap();
    assert_eq!(secondary.physical_base, config.dram_block2_base);
    assert_eq!(secondary.length, 14 * GIB);
    assert_eq!(secondary.attributes, ArmMemoryRegionAttributes::WriteBack);

    let table = map.as_terminated_table();
    assert_eq!(table.len(), map.len() + 1);
    assert_eq!(table.last().unwrap().length, 0);
    assert!(table.len() <= patina_morello::memory_map::MAX_VIRTUAL_MEMORY_MAP_DESCRIPTORS);
}

#[test]
fn test_soc_boot_with_2_gib_has_no_secondary_ddr() {
    init_logger();
    let mut hobs = RecordedHobs::default();

    let map =
        soc_virtual_memory_map(&MorelloMemoryConfig::default(), &FakeNtFwConfig::with_local_ddr(2 * GIB), &mut hobs)
            .unwrap();

    assert!(map.find("DDR Secondary").is_none());
    assert!(hobs.resources.is_empty());
    assert_eq!(hobs.guid_hobs.len(), 1);
}

#[test]
fn test_soc_boot_without_nt_fw_config_fails() {
    init_logger();
    let mut hobs = RecordedHobs::default();

    let result = soc_virtual_memory_map(&MorelloMemoryConfig::default(), &FakeNtFwConfig::missing(), &mut hobs);

    assert_eq!(result.unwrap_err(), EfiError::InvalidParameter);
    assert!(hobs.is_empty());
}

#[test]
fn test_soc_pci_windows_follow_config() {
    init_logger();
    let mut config = MorelloMemoryConfig::default();
    config.pcie.bus_max = 15;
    let mut hobs = RecordedHobs::default();

    let map = soc_virtual_memory_map(&config, &FakeNtFwConfig::with_local_ddr(8 * GIB), &mut hobs).unwrap();

    let ecam = map.find("PCIe ECAM Region").unwrap();
    assert_eq!(ecam.physical_base, config.pcie.ecam_base);
    assert_eq!(ecam.length, 16 << 20);
    assert_eq!(map.find("CCIX MMIO32 & IO Region").unwrap().length, 0x1000_0000);
}

#[test]
fn test_fvp_boot_places_gop_buffer_before_secondary_ddr() {
    init_logger();
    let config = MorelloMemoryConfig::default();
    let mut hobs = RecordedHobs::default();

    let map = fvp_virtual_memory_map(&config, &FakeFvpPlatformInfo(8 * GIB), &mut hobs).unwrap();

    let names: Vec<&str> = map.regions().iter().map(|region| region.description).collect();
    let gop = names.iter().position(|name| *name == "DDR GOP carve out").unwrap();
    assert_eq!(names[gop - 1], "DDR Primary");
    assert_eq!(names[gop + 1], "DDR Secondary");
    assert_eq!(map.find("DDR GOP carve out").unwrap().attributes, ArmMemoryRegionAttributes::UncachedUnbuffered);
    assert_eq!(hobs.resources[0].resource_length, 6 * GIB);
    assert!(hobs.guid_data(&MORELLO_PLATFORM_INFO_HOB_GUID).is_none());
}

#[test]
fn test_fvp_boot_rejects_gop_buffer_inside_ddr() {
    init_logger();
    let mut config = MorelloMemoryConfig::default();
    config.gop_buffer_base = config.system_memory_base;
    let mut hobs = RecordedHobs::default();

    assert_eq!(
        fvp_virtual_memory_map(&config, &FakeFvpPlatformInfo(8 * GIB), &mut hobs).unwrap_err(),
        EfiError::InvalidParameter
    );
    assert!(hobs.is_empty());
}

#[test]
fn test_fvp_boot_without_gop_buffer() {
    init_logger();
    let mut config = MorelloMemoryConfig::default();
    config.gop_buffer_size = 0;
    let mut hobs = RecordedHobs::default();

    let map = fvp_virtual_memory_map(&config, &FakeFvpPlatformInfo(2 * GIB), &mut hobs).unwrap();

    assert!(map.find("DDR GOP carve out").is_none());
    assert!(map.find("Mali D71").is_some());
    assert!(map.find("PCI MMIO64 Region").is_some());
}
