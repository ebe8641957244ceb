//! Morello Virtual Memory Map
//!
//! Builds the identity-mapped region table the MMU is initialized from, for the SoC and the FVP. Local DDR beyond
//! the first DRAM block is also reported to later phases as a system memory resource HOB.
//!
//! ## Logging
//!
//! The finished table is logged on the `memory_map` target at info level.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::vec::Vec;
use core::fmt;

use mu_pi::hob;
use patina_platform_sdk::{
    error::{EfiError, Result},
    hob::{guid_hob, resource_descriptor, HobProducer},
};
use r_efi::efi;
use zerocopy::IntoBytes;

use crate::{
    config::{MorelloMemoryConfig, PciHostBridgeConfig},
    platform::*,
    platform_info::{FvpPlatformInfoSource, NtFwConfigSource, PlatInfoSoc, MORELLO_PLATFORM_INFO_HOB_GUID},
};

/// Number of SoC descriptors, including the end-of-table descriptor.
pub const MAX_VIRTUAL_MEMORY_MAP_DESCRIPTORS: usize = 21;

/// Number of FVP descriptors without the GOP carve-out, including the end-of-table descriptor.
pub const FVP_MAX_VIRTUAL_MEMORY_MAP_DESCRIPTORS: usize = 18;

/// Memory attributes of a mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ArmMemoryRegionAttributes {
    #[default]
    UncachedUnbuffered = 0,
    NonSecureUncachedUnbuffered = 1,
    WriteBack = 2,
    NonSecureWriteBack = 3,
    WriteBackNonShareable = 4,
    NonSecureWriteBackNonShareable = 5,
    WriteThrough = 6,
    NonSecureWriteThrough = 7,
    Device = 8,
    NonSecureDevice = 9,
}

impl ArmMemoryRegionAttributes {
    /// Name of the attribute as printed in the memory map table.
    pub const fn description(self) -> &'static str {
        match self {
            Self::UncachedUnbuffered => "UNCACHED_UNBUFFERED",
            Self::NonSecureUncachedUnbuffered => "NONSECURE_UNCACHED_UNBUFFERED",
            Self::WriteBack => "WRITE_BACK",
            Self::NonSecureWriteBack => "NONSECURE_WRITE_BACK",
            Self::WriteBackNonShareable => "WB_NONSHAREABLE",
            Self::NonSecureWriteBackNonShareable => "NONSECURE_WB_NONSHAREABLE",
            Self::WriteThrough => "WRITE_THROUGH",
            Self::NonSecureWriteThrough => "NONSECURE_WRITE_THROUGH",
            Self::Device => "DEVICE",
            Self::NonSecureDevice => "NONSECURE_DEVICE",
        }
    }
}

/// A physical to virtual mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct ArmMemoryRegionDescriptor {
    pub physical_base: u64,
    pub virtual_base: u64,
    pub length: u64,
    pub attributes: ArmMemoryRegionAttributes,
}

impl ArmMemoryRegionDescriptor {
    /// An identity mapping of `base..base + length`.
    pub const fn identity(base: u64, length: u64, attributes: ArmMemoryRegionAttributes) -> Self {
        Self { physical_base: base, virtual_base: base, length, attributes }
    }

    pub const fn end(&self) -> u64 {
        self.physical_base.saturating_add(self.length)
    }
}

/// A described region of the virtual memory map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub description: &'static str,
    pub descriptor: ArmMemoryRegionDescriptor,
}

/// The virtual memory map of the platform.
#[derive(Debug, Clone)]
pub struct VirtualMemoryMap {
    regions: Vec<MemoryRegion>,
    max_descriptors: usize,
}

impl VirtualMemoryMap {
    /// Creates an empty map holding at most `max_descriptors - 1` regions plus the end-of-table descriptor.
    pub fn with_max_descriptors(max_descriptors: usize) -> Self {
        Self { regions: Vec::with_capacity(max_descriptors), max_descriptors }
    }

    /// Appends an identity mapped region.
    pub fn push(
        &mut self,
        description: &'static str,
        base: u64,
        length: u64,
        attributes: ArmMemoryRegionAttributes,
    ) -> Result<()> {
        if self.regions.len() + 1 >= self.max_descriptors {
            log::error!(
                target: "memory_map",
                "No descriptor left for {description}, the map holds at most {} entries.",
                self.max_descriptors
            );
            return Err(EfiError::OutOfResources);
        }
        let descriptor = ArmMemoryRegionDescriptor::identity(base, length, attributes);
        self.regions.push(MemoryRegion { description, descriptor });
        Ok(())
    }

    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    pub fn find(&self, description: &str) -> Option<&ArmMemoryRegionDescriptor> {
        self.regions.iter().find(|region| region.description == description).map(|region| &region.descriptor)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Returns the descriptor table handed to the MMU code, ended by a zero-filled descriptor.
    pub fn as_terminated_table(&self) -> Vec<ArmMemoryRegionDescriptor> {
        let mut table: Vec<ArmMemoryRegionDescriptor> = self.regions.iter().map(|region| region.descriptor).collect();
        table.push(ArmMemoryRegionDescriptor::default());
        table
    }

    fn log_table(&self) {
        log::info!(target: "memory_map", " Memory Map\n----------------------------------------------------------");
        log::info!(
            target: "memory_map",
            "{:<32}: {:>18} - {:<18} [ {:^18} ] {{ {:^29} }}",
            "Description",
            "START",
            "END",
            "SIZE",
            "ATTR"
        );
        for region in &self.regions {
            log::info!(target: "memory_map", "{region}");
        }
        log::debug!(target: "memory_map", "Virtual Memory Table setup complete.");
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<32}: {:#018x} - {:#018x} [ {:#018x} ] {{ {:<29} }}",
            self.description,
            self.descriptor.physical_base,
            self.descriptor.end().saturating_sub(1),
            self.descriptor.length,
            self.descriptor.attributes.description()
        )
    }
}

/// Size of the second DRAM block for the given local DDR size.
pub const fn dram_block2_size(local_ddr_size: u64) -> u64 {
    local_ddr_size.saturating_sub(MORELLO_DRAM_BLOCK1_SIZE)
}

/// Resource attributes of DRAM block 2, tested system memory.
pub const DRAM_BLOCK2_RESOURCE_ATTRIBUTES: u32 = hob::EFI_RESOURCE_ATTRIBUTE_PRESENT
    | hob::EFI_RESOURCE_ATTRIBUTE_INITIALIZED
    | hob::EFI_RESOURCE_ATTRIBUTE_WRITE_COMBINEABLE
    | hob::EFI_RESOURCE_ATTRIBUTE_WRITE_THROUGH_CACHEABLE
    | hob::EFI_RESOURCE_ATTRIBUTE_WRITE_BACK_CACHEABLE
    | hob::EFI_RESOURCE_ATTRIBUTE_TESTED;

/// Reports DRAM block 2 as tested system memory.
fn build_dram_block2_hob(config: &MorelloMemoryConfig, size: u64, hobs: &mut dyn HobProducer) -> Result<()> {
    hobs.build_resource_descriptor(resource_descriptor(
        efi::Guid::from_fields(0, 0, 0, 0, 0, &[0; 6]),
        hob::EFI_RESOURCE_SYSTEM_MEMORY,
        DRAM_BLOCK2_RESOURCE_ATTRIBUTES,
        config.dram_block2_base,
        size,
    ))
}

fn push_common_peripherals(map: &mut VirtualMemoryMap) -> Result<()> {
    use ArmMemoryRegionAttributes::{Device, UncachedUnbuffered};

    map.push("Generic Watchdog", MORELLO_GENERIC_WDOG_BASE, MORELLO_GENERIC_WDOG_SZ, Device)?;
    map.push("REFCLK CNTRead", MORELLO_REFCLK_CNT_BASE, MORELLO_REFCLK_CNT_SZ, Device)?;
    map.push("AP_REFCLK CNTCL", MORELLO_AP_REFCLK_CNT_BASE, MORELLO_AP_REFCLK_CNT_SZ, Device)?;
    map.push("AP_REFCLK_NS CNTCTL", MORELLO_AP_REFCLK_NS_CNT_BASE, MORELLO_AP_REFCLK_NS_CNT_SZ, Device)?;
    map.push("GIC-600", MORELLO_GIC_BASE, MORELLO_GIC_SZ, Device)?;
    map.push("GICITS-600", MORELLO_GICITS_BASE, MORELLO_GICITS_SZ, Device)?;
    map.push("GICR-600", MORELLO_GICR_BASE, MORELLO_GICR_SZ, Device)?;
    map.push("SMMU", MORELLO_SMMU_BASE, MORELLO_SMMU_SZ, Device)?;
    map.push("non-secure SRAM", MORELLO_NON_SECURE_SRAM_BASE, MORELLO_NON_SECURE_SRAM_SZ, UncachedUnbuffered)?;
    map.push("UART0", MORELLO_UART0_BASE, MORELLO_UART0_SZ, Device)
}

fn push_host_bridge(map: &mut VirtualMemoryMap, names: [&'static str; 3], bridge: &PciHostBridgeConfig) -> Result<()> {
    use ArmMemoryRegionAttributes::Device;

    map.push(names[0], bridge.ecam_base, bridge.ecam_size(), Device)?;
    map.push(names[1], bridge.mmio32_base as u64, bridge.mmio32_region_size(), Device)?;
    map.push(names[2], bridge.mmio64_base, bridge.mmio64_size, Device)
}

/// Returns the virtual memory map of the Morello SoC.
///
/// The platform information is read from the NT_FW_CONFIG device tree. Once the map is complete it is published as
/// a GUID HOB, followed by the DRAM block 2 resource HOB. A map that cannot be built produces no HOBs.
pub fn soc_virtual_memory_map(
    config: &MorelloMemoryConfig,
    nt_fw_config: &dyn NtFwConfigSource,
    hobs: &mut dyn HobProducer,
) -> Result<VirtualMemoryMap> {
    soc_memory_map_with_limit(config, nt_fw_config, hobs, MAX_VIRTUAL_MEMORY_MAP_DESCRIPTORS)
}

fn soc_memory_map_with_limit(
    config: &MorelloMemoryConfig,
    nt_fw_config: &dyn NtFwConfigSource,
    hobs: &mut dyn HobProducer,
    max_descriptors: usize,
) -> Result<VirtualMemoryMap> {
    use ArmMemoryRegionAttributes::{Device, WriteBack};

    let plat_info = PlatInfoSoc::locate(nt_fw_config)?;
    let plat_info_hob = guid_hob(MORELLO_PLATFORM_INFO_HOB_GUID, plat_info.as_bytes().len())?;
    let dram_block2_size = dram_block2_size(plat_info.local_ddr_size);

    let mut map = VirtualMemoryMap::with_max_descriptors(max_descriptors);
    push_common_peripherals(&mut map)?;
    map.push("DDR Primary", config.system_memory_base, config.system_memory_size, WriteBack)?;
    if dram_block2_size != 0 {
        map.push("DDR Secondary", config.dram_block2_base, dram_block2_size, WriteBack)?;
    }
    map.push("AP QSPI flash device", MORELLO_AP_QSPI_AHB_BASE, MORELLO_AP_QSPI_AHB_SZ, Device)?;
    map.push("Expansion Peripherals", MORELLO_EXP_PERIPH_BASE, MORELLO_EXP_PERIPH_SZ, Device)?;
    push_host_bridge(&mut map, ["PCIe ECAM Region", "PCIe MMIO32 & IO Region", "PCIe MMIO64 Region"], &config.pcie)?;
    push_host_bridge(&mut map, ["CCIX ECAM Region", "CCIX MMIO32 & IO Region", "CCIX MMIO64 Region"], &config.ccix)?;

    hobs.build_guid_hob(plat_info_hob, plat_info.as_bytes())?;
    if dram_block2_size != 0 {
        build_dram_block2_hob(config, dram_block2_size, hobs)?;
    }

    map.log_table();
    Ok(map)
}

/// Returns the virtual memory map of the Morello FVP.
///
/// The DRAM block 2 resource HOB is produced once the map is complete.
pub fn fvp_virtual_memory_map(
    config: &MorelloMemoryConfig,
    platform_info: &dyn FvpPlatformInfoSource,
    hobs: &mut dyn HobProducer,
) -> Result<VirtualMemoryMap> {
    let gop_enabled = config.gop_buffer_size != 0;
    let max_descriptors = FVP_MAX_VIRTUAL_MEMORY_MAP_DESCRIPTORS + usize::from(gop_enabled);
    fvp_memory_map_with_limit(config, platform_info, hobs, max_descriptors)
}

fn fvp_memory_map_with_limit(
    config: &MorelloMemoryConfig,
    platform_info: &dyn FvpPlatformInfoSource,
    hobs: &mut dyn HobProducer,
    max_descriptors: usize,
) -> Result<VirtualMemoryMap> {
    use ArmMemoryRegionAttributes::{Device, UncachedUnbuffered, WriteBack};

    let plat_info = platform_info.locate_platform_info().inspect_err(|err| {
        log::error!(target: "memory_map", "Failed to locate the FVP platform info: {err:?}");
    })?;
    let dram_block2_size = dram_block2_size(plat_info.local_ddr_size);

    let mut map = VirtualMemoryMap::with_max_descriptors(max_descriptors);
    push_common_peripherals(&mut map)?;
    map.push("Mali D71", config.mali_dxx_base as u64, config.mali_dxx_size as u64, Device)?;
    map.push("DDR Primary", config.system_memory_base, config.system_memory_size, WriteBack)?;
    if config.gop_buffer_size != 0 {
        let ddr_end = config.system_memory_base.saturating_add(config.system_memory_size).saturating_sub(1);
        if ddr_end >= config.gop_buffer_base {
            log::error!(
                target: "memory_map",
                "GOP buffer at {:#x} overlaps primary DDR ending at {ddr_end:#x}",
                config.gop_buffer_base
            );
            return Err(EfiError::InvalidParameter);
        }
        // Normal non-cacheable, so accelerated SetMem/CopyMem routines cannot take alignment faults.
        map.push("DDR GOP carve out", config.gop_buffer_base, config.gop_buffer_size as u64, UncachedUnbuffered)?;
    }
    if dram_block2_size != 0 {
        map.push("DDR Secondary", config.dram_block2_base, dram_block2_size, WriteBack)?;
    }
    map.push("Expansion Peripherals", MORELLO_EXP_PERIPH_BASE, MORELLO_EXP_PERIPH_SZ, Device)?;
    push_host_bridge(&mut map, ["PCI ECAM Region", "PCI MMIO32 & IO Region", "PCI MMIO64 Region"], &config.pcie)?;

    if dram_block2_size != 0 {
        build_dram_block2_hob(config, dram_block2_size, hobs)?;
    }

    map.log_table();
    Ok(map)
}
