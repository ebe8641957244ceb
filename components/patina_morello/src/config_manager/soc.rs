//! Morello SoC Platform Repository
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use patina_platform_sdk::error::{EfiError, Result};

use super::{handle_cm_object, handle_cm_object_ref_by_token, object::*, CmObjectDescriptor, PlatformRepository};
use crate::config::MorelloMemoryConfig;

const ITS_GROUP_COUNT: usize = 4;
const SMMU_V3_COUNT: usize = 2;
const ROOT_COMPLEX_COUNT: usize = 2;

/// Device ID mappings are stored as three groups of two.
const ID_MAPPING_GROUP_SIZE: usize = 2;
const ID_MAPPING_COUNT: usize = 3 * ID_MAPPING_GROUP_SIZE;

/// Heads of the ID mapping runs referenced by IORT nodes, with the number of mappings in each run.
const ID_MAPPING_HEADS: [(usize, u32); 4] = [
    (id_mapping_index(0, 0), SMMU_V3_ID_MAPPING_COUNT),
    (id_mapping_index(1, 0), ROOT_COMPLEX_ID_MAPPING_COUNT),
    (id_mapping_index(1, 1), ROOT_COMPLEX_ID_MAPPING_COUNT),
    (id_mapping_index(2, 0), SMMU_V3_ID_MAPPING_COUNT),
];

const SMMU_V3_ID_MAPPING_COUNT: u32 = 2;
const ROOT_COMPLEX_ID_MAPPING_COUNT: u32 = 1;

const fn id_mapping_index(group: usize, index: usize) -> usize {
    group * ID_MAPPING_GROUP_SIZE + index
}

/// Reference token of device ID mapping `[group][index]`.
pub const fn id_mapping_token(group: usize, index: usize) -> CmObjectToken {
    reference_token(EArmObjectId::IdMappingArray, id_mapping_index(group, index))
}

pub const fn its_group_token(index: usize) -> CmObjectToken {
    reference_token(EArmObjectId::ItsGroup, index)
}

pub const fn its_identifier_token(index: usize) -> CmObjectToken {
    reference_token(EArmObjectId::GicItsIdentifierArray, index)
}

pub const fn smmu_v3_token(index: usize) -> CmObjectToken {
    reference_token(EArmObjectId::SmmuV3, index)
}

pub const fn root_complex_token(index: usize) -> CmObjectToken {
    reference_token(EArmObjectId::RootComplex, index)
}

/// Platform repository of the Morello SoC.
#[derive(Debug, Clone)]
pub struct MorelloSocRepository {
    acpi_table_list: [CmStdObjAcpiTableInfo; 10],
    gic_its_info: [CmArmGicItsInfo; 4],
    its_group_info: [CmArmItsGroupNode; ITS_GROUP_COUNT],
    its_identifier_array: [CmArmItsIdentifier; ITS_GROUP_COUNT],
    smmu_v3_info: [CmArmSmmuV3Node; SMMU_V3_COUNT],
    root_complex_info: [CmArmRootComplexNode; ROOT_COMPLEX_COUNT],
    device_id_mapping: [CmArmIdMapping; ID_MAPPING_COUNT],
    pci_config_info: [CmArmPciConfigSpaceInfo; 2],
}

impl MorelloSocRepository {
    /// Creates the repository. `dsdt` and `ssdt_pci` are the compiled AML of the DSDT and the PCI root complex SSDT.
    pub fn new(config: &MorelloMemoryConfig, dsdt: &'static [u8], ssdt_pci: &'static [u8]) -> Self {
        let its_group = |index: usize| CmArmItsGroupNode {
            token: its_group_token(index),
            its_id_count: 1,
            its_id_token: its_identifier_token(index),
        };

        let smmu_v3 = |index: usize,
                       id_mapping_group: usize,
                       base_address: u64,
                       [event_interrupt, pri_interrupt, gerr_interrupt, sync_interrupt]: [u32; 4]| {
            CmArmSmmuV3Node {
                token: smmu_v3_token(index),
                id_mapping_count: SMMU_V3_ID_MAPPING_COUNT,
                id_mapping_token: id_mapping_token(id_mapping_group, 0),
                base_address,
                flags: EFI_ACPI_IORT_SMMUV3_FLAG_COHAC_OVERRIDE,
                vatos_address: 0,
                model: EFI_ACPI_IORT_SMMUV3_MODEL_GENERIC,
                event_interrupt,
                pri_interrupt,
                gerr_interrupt,
                sync_interrupt,
                proximity_domain: 0,
                device_id_mapping_index: 1,
            }
        };

        let root_complex = |index: usize| CmArmRootComplexNode {
            token: root_complex_token(index),
            id_mapping_count: ROOT_COMPLEX_ID_MAPPING_COUNT,
            id_mapping_token: id_mapping_token(1, index),
            cache_coherent: EFI_ACPI_IORT_MEM_ACCESS_PROP_CCA,
            allocation_hints: 0,
            memory_access_flags: EFI_ACPI_IORT_MEM_ACCESS_FLAGS_CPM,
            ats_attribute: EFI_ACPI_IORT_ROOT_COMPLEX_ATS_UNSUPPORTED,
            pci_segment_number: index as u32,
            memory_address_size: 42,
        };

        let id_mapping = |num_ids: u32, output_reference_token: CmObjectToken, flags: u32| CmArmIdMapping {
            input_base: 0,
            num_ids,
            output_base: 0,
            output_reference_token,
            flags,
        };

        Self {
            acpi_table_list: [
                CmStdObjAcpiTableInfo::new(
                    EFI_ACPI_6_4_FIXED_ACPI_DESCRIPTION_TABLE_SIGNATURE,
                    EFI_ACPI_6_4_FIXED_ACPI_DESCRIPTION_TABLE_REVISION,
                    EStdAcpiTableId::Fadt,
                )
                .with_minor_revision(EFI_ACPI_6_4_FIXED_ACPI_DESCRIPTION_TABLE_MINOR_REVISION),
                CmStdObjAcpiTableInfo::new(
                    EFI_ACPI_6_4_GENERIC_TIMER_DESCRIPTION_TABLE_SIGNATURE,
                    EFI_ACPI_6_4_GENERIC_TIMER_DESCRIPTION_TABLE_REVISION,
                    EStdAcpiTableId::Gtdt,
                ),
                CmStdObjAcpiTableInfo::new(
                    EFI_ACPI_6_4_MULTIPLE_APIC_DESCRIPTION_TABLE_SIGNATURE,
                    EFI_ACPI_6_4_MULTIPLE_APIC_DESCRIPTION_TABLE_REVISION,
                    EStdAcpiTableId::Madt,
                ),
                CmStdObjAcpiTableInfo::new(
                    EFI_ACPI_6_4_SERIAL_PORT_CONSOLE_REDIRECTION_TABLE_SIGNATURE,
                    EFI_ACPI_SERIAL_PORT_CONSOLE_REDIRECTION_TABLE_REVISION,
                    EStdAcpiTableId::Spcr,
                ),
                CmStdObjAcpiTableInfo::new(
                    EFI_ACPI_6_4_DIFFERENTIATED_SYSTEM_DESCRIPTION_TABLE_SIGNATURE,
                    0,
                    EStdAcpiTableId::DSDT,
                )
                .with_data(dsdt),
                CmStdObjAcpiTableInfo::new(
                    EFI_ACPI_6_4_DEBUG_PORT_2_TABLE_SIGNATURE,
                    EFI_ACPI_DBG2_DEBUG_DEVICE_INFORMATION_STRUCT_REVISION,
                    EStdAcpiTableId::Dbg2,
                ),
                CmStdObjAcpiTableInfo::new(
                    EFI_ACPI_6_4_PROCESSOR_PROPERTIES_TOPOLOGY_TABLE_STRUCTURE_SIGNATURE,
                    EFI_ACPI_6_4_PROCESSOR_PROPERTIES_TOPOLOGY_TABLE_REVISION,
                    EStdAcpiTableId::Pptt,
                ),
                CmStdObjAcpiTableInfo::new(
                    EFI_ACPI_6_4_IO_REMAPPING_TABLE_SIGNATURE,
                    EFI_ACPI_IO_REMAPPING_TABLE_REVISION_00,
                    EStdAcpiTableId::Iort,
                ),
                CmStdObjAcpiTableInfo::new(
                    EFI_ACPI_6_4_PCI_EXPRESS_MEMORY_MAPPED_CONFIGURATION_SPACE_BASE_ADDRESS_DESCRIPTION_TABLE_SIGNATURE,
                    EFI_ACPI_MEMORY_MAPPED_CONFIGURATION_SPACE_ACCESS_TABLE_REVISION,
                    EStdAcpiTableId::Mcfg,
                ),
                CmStdObjAcpiTableInfo::new(
                    EFI_ACPI_6_4_SECONDARY_SYSTEM_DESCRIPTION_TABLE_SIGNATURE,
                    0,
                    EStdAcpiTableId::SSDT,
                )
                .with_data(ssdt_pci),
            ],
            // PCIe TCU, PCIe RC, CCIX TCU, CCIX RC
            gic_its_info: [
                CmArmGicItsInfo { gic_its_id: 0, physical_base_address: 0x3006_0000, proximity_domain: 0 },
                CmArmGicItsInfo { gic_its_id: 1, physical_base_address: 0x300A_0000, proximity_domain: 0 },
                CmArmGicItsInfo { gic_its_id: 2, physical_base_address: 0x3004_0000, proximity_domain: 0 },
                CmArmGicItsInfo { gic_its_id: 3, physical_base_address: 0x3008_0000, proximity_domain: 0 },
            ],
            its_group_info: [its_group(0), its_group(1), its_group(2), its_group(3)],
            its_identifier_array: [
                CmArmItsIdentifier { its_id: 0 },
                CmArmItsIdentifier { its_id: 1 },
                CmArmItsIdentifier { its_id: 2 },
                CmArmItsIdentifier { its_id: 3 },
            ],
            smmu_v3_info: [
                smmu_v3(0, 0, 0x4F40_0000, [267, 72, 269, 268]),
                smmu_v3(1, 2, 0x4F00_0000, [260, 73, 262, 261]),
            ],
            root_complex_info: [root_complex(0), root_complex(1)],
            device_id_mapping: [
                // SMMUv3 (PCIe) -> ITS groups
                id_mapping(0xFFFF, its_group_token(1), 0),
                id_mapping(0x1, its_group_token(0), EFI_ACPI_IORT_ID_MAPPING_FLAGS_SINGLE),
                // Root complexes -> SMMUv3
                id_mapping(0xFFFF, smmu_v3_token(0), 0),
                id_mapping(0xFFFF, smmu_v3_token(1), 0),
                // SMMUv3 (CCIX) -> ITS groups
                id_mapping(0xFFFF, its_group_token(3), 0),
                id_mapping(0x1, its_group_token(2), EFI_ACPI_IORT_ID_MAPPING_FLAGS_SINGLE),
            ],
            pci_config_info: [
                CmArmPciConfigSpaceInfo {
                    base_address: config.pcie.ecam_base,
                    pci_segment_group_number: 0,
                    start_bus_number: config.pcie.bus_min,
                    end_bus_number: config.pcie.bus_max,
                },
                CmArmPciConfigSpaceInfo {
                    base_address: config.ccix.ecam_base,
                    pci_segment_group_number: 1,
                    start_bus_number: config.ccix.bus_min,
                    end_bus_number: config.ccix.bus_max,
                },
            ],
        }
    }

    /// Returns the run of device ID mappings starting at the mapping `token` references.
    pub fn get_device_id_mapping_array(
        &self,
        object_id: CmObjectId,
        token: CmObjectToken,
    ) -> Result<CmObjectDescriptor<'_>> {
        log::info!(target: "config_manager", "DeviceIdMapping - Token = {token:#x}");

        let head = token_index(EArmObjectId::IdMappingArray, token, ID_MAPPING_COUNT)
            .and_then(|index| ID_MAPPING_HEADS.iter().find(|(head, _)| *head == index));

        let Some(&(index, count)) = head else {
            log::info!(target: "config_manager", "DeviceIdMapping - Not Found");
            return Err(EfiError::NotFound);
        };

        log::info!(
            target: "config_manager",
            "DeviceIdMapping - Found DeviceIdMapping[{}][{}]",
            index / ID_MAPPING_GROUP_SIZE,
            index % ID_MAPPING_GROUP_SIZE
        );
        let mappings = self.device_id_mapping.get(index..index + count as usize).ok_or(EfiError::NotFound)?;
        Ok(CmObjectDescriptor::new(object_id, mappings))
    }

    /// Returns the ITS identifier `token` references.
    pub fn get_its_identifier_array(
        &self,
        object_id: CmObjectId,
        token: CmObjectToken,
    ) -> Result<CmObjectDescriptor<'_>> {
        token_index(EArmObjectId::GicItsIdentifierArray, token, self.its_identifier_array.len())
            .map(|index| CmObjectDescriptor::new(object_id, &self.its_identifier_array[index..=index]))
            .ok_or(EfiError::NotFound)
    }

    /// Returns the ITS group `token` references.
    pub fn get_its_group_info(&self, object_id: CmObjectId, token: CmObjectToken) -> Result<CmObjectDescriptor<'_>> {
        token_index(EArmObjectId::ItsGroup, token, self.its_group_info.len())
            .map(|index| CmObjectDescriptor::new(object_id, &self.its_group_info[index..=index]))
            .ok_or(EfiError::NotFound)
    }
}

impl PlatformRepository for MorelloSocRepository {
    fn get_standard_namespace_object_plat(
        &self,
        object_id: CmObjectId,
        _token: CmObjectToken,
    ) -> Result<CmObjectDescriptor<'_>> {
        match EStdObjectId::from_object(object_id.object()) {
            Some(EStdObjectId::AcpiTableList) => handle_cm_object(object_id, &self.acpi_table_list),
            _ => Err(EfiError::NotFound),
        }
    }

    fn get_arm_namespace_object_plat(
        &self,
        object_id: CmObjectId,
        token: CmObjectToken,
    ) -> Result<CmObjectDescriptor<'_>> {
        match EArmObjectId::from_object(object_id.object()) {
            Some(EArmObjectId::GicItsInfo) => handle_cm_object(object_id, &self.gic_its_info),
            Some(EArmObjectId::SmmuV3) => handle_cm_object(object_id, &self.smmu_v3_info),
            Some(EArmObjectId::ItsGroup) => {
                handle_cm_object_ref_by_token(object_id, &self.its_group_info, token, |id, token| {
                    self.get_its_group_info(id, token)
                })
            }
            Some(EArmObjectId::GicItsIdentifierArray) => {
                handle_cm_object_ref_by_token(object_id, &self.its_identifier_array, token, |id, token| {
                    self.get_its_identifier_array(id, token)
                })
            }
            Some(EArmObjectId::RootComplex) => handle_cm_object(object_id, &self.root_complex_info),
            Some(EArmObjectId::IdMappingArray) => {
                handle_cm_object_ref_by_token(object_id, &self.device_id_mapping, token, |id, token| {
                    self.get_device_id_mapping_array(id, token)
                })
            }
            Some(EArmObjectId::PciConfigSpaceInfo) => handle_cm_object(object_id, &self.pci_config_info),
            _ => Err(EfiError::NotFound),
        }
    }
}
