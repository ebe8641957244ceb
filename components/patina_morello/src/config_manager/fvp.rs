//! Morello FVP Platform Repository
//!
//! The FVP model has no PCIe or SMMU, so only the ACPI table list is platform specific.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use patina_platform_sdk::error::{EfiError, Result};

use super::{handle_cm_object, object::*, CmObjectDescriptor, PlatformRepository};

/// Platform repository of the Morello FVP.
#[derive(Debug, Clone)]
pub struct MorelloFvpRepository {
    acpi_table_list: [CmStdObjAcpiTableInfo; 7],
}

impl MorelloFvpRepository {
    /// Creates the repository. `dsdt` is the compiled AML of the DSDT.
    pub fn new(dsdt: &'static [u8]) -> Self {
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
            ],
        }
    }
}

impl PlatformRepository for MorelloFvpRepository {
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
        _object_id: CmObjectId,
        _token: CmObjectToken,
    ) -> Result<CmObjectDescriptor<'_>> {
        Err(EfiError::NotFound)
    }
}
