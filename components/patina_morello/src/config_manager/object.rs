//! Configuration Manager Objects
//!
//! Object identifiers and the object structures served to the dynamic table generators.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::fmt;

/// A token identifying one object, or the head of an array of objects, in a repository.
pub type CmObjectToken = u64;

/// The token used when an object is not referenced.
pub const CM_NULL_TOKEN: CmObjectToken = 0;

/// Reference token of element `index` of an Arm namespace object array.
pub const fn reference_token(object: EArmObjectId, index: usize) -> CmObjectToken {
    ((CmObjectId::arm(object).0 as u64) << 16) | (index as u64 + 1)
}

/// Index of the element of an Arm namespace object array with `count` elements that `token` references.
pub const fn token_index(object: EArmObjectId, token: CmObjectToken, count: usize) -> Option<usize> {
    let index = (token & 0xFFFF) as usize;
    if token >> 16 != CmObjectId::arm(object).0 as u64 || index == 0 || index > count {
        return None;
    }
    Some(index - 1)
}

/// Builds a revision value from its major and minor parts.
pub const fn create_revision(major: u16, minor: u16) -> u32 {
    ((major as u32) << 16) | minor as u32
}

/// Revision of the Configuration Manager.
pub const CONFIGURATION_MANAGER_REVISION: u32 = create_revision(1, 0);

/// OEM ID reported in the Configuration Manager info object.
pub const CFG_MGR_OEM_ID: [u8; 6] = *b"ARMLTD";

/// Namespace of a Configuration Manager object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ObjectNamespace {
    Standard = 0x0,
    Arm = 0x1,
    Oem = 0x8,
}

impl TryFrom<u32> for ObjectNamespace {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0x0 => Ok(Self::Standard),
            0x1 => Ok(Self::Arm),
            0x8 => Ok(Self::Oem),
            other => Err(other),
        }
    }
}

/// A Configuration Manager object ID.
///
/// Bits 31:28 hold the namespace and bits 7:0 the object ID within the namespace.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CmObjectId(pub u32);

impl CmObjectId {
    pub const fn new(namespace: u32, object: u32) -> Self {
        Self(((namespace & 0xF) << 28) | (object & 0xFF))
    }

    pub const fn standard(object: EStdObjectId) -> Self {
        Self::new(ObjectNamespace::Standard as u32, object as u32)
    }

    pub const fn arm(object: EArmObjectId) -> Self {
        Self::new(ObjectNamespace::Arm as u32, object as u32)
    }

    /// The raw namespace ID in bits 31:28.
    pub const fn namespace_id(self) -> u32 {
        (self.0 >> 28) & 0xF
    }

    pub fn namespace(self) -> Option<ObjectNamespace> {
        ObjectNamespace::try_from(self.namespace_id()).ok()
    }

    pub const fn object(self) -> u32 {
        self.0 & 0xFF
    }
}

impl fmt::Debug for CmObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CmObjectId({:#010x}: ns {}, obj {})", self.0, self.namespace_id(), self.object())
    }
}

/// Objects of the standard namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum EStdObjectId {
    CfgMgrInfo = 0,
    AcpiTableList = 1,
    SmbiosTableList = 2,
}

impl EStdObjectId {
    pub const fn from_object(object: u32) -> Option<Self> {
        match object {
            0 => Some(Self::CfgMgrInfo),
            1 => Some(Self::AcpiTableList),
            2 => Some(Self::SmbiosTableList),
            _ => None,
        }
    }
}

/// Objects of the Arm namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum EArmObjectId {
    Reserved = 0,
    BootArchInfo = 1,
    CpuInfo = 2,
    PowerManagementProfileInfo = 3,
    GicCInfo = 4,
    GicDInfo = 5,
    GicMsiFrameInfo = 6,
    GicRedistributorInfo = 7,
    GicItsInfo = 8,
    SerialConsolePortInfo = 9,
    SerialDebugPortInfo = 10,
    GenericTimerInfo = 11,
    PlatformGtBlockInfo = 12,
    GtBlockTimerFrameInfo = 13,
    PlatformGenericWatchdogInfo = 14,
    PciConfigSpaceInfo = 15,
    HypervisorVendorIdentity = 16,
    FixedFeatureFlags = 17,
    ItsGroup = 18,
    NamedComponent = 19,
    RootComplex = 20,
    SmmuV1SmmuV2 = 21,
    SmmuV3 = 22,
    PmcgInfo = 23,
    GicItsIdentifierArray = 24,
    IdMappingArray = 25,
    SmmuInterruptArray = 26,
    ProcHierarchyInfo = 27,
    CacheInfo = 28,
}

impl EArmObjectId {
    pub const fn from_object(object: u32) -> Option<Self> {
        Some(match object {
            0 => Self::Reserved,
            1 => Self::BootArchInfo,
            2 => Self::CpuInfo,
            3 => Self::PowerManagementProfileInfo,
            4 => Self::GicCInfo,
            5 => Self::GicDInfo,
            6 => Self::GicMsiFrameInfo,
            7 => Self::GicRedistributorInfo,
            8 => Self::GicItsInfo,
            9 => Self::SerialConsolePortInfo,
            10 => Self::SerialDebugPortInfo,
            11 => Self::GenericTimerInfo,
            12 => Self::PlatformGtBlockInfo,
            13 => Self::GtBlockTimerFrameInfo,
            14 => Self::PlatformGenericWatchdogInfo,
            15 => Self::PciConfigSpaceInfo,
            16 => Self::HypervisorVendorIdentity,
            17 => Self::FixedFeatureFlags,
            18 => Self::ItsGroup,
            19 => Self::NamedComponent,
            20 => Self::RootComplex,
            21 => Self::SmmuV1SmmuV2,
            22 => Self::SmmuV3,
            23 => Self::PmcgInfo,
            24 => Self::GicItsIdentifierArray,
            25 => Self::IdMappingArray,
            26 => Self::SmmuInterruptArray,
            27 => Self::ProcHierarchyInfo,
            28 => Self::CacheInfo,
            _ => return None,
        })
    }
}

/// Standard ACPI table generator IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum EStdAcpiTableId {
    Reserved = 0,
    /// Raw AML tables such as the DSDT and SSDTs.
    Raw = 1,
    Fadt = 2,
    Madt = 3,
    Gtdt = 4,
    Spcr = 5,
    Dbg2 = 6,
    Iort = 7,
    Mcfg = 8,
    SsdtSerialPort = 9,
    SsdtCpuTopology = 10,
    SsdtPciExpress = 11,
    Pptt = 12,
}

impl EStdAcpiTableId {
    pub const DSDT: Self = Self::Raw;
    pub const SSDT: Self = Self::Raw;
}

/// Generator ID of a standard namespace ACPI table generator.
pub const fn create_std_acpi_table_gen_id(table: EStdAcpiTableId) -> u32 {
    table as u32
}

/// Builds an ACPI table signature from its four character name.
pub const fn acpi_signature(name: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*name)
}

pub const EFI_ACPI_6_4_FIXED_ACPI_DESCRIPTION_TABLE_SIGNATURE: u32 = acpi_signature(b"FACP");
pub const EFI_ACPI_6_4_GENERIC_TIMER_DESCRIPTION_TABLE_SIGNATURE: u32 = acpi_signature(b"GTDT");
pub const EFI_ACPI_6_4_MULTIPLE_APIC_DESCRIPTION_TABLE_SIGNATURE: u32 = acpi_signature(b"APIC");
pub const EFI_ACPI_6_4_SERIAL_PORT_CONSOLE_REDIRECTION_TABLE_SIGNATURE: u32 = acpi_signature(b"SPCR");
pub const EFI_ACPI_6_4_DIFFERENTIATED_SYSTEM_DESCRIPTION_TABLE_SIGNATURE: u32 = acpi_signature(b"DSDT");
pub const EFI_ACPI_6_4_SECONDARY_SYSTEM_DESCRIPTION_TABLE_SIGNATURE: u32 = acpi_signature(b"SSDT");
pub const EFI_ACPI_6_4_DEBUG_PORT_2_TABLE_SIGNATURE: u32 = acpi_signature(b"DBG2");
pub const EFI_ACPI_6_4_PROCESSOR_PROPERTIES_TOPOLOGY_TABLE_STRUCTURE_SIGNATURE: u32 = acpi_signature(b"PPTT");
pub const EFI_ACPI_6_4_IO_REMAPPING_TABLE_SIGNATURE: u32 = acpi_signature(b"IORT");
pub const EFI_ACPI_6_4_PCI_EXPRESS_MEMORY_MAPPED_CONFIGURATION_SPACE_BASE_ADDRESS_DESCRIPTION_TABLE_SIGNATURE: u32 =
    acpi_signature(b"MCFG");

pub const EFI_ACPI_6_4_FIXED_ACPI_DESCRIPTION_TABLE_REVISION: u8 = 6;
pub const EFI_ACPI_6_4_FIXED_ACPI_DESCRIPTION_TABLE_MINOR_REVISION: u8 = 4;
pub const EFI_ACPI_6_4_GENERIC_TIMER_DESCRIPTION_TABLE_REVISION: u8 = 3;
pub const EFI_ACPI_6_4_MULTIPLE_APIC_DESCRIPTION_TABLE_REVISION: u8 = 5;
pub const EFI_ACPI_SERIAL_PORT_CONSOLE_REDIRECTION_TABLE_REVISION: u8 = 2;
pub const EFI_ACPI_DBG2_DEBUG_DEVICE_INFORMATION_STRUCT_REVISION: u8 = 0;
pub const EFI_ACPI_6_4_PROCESSOR_PROPERTIES_TOPOLOGY_TABLE_REVISION: u8 = 3;
pub const EFI_ACPI_IO_REMAPPING_TABLE_REVISION_00: u8 = 0;
pub const EFI_ACPI_MEMORY_MAPPED_CONFIGURATION_SPACE_ACCESS_TABLE_REVISION: u8 = 1;

// IORT node flags and properties.
pub const EFI_ACPI_IORT_SMMUV3_FLAG_COHAC_OVERRIDE: u32 = 1 << 0;
pub const EFI_ACPI_IORT_SMMUV3_MODEL_GENERIC: u32 = 0;
pub const EFI_ACPI_IORT_MEM_ACCESS_PROP_CCA: u32 = 1 << 0;
pub const EFI_ACPI_IORT_MEM_ACCESS_FLAGS_CPM: u8 = 1 << 0;
pub const EFI_ACPI_IORT_ROOT_COMPLEX_ATS_UNSUPPORTED: u32 = 0;
pub const EFI_ACPI_IORT_ID_MAPPING_FLAGS_SINGLE: u32 = 1 << 0;

/// Configuration Manager information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CmStdObjConfigurationManagerInfo {
    pub revision: u32,
    pub oem_id: [u8; 6],
}

/// An ACPI table to install, and the generator that builds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CmStdObjAcpiTableInfo {
    pub acpi_table_signature: u32,
    pub acpi_table_revision: u8,
    pub table_generator_id: u32,
    /// Prebuilt table data, for raw AML tables.
    pub acpi_table_data: Option<&'static [u8]>,
    pub oem_table_id: u64,
    pub oem_revision: u32,
    pub minor_revision: u8,
}

impl CmStdObjAcpiTableInfo {
    pub const fn new(signature: u32, revision: u8, generator: EStdAcpiTableId) -> Self {
        Self {
            acpi_table_signature: signature,
            acpi_table_revision: revision,
            table_generator_id: create_std_acpi_table_gen_id(generator),
            acpi_table_data: None,
            oem_table_id: 0,
            oem_revision: 0,
            minor_revision: 0,
        }
    }

    pub const fn with_data(mut self, data: &'static [u8]) -> Self {
        self.acpi_table_data = Some(data);
        self
    }

    pub const fn with_minor_revision(mut self, minor_revision: u8) -> Self {
        self.minor_revision = minor_revision;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CmArmGicItsInfo {
    pub gic_its_id: u32,
    pub physical_base_address: u64,
    pub proximity_domain: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CmArmItsGroupNode {
    /// Reference token of this node.
    pub token: CmObjectToken,
    pub its_id_count: u32,
    /// Reference token of the ITS identifier array.
    pub its_id_token: CmObjectToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CmArmItsIdentifier {
    pub its_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CmArmSmmuV3Node {
    /// Reference token of this node.
    pub token: CmObjectToken,
    pub id_mapping_count: u32,
    /// Reference token of the ID mapping array.
    pub id_mapping_token: CmObjectToken,
    pub base_address: u64,
    pub flags: u32,
    pub vatos_address: u64,
    pub model: u32,
    pub event_interrupt: u32,
    pub pri_interrupt: u32,
    pub gerr_interrupt: u32,
    pub sync_interrupt: u32,
    pub proximity_domain: u32,
    pub device_id_mapping_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CmArmRootComplexNode {
    /// Reference token of this node.
    pub token: CmObjectToken,
    pub id_mapping_count: u32,
    /// Reference token of the ID mapping array.
    pub id_mapping_token: CmObjectToken,
    pub cache_coherent: u32,
    pub allocation_hints: u8,
    pub memory_access_flags: u8,
    pub ats_attribute: u32,
    pub pci_segment_number: u32,
    pub memory_address_size: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CmArmIdMapping {
    pub input_base: u32,
    pub num_ids: u32,
    pub output_base: u32,
    /// Reference token of the node the IDs are mapped to.
    pub output_reference_token: CmObjectToken,
    pub flags: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CmArmPciConfigSpaceInfo {
    pub base_address: u64,
    pub pci_segment_group_number: u16,
    pub start_bus_number: u8,
    pub end_bus_number: u8,
}

/// Borrowed object data of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmObjectData<'a> {
    CfgMgrInfo(&'a [CmStdObjConfigurationManagerInfo]),
    AcpiTableList(&'a [CmStdObjAcpiTableInfo]),
    GicItsInfo(&'a [CmArmGicItsInfo]),
    ItsGroup(&'a [CmArmItsGroupNode]),
    ItsIdentifier(&'a [CmArmItsIdentifier]),
    SmmuV3(&'a [CmArmSmmuV3Node]),
    RootComplex(&'a [CmArmRootComplexNode]),
    IdMapping(&'a [CmArmIdMapping]),
    PciConfigSpace(&'a [CmArmPciConfigSpaceInfo]),
}

impl CmObjectData<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::CfgMgrInfo(data) => data.len(),
            Self::AcpiTableList(data) => data.len(),
            Self::GicItsInfo(data) => data.len(),
            Self::ItsGroup(data) => data.len(),
            Self::ItsIdentifier(data) => data.len(),
            Self::SmmuV3(data) => data.len(),
            Self::RootComplex(data) => data.len(),
            Self::IdMapping(data) => data.len(),
            Self::PciConfigSpace(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An object type that can be described by a [`CmObjectData`].
pub trait CmObject: Sized {
    fn wrap(objects: &[Self]) -> CmObjectData<'_>;
}

macro_rules! impl_cm_object {
    ($($object:ty => $variant:ident),+ $(,)?) => {
        $(
            impl CmObject for $object {
                fn wrap(objects: &[Self]) -> CmObjectData<'_> {
                    CmObjectData::$variant(objects)
                }
            }
        )+
    };
}

impl_cm_object!(
    CmStdObjConfigurationManagerInfo => CfgMgrInfo,
    CmStdObjAcpiTableInfo => AcpiTableList,
    CmArmGicItsInfo => GicItsInfo,
    CmArmItsGroupNode => ItsGroup,
    CmArmItsIdentifier => ItsIdentifier,
    CmArmSmmuV3Node => SmmuV3,
    CmArmRootComplexNode => RootComplex,
    CmArmIdMapping => IdMapping,
    CmArmPciConfigSpaceInfo => PciConfigSpace,
);
