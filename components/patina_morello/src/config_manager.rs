//! Morello Configuration Manager
//!
//! Serves the platform description objects consumed by the dynamic ACPI table generators. Objects are looked up
//! by [`CmObjectId`] and, for arrays referenced from other objects, by [`CmObjectToken`].
//!
//! The front end, [`ConfigurationManager`], answers the common objects itself and hands everything else to a
//! [`PlatformRepository`]: [`soc::MorelloSocRepository`] for the SoC or [`fvp::MorelloFvpRepository`] for the FVP.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
pub mod fvp;
pub mod object;
pub mod soc;

use core::mem::size_of;

use patina_platform_sdk::error::{EfiError, Result};

pub use object::*;

/// Describes a run of objects returned by the Configuration Manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmObjectDescriptor<'a> {
    pub object_id: CmObjectId,
    pub count: u32,
    pub data: CmObjectData<'a>,
}

impl<'a> CmObjectDescriptor<'a> {
    pub fn new<T: CmObject>(object_id: CmObjectId, objects: &'a [T]) -> Self {
        Self { object_id, count: objects.len() as u32, data: T::wrap(objects) }
    }

    /// Size in bytes of the described objects.
    pub fn size(&self) -> usize {
        let element_size = match self.data {
            CmObjectData::CfgMgrInfo(_) => size_of::<CmStdObjConfigurationManagerInfo>(),
            CmObjectData::AcpiTableList(_) => size_of::<CmStdObjAcpiTableInfo>(),
            CmObjectData::GicItsInfo(_) => size_of::<CmArmGicItsInfo>(),
            CmObjectData::ItsGroup(_) => size_of::<CmArmItsGroupNode>(),
            CmObjectData::ItsIdentifier(_) => size_of::<CmArmItsIdentifier>(),
            CmObjectData::SmmuV3(_) => size_of::<CmArmSmmuV3Node>(),
            CmObjectData::RootComplex(_) => size_of::<CmArmRootComplexNode>(),
            CmObjectData::IdMapping(_) => size_of::<CmArmIdMapping>(),
            CmObjectData::PciConfigSpace(_) => size_of::<CmArmPciConfigSpaceInfo>(),
        };
        self.count as usize * element_size
    }
}

/// Describes the whole `objects` array.
pub fn handle_cm_object<T: CmObject>(object_id: CmObjectId, objects: &[T]) -> Result<CmObjectDescriptor<'_>> {
    let descriptor = CmObjectDescriptor::new(object_id, objects);
    log::info!(
        target: "config_manager",
        "{object_id:?}: Ptr = {:p}, Size = {}, Count = {}",
        objects.as_ptr(),
        descriptor.size(),
        descriptor.count
    );
    Ok(descriptor)
}

/// Describes the whole `objects` array for [`CM_NULL_TOKEN`], otherwise the objects `lookup` resolves `token` to.
pub fn handle_cm_object_ref_by_token<'a, T, F>(
    object_id: CmObjectId,
    objects: &'a [T],
    token: CmObjectToken,
    lookup: F,
) -> Result<CmObjectDescriptor<'a>>
where
    T: CmObject,
    F: FnOnce(CmObjectId, CmObjectToken) -> Result<CmObjectDescriptor<'a>>,
{
    if token == CM_NULL_TOKEN {
        return handle_cm_object(object_id, objects);
    }

    let descriptor = lookup(object_id, token)?;
    log::info!(
        target: "config_manager",
        "{object_id:?}: Token = {token:#x}, Size = {}, Count = {}",
        descriptor.size(),
        descriptor.count
    );
    Ok(descriptor)
}

/// Platform specific object repository.
pub trait PlatformRepository {
    /// Returns a platform specific standard namespace object.
    fn get_standard_namespace_object_plat(
        &self,
        object_id: CmObjectId,
        token: CmObjectToken,
    ) -> Result<CmObjectDescriptor<'_>>;

    /// Returns a platform specific Arm namespace object.
    fn get_arm_namespace_object_plat(&self, object_id: CmObjectId, token: CmObjectToken)
        -> Result<CmObjectDescriptor<'_>>;
}

/// The Configuration Manager.
pub struct ConfigurationManager<P: PlatformRepository> {
    info: [CmStdObjConfigurationManagerInfo; 1],
    platform: P,
}

impl<P: PlatformRepository> ConfigurationManager<P> {
    pub const fn new(platform: P) -> Self {
        Self {
            info: [CmStdObjConfigurationManagerInfo {
                revision: CONFIGURATION_MANAGER_REVISION,
                oem_id: CFG_MGR_OEM_ID,
            }],
            platform,
        }
    }

    pub fn revision(&self) -> u32 {
        self.info[0].revision
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Returns the requested object.
    pub fn get_object(&self, object_id: CmObjectId, token: CmObjectToken) -> Result<CmObjectDescriptor<'_>> {
        let result = match object_id.namespace() {
            Some(ObjectNamespace::Standard) => self.get_standard_namespace_object(object_id, token),
            Some(ObjectNamespace::Arm) => self.platform.get_arm_namespace_object_plat(object_id, token),
            Some(ObjectNamespace::Oem) => Err(EfiError::NotFound),
            None => {
                log::error!(target: "config_manager", "Unknown Namespace Object = {object_id:?}");
                Err(EfiError::InvalidParameter)
            }
        };

        if let Err(EfiError::NotFound) = result {
            log::info!(target: "config_manager", "Object {object_id:?} not found. Token = {token:#x}");
        }
        result
    }

    /// Updating objects is not supported.
    pub fn set_object(&self, object_id: CmObjectId, _token: CmObjectToken) -> Result<()> {
        log::error!(target: "config_manager", "SetObject {object_id:?} is not supported");
        Err(EfiError::Unsupported)
    }

    fn get_standard_namespace_object(
        &self,
        object_id: CmObjectId,
        token: CmObjectToken,
    ) -> Result<CmObjectDescriptor<'_>> {
        match EStdObjectId::from_object(object_id.object()) {
            Some(EStdObjectId::CfgMgrInfo) => handle_cm_object(object_id, &self.info),
            _ => self.platform.get_standard_namespace_object_plat(object_id, token),
        }
    }
}
