//! Morello I2C Buses
//!
//! The Morello SoC drives its HDMI transmitter over a Cadence I2C controller. [`CadenceI2cInstall`] carries what
//! the Cadence driver needs to install an I2C master on one controller. [`I2cBusHdmi`] owns the lifetime of the
//! HDMI bus: [`start`](I2cBusHdmi::start) installs the controller and device bindings through [`I2cBusBindings`],
//! [`stop`](I2cBusHdmi::stop) removes them.
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

/// Install information for one Cadence I2C controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CadenceI2cInstall {
    /// Base MMIO address.
    pub mmio_base: efi::PhysicalAddress,
    /// Input hardware clock in Hertz.
    pub input_clock_hz: u32,
}

/// A device on an I2C bus, as reported to the I2C bus driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cDevice {
    pub device_guid: efi::Guid,
    pub device_index: u32,
    pub hardware_revision: u32,
    pub slave_addresses: &'static [u32],
}

/// Handle of an installed I2C bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cBusHandle(pub usize);

/// Installs and removes the driver bindings of an I2C bus.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait I2cBusBindings {
    /// Installs the controller and the device bindings of a bus.
    fn install(&mut self, controller: &CadenceI2cInstall, devices: &[I2cDevice]) -> Result<I2cBusHandle>;

    /// Uninstalls the bindings of a bus returned by [`install`](I2cBusBindings::install).
    fn uninstall(&mut self, bus: I2cBusHandle) -> Result<()>;
}

/// The Morello SoC HDMI I2C bus.
pub struct I2cBusHdmi<B: I2cBusBindings> {
    bindings: B,
    controller: CadenceI2cInstall,
    devices: &'static [I2cDevice],
    bus: Option<I2cBusHandle>,
}

impl<B: I2cBusBindings> I2cBusHdmi<B> {
    pub const fn new(bindings: B, controller: CadenceI2cInstall, devices: &'static [I2cDevice]) -> Self {
        Self { bindings, controller, devices, bus: None }
    }

    pub const fn is_started(&self) -> bool {
        self.bus.is_some()
    }

    /// Installs the controller and device bindings of the bus.
    ///
    /// A bus that is already started is `AlreadyStarted`. A controller without an MMIO base or an input clock, or a
    /// device without a slave address, is `InvalidParameter`.
    pub fn start(&mut self) -> Result<()> {
        if self.bus.is_some() {
            return Err(EfiError::AlreadyStarted);
        }
        if self.controller.mmio_base == 0 || self.controller.input_clock_hz == 0 {
            log::error!(target: "i2c", "Invalid HDMI I2C controller: {:x?}", self.controller);
            return Err(EfiError::InvalidParameter);
        }
        if let Some(device) = self.devices.iter().find(|device| device.slave_addresses.is_empty()) {
            log::error!(target: "i2c", "HDMI I2C device {} has no slave address.", device.device_index);
            return Err(EfiError::InvalidParameter);
        }

        let bus = self.bindings.install(&self.controller, self.devices).inspect_err(|err| {
            log::error!(target: "i2c", "Failed to install the HDMI I2C bus: {err:?}");
        })?;
        log::info!(
            target: "i2c",
            "HDMI I2C bus started on controller {:#x} with {} device(s).",
            self.controller.mmio_base,
            self.devices.len()
        );
        self.bus = Some(bus);
        Ok(())
    }

    /// Uninstalls the bus. Stopping a bus that is not started succeeds.
    ///
    /// The bus stays started when the bindings cannot be removed.
    pub fn stop(&mut self) -> Result<()> {
        let Some(bus) = self.bus else {
            return Ok(());
        };
        self.bindings.uninstall(bus).inspect_err(|err| {
            log::error!(target: "i2c", "Failed to uninstall the HDMI I2C bus: {err:?}");
        })?;
        self.bus = None;
        log::info!(target: "i2c", "HDMI I2C bus stopped.");
        Ok(())
    }
}
