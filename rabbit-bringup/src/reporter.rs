//! Firmware version reporting
//!
//! The record layout matches the device's serial log so existing tooling
//! that scrapes it keeps working.

use device_platform::{FirmwareInfo, FirmwareSource, FIRMWARE_NAME_CAPACITY};

use crate::error::{BringupError, Result};
use crate::logging::APP_TARGET;

/// A firmware snapshot and its rendered diagnostic record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    pub info: FirmwareInfo,
    pub record: String,
}

/// Queries and renders firmware metadata
pub struct VersionReporter<'a> {
    source: &'a dyn FirmwareSource,
}

impl<'a> VersionReporter<'a> {
    pub fn new(source: &'a dyn FirmwareSource) -> Self {
        Self { source }
    }

    /// Read the current firmware metadata
    pub fn query_firmware_info(&self) -> Result<FirmwareInfo> {
        self.source
            .query()
            .map_err(BringupError::VersionQueryFailure)
    }

    /// Query, render, and log the diagnostic record
    pub fn report(&self) -> Result<VersionReport> {
        let info = self.query_firmware_info()?;
        let record = render(&info);
        tracing::info!(target: APP_TARGET, "\n{}", record);
        Ok(VersionReport { info, record })
    }
}

/// Render the fixed multi-line firmware record
pub fn render(info: &FirmwareInfo) -> String {
    format!(
        "mx1200_ver = {}\n\
         sound_remind_ver = {}\n\
         hardware_ver = {}\n\
         mx1200_fw_name_len = {}\n\
         mx1200_fw_name[{cap}] = {}\n\
         sound_remind_fw_name_len = {}\n\
         sound_remind_fw_name[{cap}] = {}",
        info.mx1200_version,
        info.sound_remind_version,
        info.hardware_version,
        info.mx1200_fw_name.len(),
        info.mx1200_fw_name.as_str(),
        info.sound_remind_fw_name.len(),
        info.sound_remind_fw_name.as_str(),
        cap = FIRMWARE_NAME_CAPACITY,
    )
}
