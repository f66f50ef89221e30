//! Application — a mobile app known to the head unit, registered or pending.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppWakeError, ValidationError};
use crate::id::{AppId, DeviceHandle, HmiAppId};

/// Mobile protocol generation an application connected with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProtocolVersion {
    V1,
    V2,
    V3,
    V4,
    V5,
}

impl ProtocolVersion {
    /// Oldest protocol able to receive a launch signal for another app.
    pub const LAUNCH_SIGNAL_FLOOR: Self = Self::V4;

    /// Whether an app speaking this version can forward a launch signal.
    #[must_use]
    pub fn supports_launch_signal(self) -> bool {
        self >= Self::LAUNCH_SIGNAL_FLOOR
    }
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            5 => Ok(Self::V5),
            other => Err(ValidationError::UnknownProtocolVersion(other)),
        }
    }
}

impl From<ProtocolVersion> for u8 {
    fn from(version: ProtocolVersion) -> Self {
        match version {
            ProtocolVersion::V1 => 1,
            ProtocolVersion::V2 => 2,
            ProtocolVersion::V3 => 3,
            ProtocolVersion::V4 => 4,
            ProtocolVersion::V5 => 5,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", u8::from(*self))
    }
}

/// A mobile application as seen by the head unit.
///
/// `app_id` is only meaningful once the application is registered; before
/// that the HMI addresses it by `hmi_app_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub app_id: AppId,
    pub hmi_app_id: HmiAppId,
    pub device: DeviceHandle,
    pub protocol_version: ProtocolVersion,
    pub is_registered: bool,
    /// At most one application per device should report `true`.
    pub is_foreground: bool,
    pub schema_url: String,
    pub package_name: String,
}

impl Application {
    /// Create a builder for constructing an [`Application`].
    #[must_use]
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }

    /// Whether this application can relay a launch signal for an app on `device`.
    #[must_use]
    pub fn is_launch_candidate_on(&self, device: DeviceHandle) -> bool {
        self.device == device && self.protocol_version.supports_launch_signal()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AppWakeError::Validation`] when the `hmi_app_id` is zero,
    /// a registered app has no `app_id`, or a pending app has no package name
    /// to launch.
    pub fn validate(&self) -> Result<(), AppWakeError> {
        if self.hmi_app_id.is_unset() {
            return Err(ValidationError::MissingHmiAppId.into());
        }
        if self.is_registered && self.app_id.is_unset() {
            return Err(ValidationError::MissingAppId.into());
        }
        if !self.is_registered && self.package_name.is_empty() {
            return Err(ValidationError::EmptyPackageName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Application`].
#[derive(Debug, Default)]
pub struct ApplicationBuilder {
    app_id: Option<AppId>,
    hmi_app_id: Option<HmiAppId>,
    device: Option<DeviceHandle>,
    protocol_version: Option<ProtocolVersion>,
    registered: bool,
    foreground: bool,
    schema_url: Option<String>,
    package_name: Option<String>,
}

impl ApplicationBuilder {
    #[must_use]
    pub fn app_id(mut self, app_id: impl Into<AppId>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    #[must_use]
    pub fn hmi_app_id(mut self, hmi_app_id: impl Into<HmiAppId>) -> Self {
        self.hmi_app_id = Some(hmi_app_id.into());
        self
    }

    #[must_use]
    pub fn device(mut self, device: impl Into<DeviceHandle>) -> Self {
        self.device = Some(device.into());
        self
    }

    #[must_use]
    pub fn protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.protocol_version = Some(version);
        self
    }

    #[must_use]
    pub fn registered(mut self, registered: bool) -> Self {
        self.registered = registered;
        self
    }

    #[must_use]
    pub fn foreground(mut self, foreground: bool) -> Self {
        self.foreground = foreground;
        self
    }

    #[must_use]
    pub fn schema_url(mut self, schema_url: impl Into<String>) -> Self {
        self.schema_url = Some(schema_url.into());
        self
    }

    #[must_use]
    pub fn package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    /// Consume the builder, validate, and return an [`Application`].
    ///
    /// Protocol version defaults to [`ProtocolVersion::V1`].
    ///
    /// # Errors
    ///
    /// Returns [`AppWakeError::Validation`] if invariants fail.
    pub fn build(self) -> Result<Application, AppWakeError> {
        let app = Application {
            app_id: self.app_id.unwrap_or_default(),
            hmi_app_id: self.hmi_app_id.unwrap_or_default(),
            device: self.device.unwrap_or_default(),
            protocol_version: self.protocol_version.unwrap_or(ProtocolVersion::V1),
            is_registered: self.registered,
            is_foreground: self.foreground,
            schema_url: self.schema_url.unwrap_or_default(),
            package_name: self.package_name.unwrap_or_default(),
        };
        app.validate()?;
        Ok(app)
    }
}
