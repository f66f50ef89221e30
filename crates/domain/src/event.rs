//! Events consumed from the HMI and signals produced towards companion apps.

use serde::{Deserialize, Serialize};

use crate::application::Application;
use crate::id::{AppId, HmiAppId};

/// Notification that an application completed registration.
///
/// `hmi_app_id` is the id assigned at registration time; it may differ from
/// the id the original activation request used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationEvent {
    pub hmi_app_id: HmiAppId,
}

/// A notification broadcast on the HMI event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HmiEvent {
    AppRegistered(RegistrationEvent),
    /// Any other notification; activation ignores these.
    Other { method: String },
}

impl HmiEvent {
    /// The registration payload, if this is a registration notification.
    #[must_use]
    pub fn as_registration(&self) -> Option<RegistrationEvent> {
        match self {
            Self::AppRegistered(event) => Some(*event),
            Self::Other { .. } => None,
        }
    }
}

/// Request for a companion app to start another app's launch flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSignal {
    /// The registered app that receives the signal.
    pub app_id: AppId,
    pub schema_url: String,
    pub package_name: String,
}

impl LaunchSignal {
    /// Signal asking `relay` to launch `target`.
    #[must_use]
    pub fn new(relay: &Application, target: &Application) -> Self {
        Self {
            app_id: relay.app_id,
            schema_url: target.schema_url.clone(),
            package_name: target.package_name.clone(),
        }
    }
}
