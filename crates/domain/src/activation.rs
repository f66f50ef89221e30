//! Activation — one inbound request to bring an application to the foreground.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AppId, CorrelationId, HmiAppId};

/// An inbound activation call.
///
/// `target` is a raw number: it is an [`AppId`] if the application is
/// registered, or an [`HmiAppId`] if it is still pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRequest {
    pub correlation_id: CorrelationId,
    pub target: u32,
    pub received_at: DateTime<Utc>,
}

impl ActivationRequest {
    /// Create a request received now.
    #[must_use]
    pub fn new(correlation_id: CorrelationId, target: u32) -> Self {
        Self {
            correlation_id,
            target,
            received_at: Utc::now(),
        }
    }

    /// The target read in the registered namespace.
    #[must_use]
    pub fn target_app_id(&self) -> AppId {
        AppId::new(self.target)
    }

    /// The target read in the pending namespace.
    #[must_use]
    pub fn target_hmi_app_id(&self) -> HmiAppId {
        HmiAppId::new(self.target)
    }
}

/// Result code carried by the single response to an activation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    #[serde(rename = "SUCCESS")]
    Success,
    /// The target resolves in neither registry.
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    /// The target is pending but no app on its device can relay a launch.
    #[serde(rename = "NO_APPS_REGISTERED")]
    NoAppsRegistered,
    /// A launch was requested but registration did not follow in time.
    #[serde(rename = "APPLICATION_NOT_REGISTERED")]
    NotRegistered,
}

impl ResultCode {
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Name used by the HMI for this code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::NotFound => "NOT_FOUND",
            Self::NoAppsRegistered => "NO_APPS_REGISTERED",
            Self::NotRegistered => "APPLICATION_NOT_REGISTERED",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The response sent back for an activation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationResponse {
    pub correlation_id: CorrelationId,
    pub success: bool,
    pub result_code: ResultCode,
}

impl ActivationResponse {
    #[must_use]
    pub fn new(correlation_id: CorrelationId, result_code: ResultCode) -> Self {
        Self {
            correlation_id,
            success: result_code.is_success(),
            result_code,
        }
    }
}

/// Lifecycle of a single activation request.
///
/// The decision pass leaves a new request in one of the first three states;
/// only a request awaiting launch moves again.
///
/// ```text
/// request ─┬─> ImmediateDone
///          ├─> Failed(NotFound | NoAppsRegistered)
///          └─> AwaitingLaunch ─┬─> Completed
///                              └─> Failed(NotRegistered)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActivationState {
    /// The target was registered; policy was asked to activate it.
    ImmediateDone { app_id: AppId },
    /// Launch signals went out; waiting for the target to register.
    AwaitingLaunch { signals_sent: usize },
    /// The launched application registered and was handed to policy.
    Completed { app_id: AppId },
    Failed { result_code: ResultCode },
}

impl ActivationState {
    /// Whether no further event or timeout may affect this request.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::AwaitingLaunch { .. })
    }

    #[must_use]
    pub fn failed(result_code: ResultCode) -> Self {
        Self::Failed { result_code }
    }
}
