//! Loosely-typed HMI messages — identifier extraction and outbound shapes.
//!
//! Inbound messages are JSON objects of the form
//! `{ "id": 5, "method": "SDL.ActivateApp", "msg_params": { "appID": 9 } }`.
//! A missing identifier never rejects the message: it degrades to `0`, which
//! no registry resolves, and the reason is kept so callers can log it.

use std::fmt;
use std::str::FromStr;

use serde_json::{Value, json};

use crate::activation::{ActivationRequest, ActivationResponse};
use crate::error::MessageError;
use crate::event::{HmiEvent, LaunchSignal, RegistrationEvent};
use crate::id::{CorrelationId, HmiAppId};

const MSG_PARAMS: &str = "msg_params";
const APPLICATION: &str = "application";
const APP_ID: &str = "appID";

/// HMI functions this core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionId {
    ActivateApp,
    OnAppRegistered,
    OnLaunchApp,
}

impl FunctionId {
    #[must_use]
    pub fn method(self) -> &'static str {
        match self {
            Self::ActivateApp => "SDL.ActivateApp",
            Self::OnAppRegistered => "BasicCommunication.OnAppRegistered",
            Self::OnLaunchApp => "SDL.OnLaunchApp",
        }
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

impl FromStr for FunctionId {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SDL.ActivateApp" => Ok(Self::ActivateApp),
            "BasicCommunication.OnAppRegistered" => Ok(Self::OnAppRegistered),
            "SDL.OnLaunchApp" => Ok(Self::OnLaunchApp),
            other => Err(MessageError::UnknownFunction(other.to_string())),
        }
    }
}

/// What an inbound message asks of the activation core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Activate(ActivationRequest),
    Event(HmiEvent),
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub inbound: Inbound,
    /// Set when an identifier was missing and replaced by `0`.
    pub degraded: Option<MessageError>,
}

/// Decode an inbound HMI message.
///
/// Requests other than `SDL.ActivateApp` are rejected; notifications other
/// than registration are passed through as [`HmiEvent::Other`].
///
/// # Errors
///
/// Returns [`MessageError`] when the message has no `method` or carries an
/// unsupported request.
pub fn decode(message: &Value) -> Result<Decoded, MessageError> {
    let method = message
        .get("method")
        .and_then(Value::as_str)
        .ok_or(MessageError::MissingSection("method"))?;

    match method.parse::<FunctionId>() {
        Ok(FunctionId::ActivateApp) => {
            let mut degraded = None;
            let correlation_id = correlation_id(message).unwrap_or_else(|err| {
                degraded.get_or_insert(err);
                CorrelationId::default()
            });
            let target = activation_target(message).unwrap_or_else(|err| {
                degraded.get_or_insert(err);
                0
            });
            Ok(Decoded {
                inbound: Inbound::Activate(ActivationRequest::new(correlation_id, target)),
                degraded,
            })
        }
        Ok(FunctionId::OnAppRegistered) => {
            let (hmi_app_id, degraded) = match registered_hmi_app_id(message) {
                Ok(id) => (id, None),
                Err(err) => (HmiAppId::default(), Some(err)),
            };
            Ok(Decoded {
                inbound: Inbound::Event(HmiEvent::AppRegistered(RegistrationEvent { hmi_app_id })),
                degraded,
            })
        }
        Ok(FunctionId::OnLaunchApp) => Err(MessageError::UnknownFunction(method.to_string())),
        Err(err) if message.get("id").is_some() => Err(err),
        Err(_) => Ok(Decoded {
            inbound: Inbound::Event(HmiEvent::Other {
                method: method.to_string(),
            }),
            degraded: None,
        }),
    }
}

/// Top-level request id.
///
/// # Errors
///
/// Returns [`MessageError`] if `id` is absent or not an unsigned integer.
pub fn correlation_id(message: &Value) -> Result<CorrelationId, MessageError> {
    let id = message.get("id").ok_or(MessageError::MissingSection("id"))?;
    as_u32(id, "id").map(CorrelationId::new)
}

/// `msg_params.appID` of an activation request.
///
/// # Errors
///
/// Returns [`MessageError`] naming the first absent section.
pub fn activation_target(message: &Value) -> Result<u32, MessageError> {
    let app_id = message
        .get(MSG_PARAMS)
        .ok_or(MessageError::MissingSection(MSG_PARAMS))?
        .get(APP_ID)
        .ok_or(MessageError::MissingSection(APP_ID))?;
    as_u32(app_id, APP_ID)
}

/// `msg_params.application.appID` of a registration notification.
///
/// The id is read when the key is present; absence degrades the caller.
///
/// # Errors
///
/// Returns [`MessageError`] naming the first absent section.
pub fn registered_hmi_app_id(message: &Value) -> Result<HmiAppId, MessageError> {
    let app_id = message
        .get(MSG_PARAMS)
        .ok_or(MessageError::MissingSection(MSG_PARAMS))?
        .get(APPLICATION)
        .ok_or(MessageError::MissingSection(APPLICATION))?
        .get(APP_ID)
        .ok_or(MessageError::MissingSection(APP_ID))?;
    as_u32(app_id, APP_ID).map(HmiAppId::new)
}

fn as_u32(value: &Value, field: &'static str) -> Result<u32, MessageError> {
    value
        .as_u64()
        .and_then(|raw| u32::try_from(raw).ok())
        .ok_or(MessageError::NotAnInteger(field))
}

/// Outbound response to an `SDL.ActivateApp` request.
#[must_use]
pub fn response_message(response: &ActivationResponse) -> Value {
    json!({
        "id": response.correlation_id,
        "method": FunctionId::ActivateApp.method(),
        "success": response.success,
        "result_code": response.result_code,
    })
}

/// Outbound launch signal notification.
#[must_use]
pub fn launch_message(signal: &LaunchSignal) -> Value {
    json!({
        "method": FunctionId::OnLaunchApp.method(),
        "msg_params": {
            "appID": signal.app_id,
            "urlSchema": signal.schema_url,
            "packageName": signal.package_name,
        },
    })
}
