//! Registry snapshot — one consistent view of registered and pending apps.
//!
//! A decision pass works on a single snapshot so that lookups and candidate
//! filtering never observe a half-applied registration.

use serde::{Deserialize, Serialize};

use crate::activation::ActivationRequest;
use crate::application::Application;
use crate::event::LaunchSignal;
use crate::id::{AppId, DeviceHandle, HmiAppId};

/// Point-in-time copy of both application registries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    registered: Vec<Application>,
    pending: Vec<Application>,
}

/// Where an activation target was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Registered(&'a Application),
    Pending(&'a Application),
    NotFound,
}

/// How launch signals for a pending target are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPlan {
    /// A foreground relay exists on the device; only it is signalled.
    Foreground(LaunchSignal),
    /// No relay is in the foreground; every candidate is signalled.
    Broadcast(Vec<LaunchSignal>),
}

impl LaunchPlan {
    #[must_use]
    pub fn signals(&self) -> &[LaunchSignal] {
        match self {
            Self::Foreground(signal) => std::slice::from_ref(signal),
            Self::Broadcast(signals) => signals,
        }
    }

    #[must_use]
    pub fn into_signals(self) -> Vec<LaunchSignal> {
        match self {
            Self::Foreground(signal) => vec![signal],
            Self::Broadcast(signals) => signals,
        }
    }
}

impl RegistrySnapshot {
    #[must_use]
    pub fn new(registered: Vec<Application>, pending: Vec<Application>) -> Self {
        Self {
            registered,
            pending,
        }
    }

    /// All registered applications, in registry iteration order.
    #[must_use]
    pub fn applications(&self) -> &[Application] {
        &self.registered
    }

    /// Applications waiting to be registered.
    #[must_use]
    pub fn apps_to_be_registered(&self) -> &[Application] {
        &self.pending
    }

    /// Registered application by its stable id.
    #[must_use]
    pub fn application(&self, app_id: AppId) -> Option<&Application> {
        if app_id.is_unset() {
            return None;
        }
        self.registered.iter().find(|app| app.app_id == app_id)
    }

    /// Registered application by the HMI id it registered with.
    #[must_use]
    pub fn application_by_hmi_app(&self, hmi_app_id: HmiAppId) -> Option<&Application> {
        if hmi_app_id.is_unset() {
            return None;
        }
        self.registered.iter().find(|app| app.hmi_app_id == hmi_app_id)
    }

    /// Pending application by its HMI id.
    #[must_use]
    pub fn app_to_be_registered(&self, hmi_app_id: HmiAppId) -> Option<&Application> {
        if hmi_app_id.is_unset() {
            return None;
        }
        self.pending.iter().find(|app| app.hmi_app_id == hmi_app_id)
    }

    /// Resolve an activation target, registered namespace first.
    ///
    /// The two id spaces may hold the same number for different apps, so the
    /// pending registry is consulted only when the registered lookup misses.
    #[must_use]
    pub fn resolve(&self, request: &ActivationRequest) -> Resolution<'_> {
        if let Some(app) = self.application(request.target_app_id()) {
            return Resolution::Registered(app);
        }
        match self.app_to_be_registered(request.target_hmi_app_id()) {
            Some(app) => Resolution::Pending(app),
            None => Resolution::NotFound,
        }
    }

    /// Registered apps on `device` able to relay a launch signal.
    pub fn launch_candidates(&self, device: DeviceHandle) -> impl Iterator<Item = &Application> {
        self.registered
            .iter()
            .filter(move |app| app.is_launch_candidate_on(device))
    }

    /// The candidate currently in the foreground on `device`, if any.
    ///
    /// Should several report foreground, the first in iteration order wins;
    /// the registry promises no ordering.
    #[must_use]
    pub fn foreground_candidate(&self, device: DeviceHandle) -> Option<&Application> {
        self.launch_candidates(device).find(|app| app.is_foreground)
    }

    /// Decide who receives the launch signal for a pending `target`.
    ///
    /// Returns `None` when the target's device has no candidate at all.
    #[must_use]
    pub fn plan_launch(&self, target: &Application) -> Option<LaunchPlan> {
        if let Some(relay) = self.foreground_candidate(target.device) {
            return Some(LaunchPlan::Foreground(LaunchSignal::new(relay, target)));
        }
        let signals: Vec<_> = self
            .launch_candidates(target.device)
            .map(|relay| LaunchSignal::new(relay, target))
            .collect();
        if signals.is_empty() {
            None
        } else {
            Some(LaunchPlan::Broadcast(signals))
        }
    }
}
