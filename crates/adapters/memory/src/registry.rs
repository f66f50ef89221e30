//! In-memory implementation of [`ApplicationRegistry`].

use std::future::Future;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use appwake_app::ports::ApplicationRegistry;
use appwake_domain::application::Application;
use appwake_domain::error::AppWakeError;
use appwake_domain::id::{AppId, DeviceHandle, HmiAppId};
use appwake_domain::registry::RegistrySnapshot;

#[derive(Debug, Default)]
struct Registries {
    registered: Vec<Application>,
    pending: Vec<Application>,
    last_app_id: u32,
}

impl Registries {
    fn forget(&mut self, hmi_app_id: HmiAppId) {
        self.registered.retain(|app| app.hmi_app_id != hmi_app_id);
        self.pending.retain(|app| app.hmi_app_id != hmi_app_id);
    }

    fn next_app_id(&mut self) -> AppId {
        loop {
            self.last_app_id = self.last_app_id.wrapping_add(1).max(1);
            let candidate = AppId::new(self.last_app_id);
            if !self.registered.iter().any(|app| app.app_id == candidate) {
                return candidate;
            }
        }
    }
}

/// Registered and pending applications behind one lock.
///
/// An application lives in exactly one of the two sets; every mutation
/// removes it from the other set first.
#[derive(Debug, Default)]
pub struct InMemoryApplicationRegistry {
    inner: RwLock<Registries>,
}

impl InMemoryApplicationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry seeded with `applications`.
    ///
    /// # Errors
    ///
    /// Returns [`AppWakeError::Validation`] for the first invalid application.
    pub fn with_applications(applications: Vec<Application>) -> Result<Self, AppWakeError> {
        let registry = Self::new();
        for app in applications {
            registry.insert(app)?;
        }
        Ok(registry)
    }

    /// Add or replace an application, filed by its `is_registered` flag.
    ///
    /// # Errors
    ///
    /// Returns [`AppWakeError::Validation`] if the application is invalid.
    pub fn insert(&self, app: Application) -> Result<(), AppWakeError> {
        app.validate()?;
        let mut inner = self.write();
        inner.forget(app.hmi_app_id);
        if app.is_registered {
            inner.registered.retain(|other| other.app_id != app.app_id);
            inner.last_app_id = inner.last_app_id.max(app.app_id.get());
            inner.registered.push(app);
        } else {
            inner.pending.push(app);
        }
        Ok(())
    }

    /// Move a pending application to the registered set under a fresh `app_id`.
    ///
    /// Returns the registered application, or `None` if nothing was pending
    /// under `hmi_app_id`.
    pub fn complete_registration(&self, hmi_app_id: HmiAppId) -> Option<Application> {
        let mut inner = self.write();
        let index = inner
            .pending
            .iter()
            .position(|app| app.hmi_app_id == hmi_app_id)?;
        let mut app = inner.pending.remove(index);
        app.app_id = inner.next_app_id();
        app.is_registered = true;
        app.is_foreground = false;
        tracing::debug!(%hmi_app_id, app_id = %app.app_id, "application registered");
        inner.registered.push(app.clone());
        Some(app)
    }

    /// Mark `app_id` as the foreground app of its device, clearing the flag on
    /// every other app of that device.
    ///
    /// Returns `false` if `app_id` is not registered.
    pub fn bring_to_foreground(&self, app_id: AppId) -> bool {
        let mut inner = self.write();
        let Some(device) = inner
            .registered
            .iter()
            .find(|app| app.app_id == app_id)
            .map(|app| app.device)
        else {
            return false;
        };
        for app in inner.registered.iter_mut().filter(|app| app.device == device) {
            app.is_foreground = app.app_id == app_id;
        }
        true
    }

    /// Drop every application of a disconnected device.
    ///
    /// Returns how many applications were removed.
    pub fn disconnect(&self, device: DeviceHandle) -> usize {
        let mut inner = self.write();
        let before = inner.registered.len() + inner.pending.len();
        inner.registered.retain(|app| app.device != device);
        inner.pending.retain(|app| app.device != device);
        before - inner.registered.len() - inner.pending.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Registries> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registries> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ApplicationRegistry for InMemoryApplicationRegistry {
    fn snapshot(&self) -> impl Future<Output = Result<RegistrySnapshot, AppWakeError>> + Send {
        let inner = self.read();
        let snapshot = RegistrySnapshot::new(inner.registered.clone(), inner.pending.clone());
        drop(inner);
        async { Ok(snapshot) }
    }
}
