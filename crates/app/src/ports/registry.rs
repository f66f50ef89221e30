//! Registry port — read access to registered and pending applications.

use std::future::Future;

use appwake_domain::error::AppWakeError;
use appwake_domain::registry::RegistrySnapshot;

/// Source of application registry snapshots.
///
/// Both registries are owned elsewhere; the activation core only reads them.
/// Every lookup of one decision pass goes through a single snapshot, so an
/// implementation must copy registered and pending apps atomically.
pub trait ApplicationRegistry {
    /// Take a consistent copy of both registries.
    fn snapshot(&self) -> impl Future<Output = Result<RegistrySnapshot, AppWakeError>> + Send;
}

impl<T: ApplicationRegistry + Send + Sync> ApplicationRegistry for std::sync::Arc<T> {
    fn snapshot(&self) -> impl Future<Output = Result<RegistrySnapshot, AppWakeError>> + Send {
        (**self).snapshot()
    }
}
