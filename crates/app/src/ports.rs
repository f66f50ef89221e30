//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the activation core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod event_bus;
pub mod messenger;
pub mod policy;
pub mod registry;

pub use event_bus::EventPublisher;
pub use messenger::HmiMessenger;
pub use policy::PolicyHandler;
pub use registry::ApplicationRegistry;
