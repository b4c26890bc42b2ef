//! Capability Dispatcher Common Types
//!
//! Shared types used by the dispatcher service and by feature modules
//! that contribute handlers to it.

pub mod capability;
pub mod handler;
pub mod result;
pub mod settings;

pub use capability::{Capability, CapabilityCatalog};
pub use handler::{HandlerDescriptor, HandlerSource};
pub use result::{AttemptFailure, DispatchFailure, DispatchFailureKind, ExecuteResult};
pub use settings::{CapabilitySettings, ConfigSource, StoredKey};
