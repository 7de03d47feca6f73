//! Kernel module - job infrastructure and collaborator traits.

pub mod deps;
pub mod events;
pub mod jobs;
pub mod test_dependencies;
pub mod traits;

pub use deps::OffloadDeps;
pub use events::{BulkActionEvent, EventBus};
pub use test_dependencies::TestDependencies;
pub use traits::*;
