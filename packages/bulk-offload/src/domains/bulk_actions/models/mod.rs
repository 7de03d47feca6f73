pub mod edit;
pub mod job;
pub mod result;

pub use edit::{EditFields, PostUpdate, Sticky};
pub use job::{ActionKind, Fingerprint, JobDescriptor, StatusFilter, ANY_STATUS};
pub use result::{ItemOutcome, ResultRecord};
