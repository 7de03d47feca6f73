pub mod ids;
pub mod request;

pub use ids::{new_job_id, JobId, PostId, UserId};
pub use request::{ClaimedFields, RequestContext, Screen};
