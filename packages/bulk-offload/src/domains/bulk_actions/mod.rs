//! Deferred bulk actions: capture, dedup-and-schedule, execution and
//! listing visibility.

pub mod capture;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod index;
pub mod models;
pub mod notices;
pub mod redirect;
pub mod visibility;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{CaptureError, DispatchError};
pub use executor::{execute, ExecutionSettings};
pub use handlers::{
    BulkActionHandler, CustomBulkAction, HandlerRegistry, ProcessOutcome, SharedHandlerRegistry,
};
pub use models::*;
pub use notices::{Notice, NoticeKind};
pub use visibility::{Exclusion, ListingQuery};
