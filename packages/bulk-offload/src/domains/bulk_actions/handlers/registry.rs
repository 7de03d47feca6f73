//! Handler lookup by action kind.
//!
//! Native kinds always resolve. A custom kind resolves only when an action
//! of that name was registered, which is what lets unknown custom actions
//! fall through to the synchronous path.

use std::sync::Arc;

use super::{
    BulkActionHandler, CustomActionHandler, CustomBulkAction, DeleteAllHandler,
    DeletePermanentlyHandler, EditHandler, MoveToTrashHandler, RestoreFromTrashHandler,
};
use crate::domains::bulk_actions::models::ActionKind;

/// Every handler, native and custom.
#[derive(Debug, Default, Clone)]
pub struct HandlerRegistry {
    edit: EditHandler,
    trash: MoveToTrashHandler,
    untrash: RestoreFromTrashHandler,
    delete: DeletePermanentlyHandler,
    delete_all: DeleteAllHandler,
    custom: CustomActionHandler,
}

/// Shared registry handle.
pub type SharedHandlerRegistry = Arc<HandlerRegistry>;

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom bulk action (builder style).
    pub fn with_custom_action(mut self, action: Arc<dyn CustomBulkAction>) -> Self {
        self.custom.register(action);
        self
    }

    pub fn register_custom_action(&mut self, action: Arc<dyn CustomBulkAction>) {
        self.custom.register(action);
    }

    /// Handler responsible for `kind`, if any.
    pub fn handler_for(&self, kind: &ActionKind) -> Option<&dyn BulkActionHandler> {
        match kind {
            ActionKind::Edit => Some(&self.edit),
            ActionKind::Trash => Some(&self.trash),
            ActionKind::Untrash => Some(&self.untrash),
            ActionKind::Delete => Some(&self.delete),
            ActionKind::DeleteAll => Some(&self.delete_all),
            ActionKind::Custom(name) if self.custom.is_registered(name) => Some(&self.custom),
            ActionKind::Custom(_) => None,
        }
    }

    /// All handlers, for listing filters and notices.
    pub fn handlers(&self) -> [&dyn BulkActionHandler; 6] {
        [
            &self.edit,
            &self.trash,
            &self.untrash,
            &self.delete,
            &self.delete_all,
            &self.custom,
        ]
    }

    pub fn delete_all(&self) -> &DeleteAllHandler {
        &self.delete_all
    }

    pub fn custom(&self) -> &CustomActionHandler {
        &self.custom
    }
}
