//! Entry point for bulk-action requests on the listing screen.
//!
//! Per request: `Unclaimed → Validated → Described` and then one of
//! `ShortCircuited`, `Scheduled`, `AlreadyPending` (all redirect) or
//! `Unhandled` (the untouched request goes back to the synchronous path).
//! The request is claimed only on the redirecting paths.

use tracing::{debug, info};

use super::capture::{self, CLAIMED_KEYS};
use super::error::DispatchError;
use super::handlers::{self, ProcessOutcome, SharedHandlerRegistry};
use super::notices::NO_POSTS_NOTICE_KEY;
use super::redirect;
use crate::common::{JobId, RequestContext};
use crate::kernel::events::BulkActionEvent;
use crate::kernel::OffloadDeps;

/// Terminal state of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A native action with nothing selected; no job was scheduled.
    ShortCircuited { redirect: String },
    Scheduled { job_id: JobId, redirect: String },
    AlreadyPending { existing_job_id: JobId, redirect: String },
    /// Not offloaded. Carries the request exactly as it came in.
    Unhandled(RequestContext),
}

impl DispatchOutcome {
    /// Where to send the browser, unless the request falls through.
    pub fn redirect(&self) -> Option<&str> {
        match self {
            DispatchOutcome::ShortCircuited { redirect }
            | DispatchOutcome::Scheduled { redirect, .. }
            | DispatchOutcome::AlreadyPending { redirect, .. } => Some(redirect),
            DispatchOutcome::Unhandled(_) => None,
        }
    }

    pub fn is_unhandled(&self) -> bool {
        matches!(self, DispatchOutcome::Unhandled(_))
    }
}

/// Intercepts bulk-action requests and offloads them to the job store.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    deps: OffloadDeps,
    registry: SharedHandlerRegistry,
}

impl Dispatcher {
    pub fn new(deps: OffloadDeps, registry: SharedHandlerRegistry) -> Self {
        Self { deps, registry }
    }

    pub fn deps(&self) -> &OffloadDeps {
        &self.deps
    }

    pub fn registry(&self) -> &SharedHandlerRegistry {
        &self.registry
    }

    /// Handle one listing request.
    ///
    /// Fails only when the request does not verify or the job store errors.
    pub async fn dispatch(&self, ctx: RequestContext) -> Result<DispatchOutcome, DispatchError> {
        if capture::requested_action(&ctx).is_none() {
            return Ok(DispatchOutcome::Unhandled(ctx));
        }

        self.deps
            .verifier
            .verify_bulk_request(&ctx)
            .map_err(|e| DispatchError::InvalidNonce(e.to_string()))?;

        let job = match capture::capture(&ctx) {
            Ok(job) => job,
            Err(e) => {
                debug!(error = %e, "bulk request left to the synchronous path");
                return Ok(DispatchOutcome::Unhandled(ctx));
            }
        };

        let kind = job.kind().clone();

        if kind.is_native() && !kind.targets_by_filter() && job.target_ids().is_empty() {
            let (_, residual) = ctx.claim(CLAIMED_KEYS);
            info!(kind = %kind, user_id = %job.requestor_id(), "bulk action with no posts selected");
            self.deps.events.emit(BulkActionEvent::NoTargetsSelected {
                kind,
                requestor_id: job.requestor_id(),
            });
            return Ok(DispatchOutcome::ShortCircuited {
                redirect: redirect::with_notice(residual.request_uri(), NO_POSTS_NOTICE_KEY, false),
            });
        }

        let Some(handler) = self.registry.handler_for(&kind) else {
            debug!(kind = %kind, "no handler registered for bulk action");
            return Ok(DispatchOutcome::Unhandled(ctx));
        };

        let (claimed, residual) = ctx.claim(CLAIMED_KEYS);
        debug!(
            handler = handler.name(),
            claimed = ?claimed.keys().collect::<Vec<_>>(),
            targets = job.target_ids().len(),
            "bulk request claimed"
        );

        let outcome = handlers::process(handler, &self.deps, job).await?;
        let redirect =
            redirect::with_notice(residual.request_uri(), handler.notice_key(), outcome.is_scheduled());

        Ok(match outcome {
            ProcessOutcome::Scheduled(job_id) => DispatchOutcome::Scheduled { job_id, redirect },
            ProcessOutcome::AlreadyPending(existing_job_id) => DispatchOutcome::AlreadyPending {
                existing_job_id,
                redirect,
            },
        })
    }
}
