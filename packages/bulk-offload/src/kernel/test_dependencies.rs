// TestDependencies - mock implementations for testing
//
// Provides an in-memory content store and request verifiers that can be
// injected into OffloadDeps for tests and the demo binary.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::events::EventBus;
use super::jobs::InMemoryJobStore;
use super::{BaseContentStore, BaseRequestVerifier, Capability, OffloadDeps};
use crate::common::{PostId, RequestContext, UserId};
use crate::domains::bulk_actions::models::{PostUpdate, StatusFilter};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// =============================================================================
// Mock Content Store
// =============================================================================

/// One stored item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPost {
    pub post_type: String,
    pub status: String,
    /// Status before trashing, restored by `untrash`.
    pub previous_status: Option<String>,
    pub sticky: bool,
    pub last_update: Option<PostUpdate>,
}

/// Kind of mutation recorded by [`MockContentStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationCall {
    Trash(PostId),
    Untrash(PostId),
    Delete(PostId),
    Update(PostId),
}

/// Content store double with per-item switches for denial, locks and
/// failures.
///
/// `deny` refuses every capability on an item; `deny_capability` refuses
/// only the named one.
#[derive(Debug, Default)]
pub struct MockContentStore {
    posts: Mutex<BTreeMap<PostId, MockPost>>,
    denied: Mutex<HashSet<PostId>>,
    denied_capabilities: Mutex<HashSet<(PostId, Capability)>>,
    locked: Mutex<HashSet<PostId>>,
    refusing: Mutex<HashSet<PostId>>,
    erroring: Mutex<HashSet<PostId>>,
    calls: Mutex<Vec<MutationCall>>,
    capability_checks: Mutex<Vec<(UserId, PostId, Capability)>>,
    releases: AtomicUsize,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item with the given type and status
    pub fn with_post(self, id: u64, post_type: &str, status: &str) -> Self {
        lock(&self.posts).insert(
            PostId(id),
            MockPost {
                post_type: post_type.to_string(),
                status: status.to_string(),
                previous_status: None,
                sticky: false,
                last_update: None,
            },
        );
        self
    }

    /// Add several items sharing a type and status
    pub fn with_posts(self, ids: impl IntoIterator<Item = u64>, post_type: &str, status: &str) -> Self {
        ids.into_iter()
            .fold(self, |store, id| store.with_post(id, post_type, status))
    }

    /// Deny every capability on `id`
    pub fn deny(self, id: u64) -> Self {
        lock(&self.denied).insert(PostId(id));
        self
    }

    /// Deny only `capability` on `id`
    pub fn deny_capability(self, id: u64, capability: Capability) -> Self {
        lock(&self.denied_capabilities).insert((PostId(id), capability));
        self
    }

    /// Mark `id` as locked by another user
    pub fn lock_post(self, id: u64) -> Self {
        lock(&self.locked).insert(PostId(id));
        self
    }

    /// Make mutations of `id` report failure
    pub fn refuse(self, id: u64) -> Self {
        lock(&self.refusing).insert(PostId(id));
        self
    }

    /// Make mutations of `id` return an error
    pub fn error_on(self, id: u64) -> Self {
        lock(&self.erroring).insert(PostId(id));
        self
    }

    /// Current stored item, if it exists
    pub fn post(&self, id: u64) -> Option<MockPost> {
        lock(&self.posts).get(&PostId(id)).cloned()
    }

    pub fn status_of(&self, id: u64) -> Option<String> {
        self.post(id).map(|post| post.status)
    }

    pub fn exists(&self, id: u64) -> bool {
        lock(&self.posts).contains_key(&PostId(id))
    }

    /// Every mutation attempted, in order
    pub fn calls(&self) -> Vec<MutationCall> {
        lock(&self.calls).clone()
    }

    /// Every capability check performed, in order
    pub fn capability_checks(&self) -> Vec<(UserId, PostId, Capability)> {
        lock(&self.capability_checks).clone()
    }

    /// How many times buffers were released
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Shared failure switches for every mutation
    fn guard(&self, post: PostId) -> Result<bool> {
        if lock(&self.erroring).contains(&post) {
            bail!("storage error on post {}", post);
        }
        Ok(!lock(&self.refusing).contains(&post))
    }
}

#[async_trait]
impl BaseContentStore for MockContentStore {
    async fn can_mutate(&self, user: UserId, post: PostId, capability: &Capability) -> Result<bool> {
        lock(&self.capability_checks).push((user, post, capability.clone()));
        let denied = lock(&self.denied).contains(&post)
            || lock(&self.denied_capabilities).contains(&(post, capability.clone()));
        Ok(!denied)
    }

    async fn is_locked(&self, post: PostId, _user: UserId) -> Result<bool> {
        Ok(lock(&self.locked).contains(&post))
    }

    async fn trash(&self, post: PostId) -> Result<bool> {
        lock(&self.calls).push(MutationCall::Trash(post));
        if !self.guard(post)? {
            return Ok(false);
        }

        let mut posts = lock(&self.posts);
        let Some(item) = posts.get_mut(&post) else {
            return Ok(false);
        };
        if item.status != "trash" {
            item.previous_status = Some(std::mem::replace(&mut item.status, "trash".to_string()));
        }
        Ok(true)
    }

    async fn untrash(&self, post: PostId) -> Result<bool> {
        lock(&self.calls).push(MutationCall::Untrash(post));
        if !self.guard(post)? {
            return Ok(false);
        }

        let mut posts = lock(&self.posts);
        let Some(item) = posts.get_mut(&post) else {
            return Ok(false);
        };
        if item.status == "trash" {
            item.status = item
                .previous_status
                .take()
                .unwrap_or_else(|| "draft".to_string());
        }
        Ok(true)
    }

    async fn delete_permanently(&self, post: PostId) -> Result<bool> {
        lock(&self.calls).push(MutationCall::Delete(post));
        if !self.guard(post)? {
            return Ok(false);
        }

        // Deleting something already gone is a no-op success.
        lock(&self.posts).remove(&post);
        Ok(true)
    }

    async fn update_fields(&self, post: PostId, update: &PostUpdate) -> Result<bool> {
        lock(&self.calls).push(MutationCall::Update(post));
        if !self.guard(post)? {
            return Ok(false);
        }

        let mut posts = lock(&self.posts);
        let Some(item) = posts.get_mut(&post) else {
            return Ok(false);
        };
        if let Some(status) = &update.status {
            item.status = status.clone();
        }
        if let Some(sticky) = update.sticky {
            item.sticky = matches!(sticky, crate::domains::bulk_actions::models::Sticky::Stick);
        }
        item.last_update = Some(update.clone());
        Ok(true)
    }

    async fn find_ids(&self, post_type: &str, statuses: &StatusFilter) -> Result<Vec<PostId>> {
        Ok(lock(&self.posts)
            .iter()
            .filter(|(_, post)| post.post_type == post_type && statuses.includes(&post.status))
            .map(|(id, _)| *id)
            .collect())
    }

    fn release_buffers(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Request Verifiers
// =============================================================================

/// Verifier that accepts every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllVerifier;

impl BaseRequestVerifier for AllowAllVerifier {
    fn verify_bulk_request(&self, _ctx: &RequestContext) -> Result<()> {
        Ok(())
    }
}

/// Verifier that requires `_wpnonce` to equal a fixed token.
#[derive(Debug, Clone)]
pub struct StaticNonceVerifier {
    expected: String,
}

impl StaticNonceVerifier {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl BaseRequestVerifier for StaticNonceVerifier {
    fn verify_bulk_request(&self, ctx: &RequestContext) -> Result<()> {
        match ctx.get("_wpnonce") {
            Some(nonce) if nonce == self.expected => Ok(()),
            Some(_) => bail!("nonce mismatch"),
            None => bail!("missing nonce"),
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Mock collaborators, kept as concrete types so tests can inspect them.
pub struct TestDependencies {
    pub job_store: Arc<InMemoryJobStore>,
    pub content: Arc<MockContentStore>,
    pub verifier: Arc<dyn BaseRequestVerifier>,
    pub events: EventBus,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            job_store: Arc::new(InMemoryJobStore::new()),
            content: Arc::new(MockContentStore::new()),
            verifier: Arc::new(AllowAllVerifier),
            events: EventBus::new(),
        }
    }

    /// Set a mock content store
    pub fn mock_content(mut self, content: MockContentStore) -> Self {
        self.content = Arc::new(content);
        self
    }

    /// Set a request verifier
    pub fn verifier(mut self, verifier: impl BaseRequestVerifier + 'static) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }

    /// Build OffloadDeps sharing these mocks
    pub fn deps(&self) -> OffloadDeps {
        OffloadDeps::new(
            self.job_store.clone(),
            self.content.clone(),
            self.verifier.clone(),
            self.events.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
