use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::Result;
use crate::models::{CommunityDoc, ThreadDoc, UserDoc};

/// Thread-collection operations the service depends on.
///
/// Implementations provide store-specific CRUD; the MongoDB one lives in
/// `repositories::thread`.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Insert a new thread document. `parent_id` is set for replies only.
    async fn insert(
        &self,
        text: String,
        author: ObjectId,
        community: Option<ObjectId>,
        parent_id: Option<ObjectId>,
    ) -> Result<ThreadDoc>;

    /// Get thread by ID
    async fn find_by_id(&self, thread_id: ObjectId) -> Result<Option<ThreadDoc>>;

    /// Batch-load threads by id (one query per populate level).
    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<ThreadDoc>>;

    /// One page of root threads (no parent), newest first.
    async fn find_roots(&self, skip: u64, limit: i64) -> Result<Vec<ThreadDoc>>;

    /// Total number of root threads, ignoring pagination.
    async fn count_roots(&self) -> Result<u64>;

    /// Append a reply id to the parent's `children`. Returns the number of
    /// matched parents (0 when the parent does not exist).
    async fn push_child(&self, parent_id: ObjectId, child_id: ObjectId) -> Result<u64>;
}

/// User-collection operations the service depends on.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Batch-load users for populate.
    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<UserDoc>>;

    /// Append a thread id to the user's `threads`. Returns the number of
    /// matched users (0 when the author id dangles).
    async fn attach_thread(&self, user_id: ObjectId, thread_id: ObjectId) -> Result<u64>;
}

/// Community-collection operations the service depends on.
#[async_trait]
pub trait CommunityStore: Send + Sync {
    /// Batch-load communities for populate.
    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<CommunityDoc>>;
}
