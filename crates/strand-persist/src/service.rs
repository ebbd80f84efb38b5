use std::collections::HashSet;
use std::sync::Arc;

use mongodb::bson::oid::ObjectId;

use crate::error::{PersistError, Result};
use crate::invalidate::ViewInvalidator;
use crate::models::ThreadDoc;
use crate::populate::{assemble, Loaded};
use crate::store::{CommunityStore, ThreadStore, UserStore};
use crate::views::{AuthorView, CommunityView, ThreadView};

/// How many reply levels the feed resolves (direct replies' authors only).
const FEED_DEPTH: usize = 1;

#[derive(Debug, Clone)]
pub struct NewThread {
    pub text: String,
    pub author: String,
    pub community_id: Option<String>,
    /// View to invalidate after the write.
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct FeedPage {
    pub posts: Vec<ThreadView>,
    pub is_next: bool,
}

/// The thread operations: create, paginate the root feed, fetch one thread
/// with nested replies resolved.
pub struct ThreadService {
    threads: Arc<dyn ThreadStore>,
    users: Arc<dyn UserStore>,
    communities: Arc<dyn CommunityStore>,
    invalidator: Arc<dyn ViewInvalidator>,
}

impl ThreadService {
    pub fn new(
        threads: Arc<dyn ThreadStore>,
        users: Arc<dyn UserStore>,
        communities: Arc<dyn CommunityStore>,
        invalidator: Arc<dyn ViewInvalidator>,
    ) -> Self {
        Self {
            threads,
            users,
            communities,
            invalidator,
        }
    }

    /// Create a root thread and record it on its author.
    ///
    /// The two writes are sequential and non-transactional: a failed author
    /// update leaves the thread in place. An author id that matches no user
    /// is logged and tolerated.
    pub async fn create_thread(&self, req: NewThread) -> Result<ThreadDoc> {
        let author = parse_oid(&req.author)?;
        let community = req.community_id.as_deref().map(parse_oid).transpose()?;

        let thread = self
            .threads
            .insert(req.text, author, community, None)
            .await
            .map_err(|e| PersistError::ThreadCreation(e.to_string()))?;

        let matched = self
            .users
            .attach_thread(author, thread.id)
            .await
            .map_err(|e| PersistError::ThreadCreation(e.to_string()))?;
        if matched == 0 {
            tracing::warn!(
                author = %req.author,
                thread_id = %thread.id,
                "Thread created for unknown author; threads list not updated"
            );
        }

        self.invalidator.invalidate(&req.path).await;
        Ok(thread)
    }

    /// Create a reply under `parent_id`, maintaining both sides of the
    /// parent/children relation.
    pub async fn add_comment(
        &self,
        parent_id: &str,
        text: String,
        author: &str,
        path: &str,
    ) -> Result<ThreadDoc> {
        let parent_oid = parse_oid(parent_id)?;
        let author_oid = parse_oid(author)?;

        let parent = self
            .threads
            .find_by_id(parent_oid)
            .await?
            .ok_or_else(|| PersistError::ThreadNotFound(parent_id.to_string()))?;

        let comment = self
            .threads
            .insert(text, author_oid, parent.community, Some(parent.id))
            .await
            .map_err(|e| PersistError::ThreadCreation(e.to_string()))?;

        self.threads
            .push_child(parent.id, comment.id)
            .await
            .map_err(|e| PersistError::ThreadCreation(e.to_string()))?;

        self.invalidator.invalidate(path).await;
        Ok(comment)
    }

    /// One page of root threads, newest first, with authors and direct
    /// replies' authors resolved.
    pub async fn fetch_feed(&self, page_number: u32, page_size: u32) -> Result<FeedPage> {
        let skip = skip_for_page(page_number, page_size);

        let roots = self.threads.find_roots(skip, i64::from(page_size)).await?;
        let total = self.threads.count_roots().await?;

        let loaded = self.load_tree(&roots, FEED_DEPTH, false).await?;
        let posts: Vec<ThreadView> = roots.iter().map(|t| assemble(t, FEED_DEPTH, &loaded)).collect();

        let is_next = has_next(total, skip, posts.len());
        Ok(FeedPage { posts, is_next })
    }

    /// Fetch one thread with `depth` levels of replies resolved; `Ok(None)`
    /// when no such thread exists. Query failures are logged with their
    /// cause and surfaced as the generic [`PersistError::ThreadFetch`].
    pub async fn fetch_thread(&self, thread_id: &str, depth: usize) -> Result<Option<ThreadView>> {
        let oid = parse_oid(thread_id)?;

        match self.fetch_thread_inner(oid, depth).await {
            Ok(view) => Ok(view),
            Err(err) => {
                tracing::error!(thread_id = %thread_id, error = %err, "Error while fetching thread");
                Err(PersistError::ThreadFetch)
            }
        }
    }

    async fn fetch_thread_inner(&self, oid: ObjectId, depth: usize) -> Result<Option<ThreadView>> {
        let Some(thread) = self.threads.find_by_id(oid).await? else {
            return Ok(None);
        };

        let roots = [thread];
        let loaded = self.load_tree(&roots, depth, true).await?;
        Ok(Some(assemble(&roots[0], depth, &loaded)))
    }

    /// Gather the documents one populate pass needs: child threads
    /// breadth-first up to `depth`, then authors (and communities for the
    /// single-thread fetch) in batches.
    async fn load_tree(
        &self,
        roots: &[ThreadDoc],
        depth: usize,
        with_communities: bool,
    ) -> Result<Loaded> {
        let mut loaded = Loaded::default();

        let mut author_ids: HashSet<ObjectId> = roots.iter().map(|t| t.author).collect();
        let mut frontier: Vec<ObjectId> = roots
            .iter()
            .flat_map(|t| t.children.iter().copied())
            .collect();

        for _ in 0..depth {
            if frontier.is_empty() {
                break;
            }
            let docs = self.threads.find_many(&frontier).await?;
            frontier = docs
                .iter()
                .flat_map(|d| d.children.iter().copied())
                .collect();
            for doc in docs {
                author_ids.insert(doc.author);
                loaded.threads.insert(doc.id, doc);
            }
        }

        let author_ids: Vec<ObjectId> = author_ids.into_iter().collect();
        for user in self.users.find_many(&author_ids).await? {
            loaded.authors.insert(user.id, AuthorView::from(&user));
        }

        if with_communities {
            let community_ids: Vec<ObjectId> =
                roots.iter().filter_map(|t| t.community).collect();
            for community in self.communities.find_many(&community_ids).await? {
                loaded
                    .communities
                    .insert(community.id, CommunityView::from(&community));
            }
        }

        Ok(loaded)
    }
}

fn parse_oid(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|e| PersistError::InvalidObjectId(e.to_string()))
}

/// 1-indexed pages; page 0 clamps to the first page so the store never sees
/// a negative skip.
fn skip_for_page(page_number: u32, page_size: u32) -> u64 {
    u64::from(page_number.max(1) - 1) * u64::from(page_size)
}

fn has_next(total: u64, skip: u64, returned: usize) -> bool {
    total > skip + returned as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::invalidate::RecordingInvalidator;
    use crate::models::{CommunityDoc, UserDoc};

    #[derive(Default)]
    struct MemThreads {
        docs: Mutex<HashMap<ObjectId, ThreadDoc>>,
    }

    #[async_trait]
    impl ThreadStore for MemThreads {
        async fn insert(
            &self,
            text: String,
            author: ObjectId,
            community: Option<ObjectId>,
            parent_id: Option<ObjectId>,
        ) -> Result<ThreadDoc> {
            let thread = ThreadDoc {
                id: ObjectId::new(),
                text,
                author,
                community,
                parent_id,
                children: vec![],
                created_at: Utc::now(),
            };
            self.docs.lock().unwrap().insert(thread.id, thread.clone());
            Ok(thread)
        }

        async fn find_by_id(&self, thread_id: ObjectId) -> Result<Option<ThreadDoc>> {
            Ok(self.docs.lock().unwrap().get(&thread_id).cloned())
        }

        async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<ThreadDoc>> {
            let docs = self.docs.lock().unwrap();
            Ok(ids.iter().filter_map(|id| docs.get(id).cloned()).collect())
        }

        async fn find_roots(&self, skip: u64, limit: i64) -> Result<Vec<ThreadDoc>> {
            let docs = self.docs.lock().unwrap();
            let mut roots: Vec<ThreadDoc> =
                docs.values().filter(|d| d.is_root()).cloned().collect();
            // Deterministic newest-first order, ties broken by id.
            roots.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
            Ok(roots
                .into_iter()
                .skip(skip as usize)
                .take(limit as usize)
                .collect())
        }

        async fn count_roots(&self) -> Result<u64> {
            let docs = self.docs.lock().unwrap();
            Ok(docs.values().filter(|d| d.is_root()).count() as u64)
        }

        async fn push_child(&self, parent_id: ObjectId, child_id: ObjectId) -> Result<u64> {
            let mut docs = self.docs.lock().unwrap();
            match docs.get_mut(&parent_id) {
                Some(parent) => {
                    parent.children.push(child_id);
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    #[derive(Default)]
    struct MemUsers {
        docs: Mutex<HashMap<ObjectId, UserDoc>>,
    }

    impl MemUsers {
        fn with_user(id: ObjectId, name: &str) -> Self {
            let user = UserDoc {
                id,
                name: name.to_string(),
                username: name.to_lowercase(),
                image: None,
                bio: None,
                threads: vec![],
                onboarded: true,
            };
            let users = Self::default();
            users.docs.lock().unwrap().insert(id, user);
            users
        }
    }

    #[async_trait]
    impl UserStore for MemUsers {
        async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<UserDoc>> {
            let docs = self.docs.lock().unwrap();
            Ok(ids.iter().filter_map(|id| docs.get(id).cloned()).collect())
        }

        async fn attach_thread(&self, user_id: ObjectId, thread_id: ObjectId) -> Result<u64> {
            let mut docs = self.docs.lock().unwrap();
            match docs.get_mut(&user_id) {
                Some(user) => {
                    user.threads.push(thread_id);
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    struct NoCommunities;

    #[async_trait]
    impl CommunityStore for NoCommunities {
        async fn find_many(&self, _ids: &[ObjectId]) -> Result<Vec<CommunityDoc>> {
            Ok(vec![])
        }
    }

    /// Every operation fails, for exercising the error paths.
    struct FailingThreads;

    #[async_trait]
    impl ThreadStore for FailingThreads {
        async fn insert(
            &self,
            _text: String,
            _author: ObjectId,
            _community: Option<ObjectId>,
            _parent_id: Option<ObjectId>,
        ) -> Result<ThreadDoc> {
            Err(PersistError::Connection("store down".to_string()))
        }

        async fn find_by_id(&self, _thread_id: ObjectId) -> Result<Option<ThreadDoc>> {
            Err(PersistError::Connection("store down".to_string()))
        }

        async fn find_many(&self, _ids: &[ObjectId]) -> Result<Vec<ThreadDoc>> {
            Err(PersistError::Connection("store down".to_string()))
        }

        async fn find_roots(&self, _skip: u64, _limit: i64) -> Result<Vec<ThreadDoc>> {
            Err(PersistError::Connection("store down".to_string()))
        }

        async fn count_roots(&self) -> Result<u64> {
            Err(PersistError::Connection("store down".to_string()))
        }

        async fn push_child(&self, _parent_id: ObjectId, _child_id: ObjectId) -> Result<u64> {
            Err(PersistError::Connection("store down".to_string()))
        }
    }

    fn service(
        threads: Arc<MemThreads>,
        users: Arc<MemUsers>,
    ) -> (ThreadService, Arc<RecordingInvalidator>) {
        let recorder = Arc::new(RecordingInvalidator::new());
        let svc = ThreadService::new(threads, users, Arc::new(NoCommunities), recorder.clone());
        (svc, recorder)
    }

    fn new_thread(text: &str, author: ObjectId, path: &str) -> NewThread {
        NewThread {
            text: text.to_string(),
            author: author.to_hex(),
            community_id: None,
            path: path.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_thread_appends_to_author_and_invalidates() {
        let author = ObjectId::new();
        let threads = Arc::new(MemThreads::default());
        let users = Arc::new(MemUsers::with_user(author, "Ada"));
        let (svc, recorder) = service(threads.clone(), users.clone());

        let thread = svc
            .create_thread(new_thread("hello world", author, "/feed"))
            .await
            .unwrap();

        assert!(threads.docs.lock().unwrap().contains_key(&thread.id));
        assert_eq!(
            users.docs.lock().unwrap()[&author].threads,
            vec![thread.id]
        );
        assert_eq!(recorder.paths().await, vec!["/feed"]);
    }

    #[tokio::test]
    async fn test_create_thread_unknown_author_still_succeeds() {
        let threads = Arc::new(MemThreads::default());
        let users = Arc::new(MemUsers::default());
        let (svc, recorder) = service(threads.clone(), users);

        let thread = svc
            .create_thread(new_thread("orphaned post", ObjectId::new(), "/"))
            .await
            .unwrap();

        // The thread insert stands even though no user gained a reference.
        assert!(threads.docs.lock().unwrap().contains_key(&thread.id));
        assert_eq!(recorder.paths().await, vec!["/"]);
    }

    #[tokio::test]
    async fn test_add_comment_links_both_sides() {
        let author = ObjectId::new();
        let threads = Arc::new(MemThreads::default());
        let users = Arc::new(MemUsers::with_user(author, "Ada"));
        let (svc, recorder) = service(threads.clone(), users);

        let root = svc
            .create_thread(new_thread("root post", author, "/"))
            .await
            .unwrap();
        let comment = svc
            .add_comment(&root.id.to_hex(), "nice one".to_string(), &author.to_hex(), "/t")
            .await
            .unwrap();

        assert_eq!(comment.parent_id, Some(root.id));
        let docs = threads.docs.lock().unwrap();
        assert_eq!(docs[&root.id].children, vec![comment.id]);
        drop(docs);
        assert_eq!(recorder.paths().await, vec!["/", "/t"]);
    }

    #[tokio::test]
    async fn test_add_comment_missing_parent_is_not_found() {
        let (svc, recorder) = service(
            Arc::new(MemThreads::default()),
            Arc::new(MemUsers::default()),
        );

        let result = svc
            .add_comment(
                &ObjectId::new().to_hex(),
                "into the void".to_string(),
                &ObjectId::new().to_hex(),
                "/",
            )
            .await;

        assert!(matches!(result, Err(PersistError::ThreadNotFound(_))));
        assert!(recorder.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_feed_paginates_25_roots() {
        let author = ObjectId::new();
        let threads = Arc::new(MemThreads::default());
        let users = Arc::new(MemUsers::with_user(author, "Ada"));
        let (svc, _) = service(threads, users);

        for i in 0..25 {
            svc.create_thread(new_thread(&format!("post {}", i), author, "/"))
                .await
                .unwrap();
        }

        let first = svc.fetch_feed(1, 20).await.unwrap();
        assert_eq!(first.posts.len(), 20);
        assert!(first.is_next);

        let second = svc.fetch_feed(2, 20).await.unwrap();
        assert_eq!(second.posts.len(), 5);
        assert!(!second.is_next);

        let first_ids: HashSet<&str> = first.posts.iter().map(|p| p.id.as_str()).collect();
        assert!(second.posts.iter().all(|p| !first_ids.contains(p.id.as_str())));
    }

    #[tokio::test]
    async fn test_fetch_feed_resolves_authors() {
        let author = ObjectId::new();
        let threads = Arc::new(MemThreads::default());
        let users = Arc::new(MemUsers::with_user(author, "Ada"));
        let (svc, _) = service(threads, users);

        svc.create_thread(new_thread("a fine post", author, "/"))
            .await
            .unwrap();

        let page = svc.fetch_feed(1, 20).await.unwrap();
        assert_eq!(page.posts[0].author.as_ref().unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn test_fetch_thread_missing_returns_none() {
        let (svc, _) = service(
            Arc::new(MemThreads::default()),
            Arc::new(MemUsers::default()),
        );

        let result = svc
            .fetch_thread(&ObjectId::new().to_hex(), 2)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_fetch_thread_resolves_two_reply_levels() {
        let author = ObjectId::new();
        let threads = Arc::new(MemThreads::default());
        let users = Arc::new(MemUsers::with_user(author, "Ada"));
        let (svc, _) = service(threads, users);

        let root = svc
            .create_thread(new_thread("root post", author, "/"))
            .await
            .unwrap();
        let hex = |id: ObjectId| id.to_hex();
        let c1 = svc
            .add_comment(&hex(root.id), "reply".to_string(), &hex(author), "/")
            .await
            .unwrap();
        let c2 = svc
            .add_comment(&hex(c1.id), "reply to reply".to_string(), &hex(author), "/")
            .await
            .unwrap();
        let c3 = svc
            .add_comment(&hex(c2.id), "too deep".to_string(), &hex(author), "/")
            .await
            .unwrap();

        let view = svc.fetch_thread(&hex(root.id), 2).await.unwrap().unwrap();

        let reply = view.children[0].as_thread().expect("reply resolved");
        assert_eq!(reply.author.as_ref().unwrap().name, "Ada");

        let nested = reply.children[0].as_thread().expect("nested resolved");
        assert_eq!(nested.id, c2.id.to_hex());

        // Third level stays a bare id.
        assert!(!nested.children[0].is_resolved());
        assert_eq!(nested.children[0], crate::views::ChildNode::Ref(c3.id.to_hex()));
    }

    #[tokio::test]
    async fn test_fetch_thread_store_error_is_generic() {
        let recorder = Arc::new(RecordingInvalidator::new());
        let svc = ThreadService::new(
            Arc::new(FailingThreads),
            Arc::new(MemUsers::default()),
            Arc::new(NoCommunities),
            recorder,
        );

        let result = svc.fetch_thread(&ObjectId::new().to_hex(), 2).await;
        assert!(matches!(result, Err(PersistError::ThreadFetch)));
    }

    #[test]
    fn test_skip_for_first_page_is_zero() {
        assert_eq!(skip_for_page(1, 20), 0);
    }

    #[test]
    fn test_skip_scales_with_page_number() {
        assert_eq!(skip_for_page(2, 20), 20);
        assert_eq!(skip_for_page(3, 5), 10);
    }

    #[test]
    fn test_page_zero_clamps_to_first_page() {
        assert_eq!(skip_for_page(0, 20), 0);
    }

    #[test]
    fn test_is_next_over_25_roots_page_size_20() {
        // Page 1 returns 20 of 25, page 2 the remaining 5.
        assert!(has_next(25, skip_for_page(1, 20), 20));
        assert!(!has_next(25, skip_for_page(2, 20), 5));
    }

    #[test]
    fn test_is_next_false_on_exact_boundary() {
        assert!(!has_next(20, 0, 20));
    }

    #[test]
    fn test_parse_oid_rejects_garbage() {
        assert!(matches!(
            parse_oid("not-an-id"),
            Err(PersistError::InvalidObjectId(_))
        ));
        let oid = ObjectId::new();
        assert_eq!(parse_oid(&oid.to_hex()).unwrap(), oid);
    }
}
