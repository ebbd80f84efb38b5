use std::sync::Arc;

use mongodb::Client;

use crate::error::{PersistError, Result};
use crate::invalidate::ViewInvalidator;
use crate::repositories::{CommunityRepository, ThreadRepository, UserRepository};
use crate::service::ThreadService;

/// Owns the MongoDB connection for the process lifetime. Connect once at
/// startup and inject the handle; a failed connect is a hard error, not a
/// logged-and-swallowed condition.
pub struct PersistClient {
    thread_service: ThreadService,
}

impl PersistClient {
    pub async fn connect(
        mongodb_uri: &str,
        db_name: &str,
        invalidator: Arc<dyn ViewInvalidator>,
    ) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let thread_service = ThreadService::new(
            Arc::new(ThreadRepository::new(&client, db_name)),
            Arc::new(UserRepository::new(&client, db_name)),
            Arc::new(CommunityRepository::new(&client, db_name)),
            invalidator,
        );

        Ok(Self { thread_service })
    }

    pub fn threads(&self) -> &ThreadService {
        &self.thread_service
    }
}
