use async_trait::async_trait;
use tokio::sync::Mutex;

/// Collaborator notified after a successful write that the cached rendering
/// of `path` is stale. How invalidation happens is not this crate's concern.
#[async_trait]
pub trait ViewInvalidator: Send + Sync {
    async fn invalidate(&self, path: &str);
}

/// Production default: emit a tracing event and let the cache layer react.
pub struct LogInvalidator;

#[async_trait]
impl ViewInvalidator for LogInvalidator {
    async fn invalidate(&self, path: &str) {
        tracing::info!(path = %path, "View invalidated");
    }
}

/// Records invalidated paths; for tests and local tooling.
#[derive(Default)]
pub struct RecordingInvalidator {
    paths: Mutex<Vec<String>>,
}

impl RecordingInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn paths(&self) -> Vec<String> {
        self.paths.lock().await.clone()
    }
}

#[async_trait]
impl ViewInvalidator for RecordingInvalidator {
    async fn invalidate(&self, path: &str) {
        self.paths.lock().await.push(path.to_string());
    }
}
