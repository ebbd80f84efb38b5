use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use strand_persist::{NewThread, ThreadDoc, ThreadView};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validation::{CommentPayload, ThreadPayload};

/// Reply levels resolved on a single-thread fetch: direct replies and
/// replies-to-replies. Deeper children come back as bare ids.
const REPLY_DEPTH: usize = 2;

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub thread: String,
    pub account_id: String,
    #[serde(default)]
    pub community_id: Option<String>,
    /// View to invalidate after the write.
    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub thread: String,
    pub account_id: String,
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub text: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ThreadDoc> for ThreadResponse {
    fn from(thread: ThreadDoc) -> Self {
        Self {
            thread_id: thread.id.to_hex(),
            text: thread.text,
            author: thread.author.to_hex(),
            community: thread.community.map(|c| c.to_hex()),
            parent_id: thread.parent_id.map(|p| p.to_hex()),
            created_at: thread.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<ThreadView>,
    pub is_next: bool,
}

/// Create a new root thread
pub async fn create_thread(
    State(state): State<AppState>,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<ThreadResponse>)> {
    ThreadPayload {
        thread: req.thread.clone(),
        account_id: req.account_id.clone(),
    }
    .validate()?;

    let thread = state
        .persist
        .threads()
        .create_thread(NewThread {
            text: req.thread,
            author: req.account_id,
            community_id: req.community_id,
            path: req.path,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(thread.into())))
}

/// One page of the root-thread feed, newest first
pub async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<FeedResponse>> {
    let page_size = query.page_size.min(100); // Cap at 100

    let page = state
        .persist
        .threads()
        .fetch_feed(query.page, page_size)
        .await?;

    Ok(Json(FeedResponse {
        posts: page.posts,
        is_next: page.is_next,
    }))
}

/// Get a single thread with two levels of replies resolved
pub async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadView>> {
    let thread = state
        .persist
        .threads()
        .fetch_thread(&thread_id, REPLY_DEPTH)
        .await?;

    match thread {
        Some(view) => Ok(Json(view)),
        None => Err(ApiError::ThreadNotFound(thread_id)),
    }
}

/// Add a comment under an existing thread
pub async fn add_comment(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<ThreadResponse>)> {
    CommentPayload {
        thread: req.thread.clone(),
    }
    .validate()?;

    let comment = state
        .persist
        .threads()
        .add_comment(&thread_id, req.thread, &req.account_id, &req.path)
        .await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}
