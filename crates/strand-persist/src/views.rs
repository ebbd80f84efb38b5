use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CommunityDoc, UserDoc};

/// Author fields exposed in populated responses (id, name, image).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&UserDoc> for AuthorView {
    fn from(user: &UserDoc) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

/// Community fields exposed in populated responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommunityView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&CommunityDoc> for CommunityView {
    fn from(community: &CommunityDoc) -> Self {
        Self {
            id: community.id.to_hex(),
            name: community.name.clone(),
            image: community.image.clone(),
        }
    }
}

/// A child entry in a populated thread: either resolved into a full view or
/// left as a bare id when it lies beyond the requested resolution depth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ChildNode {
    Thread(Box<ThreadView>),
    Ref(String),
}

impl ChildNode {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ChildNode::Thread(_))
    }

    pub fn as_thread(&self) -> Option<&ThreadView> {
        match self {
            ChildNode::Thread(t) => Some(t),
            ChildNode::Ref(_) => None,
        }
    }
}

/// A thread with its references resolved for a single response.
///
/// `author` is `None` only when the stored reference dangles; `community`
/// is populated only where the query asked for it (single-thread fetch).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadView {
    pub id: String,
    pub text: String,
    pub author: Option<AuthorView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<CommunityView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub children: Vec<ChildNode>,
    pub created_at: DateTime<Utc>,
}
