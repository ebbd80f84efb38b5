use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// User document from the `users` collection.
///
/// `threads` holds the ids of the threads the user authored, in creation
/// order; `create_thread` appends to it after inserting the thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub threads: Vec<ObjectId>,
    #[serde(default)]
    pub onboarded: bool,
}
