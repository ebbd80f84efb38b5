use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Community document from the `communities` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
