use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Thread document as stored in the `threads` collection.
///
/// A thread with no `parent_id` is a root post and appears in the feed;
/// replies carry a `parent_id` and are listed in their parent's `children`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub text: String,
    pub author: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,
    #[serde(default)]
    pub children: Vec<ObjectId>,
    pub created_at: DateTime<Utc>,
}

impl ThreadDoc {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_thread_doc_bson_roundtrip() {
        let doc = ThreadDoc {
            id: ObjectId::new(),
            text: "hello".to_string(),
            author: ObjectId::new(),
            community: None,
            parent_id: None,
            children: vec![],
            created_at: Utc::now(),
        };

        let bson_doc = bson::to_document(&doc).unwrap();
        assert!(bson_doc.contains_key("_id"));
        assert!(!bson_doc.contains_key("parent_id"));

        let back: ThreadDoc = bson::from_document(bson_doc).unwrap();
        assert_eq!(back.id, doc.id);
        assert_eq!(back.text, "hello");
        assert!(back.is_root());
    }

    #[test]
    fn test_reply_is_not_root() {
        let doc = ThreadDoc {
            id: ObjectId::new(),
            text: "a reply".to_string(),
            author: ObjectId::new(),
            community: None,
            parent_id: Some(ObjectId::new()),
            children: vec![],
            created_at: Utc::now(),
        };
        assert!(!doc.is_root());
    }

    #[test]
    fn test_children_default_when_absent() {
        let id = ObjectId::new();
        let author = ObjectId::new();
        let raw = bson::doc! {
            "_id": id,
            "text": "no children field",
            "author": author,
            "created_at": bson::to_bson(&Utc::now()).unwrap(),
        };
        let doc: ThreadDoc = bson::from_document(raw).unwrap();
        assert!(doc.children.is_empty());
    }
}
