use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, bson::oid::ObjectId, Client, Collection};

use crate::error::Result;
use crate::models::ThreadDoc;
use crate::store::ThreadStore;

#[derive(Clone)]
pub struct ThreadRepository {
    collection: Collection<ThreadDoc>,
}

impl ThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }
}

#[async_trait]
impl ThreadStore for ThreadRepository {
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

        self.collection.insert_one(&thread).await?;
        Ok(thread)
    }

    async fn find_by_id(&self, thread_id: ObjectId) -> Result<Option<ThreadDoc>> {
        let filter = doc! { "_id": thread_id };
        Ok(self.collection.find_one(filter).await?)
    }

    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<ThreadDoc>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let filter = doc! { "_id": { "$in": ids.to_vec() } };
        let threads = self.collection.find(filter).await?.try_collect().await?;
        Ok(threads)
    }

    async fn find_roots(&self, skip: u64, limit: i64) -> Result<Vec<ThreadDoc>> {
        let filter = doc! { "parent_id": null };
        let threads = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    async fn count_roots(&self) -> Result<u64> {
        let filter = doc! { "parent_id": null };
        Ok(self.collection.count_documents(filter).await?)
    }

    async fn push_child(&self, parent_id: ObjectId, child_id: ObjectId) -> Result<u64> {
        let filter = doc! { "_id": parent_id };
        let update = doc! { "$push": { "children": child_id } };
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count)
    }
}
