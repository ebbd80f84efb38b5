use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, bson::oid::ObjectId, Client, Collection};

use crate::error::Result;
use crate::models::UserDoc;
use crate::store::UserStore;

#[derive(Clone)]
pub struct UserRepository {
    collection: Collection<UserDoc>,
}

impl UserRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("users");
        Self { collection }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<UserDoc>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let filter = doc! { "_id": { "$in": ids.to_vec() } };
        let users = self.collection.find(filter).await?.try_collect().await?;
        Ok(users)
    }

    async fn attach_thread(&self, user_id: ObjectId, thread_id: ObjectId) -> Result<u64> {
        let filter = doc! { "_id": user_id };
        let update = doc! { "$push": { "threads": thread_id } };
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count)
    }
}
