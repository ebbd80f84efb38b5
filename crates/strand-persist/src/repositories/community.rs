use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, bson::oid::ObjectId, Client, Collection};

use crate::error::Result;
use crate::models::CommunityDoc;
use crate::store::CommunityStore;

#[derive(Clone)]
pub struct CommunityRepository {
    collection: Collection<CommunityDoc>,
}

impl CommunityRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("communities");
        Self { collection }
    }
}

#[async_trait]
impl CommunityStore for CommunityRepository {
    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<CommunityDoc>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let filter = doc! { "_id": { "$in": ids.to_vec() } };
        let communities = self.collection.find(filter).await?.try_collect().await?;
        Ok(communities)
    }
}
