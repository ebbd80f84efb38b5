//! Reference resolution ("populate") for thread trees.
//!
//! The service loads the documents a response needs (child threads gathered
//! breadth-first up to the requested depth, then authors and communities in
//! `$in` batches); `assemble` stitches those maps into a [`ThreadView`]
//! without further I/O. A child whose document was not loaded, or which lies
//! beyond `depth`, stays a bare [`ChildNode::Ref`].

use std::collections::HashMap;

use mongodb::bson::oid::ObjectId;

use crate::models::ThreadDoc;
use crate::views::{AuthorView, ChildNode, CommunityView, ThreadView};

/// Documents prefetched for one populate pass.
#[derive(Debug, Default)]
pub struct Loaded {
    pub threads: HashMap<ObjectId, ThreadDoc>,
    pub authors: HashMap<ObjectId, AuthorView>,
    pub communities: HashMap<ObjectId, CommunityView>,
}

/// Build a populated view of `doc`, resolving `depth` levels of children.
pub fn assemble(doc: &ThreadDoc, depth: usize, loaded: &Loaded) -> ThreadView {
    let children = doc
        .children
        .iter()
        .map(|child_id| {
            if depth == 0 {
                return ChildNode::Ref(child_id.to_hex());
            }
            match loaded.threads.get(child_id) {
                Some(child) => ChildNode::Thread(Box::new(assemble(child, depth - 1, loaded))),
                None => ChildNode::Ref(child_id.to_hex()),
            }
        })
        .collect();

    ThreadView {
        id: doc.id.to_hex(),
        text: doc.text.clone(),
        author: loaded.authors.get(&doc.author).cloned(),
        community: doc
            .community
            .and_then(|c| loaded.communities.get(&c).cloned()),
        parent_id: doc.parent_id.map(|p| p.to_hex()),
        children,
        created_at: doc.created_at,
    }
}
