pub mod client;
pub mod error;
pub mod invalidate;
pub mod models;
pub mod populate;
pub mod repositories;
pub mod service;
pub mod store;
pub mod views;

pub use client::PersistClient;
pub use error::PersistError;
pub use invalidate::{LogInvalidator, RecordingInvalidator, ViewInvalidator};
pub use models::{CommunityDoc, ThreadDoc, UserDoc};
pub use repositories::{CommunityRepository, ThreadRepository, UserRepository};
pub use service::{FeedPage, NewThread, ThreadService};
pub use store::{CommunityStore, ThreadStore, UserStore};
pub use views::{AuthorView, ChildNode, CommunityView, ThreadView};
