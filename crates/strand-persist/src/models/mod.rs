mod community;
mod thread;
mod user;

pub use community::CommunityDoc;
pub use thread::ThreadDoc;
pub use user::UserDoc;
