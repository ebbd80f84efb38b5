mod community;
mod thread;
mod user;

pub use community::CommunityRepository;
pub use thread::ThreadRepository;
pub use user::UserRepository;
