pub mod tweet;
pub mod user;

pub use tweet::*;
pub use user::*;
