pub mod comment;
pub mod follow;
pub mod tweet;
pub mod tweet_like;
pub mod user;
