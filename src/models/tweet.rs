use crate::models::UserResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTweetRequest {
    pub content: String,
    /// Opaque media-store reference for an attached image.
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RetweetRequest {
    /// Blank or absent for a plain retweet, text for a quote.
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTweetRequest {
    pub content: String,
}

/// Summary of the tweet a retweet/quote points at.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParentTweetResponse {
    pub id: i64,
    pub user: UserResponse,
    pub content: String,
    pub like_count: u64,
    pub user_like_it: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TweetResponse {
    pub id: i64,
    pub user: UserResponse,
    pub content: String,
    pub image: Option<String>,
    pub is_retweet: bool,
    pub parent: Option<ParentTweetResponse>,
    pub like_count: u64,
    pub comment_count: u64,
    pub user_like_it: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub tweet_id: i64,
    pub user: UserResponse,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
