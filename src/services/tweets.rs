//! The post store: tweets (original and retweet/quote), comments, and
//! the canonical response hydration used by every read path.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, Value,
};

use crate::db::DbPool;
use crate::entities::{comment, tweet, tweet_like, user};
use crate::error::{Error, Result};
use crate::models::{CommentResponse, ParentTweetResponse, TweetResponse};
use crate::services::graph;

/// Maximum tweet length in Unicode code points.
pub const MAX_TWEET_LENGTH: usize = 250;

fn validate_content(content: &str) -> Result<()> {
    if content.chars().count() > MAX_TWEET_LENGTH {
        return Err(Error::Validation(format!(
            "tweet content is longer than {} characters",
            MAX_TWEET_LENGTH
        )));
    }
    Ok(())
}

pub async fn create_tweet(
    db: &DbPool,
    owner_id: i64,
    content: String,
    image: Option<String>,
) -> Result<tweet::Model> {
    validate_content(&content)?;

    let now = Utc::now();
    let new_tweet = tweet::ActiveModel {
        user_id: Set(owner_id),
        parent_id: Set(None),
        content: Set(content),
        image: Set(image),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(tweet::Entity::insert(new_tweet).exec_with_returning(db).await?)
}

/// Creates a child tweet pointing at `parent_id`. Blank content is a
/// plain retweet, text makes it a quote; whether blank content is
/// acceptable is the caller's decision.
pub async fn create_retweet(
    db: &DbPool,
    owner_id: i64,
    parent_id: i64,
    content: Option<String>,
) -> Result<tweet::Model> {
    let content = content.unwrap_or_default();
    validate_content(&content)?;

    get_tweet(db, parent_id).await?;

    let now = Utc::now();
    let new_tweet = tweet::ActiveModel {
        user_id: Set(owner_id),
        parent_id: Set(Some(parent_id)),
        content: Set(content),
        image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(tweet::Entity::insert(new_tweet).exec_with_returning(db).await?)
}

pub async fn update_tweet(
    db: &DbPool,
    tweet_id: i64,
    editor_id: i64,
    content: String,
) -> Result<tweet::Model> {
    let existing = get_tweet(db, tweet_id).await?;
    if existing.user_id != editor_id {
        return Err(Error::Forbidden("you do not own this tweet"));
    }
    validate_content(&content)?;

    let updated = tweet::ActiveModel {
        id: Set(tweet_id),
        content: Set(content),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(tweet::Entity::update(updated).exec(db).await?)
}

/// Deletes a tweet with its comments and likes. Child tweets are not
/// deleted; their parent reference is cleared and they live on as
/// originals.
pub async fn delete_tweet(db: &DbPool, tweet_id: i64, editor_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = get_tweet(&txn, tweet_id).await?;
    if existing.user_id != editor_id {
        return Err(Error::Forbidden("you do not own this tweet"));
    }

    comment::Entity::delete_many()
        .filter(comment::Column::TweetId.eq(tweet_id))
        .exec(&txn)
        .await?;
    tweet_like::Entity::delete_many()
        .filter(tweet_like::Column::TweetId.eq(tweet_id))
        .exec(&txn)
        .await?;
    tweet::Entity::update_many()
        .col_expr(tweet::Column::ParentId, Expr::value(Value::BigInt(None)))
        .filter(tweet::Column::ParentId.eq(tweet_id))
        .exec(&txn)
        .await?;
    tweet::Entity::delete_by_id(tweet_id).exec(&txn).await?;

    txn.commit().await?;

    log::info!("user {} deleted tweet {}", editor_id, tweet_id);
    Ok(())
}

pub async fn get_tweet<C: ConnectionTrait>(db: &C, tweet_id: i64) -> Result<tweet::Model> {
    tweet::Entity::find_by_id(tweet_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("tweet"))
}

/// Global newest-first listing with the optional author/content filters.
pub async fn list_tweets<C: ConnectionTrait>(
    db: &C,
    username: Option<&str>,
    content: Option<&str>,
    page: u64,
    limit: u64,
) -> Result<Vec<tweet::Model>> {
    let mut query = tweet::Entity::find();

    if let Some(username) = username {
        let author = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await?;
        match author {
            Some(author) => query = query.filter(tweet::Column::UserId.eq(author.id)),
            None => return Ok(Vec::new()),
        }
    }
    if let Some(content) = content {
        query = query.filter(tweet::Column::Content.contains(content));
    }

    Ok(query
        .order_by_desc(tweet::Column::CreatedAt)
        .order_by_desc(tweet::Column::UpdatedAt)
        .limit(limit)
        .offset(page_offset(page, limit))
        .all(db)
        .await?)
}

pub async fn list_by_user<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    page: u64,
    limit: u64,
) -> Result<Vec<tweet::Model>> {
    Ok(tweet::Entity::find()
        .filter(tweet::Column::UserId.eq(user_id))
        .order_by_desc(tweet::Column::CreatedAt)
        .order_by_desc(tweet::Column::UpdatedAt)
        .limit(limit)
        .offset(page_offset(page, limit))
        .all(db)
        .await?)
}

pub async fn add_comment(
    db: &DbPool,
    author_id: i64,
    tweet_id: i64,
    content: String,
) -> Result<comment::Model> {
    get_tweet(db, tweet_id).await?;

    let now = Utc::now();
    let new_comment = comment::ActiveModel {
        user_id: Set(author_id),
        tweet_id: Set(tweet_id),
        content: Set(content),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(comment::Entity::insert(new_comment).exec_with_returning(db).await?)
}

pub async fn list_comments<C: ConnectionTrait>(
    db: &C,
    tweet_id: i64,
    page: u64,
    limit: u64,
) -> Result<Vec<comment::Model>> {
    get_tweet(db, tweet_id).await?;

    Ok(comment::Entity::find()
        .filter(comment::Column::TweetId.eq(tweet_id))
        .order_by_desc(comment::Column::CreatedAt)
        .order_by_desc(comment::Column::UpdatedAt)
        .limit(limit)
        .offset(page_offset(page, limit))
        .all(db)
        .await?)
}

pub async fn comment_count<C: ConnectionTrait>(db: &C, tweet_id: i64) -> Result<u64> {
    Ok(comment::Entity::find()
        .filter(comment::Column::TweetId.eq(tweet_id))
        .count(db)
        .await?)
}

/// Assembles the canonical tweet response for a (possibly anonymous)
/// viewer: owner, counts, the viewer's like flag and the parent summary.
pub async fn hydrate<C: ConnectionTrait>(
    db: &C,
    tweet: tweet::Model,
    viewer_id: Option<i64>,
) -> Result<TweetResponse> {
    let owner = user::Entity::find_by_id(tweet.user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("user"))?;

    let like_count = graph::like_count(db, tweet.id).await?;
    let comment_count = comment_count(db, tweet.id).await?;
    let user_like_it = match viewer_id {
        Some(viewer_id) => graph::has_liked(db, viewer_id, tweet.id).await?,
        None => false,
    };

    let is_retweet = tweet.is_retweet();
    let parent = match tweet.parent_id {
        Some(parent_id) => hydrate_parent(db, parent_id, viewer_id).await?,
        None => None,
    };

    Ok(TweetResponse {
        id: tweet.id,
        user: owner.into(),
        content: tweet.content,
        image: tweet.image,
        is_retweet,
        parent,
        like_count,
        comment_count,
        user_like_it,
        created_at: tweet.created_at,
        updated_at: tweet.updated_at,
    })
}

async fn hydrate_parent<C: ConnectionTrait>(
    db: &C,
    parent_id: i64,
    viewer_id: Option<i64>,
) -> Result<Option<ParentTweetResponse>> {
    let parent = match tweet::Entity::find_by_id(parent_id).one(db).await? {
        Some(parent) => parent,
        None => return Ok(None),
    };
    let owner = user::Entity::find_by_id(parent.user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("user"))?;

    let like_count = graph::like_count(db, parent.id).await?;
    let user_like_it = match viewer_id {
        Some(viewer_id) => graph::has_liked(db, viewer_id, parent.id).await?,
        None => false,
    };

    Ok(Some(ParentTweetResponse {
        id: parent.id,
        user: owner.into(),
        content: parent.content,
        like_count,
        user_like_it,
    }))
}

pub async fn hydrate_many<C: ConnectionTrait>(
    db: &C,
    tweets: Vec<tweet::Model>,
    viewer_id: Option<i64>,
) -> Result<Vec<TweetResponse>> {
    let mut responses = Vec::with_capacity(tweets.len());
    for tweet in tweets {
        responses.push(hydrate(db, tweet, viewer_id).await?);
    }
    Ok(responses)
}

pub async fn comment_response<C: ConnectionTrait>(
    db: &C,
    comment: comment::Model,
) -> Result<CommentResponse> {
    let author = user::Entity::find_by_id(comment.user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("user"))?;
    Ok(CommentResponse {
        id: comment.id,
        tweet_id: comment.tweet_id,
        user: author.into(),
        content: comment.content,
        created_at: comment.created_at,
    })
}

pub async fn comment_responses<C: ConnectionTrait>(
    db: &C,
    comments: Vec<comment::Model>,
) -> Result<Vec<CommentResponse>> {
    let mut responses = Vec::with_capacity(comments.len());
    for comment in comments {
        responses.push(comment_response(db, comment).await?);
    }
    Ok(responses)
}

fn page_offset(page: u64, limit: u64) -> u64 {
    (page.max(1) - 1) * limit
}
