//! The relationship graph: directed follow edges between users and like
//! edges between users and tweets.
//!
//! Every mutation checks the current edge state and applies the change in
//! one transaction; the composite primary keys on `follows` and
//! `tweet_likes` settle concurrent duplicates, so the loser of a race
//! surfaces `AlreadyExists` instead of a second edge.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

use crate::db::DbPool;
use crate::entities::{follow, tweet, tweet_like, user};
use crate::error::{Error, Result};

/// Creates the follower -> followed edge and returns the followee's
/// updated follower count.
pub async fn follow(db: &DbPool, follower_id: i64, followed_id: i64) -> Result<u64> {
    if follower_id == followed_id {
        return Err(Error::InvalidOperation("cannot follow yourself"));
    }

    let txn = db.begin().await?;

    let target = user::Entity::find_by_id(followed_id)
        .one(&txn)
        .await?
        .filter(|u| u.is_active)
        .ok_or(Error::NotFound("user"))?;

    if edge_exists(&txn, follower_id, followed_id).await? {
        return Err(Error::AlreadyExists("follow"));
    }

    let edge = follow::ActiveModel {
        follower_id: Set(follower_id),
        followed_id: Set(followed_id),
        created_at: Set(Utc::now()),
    };
    follow::Entity::insert(edge)
        .exec_without_returning(&txn)
        .await
        .map_err(|e| Error::from_insert(e, "follow"))?;

    let count = follower_count(&txn, target.id).await?;
    txn.commit().await?;

    log::info!("user {} followed user {}", follower_id, followed_id);
    Ok(count)
}

/// Removes the follower -> followed edge and returns the followee's
/// updated follower count.
pub async fn unfollow(db: &DbPool, follower_id: i64, followed_id: i64) -> Result<u64> {
    if follower_id == followed_id {
        return Err(Error::InvalidOperation("cannot unfollow yourself"));
    }

    let txn = db.begin().await?;

    let result = follow::Entity::delete_by_id((follower_id, followed_id))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound("follow"));
    }

    let count = follower_count(&txn, followed_id).await?;
    txn.commit().await?;

    log::info!("user {} unfollowed user {}", follower_id, followed_id);
    Ok(count)
}

pub async fn is_following<C: ConnectionTrait>(db: &C, follower_id: i64, followed_id: i64) -> Result<bool> {
    edge_exists(db, follower_id, followed_id).await
}

async fn edge_exists<C: ConnectionTrait>(db: &C, follower_id: i64, followed_id: i64) -> Result<bool> {
    Ok(follow::Entity::find_by_id((follower_id, followed_id))
        .one(db)
        .await?
        .is_some())
}

/// Users following `user_id`, in edge-insertion order.
pub async fn followers<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    page: u64,
    limit: u64,
) -> Result<Vec<user::Model>> {
    let edges = follow::Entity::find()
        .filter(follow::Column::FollowedId.eq(user_id))
        .order_by_asc(follow::Column::CreatedAt)
        .limit(limit)
        .offset(page_offset(page, limit))
        .all(db)
        .await?;
    let ids = edges.iter().map(|e| e.follower_id).collect();
    users_in_order(db, ids).await
}

/// Users that `user_id` follows, in edge-insertion order.
pub async fn following<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    page: u64,
    limit: u64,
) -> Result<Vec<user::Model>> {
    let edges = follow::Entity::find()
        .filter(follow::Column::FollowerId.eq(user_id))
        .order_by_asc(follow::Column::CreatedAt)
        .limit(limit)
        .offset(page_offset(page, limit))
        .all(db)
        .await?;
    let ids = edges.iter().map(|e| e.followed_id).collect();
    users_in_order(db, ids).await
}

/// Ids of every user that `user_id` follows, unpaginated. The feed
/// assembler scopes its query with this.
pub async fn following_ids<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<Vec<i64>> {
    let edges = follow::Entity::find()
        .filter(follow::Column::FollowerId.eq(user_id))
        .all(db)
        .await?;
    Ok(edges.into_iter().map(|e| e.followed_id).collect())
}

pub async fn follower_count<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<u64> {
    Ok(follow::Entity::find()
        .filter(follow::Column::FollowedId.eq(user_id))
        .count(db)
        .await?)
}

pub async fn following_count<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<u64> {
    Ok(follow::Entity::find()
        .filter(follow::Column::FollowerId.eq(user_id))
        .count(db)
        .await?)
}

/// Creates the user -> tweet like edge and returns the tweet's updated
/// like count.
pub async fn like(db: &DbPool, user_id: i64, tweet_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    tweet::Entity::find_by_id(tweet_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound("tweet"))?;

    if has_liked(&txn, user_id, tweet_id).await? {
        return Err(Error::AlreadyExists("like"));
    }

    let edge = tweet_like::ActiveModel {
        user_id: Set(user_id),
        tweet_id: Set(tweet_id),
        created_at: Set(Utc::now()),
    };
    tweet_like::Entity::insert(edge)
        .exec_without_returning(&txn)
        .await
        .map_err(|e| Error::from_insert(e, "like"))?;

    let count = like_count(&txn, tweet_id).await?;
    txn.commit().await?;
    Ok(count)
}

/// Removes the user -> tweet like edge and returns the tweet's updated
/// like count.
pub async fn unlike(db: &DbPool, user_id: i64, tweet_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    let result = tweet_like::Entity::delete_by_id((user_id, tweet_id))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound("like"));
    }

    let count = like_count(&txn, tweet_id).await?;
    txn.commit().await?;
    Ok(count)
}

pub async fn has_liked<C: ConnectionTrait>(db: &C, user_id: i64, tweet_id: i64) -> Result<bool> {
    Ok(tweet_like::Entity::find_by_id((user_id, tweet_id))
        .one(db)
        .await?
        .is_some())
}

pub async fn like_count<C: ConnectionTrait>(db: &C, tweet_id: i64) -> Result<u64> {
    Ok(tweet_like::Entity::find()
        .filter(tweet_like::Column::TweetId.eq(tweet_id))
        .count(db)
        .await?)
}

/// Deletes every edge touching `user_id`, both directions. Part of the
/// account-deletion cascade.
pub async fn remove_user_edges<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<()> {
    follow::Entity::delete_many()
        .filter(
            Condition::any()
                .add(follow::Column::FollowerId.eq(user_id))
                .add(follow::Column::FollowedId.eq(user_id)),
        )
        .exec(db)
        .await?;
    tweet_like::Entity::delete_many()
        .filter(tweet_like::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

fn page_offset(page: u64, limit: u64) -> u64 {
    (page.max(1) - 1) * limit
}

/// Fetches users by id, preserving the order of `ids`.
async fn users_in_order<C: ConnectionTrait>(db: &C, ids: Vec<i64>) -> Result<Vec<user::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?;
    let mut by_id: HashMap<i64, user::Model> = users.into_iter().map(|u| (u.id, u)).collect();
    Ok(ids.into_iter().filter_map(|id| by_id.remove(&id)).collect())
}
