//! Identity lifecycle: signup, profile reads and updates, password
//! change, deactivation and account deletion with its cascade.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait, Value,
};

use crate::auth::{hash_password, verify_password};
use crate::db::DbPool;
use crate::entities::{comment, tweet, tweet_like, user};
use crate::error::{Error, Result};
use crate::models::{ProfileResponse, SignupRequest, UpdateProfileRequest};
use crate::services::graph;

fn validate_signup(req: &SignupRequest) -> Result<()> {
    let username_len = req.username.chars().count();
    if !(4..=20).contains(&username_len) {
        return Err(Error::Validation(
            "username must be between 4 and 20 characters".to_string(),
        ));
    }
    validate_name("first_name", &req.first_name)?;
    validate_name("last_name", &req.last_name)?;
    validate_email(&req.email)?;
    validate_password(&req.password, &req.password_confirmation)?;
    Ok(())
}

fn validate_name(field: &str, value: &str) -> Result<()> {
    let len = value.chars().count();
    if !(2..=30).contains(&len) {
        return Err(Error::Validation(format!(
            "{} must be between 2 and 30 characters",
            field
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(Error::Validation("invalid email address".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str, confirmation: &str) -> Result<()> {
    let len = password.chars().count();
    if !(8..=60).contains(&len) {
        return Err(Error::Validation(
            "password must be between 8 and 60 characters".to_string(),
        ));
    }
    if password != confirmation {
        return Err(Error::Validation("passwords do not match".to_string()));
    }
    Ok(())
}

pub async fn signup(db: &DbPool, req: SignupRequest) -> Result<user::Model> {
    validate_signup(&req)?;

    let password_hash =
        hash_password(&req.password).map_err(|e| Error::Internal(e.to_string()))?;

    let txn = db.begin().await?;

    let existing = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(&req.email))
                .add(user::Column::Username.eq(&req.username)),
        )
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::AlreadyExists("user"));
    }

    let now = Utc::now();
    let new_user = user::ActiveModel {
        email: Set(req.email),
        username: Set(req.username),
        first_name: Set(req.first_name),
        last_name: Set(req.last_name),
        bio: Set(None),
        picture: Set(None),
        password_hash: Set(password_hash),
        is_active: Set(true),
        is_admin: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = user::Entity::insert(new_user)
        .exec_with_returning(&txn)
        .await
        .map_err(|e| Error::from_insert(e, "user"))?;
    txn.commit().await?;

    log::info!("user {} signed up", created.username);
    Ok(created)
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<user::Model> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("user"))
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<user::Model>> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?)
}

/// Active users only; deactivated profiles are hidden from lookups.
pub async fn get_active_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<user::Model> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .filter(user::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or(Error::NotFound("user"))
}

pub async fn profile<C: ConnectionTrait>(
    db: &C,
    username: &str,
    viewer_id: Option<i64>,
) -> Result<ProfileResponse> {
    let user = get_active_by_username(db, username).await?;

    let tweet_count = tweet::Entity::find()
        .filter(tweet::Column::UserId.eq(user.id))
        .count(db)
        .await?;
    let follower_count = graph::follower_count(db, user.id).await?;
    let following_count = graph::following_count(db, user.id).await?;
    let is_following = match viewer_id {
        Some(viewer_id) => graph::is_following(db, viewer_id, user.id).await?,
        None => false,
    };

    Ok(ProfileResponse {
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        bio: user.bio,
        picture: user.picture,
        tweet_count,
        follower_count,
        following_count,
        is_following,
    })
}

pub async fn update_profile(
    db: &DbPool,
    user_id: i64,
    req: UpdateProfileRequest,
) -> Result<user::Model> {
    let existing = get_by_id(db, user_id).await?;

    let mut updated = user::ActiveModel {
        id: Set(existing.id),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    if let Some(first_name) = req.first_name {
        validate_name("first_name", &first_name)?;
        updated.first_name = Set(first_name);
    }
    if let Some(last_name) = req.last_name {
        validate_name("last_name", &last_name)?;
        updated.last_name = Set(last_name);
    }
    if let Some(bio) = req.bio {
        updated.bio = Set(Some(bio));
    }
    if let Some(picture) = req.picture {
        updated.picture = Set(Some(picture));
    }

    Ok(user::Entity::update(updated).exec(db).await?)
}

pub async fn change_password(
    db: &DbPool,
    user_id: i64,
    old_password: &str,
    new_password: &str,
    confirmation: &str,
) -> Result<()> {
    let existing = get_by_id(db, user_id).await?;

    let old_ok = verify_password(old_password, &existing.password_hash)
        .map_err(|e| Error::Internal(e.to_string()))?;
    if !old_ok {
        return Err(Error::Forbidden("old password does not match"));
    }
    validate_password(new_password, confirmation)?;

    let password_hash =
        hash_password(new_password).map_err(|e| Error::Internal(e.to_string()))?;
    let updated = user::ActiveModel {
        id: Set(user_id),
        password_hash: Set(password_hash),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    user::Entity::update(updated).exec(db).await?;
    Ok(())
}

/// The normal account-removal flow: flips the active flag, keeps rows.
pub async fn deactivate(db: &DbPool, user_id: i64) -> Result<()> {
    get_by_id(db, user_id).await?;

    let updated = user::ActiveModel {
        id: Set(user_id),
        is_active: Set(false),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    user::Entity::update(updated).exec(db).await?;

    log::info!("user {} deactivated", user_id);
    Ok(())
}

/// Hard delete with full cascade: the user's tweets go together with the
/// comments and likes on them, the user's own comments and like edges,
/// and every follow edge in either direction. Tweets that point at a
/// deleted tweet as parent are orphaned, not removed.
pub async fn delete_account(db: &DbPool, user_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    get_by_id(&txn, user_id).await?;

    let tweet_ids: Vec<i64> = tweet::Entity::find()
        .filter(tweet::Column::UserId.eq(user_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    if !tweet_ids.is_empty() {
        comment::Entity::delete_many()
            .filter(comment::Column::TweetId.is_in(tweet_ids.clone()))
            .exec(&txn)
            .await?;
        tweet_like::Entity::delete_many()
            .filter(tweet_like::Column::TweetId.is_in(tweet_ids.clone()))
            .exec(&txn)
            .await?;
        tweet::Entity::update_many()
            .col_expr(tweet::Column::ParentId, Expr::value(Value::BigInt(None)))
            .filter(tweet::Column::ParentId.is_in(tweet_ids.clone()))
            .exec(&txn)
            .await?;
    }

    comment::Entity::delete_many()
        .filter(comment::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    graph::remove_user_edges(&txn, user_id).await?;
    tweet::Entity::delete_many()
        .filter(tweet::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(user_id).exec(&txn).await?;

    txn.commit().await?;

    log::info!("user {} deleted", user_id);
    Ok(())
}
