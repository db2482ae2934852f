//! The action engine: every state-changing social action funnels through
//! [`dispatch`], which resolves the actor, applies the per-action policy
//! and delegates to the graph or the post store. Read paths do not pass
//! through here.

use crate::db::DbPool;
use crate::entities::{comment, tweet, user};
use crate::error::{Error, Result};
use crate::services::{graph, tweets, users};

/// A validated, state-changing social action.
#[derive(Debug, Clone)]
pub enum Action {
    Tweet { content: String, image: Option<String> },
    Follow { user_id: i64 },
    Unfollow { user_id: i64 },
    Like { tweet_id: i64 },
    Unlike { tweet_id: i64 },
    Retweet { tweet_id: i64, content: Option<String> },
    Comment { tweet_id: i64, content: String },
    EditTweet { tweet_id: i64, content: String },
    DeleteTweet { tweet_id: i64 },
}

/// What an action produced.
#[derive(Debug)]
pub enum Outcome {
    /// Updated follower count of the followee.
    FollowerCount(u64),
    /// Updated like count of the tweet.
    LikeCount(u64),
    Tweet(tweet::Model),
    Comment(comment::Model),
    Deleted,
}

pub async fn dispatch(db: &DbPool, actor_id: i64, action: Action) -> Result<Outcome> {
    let actor = users::get_by_id(db, actor_id).await?;
    allow(&actor, &action)?;

    match action {
        Action::Tweet { content, image } => {
            let created = tweets::create_tweet(db, actor.id, content, image).await?;
            Ok(Outcome::Tweet(created))
        }
        Action::Follow { user_id } => {
            let count = graph::follow(db, actor.id, user_id).await?;
            Ok(Outcome::FollowerCount(count))
        }
        Action::Unfollow { user_id } => {
            let count = graph::unfollow(db, actor.id, user_id).await?;
            Ok(Outcome::FollowerCount(count))
        }
        Action::Like { tweet_id } => {
            let count = graph::like(db, actor.id, tweet_id).await?;
            Ok(Outcome::LikeCount(count))
        }
        Action::Unlike { tweet_id } => {
            let count = graph::unlike(db, actor.id, tweet_id).await?;
            Ok(Outcome::LikeCount(count))
        }
        Action::Retweet { tweet_id, content } => {
            let created = tweets::create_retweet(db, actor.id, tweet_id, content).await?;
            Ok(Outcome::Tweet(created))
        }
        Action::Comment { tweet_id, content } => {
            let created = tweets::add_comment(db, actor.id, tweet_id, content).await?;
            Ok(Outcome::Comment(created))
        }
        Action::EditTweet { tweet_id, content } => {
            let updated = tweets::update_tweet(db, tweet_id, actor.id, content).await?;
            Ok(Outcome::Tweet(updated))
        }
        Action::DeleteTweet { tweet_id } => {
            tweets::delete_tweet(db, tweet_id, actor.id).await?;
            Ok(Outcome::Deleted)
        }
    }
}

/// Actor-level policy, checked before any state is touched. Resource
/// ownership (edit/delete) is enforced where the row is loaded, in the
/// post store; edge preconditions live in the graph.
fn allow(actor: &user::Model, action: &Action) -> Result<()> {
    if !actor.is_active {
        return Err(Error::Forbidden("account is deactivated"));
    }
    match action {
        Action::Follow { user_id } if *user_id == actor.id => {
            Err(Error::InvalidOperation("cannot follow yourself"))
        }
        Action::Unfollow { user_id } if *user_id == actor.id => {
            Err(Error::InvalidOperation("cannot unfollow yourself"))
        }
        _ => Ok(()),
    }
}
