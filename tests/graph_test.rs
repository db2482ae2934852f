// Service-level tests for the relationship graph, the post store and the
// feed assembler, run directly against a fresh in-memory database.
// Run with: cargo test --test graph_test

use microblog_service::db::{self, DbPool};
use microblog_service::entities::{comment, follow, tweet_like, user};
use microblog_service::error::Error;
use microblog_service::models::SignupRequest;
use microblog_service::services::actions::{self, Action};
use microblog_service::services::{feed, graph, tweets, users};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

async fn setup() -> DbPool {
    db::create_pool("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

async fn create_user(db: &DbPool, username: &str) -> user::Model {
    users::signup(
        db,
        SignupRequest {
            email: format!("{}@example.com", username),
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password: "password123".to_string(),
            password_confirmation: "password123".to_string(),
        },
    )
    .await
    .expect("signup should succeed")
}

async fn edge_count(db: &DbPool) -> u64 {
    follow::Entity::find().count(db).await.unwrap()
}

#[actix_web::test]
async fn follow_unfollow_round_trip() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;

    assert_eq!(edge_count(&db).await, 0);

    let count = graph::follow(&db, alice.id, bob.id).await.unwrap();
    assert_eq!(count, 1);
    assert!(graph::is_following(&db, alice.id, bob.id).await.unwrap());
    assert_eq!(edge_count(&db).await, 1);

    let count = graph::unfollow(&db, alice.id, bob.id).await.unwrap();
    assert_eq!(count, 0);
    assert!(!graph::is_following(&db, alice.id, bob.id).await.unwrap());
    assert_eq!(edge_count(&db).await, 0, "the graph is back in its original state");
}

#[actix_web::test]
async fn self_follow_always_rejected() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;

    let err = graph::follow(&db, alice.id, alice.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));

    // Also through the action engine.
    let err = actions::dispatch(&db, alice.id, Action::Follow { user_id: alice.id })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));

    assert_eq!(edge_count(&db).await, 0);
}

#[actix_web::test]
async fn double_follow_conflicts_without_growing_the_edge_set() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;

    graph::follow(&db, alice.id, bob.id).await.unwrap();
    let err = graph::follow(&db, alice.id, bob.id).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
    assert_eq!(edge_count(&db).await, 1);
}

#[actix_web::test]
async fn unfollow_without_edge_is_not_found() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;

    let err = graph::unfollow(&db, alice.id, bob.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[actix_web::test]
async fn follow_unknown_user_is_not_found() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;

    let err = graph::follow(&db, alice.id, 999_999).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[actix_web::test]
async fn feed_contains_own_and_followed_tweets_only() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;
    let carol = create_user(&db, "carol").await;

    let bob_tweet = tweets::create_tweet(&db, bob.id, "from bob".to_string(), None)
        .await
        .unwrap();
    tweets::create_tweet(&db, carol.id, "from carol".to_string(), None)
        .await
        .unwrap();
    let alice_tweet = tweets::create_tweet(&db, alice.id, "from alice".to_string(), None)
        .await
        .unwrap();

    graph::follow(&db, alice.id, bob.id).await.unwrap();

    let result = feed::feed(&db, alice.id, 1, 20).await.unwrap();
    let ids: Vec<i64> = result.iter().map(|t| t.id).collect();
    assert_eq!(
        ids,
        vec![alice_tweet.id, bob_tweet.id],
        "newest first, own and followed authors only"
    );
}

#[actix_web::test]
async fn feed_reflects_the_live_edge_set() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;

    tweets::create_tweet(&db, bob.id, "from bob".to_string(), None)
        .await
        .unwrap();

    graph::follow(&db, alice.id, bob.id).await.unwrap();
    assert_eq!(feed::feed(&db, alice.id, 1, 20).await.unwrap().len(), 1);

    graph::unfollow(&db, alice.id, bob.id).await.unwrap();
    assert_eq!(
        feed::feed(&db, alice.id, 1, 20).await.unwrap().len(),
        0,
        "the feed recomputes from the current graph"
    );
}

#[actix_web::test]
async fn like_unlike_round_trip() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;

    let tweet = tweets::create_tweet(&db, bob.id, "like me".to_string(), None)
        .await
        .unwrap();

    let count = graph::like(&db, alice.id, tweet.id).await.unwrap();
    assert_eq!(count, 1);
    assert!(graph::has_liked(&db, alice.id, tweet.id).await.unwrap());

    let err = graph::like(&db, alice.id, tweet.id).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
    assert_eq!(graph::like_count(&db, tweet.id).await.unwrap(), 1);

    let count = graph::unlike(&db, alice.id, tweet.id).await.unwrap();
    assert_eq!(count, 0);

    let err = graph::unlike(&db, alice.id, tweet.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(graph::like_count(&db, tweet.id).await.unwrap(), 0);
}

#[actix_web::test]
async fn deleting_a_tweet_cascades_comments_and_orphans_children() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;

    let parent = tweets::create_tweet(&db, bob.id, "parent".to_string(), None)
        .await
        .unwrap();
    tweets::add_comment(&db, alice.id, parent.id, "nice".to_string())
        .await
        .unwrap();
    graph::like(&db, alice.id, parent.id).await.unwrap();
    let child = tweets::create_retweet(&db, alice.id, parent.id, Some("quoting".to_string()))
        .await
        .unwrap();
    assert!(child.is_retweet());

    tweets::delete_tweet(&db, parent.id, bob.id).await.unwrap();

    let err = tweets::get_tweet(&db, parent.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let remaining_comments = comment::Entity::find()
        .filter(comment::Column::TweetId.eq(parent.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(remaining_comments, 0, "comments go with their tweet");

    let remaining_likes = tweet_like::Entity::find()
        .filter(tweet_like::Column::TweetId.eq(parent.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(remaining_likes, 0, "likes go with their tweet");

    let orphan = tweets::get_tweet(&db, child.id).await.unwrap();
    assert_eq!(orphan.parent_id, None, "children are orphaned, not deleted");
    assert!(!orphan.is_retweet());
}

#[actix_web::test]
async fn deleting_a_tweet_requires_ownership() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;

    let tweet = tweets::create_tweet(&db, bob.id, "bob's".to_string(), None)
        .await
        .unwrap();

    let err = tweets::delete_tweet(&db, tweet.id, alice.id).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
    assert!(tweets::get_tweet(&db, tweet.id).await.is_ok());

    let err = actions::dispatch(
        &db,
        alice.id,
        Action::EditTweet {
            tweet_id: tweet.id,
            content: "mine now".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
}

#[actix_web::test]
async fn account_deletion_cascades_everything() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;

    let hello = tweets::create_tweet(&db, bob.id, "hello".to_string(), None)
        .await
        .unwrap();
    graph::follow(&db, alice.id, bob.id).await.unwrap();
    graph::like(&db, alice.id, hello.id).await.unwrap();
    tweets::add_comment(&db, alice.id, hello.id, "hi bob".to_string())
        .await
        .unwrap();
    let quote = tweets::create_retweet(&db, alice.id, hello.id, Some("look".to_string()))
        .await
        .unwrap();

    assert_eq!(feed::feed(&db, alice.id, 1, 20).await.unwrap().len(), 2);

    users::delete_account(&db, bob.id).await.unwrap();

    let err = users::get_by_id(&db, bob.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    // Bob's tweets are gone, the follow edge is gone, and the feed only
    // holds alice's own (now orphaned) quote.
    assert!(!graph::is_following(&db, alice.id, bob.id).await.unwrap());
    assert_eq!(edge_count(&db).await, 0);
    let result = feed::feed(&db, alice.id, 1, 20).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, quote.id);
    assert_eq!(result[0].parent_id, None);

    let dangling_likes = tweet_like::Entity::find().count(&db).await.unwrap();
    assert_eq!(dangling_likes, 0);
    let dangling_comments = comment::Entity::find().count(&db).await.unwrap();
    assert_eq!(dangling_comments, 0);
}

#[actix_web::test]
async fn content_length_counts_code_points() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;

    // 250 two-byte code points are fine; the limit is not in bytes.
    let ok = tweets::create_tweet(&db, alice.id, "é".repeat(250), None).await;
    assert!(ok.is_ok());

    let err = tweets::create_tweet(&db, alice.id, "é".repeat(251), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = tweets::create_retweet(
        &db,
        alice.id,
        ok.unwrap().id,
        Some("x".repeat(251)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[actix_web::test]
async fn retweet_of_missing_tweet_is_not_found() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;

    let err = tweets::create_retweet(&db, alice.id, 999_999, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[actix_web::test]
async fn comments_list_newest_first() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;

    let tweet = tweets::create_tweet(&db, alice.id, "discuss".to_string(), None)
        .await
        .unwrap();
    tweets::add_comment(&db, alice.id, tweet.id, "first".to_string())
        .await
        .unwrap();
    tweets::add_comment(&db, alice.id, tweet.id, "second".to_string())
        .await
        .unwrap();

    let comments = tweets::list_comments(&db, tweet.id, 1, 20).await.unwrap();
    let contents: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["second", "first"]);
}

#[actix_web::test]
async fn followers_and_following_keep_insertion_order() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;
    let carol = create_user(&db, "carol").await;
    let dave = create_user(&db, "dave").await;

    graph::follow(&db, alice.id, dave.id).await.unwrap();
    graph::follow(&db, bob.id, dave.id).await.unwrap();
    graph::follow(&db, carol.id, dave.id).await.unwrap();

    let followers = graph::followers(&db, dave.id, 1, 20).await.unwrap();
    let names: Vec<&str> = followers.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);

    graph::follow(&db, dave.id, carol.id).await.unwrap();
    graph::follow(&db, dave.id, alice.id).await.unwrap();

    let following = graph::following(&db, dave.id, 1, 20).await.unwrap();
    let names: Vec<&str> = following.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["carol", "alice"]);
}

#[actix_web::test]
async fn update_bumps_modification_time_and_content() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;

    let tweet = tweets::create_tweet(&db, alice.id, "v1".to_string(), None)
        .await
        .unwrap();
    let updated = tweets::update_tweet(&db, tweet.id, alice.id, "v2".to_string())
        .await
        .unwrap();

    assert_eq!(updated.content, "v2");
    assert!(updated.updated_at >= tweet.updated_at);
    assert_eq!(updated.created_at, tweet.created_at);
}
