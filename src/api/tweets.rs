use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::models::{
    CommentRequest, CommentResponse, CreateTweetRequest, LikeResponse, RetweetRequest,
    TweetResponse, UpdateTweetRequest,
};
use crate::services::actions::{Action, Outcome};
use crate::services::{actions, tweets};
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct TweetListQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
    /// Only tweets by this author.
    pub username: Option<String>,
    /// Only tweets whose content contains this text.
    pub content: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CommentQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/api/tweets",
    request_body = CreateTweetRequest,
    responses(
        (status = 201, description = "Tweet created successfully", body = TweetResponse),
        (status = 400, description = "Content too long"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "tweets"
)]
pub async fn create_tweet(
    req: web::Json<CreateTweetRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    let action = Action::Tweet {
        content: req.content,
        image: req.image,
    };
    let tweet = match actions::dispatch(pool.get_ref(), user.user_id, action).await? {
        Outcome::Tweet(tweet) => tweet,
        _ => unreachable!(),
    };
    let response = tweets::hydrate(pool.get_ref(), tweet, Some(user.user_id)).await?;
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    get,
    path = "/api/tweets",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("username" = Option<String>, Query, description = "Filter by author username"),
        ("content" = Option<String>, Query, description = "Filter by content substring")
    ),
    responses(
        (status = 200, description = "List of tweets", body = Vec<TweetResponse>)
    ),
    tag = "tweets"
)]
pub async fn list_tweets(
    user: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
    query: web::Query<TweetListQuery>,
) -> ActixResult<HttpResponse> {
    let viewer_id = user.map(|u| u.user_id);
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let tweets_page = tweets::list_tweets(
        pool.get_ref(),
        query.username.as_deref(),
        query.content.as_deref(),
        page,
        limit,
    )
    .await?;
    let responses = tweets::hydrate_many(pool.get_ref(), tweets_page, viewer_id).await?;
    Ok(HttpResponse::Ok().json(responses))
}

#[utoipa::path(
    get,
    path = "/api/tweets/{tweet_id}",
    params(
        ("tweet_id" = i64, Path, description = "Tweet ID")
    ),
    responses(
        (status = 200, description = "Tweet detail", body = TweetResponse),
        (status = 404, description = "Tweet not found")
    ),
    tag = "tweets"
)]
pub async fn get_tweet(
    path: web::Path<i64>,
    user: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let viewer_id = user.map(|u| u.user_id);
    let tweet = tweets::get_tweet(pool.get_ref(), path.into_inner()).await?;
    let response = tweets::hydrate(pool.get_ref(), tweet, viewer_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    put,
    path = "/api/tweets/{tweet_id}",
    request_body = UpdateTweetRequest,
    responses(
        (status = 200, description = "Tweet updated", body = TweetResponse),
        (status = 400, description = "Content too long"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tweet not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "tweets"
)]
pub async fn update_tweet(
    path: web::Path<i64>,
    req: web::Json<UpdateTweetRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let action = Action::EditTweet {
        tweet_id: path.into_inner(),
        content: req.into_inner().content,
    };
    let tweet = match actions::dispatch(pool.get_ref(), user.user_id, action).await? {
        Outcome::Tweet(tweet) => tweet,
        _ => unreachable!(),
    };
    let response = tweets::hydrate(pool.get_ref(), tweet, Some(user.user_id)).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    delete,
    path = "/api/tweets/{tweet_id}",
    responses(
        (status = 200, description = "Tweet deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tweet not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "tweets"
)]
pub async fn delete_tweet(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let action = Action::DeleteTweet {
        tweet_id: path.into_inner(),
    };
    actions::dispatch(pool.get_ref(), user.user_id, action).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "Tweet deleted"})))
}

#[utoipa::path(
    post,
    path = "/api/tweets/{tweet_id}/like",
    responses(
        (status = 200, description = "Tweet liked", body = LikeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tweet not found"),
        (status = 409, description = "Already liked")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "tweets"
)]
pub async fn like_tweet(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let action = Action::Like {
        tweet_id: path.into_inner(),
    };
    let like_count = match actions::dispatch(pool.get_ref(), user.user_id, action).await? {
        Outcome::LikeCount(count) => count,
        _ => unreachable!(),
    };
    Ok(HttpResponse::Ok().json(LikeResponse {
        liked: true,
        like_count,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/tweets/{tweet_id}/like",
    responses(
        (status = 200, description = "Tweet unliked", body = LikeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No like to remove")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "tweets"
)]
pub async fn unlike_tweet(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let action = Action::Unlike {
        tweet_id: path.into_inner(),
    };
    let like_count = match actions::dispatch(pool.get_ref(), user.user_id, action).await? {
        Outcome::LikeCount(count) => count,
        _ => unreachable!(),
    };
    Ok(HttpResponse::Ok().json(LikeResponse {
        liked: false,
        like_count,
    }))
}

#[utoipa::path(
    post,
    path = "/api/tweets/{tweet_id}/retweet",
    request_body = RetweetRequest,
    responses(
        (status = 201, description = "Retweet created", body = TweetResponse),
        (status = 400, description = "Content too long"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tweet not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "tweets"
)]
pub async fn retweet(
    path: web::Path<i64>,
    req: web::Json<RetweetRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let action = Action::Retweet {
        tweet_id: path.into_inner(),
        content: req.into_inner().content,
    };
    let tweet = match actions::dispatch(pool.get_ref(), user.user_id, action).await? {
        Outcome::Tweet(tweet) => tweet,
        _ => unreachable!(),
    };
    let response = tweets::hydrate(pool.get_ref(), tweet, Some(user.user_id)).await?;
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    post,
    path = "/api/tweets/{tweet_id}/comment",
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tweet not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "tweets"
)]
pub async fn comment_tweet(
    path: web::Path<i64>,
    req: web::Json<CommentRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let action = Action::Comment {
        tweet_id: path.into_inner(),
        content: req.into_inner().content,
    };
    let comment = match actions::dispatch(pool.get_ref(), user.user_id, action).await? {
        Outcome::Comment(comment) => comment,
        _ => unreachable!(),
    };
    let response = tweets::comment_response(pool.get_ref(), comment).await?;
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    get,
    path = "/api/tweets/{tweet_id}/comments",
    params(
        ("tweet_id" = i64, Path, description = "Tweet ID"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "List of comments", body = Vec<CommentResponse>),
        (status = 404, description = "Tweet not found")
    ),
    tag = "tweets"
)]
pub async fn get_comments(
    path: web::Path<i64>,
    query: web::Query<CommentQuery>,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let comments =
        tweets::list_comments(pool.get_ref(), path.into_inner(), page, limit).await?;
    let responses = tweets::comment_responses(pool.get_ref(), comments).await?;
    Ok(HttpResponse::Ok().json(responses))
}
