use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::models::TweetResponse;
use crate::services::{feed, tweets};
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::Deserialize;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct FeedQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/feed",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "The viewer's feed, newest first", body = Vec<TweetResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "feed"
)]
pub async fn get_feed(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    query: web::Query<FeedQuery>,
) -> ActixResult<HttpResponse> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let tweets_page = feed::feed(pool.get_ref(), user.user_id, page, limit).await?;
    let responses = tweets::hydrate_many(pool.get_ref(), tweets_page, Some(user.user_id)).await?;
    Ok(HttpResponse::Ok().json(responses))
}
