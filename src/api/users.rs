use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::models::{
    ChangePasswordRequest, FollowResponse, ProfileResponse, TweetResponse, UpdateProfileRequest,
    UserResponse,
};
use crate::services::actions::{Action, Outcome};
use crate::services::{actions, graph, tweets, users};
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ListQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/users/{username}",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "Public profile", body = ProfileResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_profile(
    path: web::Path<String>,
    user: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let viewer_id = user.map(|u| u.user_id);
    let profile = users::profile(pool.get_ref(), &path.into_inner(), viewer_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    get,
    path = "/api/users/{username}/tweets",
    params(
        ("username" = String, Path, description = "Username"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "The user's tweets", body = Vec<TweetResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user_tweets(
    path: web::Path<String>,
    query: web::Query<ListQuery>,
    user: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let viewer_id = user.map(|u| u.user_id);
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let author = users::get_active_by_username(pool.get_ref(), &path.into_inner()).await?;
    let tweets_page = tweets::list_by_user(pool.get_ref(), author.id, page, limit).await?;
    let responses = tweets::hydrate_many(pool.get_ref(), tweets_page, viewer_id).await?;
    Ok(HttpResponse::Ok().json(responses))
}

#[utoipa::path(
    get,
    path = "/api/users/{username}/followers",
    params(
        ("username" = String, Path, description = "Username"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Users following this user", body = Vec<UserResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_followers(
    path: web::Path<String>,
    query: web::Query<ListQuery>,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let target = users::get_active_by_username(pool.get_ref(), &path.into_inner()).await?;
    let followers = graph::followers(pool.get_ref(), target.id, page, limit).await?;
    let responses: Vec<UserResponse> = followers.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}

#[utoipa::path(
    get,
    path = "/api/users/{username}/following",
    params(
        ("username" = String, Path, description = "Username"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Users this user follows", body = Vec<UserResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_following(
    path: web::Path<String>,
    query: web::Query<ListQuery>,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let target = users::get_active_by_username(pool.get_ref(), &path.into_inner()).await?;
    let following = graph::following(pool.get_ref(), target.id, page, limit).await?;
    let responses: Vec<UserResponse> = following.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}

#[utoipa::path(
    post,
    path = "/api/users/{username}/follow",
    responses(
        (status = 200, description = "Now following", body = FollowResponse),
        (status = 400, description = "Cannot follow yourself"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Already following")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn follow_user(
    path: web::Path<String>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let target = users::get_active_by_username(pool.get_ref(), &path.into_inner()).await?;
    let action = Action::Follow { user_id: target.id };
    let follower_count = match actions::dispatch(pool.get_ref(), user.user_id, action).await? {
        Outcome::FollowerCount(count) => count,
        _ => unreachable!(),
    };
    Ok(HttpResponse::Ok().json(FollowResponse {
        following: true,
        follower_count,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/users/{username}/follow",
    responses(
        (status = 200, description = "No longer following", body = FollowResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User or edge not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn unfollow_user(
    path: web::Path<String>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let target = users::get_active_by_username(pool.get_ref(), &path.into_inner()).await?;
    let action = Action::Unfollow { user_id: target.id };
    let follower_count = match actions::dispatch(pool.get_ref(), user.user_id, action).await? {
        Outcome::FollowerCount(count) => count,
        _ => unreachable!(),
    };
    Ok(HttpResponse::Ok().json(FollowResponse {
        following: false,
        follower_count,
    }))
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn update_me(
    req: web::Json<UpdateProfileRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let updated = users::update_profile(pool.get_ref(), user.user_id, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

#[utoipa::path(
    put,
    path = "/api/users/me/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Old password does not match")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn change_password(
    req: web::Json<ChangePasswordRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    users::change_password(
        pool.get_ref(),
        user.user_id,
        &req.old_password,
        &req.new_password,
        &req.password_confirmation,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({"message": "Password changed"})))
}

#[utoipa::path(
    post,
    path = "/api/users/me/deactivate",
    responses(
        (status = 200, description = "Account deactivated"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn deactivate_me(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    users::deactivate(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "Account deactivated"})))
}

#[utoipa::path(
    delete,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn delete_me(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    users::delete_account(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "Account deleted"})))
}
