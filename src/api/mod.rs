pub mod auth;
pub mod feed;
pub mod tweets;
pub mod users;

use crate::models::{
    AuthResponse, ChangePasswordRequest, CommentRequest, CommentResponse, CreateTweetRequest,
    FollowResponse, LikeResponse, LoginRequest, ParentTweetResponse, ProfileResponse,
    RetweetRequest, SignupRequest, TweetResponse, UpdateProfileRequest, UpdateTweetRequest,
    UserResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth endpoints
        auth::signup,
        auth::login,
        auth::refresh,
        // Tweet endpoints
        tweets::create_tweet,
        tweets::list_tweets,
        tweets::get_tweet,
        tweets::update_tweet,
        tweets::delete_tweet,
        tweets::like_tweet,
        tweets::unlike_tweet,
        tweets::retweet,
        tweets::comment_tweet,
        tweets::get_comments,
        // Feed endpoint
        feed::get_feed,
        // User endpoints
        users::get_profile,
        users::get_user_tweets,
        users::get_followers,
        users::get_following,
        users::follow_user,
        users::unfollow_user,
        users::update_me,
        users::change_password,
        users::deactivate_me,
        users::delete_me,
    ),
    components(schemas(
        // Auth schemas
        SignupRequest,
        LoginRequest,
        AuthResponse,
        UserResponse,
        ChangePasswordRequest,
        // Tweet schemas
        CreateTweetRequest,
        UpdateTweetRequest,
        RetweetRequest,
        TweetResponse,
        ParentTweetResponse,
        LikeResponse,
        CommentRequest,
        CommentResponse,
        // User schemas
        ProfileResponse,
        UpdateProfileRequest,
        FollowResponse,
        // Query schemas
        tweets::TweetListQuery,
        tweets::CommentQuery,
        feed::FeedQuery,
        users::ListQuery,
    )),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "tweets", description = "Tweet, retweet and comment endpoints"),
        (name = "feed", description = "Feed endpoints"),
        (name = "users", description = "Profile and follow-graph endpoints"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use utoipa::Modify;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
