use crate::auth::{create_token, verify_password, AuthenticatedUser, Claims};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::Error;
use crate::models::{AuthResponse, LoginRequest, SignupRequest, UserResponse};
use crate::services::users;
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "User already exists")
    ),
    tag = "auth"
)]
pub async fn signup(
    req: web::Json<SignupRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ActixResult<HttpResponse> {
    let user = users::signup(pool.get_ref(), req.into_inner()).await?;

    let claims = Claims::new(
        user.id,
        user.email.clone(),
        user.username.clone(),
        config.jwt.expiration_hours,
    );
    let token = create_token(&claims, &config.jwt.secret)
        .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account deactivated"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn login(
    req: web::Json<LoginRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ActixResult<HttpResponse> {
    let user = users::find_by_email(pool.get_ref(), &req.email)
        .await?
        .ok_or(Error::NotFound("user"))?;

    if !user.is_active {
        return Err(Error::Forbidden("account is deactivated").into());
    }

    let is_valid = verify_password(&req.password, &user.password_hash)
        .map_err(actix_web::error::ErrorInternalServerError)?;
    if !is_valid {
        return Ok(HttpResponse::Unauthorized().json(json!({
            "error": "Invalid credentials"
        })));
    }

    let claims = Claims::new(
        user.id,
        user.email.clone(),
        user.username.clone(),
        config.jwt.expiration_hours,
    );
    let token = create_token(&claims, &config.jwt.secret)
        .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Fresh token issued", body = AuthResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Account deactivated")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "auth"
)]
pub async fn refresh(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ActixResult<HttpResponse> {
    let user = users::get_by_id(pool.get_ref(), user.user_id).await?;
    if !user.is_active {
        return Err(Error::Forbidden("account is deactivated").into());
    }

    let claims = Claims::new(
        user.id,
        user.email.clone(),
        user.username.clone(),
        config.jwt.expiration_hours,
    );
    let token = create_token(&claims, &config.jwt.secret)
        .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}
