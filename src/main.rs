use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod auth;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod services;

use config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().expect("Failed to load configuration");

    log::info!(
        "Starting server on {}:{}",
        config.server.host,
        config.server.port
    );

    let pool = db::create_pool(&config.mysql_url())
        .await
        .expect("Failed to create database pool");

    log::info!("Database connection established");

    let openapi = api::ApiDoc::openapi();

    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(pool.clone()))
            .route(
                "/api/docs",
                web::get().to(|| async {
                    actix_web::HttpResponse::PermanentRedirect()
                        .append_header(("Location", "/api/docs/"))
                        .finish()
                }),
            )
            .service(
                SwaggerUi::new("/api/docs/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(api::auth::signup))
                            .route("/login", web::post().to(api::auth::login))
                            .route("/refresh", web::post().to(api::auth::refresh)),
                    )
                    .service(web::scope("/feed").route("", web::get().to(api::feed::get_feed)))
                    .service(
                        web::scope("/tweets")
                            .route("", web::post().to(api::tweets::create_tweet))
                            .route("", web::get().to(api::tweets::list_tweets))
                            .route("/{tweet_id}", web::get().to(api::tweets::get_tweet))
                            .route("/{tweet_id}", web::put().to(api::tweets::update_tweet))
                            .route("/{tweet_id}", web::delete().to(api::tweets::delete_tweet))
                            .route("/{tweet_id}/like", web::post().to(api::tweets::like_tweet))
                            .route(
                                "/{tweet_id}/like",
                                web::delete().to(api::tweets::unlike_tweet),
                            )
                            .route("/{tweet_id}/retweet", web::post().to(api::tweets::retweet))
                            .route(
                                "/{tweet_id}/comment",
                                web::post().to(api::tweets::comment_tweet),
                            )
                            .route(
                                "/{tweet_id}/comments",
                                web::get().to(api::tweets::get_comments),
                            ),
                    )
                    .service(
                        web::scope("/users")
                            .route("/me", web::put().to(api::users::update_me))
                            .route("/me", web::delete().to(api::users::delete_me))
                            .route("/me/password", web::put().to(api::users::change_password))
                            .route(
                                "/me/deactivate",
                                web::post().to(api::users::deactivate_me),
                            )
                            .route("/{username}", web::get().to(api::users::get_profile))
                            .route(
                                "/{username}/tweets",
                                web::get().to(api::users::get_user_tweets),
                            )
                            .route(
                                "/{username}/followers",
                                web::get().to(api::users::get_followers),
                            )
                            .route(
                                "/{username}/following",
                                web::get().to(api::users::get_following),
                            )
                            .route(
                                "/{username}/follow",
                                web::post().to(api::users::follow_user),
                            )
                            .route(
                                "/{username}/follow",
                                web::delete().to(api::users::unfollow_user),
                            ),
                    ),
            )
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await
}
