use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::handlers as auth;
use crate::auth::middleware::{admin_middleware, auth_middleware};
use crate::handlers::{admin, content, genres, movies, series};
use crate::infra::app_state::AppState;

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/movies", get(movies::list))
        .route("/movies/{id}", get(movies::detail))
        .route("/movies/{id}/credits", get(movies::credits))
        .route("/series", get(series::list))
        .route("/series/{id}", get(series::detail))
        .route("/series/{id}/credits", get(series::credits))
        .route("/series/{id}/seasons/{number}", get(series::season))
        .route("/genres", get(genres::list))
        .route("/content/browse", get(content::browse))
        .route("/content/featured", get(content::featured))
        .route("/content/search", get(content::search));

    let authed = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Layers run outermost-last-added, so the admin check goes on before the
    // auth layer that populates the user extension it reads.
    let admin_routes = Router::new()
        .route("/admin/tmdb/search", get(admin::tmdb_search))
        .route("/admin/movies", post(admin::create_movie))
        .route(
            "/admin/movies/{id}",
            put(admin::update_movie).delete(admin::delete_movie),
        )
        .route("/admin/series", post(admin::create_series))
        .route(
            "/admin/series/{id}",
            put(admin::update_series).delete(admin::delete_series),
        )
        .route("/admin/genres/sync", post(admin::sync_genres))
        .route("/admin/stats", get(admin::stats))
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public.merge(authed).merge(admin_routes).with_state(state)
}
